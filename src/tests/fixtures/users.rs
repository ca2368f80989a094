use crate::modules::time_tracking::core::roles::Role;
use crate::shared::infrastructure::backend::UserProfile;

pub fn profile(user_id: &str, role: Role, target_hours_per_week: f64) -> UserProfile {
    UserProfile {
        user_id: user_id.to_string(),
        full_name: format!("User {user_id}"),
        role,
        target_hours_per_week,
    }
}
