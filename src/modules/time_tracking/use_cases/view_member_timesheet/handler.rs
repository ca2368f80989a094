use crate::modules::time_tracking::core::roles::{Permission, Role};
use crate::modules::time_tracking::use_cases::track_time::timesheet_view::TimesheetView;
use crate::shared::core::calendar::WorkCalendar;
use crate::shared::core::clock::Clock;
use crate::shared::infrastructure::backend::{BackendError, TimeTrackingBackend, UserProfile};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum TimesheetError {
    #[error("role {role} may not view other members' timesheets")]
    Forbidden { role: Role },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Fetches a teammate's entries and answers through the same view the store hands out.
pub struct ViewMemberTimesheetHandler<B: TimeTrackingBackend + 'static> {
    backend: Arc<B>,
    clock: Arc<dyn Clock>,
    calendar: WorkCalendar,
}

impl<B: TimeTrackingBackend + 'static> ViewMemberTimesheetHandler<B> {
    pub fn new(backend: Arc<B>, clock: Arc<dyn Clock>, calendar: WorkCalendar) -> Self {
        Self {
            backend,
            clock,
            calendar,
        }
    }

    pub async fn handle(
        &self,
        viewer: &UserProfile,
        member_id: &str,
    ) -> Result<TimesheetView, TimesheetError> {
        if viewer.user_id != member_id && !viewer.role.can(Permission::ViewMemberTimesheet) {
            warn!(viewer = %viewer.user_id, role = %viewer.role, member_id, "timesheet access refused");
            return Err(TimesheetError::Forbidden { role: viewer.role });
        }

        let entries = self.backend.member_timesheet(member_id).await?;
        debug!(member_id, entries = entries.len(), "member timesheet loaded");
        Ok(TimesheetView::new(
            entries.into(),
            self.clock.now(),
            self.calendar,
        ))
    }
}
