pub mod entries;
pub mod users;
