// Composition root for the time tracking client.
//
// Responsibilities
// - Read config from the environment.
// - Instantiate the backend adapter and wire it into the store, punch control and timesheet view.
// - Install logging and guard kiosk sessions.

pub mod config;
pub mod kiosk;
pub mod state;
pub mod telemetry;
