pub mod shared {
    pub mod core {
        pub mod calendar;
        pub mod clock;
    }
    pub mod infrastructure {
        pub mod backend;
    }
}

pub mod modules {
    pub mod time_tracking {
        pub mod core {
            pub mod aggregate;
            pub mod analytics;
            pub mod ingest;
            pub mod roles;
            pub mod stats;
            pub mod time_entry;
        }
        pub mod use_cases {
            pub mod track_time {
                pub mod live_clock;
                pub mod store;
                pub mod timesheet_view;
            }
            pub mod punch_clock {
                pub mod handler;
            }
            pub mod view_member_timesheet {
                pub mod handler;
            }
        }
    }
}

pub mod shell;
