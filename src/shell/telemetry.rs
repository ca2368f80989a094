use tracing_subscriber::{EnvFilter, fmt};

pub const DEFAULT_DIRECTIVE: &str = "time_tracking=info";

/// `RUST_LOG` when set, otherwise the crate at info level.
pub fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    match rust_log.map(str::trim).filter(|value| !value.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE)),
        None => EnvFilter::new(DEFAULT_DIRECTIVE),
    }
}

/// Installs the global subscriber. Called once by the binary.
pub fn init() {
    let rust_log = std::env::var("RUST_LOG").ok();
    fmt()
        .with_env_filter(env_filter(rust_log.as_deref()))
        .with_target(false)
        .init();
}

#[cfg(test)]
mod telemetry_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, DEFAULT_DIRECTIVE)]
    #[case(Some(""), DEFAULT_DIRECTIVE)]
    #[case(Some("debug"), "debug")]
    fn it_should_pick_the_filter(#[case] rust_log: Option<&str>, #[case] expected: &str) {
        assert_eq!(env_filter(rust_log).to_string(), expected);
    }
}
