//! Tracing setup for Taskline binaries.
//!
//! [`init_tracing`] installs a global subscriber filtered by `TASKLINE_LOG`
//! (falling back to `RUST_LOG`, then to the supplied level). Only the first
//! call in a process takes effect.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "TASKLINE_LOG";

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Install the global subscriber. Logs go to stderr so stdout stays free for
/// final answers.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_tracing(json: bool, level: Level) -> bool {
    let filter = env_filter(level);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).json())
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init()
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_ignored() {
        init_tracing(false, Level::WARN);
        assert!(!init_tracing(true, Level::DEBUG));
    }
}
