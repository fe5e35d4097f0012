//! Tracing setup for the CLI. Logs go to stderr so stdout stays parseable.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directive for the chosen verbosity. `RUST_LOG` wins when set.
fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info,workscribe_tracker=debug",
        (false, _) => "trace",
    }
}

pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(default_directive(0, true), "error");
        assert_eq!(default_directive(3, true), "error");
        assert_eq!(default_directive(0, false), "warn");
        assert_eq!(default_directive(2, false), "trace");
    }
}
