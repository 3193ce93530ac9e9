// CLI module for oxidemux
//
// Command-line front end over the demuxer library. Only compiled into the
// binary.

pub mod commands;
pub mod config;
pub mod output;

use tracing_subscriber::EnvFilter;

pub use commands::run;
pub use config::Config;

/// Install the stderr log subscriber. `RUST_LOG` overrides the flags.
pub fn init_logging(config: &Config) {
    let level = if config.verbose {
        "debug"
    } else if config.quiet {
        "error"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
