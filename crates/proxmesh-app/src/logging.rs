//! Tracing subscriber setup.

use proxmesh_config::schema::{LogFormat, LogLevel, LoggingConfig};
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "proxmesh=info";

/// Pick the filter directive: the CLI flag, then `RUST_LOG`, then the
/// configured level.
fn resolve_directive(cli: Option<&str>, env: Option<&str>, level: LogLevel) -> String {
    cli.or(env)
        .map(str::to_string)
        .unwrap_or_else(|| format!("proxmesh={}", level.as_directive()))
}

/// Install the global subscriber. Logs go to stderr; stdout carries status output.
pub fn init(cli_directive: Option<&str>, config: &LoggingConfig) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = resolve_directive(cli_directive, env.as_deref(), config.level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("proxmesh: invalid log directive {directive:?} ({e}), using {DEFAULT_DIRECTIVE}");
        EnvFilter::new(DEFAULT_DIRECTIVE)
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
