use clap::Parser;

/// proxmesh: headless presence client with proximity-driven media sessions.
#[derive(Parser, Debug)]
#[command(name = "proxmesh", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Log level override (a tracing directive such as `debug` or `proxmesh=debug`).
    #[arg(long)]
    pub log_level: Option<String>,

    /// State server URL override.
    #[arg(long)]
    pub url: Option<String>,

    /// Room name override.
    #[arg(long)]
    pub room: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
