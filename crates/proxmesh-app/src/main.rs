mod cli;
mod input;
mod logging;
mod settings;
mod sinks;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use proxmesh_presence::{
    DirectionInput, LocalAvatar, OrchestratorHandle, PresenceOrchestrator, RunOutcome,
    StaticCapture,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use crate::input::InputCommand;
use crate::sinks::LogSink;

/// Avatar integration step.
const MOVE_TICK: Duration = Duration::from_millis(50);
/// Upper bound on waiting for the room leave to reach the socket.
const LEAVE_DRAIN: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() {
    let args = cli::parse();

    let config = match proxmesh_config::load_config(args.config.as_deref().map(Path::new)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("proxmesh: failed to load config: {e}");
            std::process::exit(1);
        }
    };

    logging::init(args.log_level.as_deref(), &config.logging);
    tracing::info!("proxmesh v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(ref path) = args.config {
        tracing::info!("Using config override: {path}");
    }

    let settings = settings::orchestrator_settings(&config, &args);
    let spawn = settings.spawn;
    tracing::info!(url = %settings.room.url, room = %settings.room.room, "Joining room");

    let capture = Arc::new(StaticCapture::new(config.media.stream_label.clone()));
    let (orchestrator, handle) = match PresenceOrchestrator::connect(
        settings,
        capture,
        Box::new(LogSink),
        Box::new(LogSink),
    )
    .await
    {
        Ok(joined) => joined,
        Err(e) => {
            tracing::error!(error = %e, "Failed to join room");
            std::process::exit(1);
        }
    };

    let (input_tx, input_rx) = watch::channel(DirectionInput::default());
    let avatar = LocalAvatar::new(spawn, config.movement.speed);
    tokio::spawn(drive_avatar(avatar, input_rx, handle.clone()));
    tokio::spawn(read_commands(input_tx, handle.clone()));

    let ctrl_c = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted");
            ctrl_c.shutdown().await;
        }
    });

    let room = orchestrator.room();
    match orchestrator.run().await {
        RunOutcome::Shutdown => {
            if tokio::time::timeout(LEAVE_DRAIN, room.closed()).await.is_err() {
                tracing::warn!("Room leave not flushed in time");
            }
            tracing::info!("Shutdown complete");
        }
        RunOutcome::Disconnected => {
            tracing::error!("Room connection lost");
            std::process::exit(1);
        }
    }
}

/// Step the avatar under the currently held direction and report every
/// resulting state. The orchestrator drops updates that change nothing.
async fn drive_avatar(
    mut avatar: LocalAvatar,
    input: watch::Receiver<DirectionInput>,
    handle: OrchestratorHandle,
) {
    handle.move_to(avatar.state()).await;

    let mut ticker = tokio::time::interval(MOVE_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = Instant::now();
    loop {
        ticker.tick().await;
        let now = Instant::now();
        let held = *input.borrow();
        let state = avatar.step(held, now - last);
        last = now;
        handle.move_to(state).await;
    }
}

async fn read_commands(held: watch::Sender<DirectionInput>, handle: OrchestratorHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::debug!("stdin closed, keyboard control disabled");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stdin");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<InputCommand>() {
            Ok(InputCommand::Move(direction)) => {
                let _ = held.send(direction);
            }
            Ok(InputCommand::Stop) => {
                let _ = held.send(DirectionInput::default());
            }
            Ok(InputCommand::Status) => match handle.snapshot().await {
                Some(snapshot) => println!("{}", input::format_status(&snapshot)),
                None => return,
            },
            Ok(InputCommand::Audio(enabled)) => handle.set_audio_enabled(enabled).await,
            Ok(InputCommand::Video(enabled)) => handle.set_video_enabled(enabled).await,
            Ok(InputCommand::Quit) => {
                handle.shutdown().await;
                return;
            }
            Err(e) => eprintln!("{e}"),
        }
    }
}
