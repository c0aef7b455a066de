//! The orchestrator run loop and its command handle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use proxmesh_common::{ConnectionError, Position};

use crate::media::{
    CaptureConstraints, MediaCapture, MediaEvent, MediaTransport, PeerSessionManager,
    RelayTransport, StreamSink,
};
use crate::proximity::DEFAULT_THRESHOLD;
use crate::room::{RoomClient, RoomConfig};
use crate::state::{LocalState, RemoteEvent, RemoteStateClient};

use super::engine::{PresenceCore, PresenceSnapshot};
use super::render::RenderSink;

const COMMAND_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub room: RoomConfig,
    pub threshold: f64,
    pub sweep_interval: Duration,
    pub spawn: Position,
    /// `None` sends a local update only when the state changed.
    pub idle_keepalive: Option<Duration>,
    pub constraints: CaptureConstraints,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            room: RoomConfig::default(),
            threshold: DEFAULT_THRESHOLD,
            sweep_interval: Duration::from_millis(16),
            spawn: Position::new(800.0, 800.0),
            idle_keepalive: None,
            constraints: CaptureConstraints::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) enum OrchestratorCommand {
    LocalMoved(LocalState),
    Snapshot(oneshot::Sender<PresenceSnapshot>),
    SetAudioEnabled(bool),
    SetVideoEnabled(bool),
    Shutdown,
}

/// Cloneable handle for driving a running orchestrator.
#[derive(Clone)]
pub struct OrchestratorHandle {
    command_tx: mpsc::Sender<OrchestratorCommand>,
}

impl OrchestratorHandle {
    /// Report the local avatar state.
    pub async fn move_to(&self, state: LocalState) {
        let _ = self
            .command_tx
            .send(OrchestratorCommand::LocalMoved(state))
            .await;
    }

    /// `None` once the orchestrator stopped.
    pub async fn snapshot(&self) -> Option<PresenceSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(OrchestratorCommand::Snapshot(tx))
            .await
            .ok()?;
        rx.await.ok()
    }

    pub async fn set_audio_enabled(&self, enabled: bool) {
        let _ = self
            .command_tx
            .send(OrchestratorCommand::SetAudioEnabled(enabled))
            .await;
    }

    pub async fn set_video_enabled(&self, enabled: bool) {
        let _ = self
            .command_tx
            .send(OrchestratorCommand::SetVideoEnabled(enabled))
            .await;
    }

    pub async fn shutdown(&self) {
        let _ = self.command_tx.send(OrchestratorCommand::Shutdown).await;
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Stopped on request.
    Shutdown,
    /// The room connection dropped.
    Disconnected,
}

/// Top-level coordinator. Owns every piece of presence state and mutates
/// it from one task.
pub struct PresenceOrchestrator {
    core: PresenceCore,
    remote_rx: mpsc::Receiver<RemoteEvent>,
    media_rx: mpsc::UnboundedReceiver<MediaEvent>,
    command_rx: mpsc::Receiver<OrchestratorCommand>,
    sweep_interval: Duration,
}

impl PresenceOrchestrator {
    /// Join the room and wire the relay media transport. A join failure is
    /// returned as is; nothing is retried.
    pub async fn connect(
        settings: OrchestratorSettings,
        capture: Arc<dyn MediaCapture>,
        render: Box<dyn RenderSink>,
        streams: Box<dyn StreamSink>,
    ) -> Result<(Self, OrchestratorHandle), ConnectionError> {
        let (state, remote_rx) = RemoteStateClient::join(settings.room.clone()).await?;
        let (transport, media_rx) =
            RelayTransport::new(state.local_id().clone(), state.room().clone());
        Ok(Self::assemble(
            settings,
            state,
            remote_rx,
            Box::new(transport),
            media_rx,
            capture,
            render,
            streams,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn assemble(
        settings: OrchestratorSettings,
        state: RemoteStateClient,
        remote_rx: mpsc::Receiver<RemoteEvent>,
        transport: Box<dyn MediaTransport>,
        media_rx: mpsc::UnboundedReceiver<MediaEvent>,
        capture: Arc<dyn MediaCapture>,
        render: Box<dyn RenderSink>,
        streams: Box<dyn StreamSink>,
    ) -> (Self, OrchestratorHandle) {
        let sessions = PeerSessionManager::new(capture, settings.constraints, transport, streams);
        let core = PresenceCore::new(
            state,
            sessions,
            render,
            settings.threshold,
            settings.spawn,
            settings.idle_keepalive,
        );
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let orchestrator = Self {
            core,
            remote_rx,
            media_rx,
            command_rx,
            sweep_interval: settings.sweep_interval,
        };
        (orchestrator, OrchestratorHandle { command_tx })
    }

    /// The room this orchestrator joined. After [`run`](Self::run) returns,
    /// [`RoomClient::closed`] tells when the leave has gone out.
    pub fn room(&self) -> RoomClient {
        self.core.room().clone()
    }

    /// Run until shutdown or until the room connection drops.
    pub async fn run(self) -> RunOutcome {
        let Self {
            mut core,
            mut remote_rx,
            mut media_rx,
            mut command_rx,
            sweep_interval,
        } = self;

        let capture = core.sessions().capture_task();
        tokio::pin!(capture);
        let mut capture_pending = true;

        let mut sweep = tokio::time::interval(sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Presence orchestrator running");
        loop {
            tokio::select! {
                result = &mut capture, if capture_pending => {
                    capture_pending = false;
                    core.on_capture_settled(result).await;
                }
                event = remote_rx.recv() => {
                    let connected = match event {
                        Some(event) => core.handle_remote_event(event),
                        None => core.handle_remote_event(RemoteEvent::Disconnected),
                    };
                    if !connected {
                        core.shutdown(false).await;
                        return RunOutcome::Disconnected;
                    }
                }
                Some(event) = media_rx.recv() => core.handle_media_event(event),
                command = command_rx.recv() => match command {
                    Some(OrchestratorCommand::LocalMoved(state)) => {
                        core.local_position_changed(state).await;
                    }
                    Some(OrchestratorCommand::Snapshot(reply)) => {
                        let _ = reply.send(core.snapshot());
                    }
                    Some(OrchestratorCommand::SetAudioEnabled(enabled)) => {
                        if !core.sessions_mut().set_audio_enabled(enabled) {
                            debug!("No local audio track to toggle");
                        }
                    }
                    Some(OrchestratorCommand::SetVideoEnabled(enabled)) => {
                        if !core.sessions_mut().set_video_enabled(enabled) {
                            debug!("No local video track to toggle");
                        }
                    }
                    Some(OrchestratorCommand::Shutdown) | None => {
                        info!("Presence orchestrator shutting down");
                        core.shutdown(true).await;
                        return RunOutcome::Shutdown;
                    }
                },
                _ = sweep.tick() => core.sweep(),
            }
        }
    }
}
