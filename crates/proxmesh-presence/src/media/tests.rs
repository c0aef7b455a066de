use std::sync::{Arc, Mutex};

use proxmesh_common::{CallId, MediaCaptureError, TransientSessionError};

use super::*;
use crate::testing::{
    pid, stream, FakeCapture, FakeTransport, RecordingStreamSink, StreamNote, TransportLog,
};

type Log = Arc<Mutex<TransportLog>>;
type Notes = Arc<Mutex<Vec<StreamNote>>>;

fn manager_with(capture: FakeCapture, transport: FakeTransport, log: Log) -> (PeerSessionManager, Log, Notes) {
    let (sink, notes) = RecordingStreamSink::new();
    let mgr = PeerSessionManager::new(
        Arc::new(capture),
        CaptureConstraints::default(),
        Box::new(transport),
        Box::new(sink),
    );
    (mgr, log, notes)
}

fn manager(capture: FakeCapture) -> (PeerSessionManager, Log, Notes) {
    let (transport, log) = FakeTransport::new();
    manager_with(capture, transport, log)
}

async fn ready_manager() -> (PeerSessionManager, Log, Notes) {
    let (mut mgr, log, notes) = manager(FakeCapture::ok("local"));
    mgr.initialize_local_stream().await.unwrap();
    notes.lock().unwrap().clear();
    (mgr, log, notes)
}

fn received(call: &str, remote: &str, stream_id: &str) -> MediaEvent {
    MediaEvent::StreamReceived {
        call_id: CallId::new(call),
        remote: pid(remote),
        stream: stream(stream_id),
    }
}

fn closed(call: &str, remote: &str) -> MediaEvent {
    MediaEvent::Closed {
        call_id: CallId::new(call),
        remote: pid(remote),
    }
}

fn inbound(call: &str, remote: &str) -> InboundCall {
    InboundCall {
        call_id: CallId::new(call),
        remote: pid(remote),
        stream: stream(&format!("{remote}-stream")),
    }
}

// ---------------------------------------------------------------------------
// Local stream
// ---------------------------------------------------------------------------

#[tokio::test]
async fn local_stream_ready_is_reported_once() {
    let (mut mgr, _log, notes) = manager(FakeCapture::ok("local"));
    assert!(!mgr.is_ready());
    mgr.initialize_local_stream().await.unwrap();
    assert!(mgr.is_ready());

    mgr.complete_initialization(Ok(stream("other")));
    assert_eq!(mgr.local_stream().unwrap().handle.id, "local");
    assert_eq!(
        *notes.lock().unwrap(),
        vec![StreamNote::LocalReady("local".to_string())]
    );
}

#[tokio::test]
async fn capture_failure_makes_connect_a_permanent_no_op() {
    let (mut mgr, log, notes) = manager(FakeCapture::failing(MediaCaptureError::PermissionDenied));
    let err = mgr.initialize_local_stream().await.unwrap_err();
    assert_eq!(err, MediaCaptureError::PermissionDenied);
    assert_eq!(mgr.capture_error(), Some(&MediaCaptureError::PermissionDenied));

    // A late success does not revive the manager.
    mgr.complete_initialization(Ok(stream("late")));
    assert!(!mgr.is_ready());

    mgr.connect(&pid("p1"));
    mgr.connect(&pid("p1"));
    assert!(log.lock().unwrap().calls.is_empty());
    assert_eq!(mgr.session_count(), 0);
    assert!(notes.lock().unwrap().is_empty());
}

#[test]
fn connect_before_capture_settles_is_dropped() {
    let (mut mgr, log, _notes) = manager(FakeCapture::ok("local"));
    mgr.connect(&pid("p1"));
    assert!(log.lock().unwrap().calls.is_empty());
    assert_eq!(mgr.session_state(&pid("p1")), None);
}

#[tokio::test]
async fn mute_controls_toggle_track_flags() {
    let (mut mgr, _log, _notes) = manager(FakeCapture::ok("local"));
    assert!(!mgr.set_audio_enabled(false));

    mgr.initialize_local_stream().await.unwrap();
    assert!(mgr.set_audio_enabled(false));
    assert!(mgr.set_video_enabled(false));
    let local = mgr.local_stream().unwrap();
    assert!(!local.audio_enabled);
    assert!(!local.video_enabled);

    assert!(mgr.set_audio_enabled(true));
    assert!(mgr.local_stream().unwrap().audio_enabled);
}

// ---------------------------------------------------------------------------
// Connect / disconnect
// ---------------------------------------------------------------------------

#[tokio::test]
async fn connect_twice_yields_one_session_and_one_stream() {
    let (mut mgr, log, notes) = ready_manager().await;

    mgr.connect(&pid("p1"));
    mgr.connect(&pid("p1"));
    assert_eq!(log.lock().unwrap().calls.len(), 1);
    assert_eq!(mgr.session_state(&pid("p1")), Some(SessionState::Connecting));

    mgr.handle_media_event(received("out-1", "p1", "s1"));
    mgr.connect(&pid("p1"));
    mgr.handle_media_event(received("out-1", "p1", "s1"));

    assert_eq!(log.lock().unwrap().calls.len(), 1);
    assert_eq!(mgr.session_state(&pid("p1")), Some(SessionState::Active));
    assert_eq!(
        *notes.lock().unwrap(),
        vec![StreamNote::Available(pid("p1"), "s1".to_string())]
    );
}

#[tokio::test]
async fn disconnect_when_absent_is_silent() {
    let (mut mgr, log, notes) = ready_manager().await;
    mgr.disconnect(&pid("nobody"));
    assert!(log.lock().unwrap().closes.is_empty());
    assert!(notes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn disconnect_closes_synchronously_and_late_close_is_ignored() {
    let (mut mgr, log, notes) = ready_manager().await;
    mgr.connect(&pid("p1"));
    mgr.handle_media_event(received("out-1", "p1", "s1"));

    mgr.disconnect(&pid("p1"));
    assert_eq!(mgr.session_state(&pid("p1")), None);
    assert_eq!(log.lock().unwrap().closes, vec![CallId::new("out-1")]);

    mgr.handle_media_event(closed("out-1", "p1"));
    assert_eq!(mgr.session_state(&pid("p1")), None);
    assert_eq!(
        *notes.lock().unwrap(),
        vec![
            StreamNote::Available(pid("p1"), "s1".to_string()),
            StreamNote::Closed(pid("p1")),
        ]
    );
}

#[tokio::test]
async fn disconnect_of_pending_session_does_not_notify() {
    let (mut mgr, log, notes) = ready_manager().await;
    mgr.connect(&pid("p1"));
    mgr.disconnect(&pid("p1"));
    assert_eq!(log.lock().unwrap().closes, vec![CallId::new("out-1")]);
    assert!(notes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn remove_all_during_pending_connect_is_sticky() {
    let (mut mgr, log, notes) = ready_manager().await;
    mgr.connect(&pid("p1"));
    mgr.remove_all(&pid("p1"));

    // The call resolves after the participant left.
    mgr.handle_media_event(received("out-1", "p1", "s1"));

    assert_eq!(mgr.session_state(&pid("p1")), None);
    assert_eq!(
        log.lock().unwrap().closes,
        vec![CallId::new("out-1"), CallId::new("out-1")]
    );
    assert!(notes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn transport_close_removes_active_session() {
    let (mut mgr, _log, notes) = ready_manager().await;
    mgr.connect(&pid("p1"));
    mgr.handle_media_event(received("out-1", "p1", "s1"));
    mgr.handle_media_event(closed("out-1", "p1"));

    assert_eq!(mgr.session_state(&pid("p1")), None);
    assert_eq!(notes.lock().unwrap().last(), Some(&StreamNote::Closed(pid("p1"))));
}

#[tokio::test]
async fn failed_session_is_removed_and_retried_on_next_connect() {
    let (mut mgr, log, notes) = ready_manager().await;
    mgr.connect(&pid("p1"));
    mgr.handle_media_event(received("out-1", "p1", "s1"));
    mgr.handle_media_event(MediaEvent::Failed {
        call_id: CallId::new("out-1"),
        remote: pid("p1"),
        error: TransientSessionError::Dropped {
            participant: "p1".to_string(),
        },
    });
    assert_eq!(mgr.session_state(&pid("p1")), None);
    assert_eq!(notes.lock().unwrap().last(), Some(&StreamNote::Closed(pid("p1"))));

    mgr.connect(&pid("p1"));
    assert_eq!(log.lock().unwrap().calls.len(), 2);
    assert_eq!(mgr.session_state(&pid("p1")), Some(SessionState::Connecting));
}

#[tokio::test]
async fn failed_outbound_call_leaves_no_entry() {
    let (transport, log) = FakeTransport::failing();
    let (mut mgr, log, _notes) = manager_with(FakeCapture::ok("local"), transport, log);
    mgr.initialize_local_stream().await.unwrap();

    mgr.connect(&pid("p1"));
    assert_eq!(mgr.session_state(&pid("p1")), None);
    assert!(log.lock().unwrap().calls.is_empty());
}

#[tokio::test]
async fn stream_for_unknown_call_is_closed() {
    let (mut mgr, log, notes) = ready_manager().await;
    mgr.connect(&pid("p1"));
    mgr.handle_media_event(received("stray", "p1", "s1"));

    assert_eq!(mgr.session_state(&pid("p1")), Some(SessionState::Connecting));
    assert_eq!(log.lock().unwrap().closes, vec![CallId::new("stray")]);
    assert!(notes.lock().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Inbound calls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn inbound_call_is_answered_and_registered() {
    let (mut mgr, log, notes) = ready_manager().await;
    mgr.accept_inbound(inbound("in-1", "p1"), &pid("me"));

    assert_eq!(log.lock().unwrap().answers, vec![CallId::new("in-1")]);
    assert_eq!(mgr.session_state(&pid("p1")), Some(SessionState::Connecting));

    mgr.handle_media_event(received("in-1", "p1", "p1-stream"));
    assert_eq!(mgr.session_state(&pid("p1")), Some(SessionState::Active));
    assert_eq!(
        *notes.lock().unwrap(),
        vec![StreamNote::Available(pid("p1"), "p1-stream".to_string())]
    );
}

#[test]
fn inbound_call_before_ready_is_left_unanswered() {
    let (mut mgr, log, _notes) = manager(FakeCapture::ok("local"));
    mgr.accept_inbound(inbound("in-1", "p1"), &pid("me"));
    assert!(log.lock().unwrap().answers.is_empty());
    assert!(log.lock().unwrap().closes.is_empty());
    assert_eq!(mgr.session_state(&pid("p1")), None);
}

#[tokio::test]
async fn inbound_call_while_active_is_rejected() {
    let (mut mgr, log, _notes) = ready_manager().await;
    mgr.connect(&pid("p1"));
    mgr.handle_media_event(received("out-1", "p1", "s1"));

    mgr.accept_inbound(inbound("in-1", "p1"), &pid("me"));
    assert!(log.lock().unwrap().answers.is_empty());
    assert_eq!(log.lock().unwrap().closes, vec![CallId::new("in-1")]);
    assert_eq!(mgr.session_state(&pid("p1")), Some(SessionState::Active));
}

#[tokio::test]
async fn mutual_connect_keeps_one_session_when_remote_wins() {
    // "a" sorts before "me", so the call placed by "a" is kept.
    let (mut mgr, log, notes) = ready_manager().await;
    mgr.connect(&pid("a"));
    mgr.accept_inbound(inbound("in-1", "a"), &pid("me"));
    assert_eq!(log.lock().unwrap().answers, vec![CallId::new("in-1")]);

    mgr.handle_media_event(received("in-1", "a", "a-stream"));
    assert_eq!(mgr.session_state(&pid("a")), Some(SessionState::Active));
    assert_eq!(log.lock().unwrap().closes, vec![CallId::new("out-1")]);

    // The loser resolving or closing later must not disturb the winner.
    mgr.handle_media_event(received("out-1", "a", "a-stream"));
    mgr.handle_media_event(closed("out-1", "a"));
    assert_eq!(mgr.session_state(&pid("a")), Some(SessionState::Active));
    assert_eq!(mgr.session_count(), 1);
    assert_eq!(
        *notes.lock().unwrap(),
        vec![StreamNote::Available(pid("a"), "a-stream".to_string())]
    );
}

#[tokio::test]
async fn mutual_connect_keeps_our_call_when_local_wins() {
    let (mut mgr, log, notes) = ready_manager().await;
    mgr.connect(&pid("z"));
    mgr.accept_inbound(inbound("in-1", "z"), &pid("me"));

    assert!(log.lock().unwrap().answers.is_empty());
    assert_eq!(log.lock().unwrap().closes, vec![CallId::new("in-1")]);

    mgr.handle_media_event(received("out-1", "z", "z-stream"));
    assert_eq!(mgr.session_state(&pid("z")), Some(SessionState::Active));
    assert_eq!(notes.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn closed_primary_promotes_pending_contender() {
    let (mut mgr, _log, notes) = ready_manager().await;
    mgr.connect(&pid("a"));
    mgr.accept_inbound(inbound("in-1", "a"), &pid("me"));

    mgr.handle_media_event(closed("out-1", "a"));
    assert_eq!(mgr.session_state(&pid("a")), Some(SessionState::Connecting));

    mgr.handle_media_event(received("in-1", "a", "a-stream"));
    assert_eq!(mgr.session_state(&pid("a")), Some(SessionState::Active));
    assert_eq!(notes.lock().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Reconnect / shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reconnect_redials_only_pending_sessions() {
    let (mut mgr, log, _notes) = ready_manager().await;
    mgr.connect(&pid("p1"));
    mgr.reconnect(&pid("p1"));
    {
        let log = log.lock().unwrap();
        assert_eq!(log.calls.len(), 2);
        assert_eq!(log.closes, vec![CallId::new("out-1")]);
    }

    mgr.handle_media_event(received("out-2", "p1", "s1"));
    mgr.reconnect(&pid("p1"));
    mgr.reconnect(&pid("nobody"));
    assert_eq!(log.lock().unwrap().calls.len(), 2);
    assert_eq!(mgr.session_state(&pid("p1")), Some(SessionState::Active));
}

#[tokio::test]
async fn signals_are_forwarded_to_the_transport() {
    let (mut mgr, log, _notes) = ready_manager().await;
    let signal = crate::protocol::CallSignal::Close {
        call_id: CallId::new("c1"),
        from: pid("p1"),
        to: pid("me"),
    };
    mgr.on_signal(&pid("p1"), signal.clone());
    assert_eq!(log.lock().unwrap().signals, vec![(pid("p1"), signal)]);
}

#[tokio::test]
async fn shutdown_closes_everything_and_releases_stream() {
    let (mut mgr, log, notes) = ready_manager().await;
    mgr.connect(&pid("p1"));
    mgr.connect(&pid("p2"));
    mgr.handle_media_event(received("out-1", "p1", "s1"));

    mgr.shutdown();
    assert_eq!(mgr.session_count(), 0);
    assert!(!mgr.is_ready());
    assert_eq!(log.lock().unwrap().closes.len(), 2);
    assert_eq!(notes.lock().unwrap().last(), Some(&StreamNote::Closed(pid("p1"))));

    mgr.connect(&pid("p1"));
    assert_eq!(log.lock().unwrap().calls.len(), 2);
}
