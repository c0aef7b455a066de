//! Line commands read from stdin.

use std::str::FromStr;

use proxmesh_presence::{DirectionInput, PresenceSnapshot};

/// One stdin command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    /// Hold a single direction until the next move or `stop`.
    Move(DirectionInput),
    Stop,
    Status,
    Audio(bool),
    Video(bool),
    Quit,
}

impl FromStr for InputCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err("empty command".to_string());
        };
        let held = DirectionInput::default();
        let command = match verb.to_ascii_lowercase().as_str() {
            "left" | "a" => Self::Move(DirectionInput { left: true, ..held }),
            "right" | "d" => Self::Move(DirectionInput { right: true, ..held }),
            "up" | "w" => Self::Move(DirectionInput { up: true, ..held }),
            "down" | "s" => Self::Move(DirectionInput { down: true, ..held }),
            "stop" => Self::Stop,
            "status" => Self::Status,
            "mute" => Self::Audio(false),
            "unmute" => Self::Audio(true),
            "video" => match words.next() {
                Some("on") => Self::Video(true),
                Some("off") => Self::Video(false),
                _ => return Err("usage: video on|off".to_string()),
            },
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command: {other}")),
        };
        Ok(command)
    }
}

/// Human-readable status block for the `status` command.
pub fn format_status(snapshot: &PresenceSnapshot) -> String {
    let mut out = format!(
        "you: {} at ({:.0}, {:.0}) {}\nmedia: {} audio={} video={}\nconnected: {}/{}",
        snapshot.local_id,
        snapshot.local.position.x,
        snapshot.local.position.y,
        snapshot.local.animation,
        if snapshot.media_ready { "ready" } else { "pending" },
        if snapshot.audio_enabled { "on" } else { "off" },
        if snapshot.video_enabled { "on" } else { "off" },
        snapshot.connected_count(),
        snapshot.participants.len(),
    );
    for p in &snapshot.participants {
        let session = match p.session {
            Some(state) => format!("{state:?}").to_lowercase(),
            None => "-".to_string(),
        };
        out.push_str(&format!(
            "\n  {} at ({:.0}, {:.0}) {} [{}]",
            p.id, p.position.x, p.position.y, p.animation, session
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxmesh_common::{ParticipantId, Position};
    use proxmesh_presence::{AnimationState, Facing, LocalState, ParticipantSnapshot, SessionState};

    #[test]
    fn directions_hold_one_key() {
        assert_eq!(
            "left".parse::<InputCommand>(),
            Ok(InputCommand::Move(DirectionInput {
                left: true,
                ..Default::default()
            }))
        );
        assert_eq!(
            "W".parse::<InputCommand>(),
            Ok(InputCommand::Move(DirectionInput {
                up: true,
                ..Default::default()
            }))
        );
    }

    #[test]
    fn media_toggles() {
        assert_eq!("mute".parse::<InputCommand>(), Ok(InputCommand::Audio(false)));
        assert_eq!("unmute".parse::<InputCommand>(), Ok(InputCommand::Audio(true)));
        assert_eq!("video off".parse::<InputCommand>(), Ok(InputCommand::Video(false)));
        assert_eq!("  video   on ".parse::<InputCommand>(), Ok(InputCommand::Video(true)));
        assert!("video".parse::<InputCommand>().is_err());
    }

    #[test]
    fn blank_and_unknown_lines_are_errors() {
        assert!("".parse::<InputCommand>().is_err());
        assert_eq!(
            "dance".parse::<InputCommand>(),
            Err("unknown command: dance".to_string())
        );
    }

    #[test]
    fn status_lists_participants_with_session_state() {
        let snapshot = PresenceSnapshot {
            local_id: ParticipantId::from("me"),
            local: LocalState {
                position: Position::new(800.0, 800.0),
                animation: AnimationState::idle(Facing::Front),
            },
            media_ready: true,
            audio_enabled: true,
            video_enabled: false,
            participants: vec![
                ParticipantSnapshot {
                    id: ParticipantId::from("p1"),
                    position: Position::new(810.0, 800.0),
                    animation: AnimationState::walk(Facing::Left),
                    session: Some(SessionState::Active),
                },
                ParticipantSnapshot {
                    id: ParticipantId::from("p2"),
                    position: Position::new(1500.0, 300.0),
                    animation: AnimationState::idle(Facing::Back),
                    session: None,
                },
            ],
        };

        let text = format_status(&snapshot);
        assert!(text.starts_with("you: me at (800, 800) idle_front"));
        assert!(text.contains("media: ready audio=on video=off"));
        assert!(text.contains("connected: 1/2"));
        assert!(text.contains("p1 at (810, 800) walk_left [active]"));
        assert!(text.contains("p2 at (1500, 300) idle_back [-]"));
    }
}
