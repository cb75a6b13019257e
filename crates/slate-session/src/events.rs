//! Session event types

use serde::{Deserialize, Serialize};
use slate_services::Turn;

/// Events emitted by the coordinator for the presentation layer.
///
/// Delivered over a `tokio::sync::broadcast` channel; subscribers that lag
/// lose old events, never current state (the coordinator's accessors are
/// always the source of truth).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A turn was appended to the conversation (user, assistant, or a
    /// synthetic failure notice)
    TurnAppended { turn: Turn },

    /// A new diagram version was appended; the cursor now points at it
    VersionAppended { index: usize },

    /// The history cursor moved without the version sequence changing
    CursorMoved { index: usize },

    /// Voice capture started
    CaptureStarted,

    /// Voice capture stopped; transcription may follow
    CaptureStopped,

    /// A capture or transcription produced no speech and was dropped
    /// without a conversation turn
    TranscriptDiscarded,

    /// Speech playback of assistant text started
    SpeechStarted { text: String },

    /// Speech playback finished or was superseded
    SpeechFinished,

    /// A collaborator failure was absorbed into the conversation
    FailureAbsorbed { message: String },
}

impl SessionEvent {
    /// Check if this event reflects a state change a renderer must repaint
    /// for (as opposed to purely informational signals).
    pub fn is_state_change(&self) -> bool {
        matches!(
            self,
            SessionEvent::TurnAppended { .. }
                | SessionEvent::VersionAppended { .. }
                | SessionEvent::CursorMoved { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_type_tag() {
        let event = SessionEvent::VersionAppended { index: 2 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "version_appended");
        assert_eq!(json["index"], 2);
    }

    #[test]
    fn test_state_change_classification() {
        assert!(SessionEvent::TurnAppended { turn: Turn::user("q") }.is_state_change());
        assert!(SessionEvent::CursorMoved { index: 0 }.is_state_change());
        assert!(!SessionEvent::SpeechFinished.is_state_change());
        assert!(!SessionEvent::CaptureStarted.is_state_change());
    }
}
