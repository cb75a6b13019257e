//! slate-session: Tutoring session runtime
//!
//! This crate provides the session coordinator that serializes multi-modal
//! input (typed text, captured speech) into one ordered conversation, keeps
//! an append-only history of rendered diagram artifacts, and owns the
//! freehand annotation overlay layered over the current artifact.

pub mod compose;
pub mod conversation;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod history;
pub mod overlay;
pub mod speech;

pub use compose::{OverlayCompositor, SvgCompositor};
pub use conversation::Conversation;
pub use coordinator::{Collaborators, ExportOptions, PendingOp, SessionConfig, SessionCoordinator};
pub use error::{CaptureError, HistoryError, InputError};
pub use events::SessionEvent;
pub use history::{DiagramVersion, Direction, VersionHistory};
pub use overlay::{Overlay, Point, Stroke};
pub use speech::SpeechGate;
