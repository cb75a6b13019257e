//! Error types for slate-session
//!
//! These are the synchronous, fail-fast errors surfaced to the caller of a
//! triggering operation so the presentation layer can react immediately
//! (disable input, flash the mic button). Collaborator failures are not
//! here: those are absorbed into the conversation as synthetic assistant
//! turns and never fail the session.

use thiserror::Error;

/// Errors from submitting typed text
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// The text was blank after trimming
    #[error("input is empty")]
    EmptyInput,

    /// A prior submission is still in flight
    #[error("a previous operation is still in flight")]
    Busy,
}

/// Errors from the voice capture lifecycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The capture device could not be acquired
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A prior operation is still in flight
    #[error("a previous operation is still in flight")]
    Busy,
}

/// Errors from history navigation and export
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    /// The requested version index does not exist
    #[error("version index out of range")]
    IndexOutOfRange,

    /// No versions have been recorded yet
    #[error("history is empty")]
    EmptyHistory,
}
