//! Error types for slate-services

use thiserror::Error;

/// Result type alias using slate-services Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by external collaborators.
///
/// Each variant carries a displayable message and nothing else; the session
/// runtime absorbs these into the conversation rather than failing the
/// session, so no structured detail is needed beyond what a user can read.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The response generator failed to produce a reply
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The artifact renderer rejected the diagram description
    #[error("Render failed: {0}")]
    Render(String),

    /// The transcription client failed (distinct from an empty transcript,
    /// which is a valid result)
    #[error("Transcription failed: {0}")]
    Transcription(String),

    /// Speech playback failed or was interrupted abnormally
    #[error("Speech output failed: {0}")]
    Speech(String),

    /// The capture device could not be acquired or failed mid-capture
    #[error("Capture failed: {0}")]
    Capture(String),
}

impl Error {
    /// Create a generation error from any displayable value
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create a render error from any displayable value
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Create a transcription error from any displayable value
    pub fn transcription(message: impl Into<String>) -> Self {
        Self::Transcription(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_message() {
        let e = Error::generation("model unreachable");
        assert_eq!(e.to_string(), "Generation failed: model unreachable");

        let e = Error::render("unknown node shape");
        assert_eq!(e.to_string(), "Render failed: unknown node shape");
    }

    #[test]
    fn test_errors_are_cloneable() {
        let e = Error::transcription("stream cut off");
        let copy = e.clone();
        assert_eq!(e.to_string(), copy.to_string());
    }
}
