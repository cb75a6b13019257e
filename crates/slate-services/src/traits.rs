//! Trait contracts for external collaborators
//!
//! The session runtime holds each collaborator as an `Arc<dyn Trait>` and
//! never sees past the contract: transport, model choice, audio backends,
//! and rendering engines are all host concerns.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{GeneratorReply, RenderedArtifact, Turn};

/// Produces assistant replies from a user utterance and conversation context.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Generate a reply to `user_text` given the conversation so far.
    ///
    /// `context` is the full ordered conversation including the turn for
    /// `user_text` itself.
    async fn generate(&self, user_text: &str, context: &[Turn]) -> Result<GeneratorReply>;
}

/// Turns a textual diagram description into a renderable artifact.
#[async_trait]
pub trait ArtifactRenderer: Send + Sync {
    /// Render a diagram description.
    ///
    /// Must be idempotent for identical descriptions: the same input yields
    /// an equivalent artifact, though not necessarily identical markup.
    async fn render(&self, description: &str) -> Result<RenderedArtifact>;
}

/// Converts captured audio into text.
#[async_trait]
pub trait TranscriptionClient: Send + Sync {
    /// Transcribe raw audio bytes.
    ///
    /// An empty string is a valid, non-error result meaning "no speech
    /// detected" and must not be reported as a failure.
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}

/// Speaks assistant text aloud.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text`, resolving when playback completes.
    async fn speak(&self, text: &str) -> Result<()>;

    /// Stop any active utterance immediately. Must be safe to call when
    /// nothing is playing.
    fn cancel(&self);
}

/// An exclusively-owned audio capture device.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Acquire the device and start capturing.
    ///
    /// At most one capture is active per device; acquisition fails if the
    /// device cannot be opened. The returned handle owns the capture until
    /// stopped or dropped.
    async fn acquire(&self) -> Result<Box<dyn CaptureHandle>>;
}

/// A live capture. Dropping the handle releases the device without
/// delivering audio; `stop` releases it and drains what was captured.
pub trait CaptureHandle: Send {
    /// Stop capturing and return the recorded audio bytes. May be empty if
    /// nothing was captured.
    fn stop(self: Box<Self>) -> Vec<u8>;
}
