//! slate-services: Collaborator contracts for tutoring sessions
//!
//! This crate defines the shared data types and the trait contracts for the
//! external capabilities a tutoring session depends on: response generation,
//! artifact rendering, speech transcription, speech output, and audio
//! capture. Implementations live with the host application; the session
//! runtime only sees these interfaces.

pub mod error;
pub mod fence;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use fence::split_fenced_diagram;
pub use traits::{
    ArtifactRenderer, CaptureDevice, CaptureHandle, ResponseGenerator, SpeechSynthesizer,
    TranscriptionClient,
};
pub use types::{GeneratorReply, RenderedArtifact, Role, Turn};
