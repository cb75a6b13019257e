//! Core types shared between the session runtime and its collaborators

use serde::{Deserialize, Serialize};

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Get the role as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message in the conversation. Immutable once appended; ordering is
/// append order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who authored the turn
    pub role: Role,
    /// Message text
    pub text: String,
    /// Creation time (unix millis)
    pub created_at: i64,
}

impl Turn {
    /// Create a user turn stamped with the current time
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Create an assistant turn stamped with the current time
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// What the response generator produced for a user utterance: assistant
/// text, optionally accompanied by a diagram description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorReply {
    /// Assistant text to show (and optionally speak)
    pub text: String,
    /// Diagram description to render, if the reply calls for one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram: Option<String>,
}

impl GeneratorReply {
    /// A text-only reply
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            diagram: None,
        }
    }

    /// A reply with an accompanying diagram description
    pub fn with_diagram(text: impl Into<String>, diagram: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            diagram: Some(diagram.into()),
        }
    }
}

/// A rendered diagram artifact.
///
/// Opaque to the session runtime beyond being cloneable and exportable.
/// Semantically the markup is a self-contained vector document; `description`
/// is the source text it was rendered from. Renderers must be idempotent for
/// identical descriptions, though the markup need not be byte-stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedArtifact {
    /// Self-contained vector markup suitable for display or file export
    pub markup: String,
    /// The diagram description this artifact was rendered from
    pub description: String,
}

impl RenderedArtifact {
    pub fn new(markup: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            description: description.into(),
        }
    }
}
