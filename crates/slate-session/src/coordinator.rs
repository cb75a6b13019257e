//! Session coordination: single-flight arbitration of multi-modal input.
//!
//! The coordinator owns the conversation log, the diagram version history,
//! and the annotation overlay, and mediates every asynchronous operation
//! that mutates them. Collaborators run on spawned tasks and deliver their
//! results as discrete completions over an internal channel; all state
//! transitions happen on the caller's thread in [`SessionCoordinator::step`]
//! or [`SessionCoordinator::run_until_idle`], so no transition ever
//! interleaves with another entry point mid-execution.

use std::sync::Arc;

use slate_services::{
    ArtifactRenderer, CaptureDevice, CaptureHandle, GeneratorReply, RenderedArtifact,
    ResponseGenerator, SpeechSynthesizer, TranscriptionClient, Turn, split_fenced_diagram,
};
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::compose::{OverlayCompositor, SvgCompositor};
use crate::conversation::Conversation;
use crate::error::{CaptureError, HistoryError, InputError};
use crate::events::SessionEvent;
use crate::history::{Direction, VersionHistory};
use crate::overlay::Overlay;
use crate::speech::SpeechGate;

/// The one-at-a-time gate over mutating asynchronous operations.
///
/// At most one of these is outstanding per session. While non-idle, every
/// mutating entry point rejects with `Busy`; navigation, revert, and export
/// never consult the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOp {
    /// No operation in flight
    Idle,
    /// A user turn was appended and the response generator is working
    AwaitingResponse,
    /// An assistant turn was appended and its diagram is being rendered
    AwaitingRender,
    /// Captured audio is being transcribed
    AwaitingTranscription,
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Synthetic assistant turn the conversation opens with
    pub greeting: String,
    /// Whether assistant replies are spoken aloud
    pub speak_replies: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: "Hello! How can I assist you with your learning today?".to_string(),
            speak_replies: false,
        }
    }
}

/// The external capabilities a session is wired to.
pub struct Collaborators {
    pub generator: Arc<dyn ResponseGenerator>,
    pub renderer: Arc<dyn ArtifactRenderer>,
    pub transcriber: Arc<dyn TranscriptionClient>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub capture: Arc<dyn CaptureDevice>,
}

/// Options for [`SessionCoordinator::export_current_artifact`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Layer the annotation overlay into the exported snapshot
    pub include_overlay: bool,
}

/// A completed asynchronous operation, delivered back to the coordinator's
/// logical thread. With the single-flight gate, at most one of these is in
/// the channel at a time, so arrival order trivially matches initiation
/// order and no request tagging is needed.
enum Completion {
    Response {
        result: slate_services::Result<GeneratorReply>,
    },
    Render {
        assistant_text: String,
        result: slate_services::Result<RenderedArtifact>,
    },
    Transcript {
        result: slate_services::Result<String>,
    },
}

/// The session core: one ordered conversation, an append-only diagram
/// history, an annotation overlay, and the arbitration that keeps
/// concurrent input modalities from corrupting them.
pub struct SessionCoordinator {
    session_id: Uuid,
    config: SessionConfig,
    conversation: Conversation,
    history: VersionHistory,
    overlay: Overlay,
    pending: PendingOp,

    generator: Arc<dyn ResponseGenerator>,
    renderer: Arc<dyn ArtifactRenderer>,
    transcriber: Arc<dyn TranscriptionClient>,
    capture: Arc<dyn CaptureDevice>,
    speech: SpeechGate,
    compositor: Box<dyn OverlayCompositor>,

    /// Live capture, if recording. Exclusively owned; dropping the handle
    /// releases the device on every exit path.
    active_capture: Option<Box<dyn CaptureHandle>>,

    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionCoordinator {
    /// Create a new session. The conversation opens with the configured
    /// greeting as a synthetic assistant turn; history and overlay start
    /// empty.
    pub fn new(config: SessionConfig, collaborators: Collaborators) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let speech = SpeechGate::new(Arc::clone(&collaborators.synthesizer), event_tx.clone());

        let mut coordinator = Self {
            session_id: Uuid::new_v4(),
            conversation: Conversation::new(),
            history: VersionHistory::new(),
            overlay: Overlay::new(),
            pending: PendingOp::Idle,
            generator: collaborators.generator,
            renderer: collaborators.renderer,
            transcriber: collaborators.transcriber,
            capture: collaborators.capture,
            speech,
            compositor: Box::new(SvgCompositor::default()),
            active_capture: None,
            completion_tx,
            completion_rx,
            event_tx,
            config,
        };
        coordinator.push_turn(Turn::assistant(coordinator.config.greeting.clone()));
        coordinator
    }

    /// Replace the compositor used for annotated export.
    pub fn with_compositor(mut self, compositor: Box<dyn OverlayCompositor>) -> Self {
        self.compositor = compositor;
        self
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The conversation log, oldest turn first
    pub fn conversation(&self) -> &[Turn] {
        self.conversation.turns()
    }

    /// The diagram version history
    pub fn history(&self) -> &VersionHistory {
        &self.history
    }

    /// The annotation overlay
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Mutable access to the overlay. Drawing is always permitted; the
    /// overlay never participates in the single-flight gate.
    pub fn overlay_mut(&mut self) -> &mut Overlay {
        &mut self.overlay
    }

    /// The operation currently in flight, if any
    pub fn pending(&self) -> PendingOp {
        self.pending
    }

    /// Whether voice capture is active
    pub fn is_capturing(&self) -> bool {
        self.active_capture.is_some()
    }

    /// Whether an utterance is currently playing
    pub fn is_speaking(&self) -> bool {
        self.speech.is_speaking()
    }

    /// Stop any active speech playback.
    pub fn stop_speaking(&self) {
        self.speech.cancel();
    }

    // ---- Mutating entry points (single-flight gated) ----

    /// Submit typed user text.
    ///
    /// Fails fast with `EmptyInput` for blank text and `Busy` while a prior
    /// operation is in flight; the caller queues or rejects, the session
    /// never reorders turns. On success the user turn is appended and
    /// response generation is dispatched.
    pub fn submit_user_text(&mut self, text: &str) -> Result<(), InputError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(InputError::EmptyInput);
        }
        if self.pending != PendingOp::Idle {
            return Err(InputError::Busy);
        }
        self.dispatch_generation(text.to_string());
        Ok(())
    }

    /// Acquire the capture device and start recording.
    ///
    /// An already-active capture is terminated (its audio discarded) before
    /// the new acquisition is requested; the device is singly owned.
    pub async fn begin_voice_capture(&mut self) -> Result<(), CaptureError> {
        if self.pending != PendingOp::Idle {
            return Err(CaptureError::Busy);
        }
        if let Some(prior) = self.active_capture.take() {
            tracing::debug!("capture takeover: discarding active recording");
            drop(prior);
        }
        let handle = self
            .capture
            .acquire()
            .await
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;
        self.active_capture = Some(handle);
        let _ = self.event_tx.send(SessionEvent::CaptureStarted);
        Ok(())
    }

    /// Stop recording and hand the audio to the transcription client.
    ///
    /// A no-op when nothing is recording. Zero captured audio cancels
    /// silently: silence is a valid non-event, not an error.
    pub fn end_voice_capture(&mut self) -> Result<(), CaptureError> {
        if self.pending != PendingOp::Idle {
            return Err(CaptureError::Busy);
        }
        let Some(handle) = self.active_capture.take() else {
            return Ok(());
        };
        let audio = handle.stop();
        let _ = self.event_tx.send(SessionEvent::CaptureStopped);

        if audio.is_empty() {
            tracing::debug!("capture ended with no audio, discarding");
            let _ = self.event_tx.send(SessionEvent::TranscriptDiscarded);
            return Ok(());
        }
        self.dispatch_transcription(audio);
        Ok(())
    }

    // ---- Navigation and export (never gated) ----

    /// Move the history cursor one step, clamped at both boundaries.
    /// Never errors; a boundary step is a no-op.
    pub fn navigate_history(&mut self, direction: Direction) {
        let before = self.history.cursor();
        let index = self.history.step(direction);
        if index != before {
            let _ = self.event_tx.send(SessionEvent::CursorMoved { index });
        }
    }

    /// Display an older (or newer) version without truncating history.
    pub fn revert_to_version(&mut self, index: usize) -> Result<(), HistoryError> {
        self.history.set_cursor(index)?;
        let _ = self.event_tx.send(SessionEvent::CursorMoved { index });
        Ok(())
    }

    /// Export the artifact at the cursor, optionally composited with the
    /// annotation overlay.
    pub fn export_current_artifact(
        &self,
        options: ExportOptions,
    ) -> Result<RenderedArtifact, HistoryError> {
        let artifact = self.history.current().ok_or(HistoryError::EmptyHistory)?;
        if options.include_overlay {
            Ok(self.compositor.composite(artifact, self.overlay.strokes()))
        } else {
            Ok(artifact.clone())
        }
    }

    // ---- Completion pump ----

    /// Receive and apply the next completion. All conversation/history
    /// mutation driven by asynchronous results happens here, on the
    /// caller's thread.
    pub async fn step(&mut self) {
        if let Some(completion) = self.completion_rx.recv().await {
            self.apply(completion);
        }
    }

    /// Process completions until no operation is in flight.
    pub async fn run_until_idle(&mut self) {
        while self.pending != PendingOp::Idle {
            self.step().await;
        }
    }

    fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Response { result } => self.on_response_generated(result),
            Completion::Render {
                assistant_text,
                result,
            } => self.on_artifact_rendered(assistant_text, result),
            Completion::Transcript { result } => self.on_transcription(result),
        }
    }

    /// The response generator finished.
    fn on_response_generated(&mut self, result: slate_services::Result<GeneratorReply>) {
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                self.absorb_failure(format!("I ran into a problem answering that. {e}"));
                return;
            }
        };

        // Generators sometimes embed the diagram in the reply text as a
        // fenced block instead of filling the dedicated field.
        let (fenced, text) = split_fenced_diagram(&reply.text);
        let diagram = reply.diagram.or(fenced);

        self.push_turn(Turn::assistant(text.clone()));
        match diagram {
            Some(description) => self.dispatch_render(text, description),
            None => {
                self.pending = PendingOp::Idle;
                self.maybe_speak(&text);
            }
        }
    }

    /// The artifact renderer finished. A failed render never touches the
    /// version history.
    fn on_artifact_rendered(
        &mut self,
        assistant_text: String,
        result: slate_services::Result<RenderedArtifact>,
    ) {
        match result {
            Ok(artifact) => {
                let index = self.history.append(artifact);
                let _ = self.event_tx.send(SessionEvent::VersionAppended { index });
                self.pending = PendingOp::Idle;
                self.maybe_speak(&assistant_text);
            }
            Err(e) => {
                self.absorb_failure(format!("I couldn't draw that diagram. {e}"));
            }
        }
    }

    /// The transcription client finished. A non-empty transcript is treated
    /// exactly like typed input; an empty one cancels without a trace in
    /// the conversation.
    fn on_transcription(&mut self, result: slate_services::Result<String>) {
        match result {
            Ok(transcript) => {
                let transcript = transcript.trim();
                if transcript.is_empty() {
                    tracing::debug!("empty transcript, discarding");
                    self.pending = PendingOp::Idle;
                    let _ = self.event_tx.send(SessionEvent::TranscriptDiscarded);
                } else {
                    self.dispatch_generation(transcript.to_string());
                }
            }
            Err(e) => {
                self.absorb_failure(format!("I couldn't make out that recording. {e}"));
            }
        }
    }

    // ---- Dispatch ----

    fn dispatch_generation(&mut self, text: String) {
        self.push_turn(Turn::user(text.clone()));
        self.pending = PendingOp::AwaitingResponse;

        let generator = Arc::clone(&self.generator);
        let context = self.conversation.turns().to_vec();
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let result = generator.generate(&text, &context).await;
            let _ = tx.send(Completion::Response { result });
        });
    }

    fn dispatch_render(&mut self, assistant_text: String, description: String) {
        self.pending = PendingOp::AwaitingRender;

        let renderer = Arc::clone(&self.renderer);
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let result = renderer.render(&description).await;
            let _ = tx.send(Completion::Render {
                assistant_text,
                result,
            });
        });
    }

    fn dispatch_transcription(&mut self, audio: Vec<u8>) {
        self.pending = PendingOp::AwaitingTranscription;

        let transcriber = Arc::clone(&self.transcriber);
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let result = transcriber.transcribe(&audio).await;
            let _ = tx.send(Completion::Transcript { result });
        });
    }

    // ---- Helpers ----

    fn push_turn(&mut self, turn: Turn) {
        self.conversation.push(turn.clone());
        let _ = self.event_tx.send(SessionEvent::TurnAppended { turn });
    }

    /// Absorb a collaborator failure into the conversation as a synthetic
    /// assistant turn. The session stays usable; the gate reopens.
    fn absorb_failure(&mut self, message: String) {
        tracing::warn!("absorbing failure into conversation: {message}");
        let _ = self.event_tx.send(SessionEvent::FailureAbsorbed {
            message: message.clone(),
        });
        self.push_turn(Turn::assistant(message));
        self.pending = PendingOp::Idle;
    }

    fn maybe_speak(&self, text: &str) {
        if self.config.speak_replies && !text.is_empty() {
            self.speech.say(text);
        }
    }
}
