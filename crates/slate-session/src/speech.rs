//! Speech output gate.
//!
//! Speech playback is fire-and-forget relative to conversation and history
//! mutation, but the audio channel is a singly-owned resource: at most one
//! utterance is audibly playing, and starting a new one stops the prior one
//! before the new playback is requested.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use slate_services::SpeechSynthesizer;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::events::SessionEvent;

/// Serializes utterances onto the single audio output channel.
pub struct SpeechGate {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    event_tx: broadcast::Sender<SessionEvent>,
    /// Monotonically increasing utterance id; the active entry holds the id
    /// it was started with so a finished task only clears its own slot.
    next_id: AtomicU64,
    active: Arc<Mutex<Option<(u64, CancellationToken)>>>,
}

impl SpeechGate {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        event_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            synthesizer,
            event_tx,
            next_id: AtomicU64::new(1),
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Speak `text`, superseding any utterance still playing.
    ///
    /// The prior utterance is cancelled before the new playback is
    /// requested; playback itself runs on a spawned task and never blocks
    /// the caller.
    pub fn say(&self, text: impl Into<String>) {
        let text = text.into();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let token = CancellationToken::new();

        {
            let mut active = self.active.lock();
            if let Some((prior_id, prior_token)) = active.take() {
                tracing::debug!("utterance {prior_id} superseded by {id}");
                prior_token.cancel();
                self.synthesizer.cancel();
            }
            *active = Some((id, token.clone()));
        }

        let _ = self.event_tx.send(SessionEvent::SpeechStarted { text: text.clone() });

        let synthesizer = Arc::clone(&self.synthesizer);
        let event_tx = self.event_tx.clone();
        let active = Arc::clone(&self.active);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                result = synthesizer.speak(&text) => {
                    if let Err(e) = result {
                        tracing::warn!("speech playback failed: {e}");
                    }
                }
            }

            let mut active = active.lock();
            if matches!(*active, Some((active_id, _)) if active_id == id) {
                *active = None;
            }
            let _ = event_tx.send(SessionEvent::SpeechFinished);
        });
    }

    /// Stop the active utterance, if any.
    pub fn cancel(&self) {
        let mut active = self.active.lock();
        if let Some((_, token)) = active.take() {
            token.cancel();
            self.synthesizer.cancel();
        }
    }

    /// Whether an utterance is currently playing
    pub fn is_speaking(&self) -> bool {
        self.active.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicU32;

    /// A synthesizer that plays until released, counting cancellations.
    /// Cancellation is observed by the gate's own token; `cancel` here only
    /// records that the contract was exercised.
    struct SlowSynth {
        cancels: AtomicU32,
        release: tokio::sync::Semaphore,
    }

    impl SlowSynth {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                cancels: AtomicU32::new(0),
                release: tokio::sync::Semaphore::new(0),
            })
        }

        fn finish_playback(&self) {
            self.release.add_permits(1);
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for SlowSynth {
        async fn speak(&self, _text: &str) -> slate_services::Result<()> {
            let permit = self.release.acquire().await.expect("semaphore closed");
            permit.forget();
            Ok(())
        }

        fn cancel(&self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_second_utterance_cancels_first() {
        let synth = SlowSynth::new();
        let (event_tx, mut events) = broadcast::channel(16);
        let gate = SpeechGate::new(synth.clone(), event_tx);

        gate.say("first");
        assert!(gate.is_speaking());
        gate.say("second");

        assert_eq!(synth.cancels.load(Ordering::SeqCst), 1);
        assert!(gate.is_speaking());

        // first: started, finished (superseded), second: started
        let mut started = vec![];
        for _ in 0..3 {
            match events.recv().await.unwrap() {
                SessionEvent::SpeechStarted { text } => started.push(text),
                SessionEvent::SpeechFinished => {}
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert_eq!(started, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_completion_clears_active_and_emits_finished() {
        let synth = SlowSynth::new();
        let (event_tx, mut events) = broadcast::channel(16);
        let gate = SpeechGate::new(synth.clone(), event_tx);

        gate.say("hello");
        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::SpeechStarted { .. }
        ));

        synth.finish_playback();
        assert!(matches!(events.recv().await.unwrap(), SessionEvent::SpeechFinished));
        assert!(!gate.is_speaking());
    }

    #[tokio::test]
    async fn test_cancel_with_nothing_playing_is_safe() {
        let synth = SlowSynth::new();
        let (event_tx, _events) = broadcast::channel(16);
        let gate = SpeechGate::new(synth.clone(), event_tx);

        gate.cancel();
        assert!(!gate.is_speaking());
        assert_eq!(synth.cancels.load(Ordering::SeqCst), 0);
    }
}
