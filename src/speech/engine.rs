use crate::cancellation::CancellationToken;
use crate::speech::voices::Voice;
use anyhow::Result;

/// Parameters for one utterance, captured at the moment speech starts.
#[derive(Debug, Clone)]
pub struct UtteranceParams {
    pub voice: Option<Voice>,
    pub speed: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// How an utterance ended. Cancellation is a first-class outcome so the read
/// loop can tell "superseded" apart from "finished" and never double-advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceOutcome {
    Completed,
    Cancelled,
}

/// The single underlying synthesis resource. At most one utterance is active
/// at a time; starting a new one after `cancel_current` is the caller's job.
pub trait SpeechEngine: Send + Sync {
    /// Speak one paragraph, blocking until it completes, is cancelled, or
    /// fails. Must return `Cancelled` (not an error) when `token` fires or
    /// `cancel_current` stops the utterance.
    fn speak(
        &self,
        text: &str,
        params: &UtteranceParams,
        token: &CancellationToken,
    ) -> Result<UtteranceOutcome>;

    /// Pause the current utterance in place; it is not discarded. The pause
    /// latch also applies to utterances started while paused.
    fn pause(&self);

    /// Resume the paused utterance.
    fn resume(&self);

    /// Stop whatever is playing and clear the pause latch.
    fn cancel_current(&self);

    /// Apply a new rate to the in-flight utterance and all later ones.
    fn set_speed(&self, speed: f32);

    /// Apply a new volume to the in-flight utterance and all later ones.
    fn set_volume(&self, volume: f32);
}
