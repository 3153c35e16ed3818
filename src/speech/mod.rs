//! Text-to-speech playback: the controller state machine, the synthesis
//! engine seam, the voice catalog and preference persistence.

mod controller;
mod engine;
mod piper;
mod settings;
mod voices;

pub use controller::{PlaybackPhase, ReaderEvent, SpeechController};
pub use engine::{SpeechEngine, UtteranceOutcome, UtteranceParams};
pub use piper::PiperSpeaker;
pub use settings::{FileSettings, SettingsStore};
pub use voices::{Voice, VoiceCatalog, parse_remote_index, scan_local_voices};

use std::time::Duration;

/// Clamp bounds for the utterance parameters.
pub const MIN_SPEED: f32 = 0.5;
pub const MAX_SPEED: f32 = 2.0;
pub const MIN_PITCH: f32 = 0.5;
pub const MAX_PITCH: f32 = 2.0;
pub const MIN_VOLUME: f32 = 0.0;
pub const MAX_VOLUME: f32 = 1.0;

/// Gap inserted between consecutive paragraphs.
pub const PARAGRAPH_GAP: Duration = Duration::from_millis(300);
