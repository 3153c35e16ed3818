//! Piper-backed speech engine.
//!
//! Each utterance is synthesized to a WAV cached under the server cache dir
//! (keyed by model, text and pitch) and played through a fresh `rodio` sink.
//! Rate and volume apply live on the sink; pitch is baked at synthesis time.
//! Remote voices are downloaded into the voices directory on first use.

use crate::cancellation::CancellationToken;
use crate::speech::engine::{SpeechEngine, UtteranceOutcome, UtteranceParams};
use crate::speech::voices::Voice;
use crate::speech::{MAX_PITCH, MAX_SPEED, MIN_PITCH, MIN_SPEED};
use anyhow::{Context, Result};
use piper_rs::from_config_path;
use piper_rs::synth::{AudioOutputConfig, PiperSpeechSynthesizer};
use rodio::{Decoder, OutputStream, Sink};
use sha2::{Digest, Sha256};
use std::env;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

pub struct PiperSpeaker {
    cache_root: PathBuf,
    voices_dir: PathBuf,
    default_model: PathBuf,
    http: reqwest::blocking::Client,
    loaded: Mutex<Option<LoadedVoice>>,
    current: Mutex<Option<Arc<Sink>>>,
    paused: AtomicBool,
    speed: Mutex<f32>,
    volume: Mutex<f32>,
}

struct LoadedVoice {
    model_path: PathBuf,
    synth: PiperSpeechSynthesizer,
}

impl PiperSpeaker {
    pub fn new(
        cache_root: PathBuf,
        voices_dir: PathBuf,
        default_model: PathBuf,
        espeak_data_dir: PathBuf,
    ) -> Result<Self> {
        let espeak_data_dir = sanitize_espeak_root(espeak_data_dir);
        if env::var_os("PIPER_ESPEAKNG_DATA_DIRECTORY").is_none() {
            // Safe because we set a deterministic value early in process startup.
            unsafe {
                env::set_var("PIPER_ESPEAKNG_DATA_DIRECTORY", &espeak_data_dir);
            }
        }
        let http = reqwest::blocking::Client::builder()
            .build()
            .context("Building voice download client")?;
        info!(
            cache = %cache_root.display(),
            voices = %voices_dir.display(),
            espeak_root = %espeak_data_dir.display(),
            "Initializing speech engine"
        );
        Ok(Self {
            cache_root,
            voices_dir,
            default_model,
            http,
            loaded: Mutex::new(None),
            current: Mutex::new(None),
            paused: AtomicBool::new(false),
            speed: Mutex::new(1.0),
            volume: Mutex::new(1.0),
        })
    }

    /// Resolve the model file for the requested voice, downloading remote
    /// voices (model plus config) into the voices directory first.
    fn ensure_model(&self, voice: Option<&Voice>) -> Result<PathBuf> {
        let Some(voice) = voice else {
            debug!(model = %self.default_model.display(), "No voice selected, using default model");
            return Ok(self.default_model.clone());
        };
        if let Some(path) = &voice.model_path {
            return Ok(path.clone());
        }
        let url = voice
            .download_url
            .as_deref()
            .with_context(|| format!("Voice {} has no model and no download URL", voice.name))?;

        let model_path = self.voices_dir.join(format!("{}.onnx", voice.name));
        if !model_path.exists() {
            info!(voice = %voice.name, url, "Downloading voice model");
            self.download(url, &model_path)?;
            self.download(&format!("{url}.json"), &model_path.with_extension("onnx.json"))?;
        }
        Ok(model_path)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).context("Creating voices directory")?;
        }
        let mut response = self
            .http
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("Fetching {url}"))?;
        let tmp = dest.with_extension("part");
        let mut file = File::create(&tmp).context("Creating download file")?;
        response
            .copy_to(&mut file)
            .with_context(|| format!("Writing {}", dest.display()))?;
        if fs::rename(&tmp, dest).is_err() {
            fs::copy(&tmp, dest).context("Moving download into place")?;
            let _ = fs::remove_file(&tmp);
        }
        Ok(())
    }

    /// Synthesize to the cache unless an identical utterance is already there.
    fn ensure_wav(&self, model_path: &Path, text: &str, pitch: f32) -> Result<PathBuf> {
        let path = cache_path(&self.cache_root, model_path, text, pitch);
        if path.exists() {
            return Ok(path);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Creating TTS cache directory")?;
        }

        let mut loaded = self
            .loaded
            .lock()
            .map_err(|_| anyhow::anyhow!("Speech model lock poisoned"))?;
        let reload = loaded
            .as_ref()
            .map(|l| l.model_path != model_path)
            .unwrap_or(true);
        if reload {
            let config_path = resolve_piper_config(model_path);
            if !config_path.exists() {
                anyhow::bail!(
                    "Piper config not found at {} (expected from {})",
                    config_path.display(),
                    model_path.display()
                );
            }
            let model = from_config_path(&config_path).context("Loading Piper model")?;
            let synth =
                PiperSpeechSynthesizer::new(model).context("Preparing Piper synthesizer")?;
            *loaded = Some(LoadedVoice {
                model_path: model_path.to_path_buf(),
                synth,
            });
            debug!(model = %model_path.display(), "Loaded voice model");
        }

        let synth = loaded
            .as_ref()
            .map(|l| &l.synth)
            .context("Voice model unavailable")?;

        let output_config = if (pitch - 1.0).abs() <= f32::EPSILON {
            None
        } else {
            Some(AudioOutputConfig {
                rate: None,
                volume: None,
                pitch: Some(pitch_to_percent(pitch)),
                appended_silence_ms: None,
            })
        };
        debug!(path = %path.display(), pitch, chars = text.len(), "Synthesizing paragraph");
        synth
            .synthesize_to_file(&path, text.to_string(), output_config)
            .context("Synthesizing audio")?;
        Ok(path)
    }
}

impl SpeechEngine for PiperSpeaker {
    fn speak(
        &self,
        text: &str,
        params: &UtteranceParams,
        token: &CancellationToken,
    ) -> Result<UtteranceOutcome> {
        if token.is_cancelled() {
            return Ok(UtteranceOutcome::Cancelled);
        }

        self.set_speed(params.speed);
        self.set_volume(params.volume);

        let model_path = self.ensure_model(params.voice.as_ref())?;
        let wav = self.ensure_wav(&model_path, text, params.pitch)?;
        if token.is_cancelled() {
            return Ok(UtteranceOutcome::Cancelled);
        }

        let (_stream, handle) = OutputStream::try_default().context("Opening audio output")?;
        let sink = Sink::try_new(&handle).context("Creating sink")?;
        sink.set_speed(current_value(&self.speed, 1.0));
        sink.set_volume(current_value(&self.volume, 1.0));
        if self.paused.load(Ordering::Acquire) {
            sink.pause();
        }
        let reader = BufReader::new(File::open(&wav).context("Opening synthesized audio")?);
        let source = Decoder::new(reader).context("Decoding synthesized audio")?;
        sink.append(source);

        let sink = Arc::new(sink);
        if let Ok(mut current) = self.current.lock() {
            *current = Some(Arc::clone(&sink));
        }

        // Blocks until the utterance drains, or until cancel_current stops
        // the sink. The stream handle must outlive the wait.
        sink.sleep_until_end();

        // A superseding utterance may already have registered its own sink.
        if let Ok(mut current) = self.current.lock() {
            if current.as_ref().is_some_and(|s| Arc::ptr_eq(s, &sink)) {
                *current = None;
            }
        }

        if token.is_cancelled() {
            Ok(UtteranceOutcome::Cancelled)
        } else {
            Ok(UtteranceOutcome::Completed)
        }
    }

    fn pause(&self) {
        debug!("Pausing playback");
        self.paused.store(true, Ordering::Release);
        if let Ok(current) = self.current.lock() {
            if let Some(sink) = current.as_ref() {
                sink.pause();
            }
        }
    }

    fn resume(&self) {
        debug!("Resuming playback");
        self.paused.store(false, Ordering::Release);
        if let Ok(current) = self.current.lock() {
            if let Some(sink) = current.as_ref() {
                sink.play();
            }
        }
    }

    fn cancel_current(&self) {
        self.paused.store(false, Ordering::Release);
        if let Ok(current) = self.current.lock() {
            if let Some(sink) = current.as_ref() {
                debug!("Stopping in-flight utterance");
                sink.stop();
            }
        }
    }

    fn set_speed(&self, speed: f32) {
        let clamped = speed.clamp(MIN_SPEED, MAX_SPEED);
        if let Ok(mut value) = self.speed.lock() {
            *value = clamped;
        }
        if let Ok(current) = self.current.lock() {
            if let Some(sink) = current.as_ref() {
                sink.set_speed(clamped);
            }
        }
    }

    fn set_volume(&self, volume: f32) {
        if let Ok(mut value) = self.volume.lock() {
            *value = volume;
        }
        if let Ok(current) = self.current.lock() {
            if let Some(sink) = current.as_ref() {
                sink.set_volume(volume);
            }
        }
    }
}

fn current_value(slot: &Mutex<f32>, fallback: f32) -> f32 {
    slot.lock().map(|v| *v).unwrap_or(fallback)
}

fn cache_path(base: &Path, model_path: &Path, text: &str, pitch: f32) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(model_path.as_os_str().to_string_lossy().as_bytes());
    hasher.update(text.as_bytes());
    hasher.update(pitch.to_le_bytes());
    let hash = format!("{:x}", hasher.finalize());
    base.join(format!("tts-{hash}.wav"))
}

/// Piper expects the parent directory that contains `espeak-ng-data/phonindex`.
/// Users often point directly at `.../espeak-ng-data`; trim that to avoid
/// duplicated segments like `/espeak-ng-data/espeak-ng-data/phonindex`.
fn sanitize_espeak_root(path: PathBuf) -> PathBuf {
    if path
        .file_name()
        .map(|n| n == "espeak-ng-data")
        .unwrap_or(false)
    {
        if let Some(parent) = path.parent() {
            debug!(
                original = %path.display(),
                sanitized = %parent.display(),
                "Trimming espeak-ng-data suffix"
            );
            return parent.to_path_buf();
        }
    }
    path
}

fn resolve_piper_config(model_path: &Path) -> PathBuf {
    if model_path
        .extension()
        .map(|ext| ext == "onnx")
        .unwrap_or(false)
    {
        return model_path.with_extension("onnx.json");
    }
    model_path.to_path_buf()
}

/// Map the clamped pitch range linearly onto Piper's 0..=100 percent scale.
fn pitch_to_percent(pitch: f32) -> u8 {
    let clamped = pitch.clamp(MIN_PITCH, MAX_PITCH);
    let percent = ((clamped - MIN_PITCH) / (MAX_PITCH - MIN_PITCH)) * 100.0;
    percent.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::{cache_path, pitch_to_percent, resolve_piper_config, sanitize_espeak_root};
    use std::path::{Path, PathBuf};

    #[test]
    fn cache_key_varies_with_text_and_pitch() {
        let base = Path::new("/tmp/cache");
        let model = Path::new("/voices/vi.onnx");
        let a = cache_path(base, model, "xin chào", 1.0);
        let b = cache_path(base, model, "xin chào", 1.5);
        let c = cache_path(base, model, "tạm biệt", 1.0);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, cache_path(base, model, "xin chào", 1.0));
    }

    #[test]
    fn pitch_maps_onto_percent_scale() {
        assert_eq!(pitch_to_percent(0.5), 0);
        assert_eq!(pitch_to_percent(2.0), 100);
        assert_eq!(pitch_to_percent(1.25), 50);
        assert_eq!(pitch_to_percent(9.0), 100);
    }

    #[test]
    fn onnx_models_resolve_to_sibling_config() {
        assert_eq!(
            resolve_piper_config(Path::new("/voices/vi.onnx")),
            PathBuf::from("/voices/vi.onnx.json")
        );
    }

    #[test]
    fn espeak_data_suffix_is_trimmed() {
        assert_eq!(
            sanitize_espeak_root(PathBuf::from("/usr/share/espeak-ng-data")),
            PathBuf::from("/usr/share")
        );
        assert_eq!(
            sanitize_espeak_root(PathBuf::from("/usr/share")),
            PathBuf::from("/usr/share")
        );
    }
}
