//! The speech playback controller.
//!
//! Owns one reading session at a time: an ordered paragraph list extracted
//! from the chapter source, the playback phase, and the listener preferences.
//! The sequential read loop runs on a dedicated thread and is superseded by
//! handing it a cancelled token; a fresh token identifies the loop that owns
//! the session, so a cancelled utterance never advances state.

use crate::cancellation::CancellationToken;
use crate::paragraphs::{self, Paragraph};
use crate::speech::engine::{SpeechEngine, UtteranceOutcome, UtteranceParams};
use crate::speech::settings::{KEY_AUTO_SCROLL, KEY_SPEED, KEY_VOICE, SettingsStore};
use crate::speech::voices::{Voice, VoiceCatalog};
use crate::speech::{MAX_PITCH, MAX_SPEED, MAX_VOLUME, MIN_PITCH, MIN_SPEED, MIN_VOLUME};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Playback is exactly one of these at any time, so "playing and paused at
/// once" cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    Playing,
    Paused,
}

/// Side effects the hosting view performs on the reader surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderEvent {
    /// Bring the paragraph into view (emitted only while auto-scroll is on).
    ScrollTo { paragraph: usize },
    /// The session ended; drop any paragraph highlight.
    HighlightsCleared,
}

#[derive(Debug, Clone)]
struct Preferences {
    voice: Option<Voice>,
    speed: f32,
    pitch: f32,
    volume: f32,
    auto_scroll: bool,
}

struct ControllerInner {
    engine: Arc<dyn SpeechEngine>,
    store: Mutex<Box<dyn SettingsStore>>,
    events: Sender<ReaderEvent>,
    source: Mutex<Option<String>>,
    paragraphs: Mutex<Vec<Paragraph>>,
    phase: Mutex<PlaybackPhase>,
    current: AtomicUsize,
    token: Mutex<CancellationToken>,
    prefs: Mutex<Preferences>,
    preferred_voice: Mutex<Option<String>>,
    catalog: Mutex<VoiceCatalog>,
    target_lang: String,
    gap: Duration,
}

/// Cheap-clone handle; all state lives behind the shared inner.
#[derive(Clone)]
pub struct SpeechController {
    inner: Arc<ControllerInner>,
}

impl SpeechController {
    pub fn new(
        engine: Arc<dyn SpeechEngine>,
        store: Box<dyn SettingsStore>,
        events: Sender<ReaderEvent>,
        target_lang: impl Into<String>,
        gap: Duration,
    ) -> Self {
        let speed = store
            .get(KEY_SPEED)
            .and_then(|v| v.parse::<f32>().ok())
            .map(|v| v.clamp(MIN_SPEED, MAX_SPEED))
            .unwrap_or(1.0);
        let auto_scroll = store
            .get(KEY_AUTO_SCROLL)
            .map(|v| v == "true")
            .unwrap_or(true);
        let preferred_voice = store.get(KEY_VOICE);
        debug!(speed, auto_scroll, voice = ?preferred_voice, "Restored reader preferences");

        Self {
            inner: Arc::new(ControllerInner {
                engine,
                store: Mutex::new(store),
                events,
                source: Mutex::new(None),
                paragraphs: Mutex::new(Vec::new()),
                phase: Mutex::new(PlaybackPhase::Idle),
                current: AtomicUsize::new(0),
                token: Mutex::new(CancellationToken::new()),
                prefs: Mutex::new(Preferences {
                    voice: None,
                    speed,
                    pitch: 1.0,
                    volume: 1.0,
                    auto_scroll,
                }),
                preferred_voice: Mutex::new(preferred_voice),
                catalog: Mutex::new(VoiceCatalog::default()),
                target_lang: target_lang.into(),
                gap,
            }),
        }
    }

    /// Begin a new reading session over the given chapter HTML. Paragraphs
    /// are extracted lazily on the first `play` and stay fixed until the
    /// source changes again.
    pub fn set_source(&self, html: String) {
        self.stop();
        *lock(&self.inner.paragraphs) = Vec::new();
        *lock(&self.inner.source) = Some(html);
        self.inner.current.store(0, Ordering::Release);
    }

    /// Start reading from the current paragraph. No-op while already
    /// playing; resumes while paused; logs and stays idle when the session
    /// has nothing to read.
    pub fn play(&self) {
        let mut phase = lock(&self.inner.phase);
        match *phase {
            PlaybackPhase::Playing => {
                debug!("Play requested while already playing; ignoring");
                return;
            }
            PlaybackPhase::Paused => {
                info!("Resuming playback");
                self.inner.engine.resume();
                *phase = PlaybackPhase::Playing;
                return;
            }
            PlaybackPhase::Idle => {}
        }

        let total = self.ensure_paragraphs();
        if total == 0 {
            warn!("No readable paragraphs in the current chapter");
            return;
        }

        let start = self.inner.current.load(Ordering::Acquire).min(total - 1);
        let token = CancellationToken::new();
        *lock(&self.inner.token) = token.clone();
        *phase = PlaybackPhase::Playing;
        drop(phase);

        info!(start, total, "Starting playback");
        self.spawn_read_loop(start, token);
    }

    pub fn pause(&self) {
        let mut phase = lock(&self.inner.phase);
        if *phase == PlaybackPhase::Playing {
            info!("Pausing playback");
            self.inner.engine.pause();
            *phase = PlaybackPhase::Paused;
        }
    }

    pub fn resume(&self) {
        let mut phase = lock(&self.inner.phase);
        if *phase == PlaybackPhase::Paused {
            info!("Resuming playback");
            self.inner.engine.resume();
            *phase = PlaybackPhase::Playing;
        }
    }

    pub fn toggle_play_pause(&self) {
        match self.phase() {
            PlaybackPhase::Playing => self.pause(),
            PlaybackPhase::Paused | PlaybackPhase::Idle => self.play(),
        }
    }

    /// End the session: cancel the in-flight utterance, reset the cursor to
    /// the first paragraph and clear highlighting.
    pub fn stop(&self) {
        *lock(&self.inner.phase) = PlaybackPhase::Idle;
        lock(&self.inner.token).cancel();
        self.inner.engine.cancel_current();
        self.inner.current.store(0, Ordering::Release);
        let _ = self.inner.events.send(ReaderEvent::HighlightsCleared);
        info!("Stopped playback");
    }

    pub fn skip_forward(&self) {
        self.skip(1);
    }

    pub fn skip_backward(&self) {
        self.skip(-1);
    }

    fn skip(&self, delta: isize) {
        let total = lock(&self.inner.paragraphs).len();
        if total == 0 {
            return;
        }
        let idx = self.inner.current.load(Ordering::Acquire);
        let target = idx as isize + delta;
        if target < 0 || target as usize >= total {
            debug!(idx, delta, "Skip at sequence boundary; ignoring");
            return;
        }
        info!(from = idx, to = target as usize, "Skipped paragraph");
        self.jump_to(target as usize);
    }

    /// Move the cursor to a paragraph. Idle sessions just remember the new
    /// position; active ones restart the read loop there.
    pub fn seek(&self, paragraph: usize) {
        let total = self.ensure_paragraphs();
        if total == 0 {
            return;
        }
        self.jump_to(paragraph.min(total - 1));
    }

    /// Start (or re-aim) playback at the given paragraph.
    pub fn play_from(&self, paragraph: usize) {
        self.seek(paragraph);
        self.play();
    }

    fn jump_to(&self, target: usize) {
        let phase = *lock(&self.inner.phase);
        if phase == PlaybackPhase::Idle {
            self.inner.current.store(target, Ordering::Release);
            return;
        }

        let fresh = CancellationToken::new();
        {
            let mut token = lock(&self.inner.token);
            token.cancel();
            *token = fresh.clone();
        }
        self.inner.engine.cancel_current();
        self.inner.current.store(target, Ordering::Release);

        if phase == PlaybackPhase::Paused {
            // cancel_current dropped the pause latch; re-arm it so the
            // jumped-to paragraph waits for resume.
            self.inner.engine.pause();
        }
        self.spawn_read_loop(target, fresh);
    }

    pub fn set_speed(&self, speed: f32) {
        let clamped = speed.clamp(MIN_SPEED, MAX_SPEED);
        lock(&self.inner.prefs).speed = clamped;
        self.inner.engine.set_speed(clamped);
        self.persist(KEY_SPEED, &clamped.to_string());
        info!(speed = clamped, "Updated speech rate");
    }

    /// Pitch applies from the next utterance on. It is never written to the
    /// settings store, matching speed/voice/auto-scroll being the only
    /// persisted preferences.
    pub fn set_pitch(&self, pitch: f32) {
        let clamped = pitch.clamp(MIN_PITCH, MAX_PITCH);
        lock(&self.inner.prefs).pitch = clamped;
        info!(pitch = clamped, "Updated speech pitch");
    }

    /// Volume applies to the in-flight utterance; not persisted.
    pub fn set_volume(&self, volume: f32) {
        let clamped = volume.clamp(MIN_VOLUME, MAX_VOLUME);
        lock(&self.inner.prefs).volume = clamped;
        self.inner.engine.set_volume(clamped);
        info!(volume = clamped, "Updated speech volume");
    }

    pub fn set_auto_scroll(&self, enabled: bool) {
        lock(&self.inner.prefs).auto_scroll = enabled;
        self.persist(KEY_AUTO_SCROLL, if enabled { "true" } else { "false" });
        info!(enabled, "Updated auto-scroll");
    }

    /// Select a catalog voice by name; takes effect on the next utterance.
    pub fn set_voice(&self, name: &str) {
        let Some(voice) = lock(&self.inner.catalog).find(name).cloned() else {
            warn!(name, "Requested voice is not in the catalog");
            return;
        };
        info!(voice = name, local = voice.local, "Voice selected");
        lock(&self.inner.prefs).voice = Some(voice);
        *lock(&self.inner.preferred_voice) = Some(name.to_string());
        self.persist(KEY_VOICE, name);
    }

    /// Swap in a refreshed catalog and re-run selection: the persisted
    /// preference wins when it is present, otherwise the default policy
    /// (local target-language voice first) picks.
    pub fn refresh_voices(&self, catalog: VoiceCatalog) {
        let preferred = lock(&self.inner.preferred_voice).clone();
        let selected = preferred
            .as_deref()
            .and_then(|name| catalog.find(name))
            .or_else(|| catalog.default_voice(&self.inner.target_lang))
            .cloned();
        if catalog.is_empty() {
            warn!("Voice catalog refreshed but empty; engine default will be used");
        } else if let Some(voice) = &selected {
            info!(
                voices = catalog.len(),
                selected = %voice.name,
                local = voice.local,
                "Voice catalog refreshed"
            );
        }
        lock(&self.inner.prefs).voice = selected;
        *lock(&self.inner.catalog) = catalog;
    }

    pub fn phase(&self) -> PlaybackPhase {
        *lock(&self.inner.phase)
    }

    pub fn current_index(&self) -> usize {
        self.inner.current.load(Ordering::Acquire)
    }

    pub fn paragraph_count(&self) -> usize {
        lock(&self.inner.paragraphs).len()
    }

    /// The paragraph to highlight, present only while a session is active.
    pub fn highlighted_paragraph(&self) -> Option<usize> {
        (self.phase() != PlaybackPhase::Idle).then(|| self.current_index())
    }

    pub fn speed(&self) -> f32 {
        lock(&self.inner.prefs).speed
    }

    pub fn pitch(&self) -> f32 {
        lock(&self.inner.prefs).pitch
    }

    pub fn volume(&self) -> f32 {
        lock(&self.inner.prefs).volume
    }

    pub fn auto_scroll(&self) -> bool {
        lock(&self.inner.prefs).auto_scroll
    }

    pub fn selected_voice(&self) -> Option<Voice> {
        lock(&self.inner.prefs).voice.clone()
    }

    /// Voices grouped for the picker, target language leading, local voices
    /// ahead of remote within each group.
    pub fn voices_grouped(&self) -> Vec<(String, Vec<Voice>)> {
        lock(&self.inner.catalog)
            .grouped_by_language(&self.inner.target_lang)
            .into_iter()
            .map(|(family, voices)| (family, voices.into_iter().cloned().collect()))
            .collect()
    }

    fn ensure_paragraphs(&self) -> usize {
        let mut paragraphs = lock(&self.inner.paragraphs);
        if paragraphs.is_empty() {
            if let Some(html) = lock(&self.inner.source).as_deref() {
                *paragraphs = paragraphs::extract_paragraphs(html);
                debug!(count = paragraphs.len(), "Extracted session paragraphs");
            }
        }
        paragraphs.len()
    }

    fn persist(&self, key: &str, value: &str) {
        lock(&self.inner.store).set(key, value);
    }

    fn spawn_read_loop(&self, start: usize, token: CancellationToken) {
        let inner = Arc::clone(&self.inner);
        let spawned = thread::Builder::new()
            .name("speech-loop".to_string())
            .spawn(move || read_loop(inner, start, token));
        if let Err(err) = spawned {
            error!("Failed to start playback thread: {err}");
            *lock(&self.inner.phase) = PlaybackPhase::Idle;
        }
    }
}

fn read_loop(inner: Arc<ControllerInner>, start: usize, token: CancellationToken) {
    let paragraphs = lock(&inner.paragraphs).clone();
    let total = paragraphs.len();
    let mut idx = start.min(total.saturating_sub(1));
    debug!(start = idx, total, "Read loop running");

    while idx < total {
        if token.is_cancelled() {
            debug!(idx, "Read loop superseded");
            return;
        }
        inner.current.store(idx, Ordering::Release);

        let (params, auto_scroll) = {
            let prefs = lock(&inner.prefs);
            (
                UtteranceParams {
                    voice: prefs.voice.clone(),
                    speed: prefs.speed,
                    pitch: prefs.pitch,
                    volume: prefs.volume,
                },
                prefs.auto_scroll,
            )
        };
        if auto_scroll {
            let _ = inner.events.send(ReaderEvent::ScrollTo { paragraph: idx });
        }

        match inner.engine.speak(&paragraphs[idx].text, &params, &token) {
            Ok(UtteranceOutcome::Completed) => {
                thread::sleep(inner.gap);
                idx += 1;
            }
            Ok(UtteranceOutcome::Cancelled) => {
                debug!(idx, "Utterance cancelled");
                return;
            }
            Err(err) => {
                error!(paragraph = idx, "Synthesis failed; stopping playback: {err:#}");
                finish_session(&inner);
                return;
            }
        }
    }

    info!("Finished reading the chapter");
    finish_session(&inner);
}

fn finish_session(inner: &ControllerInner) {
    *lock(&inner.phase) = PlaybackPhase::Idle;
    inner.current.store(0, Ordering::Release);
    let _ = inner.events.send(ReaderEvent::HighlightsCleared);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::{PlaybackPhase, ReaderEvent, SpeechController};
    use crate::cancellation::CancellationToken;
    use crate::speech::engine::{SpeechEngine, UtteranceOutcome, UtteranceParams};
    use crate::speech::settings::SettingsStore;
    use crate::speech::voices::{Voice, VoiceCatalog};
    use anyhow::{Result, bail};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::mpsc::{Receiver, channel};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::{Duration, Instant};

    struct MockEngine {
        utter_delay: Duration,
        fail_on: Option<String>,
        spoken: Mutex<Vec<String>>,
        active: AtomicUsize,
        max_active: AtomicUsize,
        paused: AtomicBool,
        last_speed: Mutex<Option<f32>>,
        last_volume: Mutex<Option<f32>>,
    }

    impl MockEngine {
        fn new(utter_delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                utter_delay,
                fail_on: None,
                spoken: Mutex::new(Vec::new()),
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
                paused: AtomicBool::new(false),
                last_speed: Mutex::new(None),
                last_volume: Mutex::new(None),
            })
        }

        fn failing_on(utter_delay: Duration, text: &str) -> Arc<Self> {
            let mut engine = Self::new(utter_delay);
            Arc::get_mut(&mut engine).expect("fresh engine").fail_on = Some(text.to_string());
            engine
        }

        fn spoken(&self) -> Vec<String> {
            self.spoken.lock().expect("spoken lock").clone()
        }
    }

    impl SpeechEngine for MockEngine {
        fn speak(
            &self,
            text: &str,
            _params: &UtteranceParams,
            token: &CancellationToken,
        ) -> Result<UtteranceOutcome> {
            let running = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(running, Ordering::SeqCst);
            self.spoken.lock().expect("spoken lock").push(text.to_string());

            let result = (|| {
                if self.fail_on.as_deref() == Some(text) {
                    bail!("synthetic engine failure");
                }
                let deadline = Instant::now() + self.utter_delay;
                loop {
                    if token.is_cancelled() {
                        return Ok(UtteranceOutcome::Cancelled);
                    }
                    if Instant::now() >= deadline && !self.paused.load(Ordering::SeqCst) {
                        return Ok(UtteranceOutcome::Completed);
                    }
                    thread::sleep(Duration::from_millis(1));
                }
            })();

            self.active.fetch_sub(1, Ordering::SeqCst);
            result
        }

        fn pause(&self) {
            self.paused.store(true, Ordering::SeqCst);
        }

        fn resume(&self) {
            self.paused.store(false, Ordering::SeqCst);
        }

        fn cancel_current(&self) {
            self.paused.store(false, Ordering::SeqCst);
        }

        fn set_speed(&self, speed: f32) {
            *self.last_speed.lock().expect("speed lock") = Some(speed);
        }

        fn set_volume(&self, volume: f32) {
            *self.last_volume.lock().expect("volume lock") = Some(volume);
        }
    }

    #[derive(Clone, Default)]
    struct SharedStore {
        values: Arc<Mutex<HashMap<String, String>>>,
    }

    impl SharedStore {
        fn get_value(&self, key: &str) -> Option<String> {
            self.values.lock().expect("store lock").get(key).cloned()
        }
    }

    impl SettingsStore for SharedStore {
        fn get(&self, key: &str) -> Option<String> {
            self.get_value(key)
        }

        fn set(&mut self, key: &str, value: &str) {
            self.values
                .lock()
                .expect("store lock")
                .insert(key.to_string(), value.to_string());
        }
    }

    fn chapter_html(count: usize) -> String {
        (0..count)
            .map(|i| format!("<p>Paragraph number {i}.</p>"))
            .collect()
    }

    fn controller_with(
        engine: Arc<MockEngine>,
        paragraphs: usize,
    ) -> (SpeechController, Receiver<ReaderEvent>, SharedStore) {
        let (tx, rx) = channel();
        let store = SharedStore::default();
        let controller = SpeechController::new(
            engine,
            Box::new(store.clone()),
            tx,
            "vi",
            Duration::from_millis(1),
        );
        controller.set_source(chapter_html(paragraphs));
        (controller, rx, store)
    }

    fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        condition()
    }

    fn vi_voice(name: &str, local: bool) -> Voice {
        Voice {
            name: name.to_string(),
            language: "vi_VN".to_string(),
            quality: None,
            local,
            model_path: None,
            download_url: None,
        }
    }

    #[test]
    fn visits_every_paragraph_in_order_then_returns_to_idle() {
        let engine = MockEngine::new(Duration::from_millis(5));
        let (controller, _events, _store) = controller_with(Arc::clone(&engine), 3);

        controller.play();
        assert!(wait_until(Duration::from_secs(2), || {
            controller.phase() == PlaybackPhase::Idle && engine.spoken().len() == 3
        }));

        let spoken = engine.spoken();
        assert_eq!(spoken[0], "Paragraph number 0.");
        assert_eq!(spoken[1], "Paragraph number 1.");
        assert_eq!(spoken[2], "Paragraph number 2.");
        assert_eq!(controller.current_index(), 0);
        assert_eq!(controller.highlighted_paragraph(), None);
    }

    #[test]
    fn play_while_playing_is_a_noop() {
        let engine = MockEngine::new(Duration::from_millis(20));
        let (controller, _events, _store) = controller_with(Arc::clone(&engine), 3);

        controller.play();
        controller.play();
        controller.play();

        assert!(wait_until(Duration::from_secs(3), || {
            controller.phase() == PlaybackPhase::Idle
        }));
        assert_eq!(engine.spoken().len(), 3);
        assert_eq!(engine.max_active.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn pause_and_resume_keep_the_same_paragraph() {
        let engine = MockEngine::new(Duration::from_millis(40));
        let (controller, _events, _store) = controller_with(Arc::clone(&engine), 2);

        controller.play();
        assert!(wait_until(Duration::from_secs(1), || !engine.spoken().is_empty()));

        controller.pause();
        assert_eq!(controller.phase(), PlaybackPhase::Paused);
        let index_at_pause = controller.current_index();

        // Long past the utterance deadline: a paused engine must hold it.
        thread::sleep(Duration::from_millis(80));
        assert_eq!(controller.phase(), PlaybackPhase::Paused);
        assert_eq!(controller.current_index(), index_at_pause);
        assert_eq!(engine.spoken().len(), 1);

        controller.resume();
        assert!(wait_until(Duration::from_secs(2), || {
            controller.phase() == PlaybackPhase::Idle
        }));
        // The paused paragraph finished without being spoken again.
        assert_eq!(engine.spoken().len(), 2);
    }

    #[test]
    fn play_while_paused_resumes() {
        let engine = MockEngine::new(Duration::from_millis(40));
        let (controller, _events, _store) = controller_with(Arc::clone(&engine), 2);

        controller.play();
        assert!(wait_until(Duration::from_secs(1), || !engine.spoken().is_empty()));
        controller.pause();
        controller.play();
        assert_eq!(controller.phase(), PlaybackPhase::Playing);
        assert!(wait_until(Duration::from_secs(2), || {
            controller.phase() == PlaybackPhase::Idle
        }));
        assert_eq!(engine.spoken().len(), 2);
    }

    #[test]
    fn stop_halts_the_loop_and_clears_highlighting() {
        let engine = MockEngine::new(Duration::from_millis(200));
        let (controller, events, _store) = controller_with(Arc::clone(&engine), 4);

        controller.play();
        assert!(wait_until(Duration::from_secs(1), || !engine.spoken().is_empty()));

        controller.stop();
        assert_eq!(controller.phase(), PlaybackPhase::Idle);
        assert_eq!(controller.current_index(), 0);
        assert_eq!(controller.highlighted_paragraph(), None);

        // No further paragraph is entered after the loop observes the cancel.
        thread::sleep(Duration::from_millis(100));
        assert_eq!(engine.spoken().len(), 1);

        let received: Vec<ReaderEvent> = events.try_iter().collect();
        assert!(received.contains(&ReaderEvent::HighlightsCleared));
    }

    #[test]
    fn skips_are_noops_at_sequence_boundaries() {
        let engine = MockEngine::new(Duration::from_millis(5));
        let (controller, _events, _store) = controller_with(Arc::clone(&engine), 2);
        // Paragraphs are extracted on first play; prime them without playing.
        controller.play();
        controller.stop();

        controller.skip_backward();
        assert_eq!(controller.current_index(), 0);

        controller.skip_forward();
        assert_eq!(controller.current_index(), 1);
        controller.skip_forward();
        assert_eq!(controller.current_index(), 1);
    }

    #[test]
    fn skip_forward_restarts_playback_from_the_next_paragraph() {
        let engine = MockEngine::new(Duration::from_millis(60));
        let (controller, _events, _store) = controller_with(Arc::clone(&engine), 3);

        controller.play();
        assert!(wait_until(Duration::from_secs(1), || !engine.spoken().is_empty()));
        controller.skip_forward();

        assert!(wait_until(Duration::from_secs(3), || {
            controller.phase() == PlaybackPhase::Idle
        }));
        let spoken = engine.spoken();
        // Paragraph 0 was cancelled mid-utterance, then 1 and 2 played out.
        assert_eq!(spoken.first().map(String::as_str), Some("Paragraph number 0."));
        assert_eq!(spoken.last().map(String::as_str), Some("Paragraph number 2."));
        assert_eq!(spoken.len(), 3);
    }

    #[test]
    fn play_from_starts_at_the_requested_paragraph() {
        let engine = MockEngine::new(Duration::from_millis(3));
        let (controller, _events, _store) = controller_with(Arc::clone(&engine), 3);

        controller.play_from(1);
        assert!(wait_until(Duration::from_secs(2), || {
            controller.phase() == PlaybackPhase::Idle && engine.spoken().len() == 2
        }));
        let spoken = engine.spoken();
        assert_eq!(spoken[0], "Paragraph number 1.");
        assert_eq!(spoken[1], "Paragraph number 2.");
    }

    #[test]
    fn numeric_parameters_clamp_instead_of_failing() {
        let engine = MockEngine::new(Duration::from_millis(1));
        let (controller, _events, _store) = controller_with(engine, 1);

        controller.set_speed(3.0);
        assert_eq!(controller.speed(), 2.0);
        controller.set_speed(0.1);
        assert_eq!(controller.speed(), 0.5);

        controller.set_volume(-1.0);
        assert_eq!(controller.volume(), 0.0);
        controller.set_volume(5.0);
        assert_eq!(controller.volume(), 1.0);

        controller.set_pitch(9.0);
        assert_eq!(controller.pitch(), 2.0);
        controller.set_pitch(0.0);
        assert_eq!(controller.pitch(), 0.5);
    }

    #[test]
    fn only_speed_voice_and_auto_scroll_are_persisted() {
        let engine = MockEngine::new(Duration::from_millis(1));
        let (controller, _events, store) = controller_with(engine, 1);
        controller.refresh_voices(VoiceCatalog::new(vec![vi_voice("vi-local", true)]));

        controller.set_speed(1.5);
        controller.set_auto_scroll(false);
        controller.set_voice("vi-local");
        controller.set_pitch(1.8);
        controller.set_volume(0.4);

        assert_eq!(store.get_value("speed").as_deref(), Some("1.5"));
        assert_eq!(store.get_value("auto-scroll").as_deref(), Some("false"));
        assert_eq!(store.get_value("voice").as_deref(), Some("vi-local"));
        assert_eq!(store.get_value("pitch"), None);
        assert_eq!(store.get_value("volume"), None);
    }

    #[test]
    fn live_parameter_changes_reach_the_engine() {
        let engine = MockEngine::new(Duration::from_millis(1));
        let (controller, _events, _store) = controller_with(Arc::clone(&engine), 1);

        controller.set_speed(1.25);
        controller.set_volume(0.5);
        assert_eq!(*engine.last_speed.lock().expect("speed lock"), Some(1.25));
        assert_eq!(*engine.last_volume.lock().expect("volume lock"), Some(0.5));
    }

    #[test]
    fn play_with_no_paragraphs_stays_idle() {
        let engine = MockEngine::new(Duration::from_millis(1));
        let (controller, _events, _store) = controller_with(Arc::clone(&engine), 0);

        controller.play();
        assert_eq!(controller.phase(), PlaybackPhase::Idle);
        thread::sleep(Duration::from_millis(20));
        assert!(engine.spoken().is_empty());
    }

    #[test]
    fn synthesis_error_aborts_the_whole_loop() {
        let engine = MockEngine::failing_on(Duration::from_millis(5), "Paragraph number 1.");
        let (controller, _events, _store) = controller_with(Arc::clone(&engine), 3);

        controller.play();
        assert!(wait_until(Duration::from_secs(2), || {
            controller.phase() == PlaybackPhase::Idle && engine.spoken().len() >= 2
        }));

        // The failing paragraph is not retried and the rest is never reached.
        thread::sleep(Duration::from_millis(50));
        assert_eq!(engine.spoken().len(), 2);
        assert_eq!(controller.current_index(), 0);
        assert_eq!(controller.highlighted_paragraph(), None);
    }

    #[test]
    fn catalog_refresh_reselects_with_persisted_preference_winning() {
        let engine = MockEngine::new(Duration::from_millis(1));
        let (controller, _events, _store) = controller_with(engine, 1);

        controller.refresh_voices(VoiceCatalog::new(vec![
            vi_voice("vi-online", false),
            vi_voice("vi-local", true),
        ]));
        assert_eq!(
            controller.selected_voice().map(|v| v.name),
            Some("vi-local".to_string())
        );

        controller.set_voice("vi-online");
        controller.refresh_voices(VoiceCatalog::new(vec![
            vi_voice("vi-online", false),
            vi_voice("vi-local", true),
        ]));
        assert_eq!(
            controller.selected_voice().map(|v| v.name),
            Some("vi-online".to_string())
        );
    }

    #[test]
    fn scroll_events_follow_the_auto_scroll_flag() {
        let engine = MockEngine::new(Duration::from_millis(2));
        let (controller, events, _store) = controller_with(Arc::clone(&engine), 2);

        controller.play();
        assert!(wait_until(Duration::from_secs(2), || {
            controller.phase() == PlaybackPhase::Idle
        }));
        let scrolls: Vec<ReaderEvent> = events
            .try_iter()
            .filter(|event| matches!(event, ReaderEvent::ScrollTo { .. }))
            .collect();
        assert_eq!(
            scrolls,
            vec![
                ReaderEvent::ScrollTo { paragraph: 0 },
                ReaderEvent::ScrollTo { paragraph: 1 }
            ]
        );

        controller.set_auto_scroll(false);
        controller.set_source(chapter_html(2));
        controller.play();
        assert!(wait_until(Duration::from_secs(2), || {
            controller.phase() == PlaybackPhase::Idle && engine.spoken().len() == 4
        }));
        assert!(
            events
                .try_iter()
                .all(|event| !matches!(event, ReaderEvent::ScrollTo { .. }))
        );
    }
}
