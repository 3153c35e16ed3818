use super::Effect;
use super::super::state::App;
use crate::speech::{Voice, VoiceCatalog};
use tracing::{debug, warn};

impl App {
    pub(super) fn handle_play(&mut self, effects: &mut Vec<Effect>) {
        if let Some(controller) = &self.speech {
            controller.play();
            effects.push(Effect::SaveBookmark);
        }
    }

    pub(super) fn handle_pause(&mut self) {
        if let Some(controller) = &self.speech {
            controller.pause();
        }
    }

    pub(super) fn handle_stop_speech(&mut self, effects: &mut Vec<Effect>) {
        if let Some(controller) = &self.speech {
            controller.stop();
            effects.push(Effect::SaveBookmark);
        }
    }

    pub(super) fn handle_toggle_play_pause(&mut self, effects: &mut Vec<Effect>) {
        if let Some(controller) = &self.speech {
            controller.toggle_play_pause();
            effects.push(Effect::SaveBookmark);
        }
    }

    pub(super) fn handle_skip(&mut self, forward: bool, effects: &mut Vec<Effect>) {
        if let Some(controller) = &self.speech {
            if forward {
                controller.skip_forward();
            } else {
                controller.skip_backward();
            }
            effects.push(Effect::SaveBookmark);
        }
    }

    pub(super) fn handle_speed_changed(&mut self, speed: f32) {
        if let Some(controller) = &self.speech {
            controller.set_speed(speed);
        }
    }

    pub(super) fn handle_pitch_changed(&mut self, pitch: f32) {
        if let Some(controller) = &self.speech {
            controller.set_pitch(pitch);
        }
    }

    pub(super) fn handle_volume_changed(&mut self, volume: f32) {
        if let Some(controller) = &self.speech {
            controller.set_volume(volume);
        }
    }

    pub(super) fn handle_auto_scroll_changed(&mut self, enabled: bool) {
        if let Some(controller) = &self.speech {
            controller.set_auto_scroll(enabled);
        }
    }

    pub(super) fn handle_voice_picked(&mut self, name: String) {
        if let Some(controller) = &self.speech {
            controller.set_voice(&name);
        }
    }

    pub(super) fn handle_local_voices_scanned(&mut self, voices: Vec<Voice>) {
        debug!(count = voices.len(), "Local voice scan finished");
        self.local_voices = voices;
        self.rebuild_voice_catalog();
    }

    pub(super) fn handle_voice_index_fetched(
        &mut self,
        voices: Vec<Voice>,
        error: Option<String>,
    ) {
        if let Some(error) = error {
            warn!("Voice index fetch failed: {error}");
            return;
        }
        debug!(count = voices.len(), "Voice index fetched");
        self.remote_voices = voices;
        self.rebuild_voice_catalog();
    }

    fn rebuild_voice_catalog(&mut self) {
        if let Some(controller) = &self.speech {
            let mut all = self.local_voices.clone();
            all.extend(self.remote_voices.iter().cloned());
            controller.refresh_voices(VoiceCatalog::new(all));
        }
    }
}
