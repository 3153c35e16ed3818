use super::Effect;
use super::super::state::{
    App, MAX_FONT_SIZE, MAX_LINE_SPACING, MIN_FONT_SIZE, MIN_LINE_SPACING,
};
use crate::config::ThemeMode;
use tracing::debug;

impl App {
    pub(super) fn handle_toggle_theme(&mut self, effects: &mut Vec<Effect>) {
        self.config.theme = match self.config.theme {
            ThemeMode::Day => ThemeMode::Night,
            ThemeMode::Night => ThemeMode::Day,
        };
        debug!(theme = %self.config.theme, "Toggled theme");
        effects.push(Effect::SaveConfig);
    }

    pub(super) fn handle_font_size_changed(&mut self, size: u32, effects: &mut Vec<Effect>) {
        let clamped = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        if clamped != self.config.font_size {
            self.config.font_size = clamped;
            effects.push(Effect::SaveConfig);
        }
    }

    pub(super) fn handle_line_spacing_changed(&mut self, spacing: f32, effects: &mut Vec<Effect>) {
        let clamped = spacing.clamp(MIN_LINE_SPACING, MAX_LINE_SPACING);
        if (clamped - self.config.line_spacing).abs() > f32::EPSILON {
            self.config.line_spacing = clamped;
            effects.push(Effect::SaveConfig);
        }
    }
}
