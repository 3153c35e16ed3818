use serde::Deserialize;

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct AppConfig {
    pub theme: ThemeMode,
    pub font_size: u32,
    pub line_spacing: f32,
    pub margin_horizontal: u16,
    pub margin_vertical: u16,
    pub window_width: f32,
    pub window_height: f32,
    pub window_pos_x: Option<f32>,
    pub window_pos_y: Option<f32>,
    pub server_url: String,
    pub request_timeout_secs: u64,
    pub auto_open_last_chapter: bool,
    pub target_lang: String,
    pub voices_dir: String,
    pub voice_index_url: String,
    pub default_voice_model: String,
    pub espeak_data_dir: String,
    pub paragraph_pause_secs: f32,
    pub show_tts: bool,
    pub show_settings: bool,
    pub day_highlight: HighlightColor,
    pub night_highlight: HighlightColor,
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            theme: ThemeMode::Night,
            font_size: crate::config::defaults::default_font_size(),
            line_spacing: crate::config::defaults::default_line_spacing(),
            margin_horizontal: crate::config::defaults::default_margin_horizontal(),
            margin_vertical: crate::config::defaults::default_margin_vertical(),
            window_width: crate::config::defaults::default_window_width(),
            window_height: crate::config::defaults::default_window_height(),
            window_pos_x: None,
            window_pos_y: None,
            server_url: crate::config::defaults::default_server_url(),
            request_timeout_secs: crate::config::defaults::default_request_timeout_secs(),
            auto_open_last_chapter: crate::config::defaults::default_auto_open_last_chapter(),
            target_lang: crate::config::defaults::default_target_lang(),
            voices_dir: crate::config::defaults::default_voices_dir(),
            voice_index_url: crate::config::defaults::default_voice_index_url(),
            default_voice_model: crate::config::defaults::default_voice_model(),
            espeak_data_dir: crate::config::defaults::default_espeak_data_dir(),
            paragraph_pause_secs: crate::config::defaults::default_paragraph_pause_secs(),
            show_tts: crate::config::defaults::default_show_tts(),
            show_settings: crate::config::defaults::default_show_settings(),
            day_highlight: crate::config::defaults::default_day_highlight(),
            night_highlight: crate::config::defaults::default_night_highlight(),
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

/// Theme mode.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeMode {
    Day,
    Night,
}

impl Default for ThemeMode {
    fn default() -> Self {
        ThemeMode::Night
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ThemeMode::Day => "Day",
            ThemeMode::Night => "Night",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, serde::Deserialize, serde::Serialize)]
pub struct HighlightColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
