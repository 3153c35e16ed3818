use super::defaults;
use super::models::{AppConfig, HighlightColor, LogLevel, ThemeMode};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    appearance: AppearanceConfig,
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    reading_behavior: ReadingBehaviorConfig,
    #[serde(default)]
    tts: TtsConfig,
    #[serde(default)]
    ui: UiConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            theme: tables.appearance.theme,
            font_size: tables.appearance.font_size,
            line_spacing: tables.appearance.line_spacing,
            margin_horizontal: tables.appearance.margin_horizontal,
            margin_vertical: tables.appearance.margin_vertical,
            window_width: tables.appearance.window_width,
            window_height: tables.appearance.window_height,
            window_pos_x: tables.appearance.window_pos_x,
            window_pos_y: tables.appearance.window_pos_y,
            server_url: tables.server.url,
            request_timeout_secs: tables.server.request_timeout_secs,
            auto_open_last_chapter: tables.reading_behavior.auto_open_last_chapter,
            target_lang: tables.tts.target_lang,
            voices_dir: tables.tts.voices_dir,
            voice_index_url: tables.tts.voice_index_url,
            default_voice_model: tables.tts.default_voice_model,
            espeak_data_dir: tables.tts.espeak_data_dir,
            paragraph_pause_secs: tables.reading_behavior.paragraph_pause_secs,
            show_tts: tables.ui.show_tts,
            show_settings: tables.ui.show_settings,
            day_highlight: tables.appearance.day_highlight,
            night_highlight: tables.appearance.night_highlight,
            log_level: tables.logging.log_level,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            appearance: AppearanceConfig {
                theme: config.theme,
                font_size: config.font_size,
                line_spacing: config.line_spacing,
                margin_horizontal: config.margin_horizontal,
                margin_vertical: config.margin_vertical,
                window_width: config.window_width,
                window_height: config.window_height,
                window_pos_x: config.window_pos_x,
                window_pos_y: config.window_pos_y,
                day_highlight: config.day_highlight,
                night_highlight: config.night_highlight,
            },
            server: ServerConfig {
                url: config.server_url.clone(),
                request_timeout_secs: config.request_timeout_secs,
            },
            reading_behavior: ReadingBehaviorConfig {
                auto_open_last_chapter: config.auto_open_last_chapter,
                paragraph_pause_secs: config.paragraph_pause_secs,
            },
            tts: TtsConfig {
                target_lang: config.target_lang.clone(),
                voices_dir: config.voices_dir.clone(),
                voice_index_url: config.voice_index_url.clone(),
                default_voice_model: config.default_voice_model.clone(),
                espeak_data_dir: config.espeak_data_dir.clone(),
            },
            ui: UiConfig {
                show_tts: config.show_tts,
                show_settings: config.show_settings,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct AppearanceConfig {
    #[serde(default)]
    theme: ThemeMode,
    #[serde(default = "defaults::default_font_size")]
    font_size: u32,
    #[serde(default = "defaults::default_line_spacing")]
    line_spacing: f32,
    #[serde(default = "defaults::default_margin_horizontal")]
    margin_horizontal: u16,
    #[serde(default = "defaults::default_margin_vertical")]
    margin_vertical: u16,
    #[serde(default = "defaults::default_window_width")]
    window_width: f32,
    #[serde(default = "defaults::default_window_height")]
    window_height: f32,
    #[serde(default)]
    window_pos_x: Option<f32>,
    #[serde(default)]
    window_pos_y: Option<f32>,
    #[serde(default = "defaults::default_day_highlight")]
    day_highlight: HighlightColor,
    #[serde(default = "defaults::default_night_highlight")]
    night_highlight: HighlightColor,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        AppearanceConfig {
            theme: ThemeMode::default(),
            font_size: defaults::default_font_size(),
            line_spacing: defaults::default_line_spacing(),
            margin_horizontal: defaults::default_margin_horizontal(),
            margin_vertical: defaults::default_margin_vertical(),
            window_width: defaults::default_window_width(),
            window_height: defaults::default_window_height(),
            window_pos_x: None,
            window_pos_y: None,
            day_highlight: defaults::default_day_highlight(),
            night_highlight: defaults::default_night_highlight(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ServerConfig {
    #[serde(default = "defaults::default_server_url")]
    url: String,
    #[serde(default = "defaults::default_request_timeout_secs")]
    request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            url: defaults::default_server_url(),
            request_timeout_secs: defaults::default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ReadingBehaviorConfig {
    #[serde(default = "defaults::default_auto_open_last_chapter")]
    auto_open_last_chapter: bool,
    #[serde(default = "defaults::default_paragraph_pause_secs")]
    paragraph_pause_secs: f32,
}

impl Default for ReadingBehaviorConfig {
    fn default() -> Self {
        ReadingBehaviorConfig {
            auto_open_last_chapter: defaults::default_auto_open_last_chapter(),
            paragraph_pause_secs: defaults::default_paragraph_pause_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct TtsConfig {
    #[serde(default = "defaults::default_target_lang")]
    target_lang: String,
    #[serde(default = "defaults::default_voices_dir")]
    voices_dir: String,
    #[serde(default = "defaults::default_voice_index_url")]
    voice_index_url: String,
    #[serde(default = "defaults::default_voice_model")]
    default_voice_model: String,
    #[serde(default = "defaults::default_espeak_data_dir")]
    espeak_data_dir: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        TtsConfig {
            target_lang: defaults::default_target_lang(),
            voices_dir: defaults::default_voices_dir(),
            voice_index_url: defaults::default_voice_index_url(),
            default_voice_model: defaults::default_voice_model(),
            espeak_data_dir: defaults::default_espeak_data_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct UiConfig {
    #[serde(default = "defaults::default_show_tts")]
    show_tts: bool,
    #[serde(default = "defaults::default_show_settings")]
    show_settings: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_tts: defaults::default_show_tts(),
            show_settings: defaults::default_show_settings(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}
