pub(crate) fn default_font_size() -> u32 {
    18
}

pub(crate) fn default_line_spacing() -> f32 {
    1.4
}

pub(crate) fn default_margin_horizontal() -> u16 {
    80
}

pub(crate) fn default_margin_vertical() -> u16 {
    12
}

pub(crate) fn default_window_width() -> f32 {
    1100.0
}

pub(crate) fn default_window_height() -> f32 {
    800.0
}

pub(crate) fn default_server_url() -> String {
    "http://localhost:5000".to_string()
}

pub(crate) fn default_request_timeout_secs() -> u64 {
    15
}

pub(crate) fn default_auto_open_last_chapter() -> bool {
    true
}

pub(crate) fn default_target_lang() -> String {
    "vi".to_string()
}

pub(crate) fn default_voices_dir() -> String {
    "voices".to_string()
}

pub(crate) fn default_voice_index_url() -> String {
    "https://huggingface.co/rhasspy/piper-voices/resolve/main/voices.json".to_string()
}

pub(crate) fn default_voice_model() -> String {
    "/usr/share/piper-voices/vi/vi_VN/vais1000/medium/vi_VN-vais1000-medium.onnx".to_string()
}

pub(crate) fn default_espeak_data_dir() -> String {
    "/usr/share".to_string()
}

pub(crate) fn default_paragraph_pause_secs() -> f32 {
    0.3
}

pub(crate) fn default_show_tts() -> bool {
    true
}

pub(crate) fn default_show_settings() -> bool {
    false
}

pub(crate) fn default_day_highlight() -> crate::config::HighlightColor {
    crate::config::HighlightColor {
        r: 0.2,
        g: 0.4,
        b: 0.7,
        a: 0.15,
    }
}

pub(crate) fn default_night_highlight() -> crate::config::HighlightColor {
    crate::config::HighlightColor {
        r: 0.8,
        g: 0.8,
        b: 0.5,
        a: 0.2,
    }
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}
