//! Key-value persistence for reader preferences.
//!
//! The controller only knows this trait; the file-backed store mirrors the
//! cache layout (tiny TOML map, write-through, errors ignored).

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub const KEY_SPEED: &str = "speed";
pub const KEY_AUTO_SCROLL: &str = "auto-scroll";
pub const KEY_VOICE: &str = "voice";

pub trait SettingsStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Write-through TOML map under the cache directory.
pub struct FileSettings {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileSettings {
    pub fn open(path: PathBuf) -> Self {
        let values = fs::read_to_string(&path)
            .ok()
            .and_then(|data| toml::from_str(&data).ok())
            .unwrap_or_default();
        debug!(path = %path.display(), "Opened reader settings");
        Self { path, values }
    }

    fn flush(&self) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(contents) = toml::to_string(&self.values) {
            let _ = fs::write(&self.path, contents);
        }
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::{FileSettings, SettingsStore};

    #[test]
    fn survives_reopen() {
        let dir = std::env::temp_dir().join("truyen-reader-settings-test");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("reader-settings.toml");

        let mut store = FileSettings::open(path.clone());
        store.set("speed", "1.5");
        store.set("voice", "vi_VN-vais1000-medium");

        let reopened = FileSettings::open(path);
        assert_eq!(reopened.get("speed").as_deref(), Some("1.5"));
        assert_eq!(
            reopened.get("voice").as_deref(),
            Some("vi_VN-vais1000-medium")
        );
        let _ = std::fs::remove_dir_all(&dir);
    }
}
