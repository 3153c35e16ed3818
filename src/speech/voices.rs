//! Voice catalog for the synthesizer.
//!
//! Voices come from two places: models already installed under the voices
//! directory (local, ready to speak) and entries of the published voice index
//! (remote, downloaded on first use). The index fetch finishes after startup,
//! so the catalog is refreshed and selection re-runs when it lands.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// Language code as the model reports it, e.g. `vi_VN`.
    pub language: String,
    pub quality: Option<String>,
    /// True when the model synthesizes from disk without a network fetch.
    pub local: bool,
    pub model_path: Option<PathBuf>,
    pub download_url: Option<String>,
}

impl Voice {
    /// Label shown in the voice picker, mirroring the local/online tag the
    /// web client displayed next to each voice.
    pub fn display_label(&self) -> String {
        let origin = if self.local { "local" } else { "online" };
        match &self.quality {
            Some(quality) => format!("{} · {} · {}", self.name, quality, origin),
            None => format!("{} · {}", self.name, origin),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VoiceCatalog {
    voices: Vec<Voice>,
}

impl VoiceCatalog {
    /// Build a catalog, deduplicating by name with local entries winning.
    pub fn new(voices: Vec<Voice>) -> Self {
        let mut merged: Vec<Voice> = Vec::with_capacity(voices.len());
        for voice in voices {
            match merged.iter_mut().find(|v| v.name == voice.name) {
                Some(existing) => {
                    if voice.local && !existing.local {
                        *existing = voice;
                    }
                }
                None => merged.push(voice),
            }
        }
        Self { voices: merged }
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn find(&self, name: &str) -> Option<&Voice> {
        self.voices.iter().find(|voice| voice.name == name)
    }

    /// Default-selection policy: a local voice in the target language, then
    /// any voice in the target language, then any local voice, then the
    /// first catalog entry, then none.
    pub fn default_voice(&self, target_lang: &str) -> Option<&Voice> {
        self.voices
            .iter()
            .find(|v| v.local && lang_matches(&v.language, target_lang))
            .or_else(|| {
                self.voices
                    .iter()
                    .find(|v| lang_matches(&v.language, target_lang))
            })
            .or_else(|| self.voices.iter().find(|v| v.local))
            .or_else(|| self.voices.first())
    }

    /// Voices grouped by language family for the picker. The target language
    /// group leads; within a group local voices come before remote ones and
    /// ties break alphabetically, the same ordering the default policy uses.
    pub fn grouped_by_language(&self, target_lang: &str) -> Vec<(String, Vec<&Voice>)> {
        let target_family = lang_family(target_lang);
        let mut families: Vec<String> = Vec::new();
        for voice in &self.voices {
            let family = lang_family(&voice.language);
            if !families.contains(&family) {
                families.push(family);
            }
        }
        families.sort();
        if let Some(pos) = families.iter().position(|f| *f == target_family) {
            let target = families.remove(pos);
            families.insert(0, target);
        }

        families
            .into_iter()
            .map(|family| {
                let mut group: Vec<&Voice> = self
                    .voices
                    .iter()
                    .filter(|v| lang_family(&v.language) == family)
                    .collect();
                group.sort_by(|a, b| {
                    b.local
                        .cmp(&a.local)
                        .then_with(|| a.name.cmp(&b.name))
                });
                (family, group)
            })
            .collect()
    }
}

/// `vi_VN` and `vi-VN` both match a target of `vi`.
pub fn lang_matches(voice_lang: &str, target: &str) -> bool {
    let voice = voice_lang.to_ascii_lowercase().replace('_', "-");
    let target = target.to_ascii_lowercase().replace('_', "-");
    voice.starts_with(&target)
}

fn lang_family(lang: &str) -> String {
    lang.to_ascii_lowercase()
        .replace('_', "-")
        .split('-')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[derive(Debug, Deserialize)]
struct PiperModelConfig {
    #[serde(default)]
    language: Option<PiperLanguage>,
    #[serde(default)]
    dataset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PiperLanguage {
    #[serde(default)]
    code: Option<String>,
}

/// Scan the voices directory for installed Piper models (`*.onnx` with a
/// sibling `*.onnx.json` config).
pub fn scan_local_voices(dir: &Path) -> Vec<Voice> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), "No local voices directory: {err}");
            return Vec::new();
        }
    };

    let mut voices = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map(|ext| ext != "onnx").unwrap_or(true) {
            continue;
        }
        let config_path = path.with_extension("onnx.json");
        if !config_path.exists() {
            warn!(model = %path.display(), "Skipping model without a config");
            continue;
        }
        let name = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => continue,
        };
        let config: Option<PiperModelConfig> = fs::read_to_string(&config_path)
            .ok()
            .and_then(|data| serde_json::from_str(&data).ok());
        let language = config
            .as_ref()
            .and_then(|c| c.language.as_ref())
            .and_then(|l| l.code.clone())
            .unwrap_or_else(|| name.split('-').next().unwrap_or("").to_string());
        let quality = quality_from_name(&name)
            .map(str::to_string)
            .or_else(|| config.as_ref().and_then(|c| c.dataset.clone()));

        voices.push(Voice {
            name,
            language,
            quality,
            local: true,
            model_path: Some(path),
            download_url: None,
        });
    }

    voices.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(count = voices.len(), dir = %dir.display(), "Scanned local voices");
    voices
}

fn quality_from_name(name: &str) -> Option<&str> {
    let tail = name.rsplit('-').next()?;
    matches!(tail, "x_low" | "low" | "medium" | "high").then_some(tail)
}

#[derive(Debug, Deserialize)]
struct RemoteVoiceEntry {
    #[serde(default)]
    language: Option<PiperLanguage>,
    #[serde(default)]
    quality: Option<String>,
    #[serde(default)]
    files: BTreeMap<String, serde_json::Value>,
}

/// Parse the published voice index into remote catalog entries. Download
/// URLs are resolved against the index URL.
pub fn parse_remote_index(index_url: &str, json: &str) -> Result<Vec<Voice>> {
    let entries: BTreeMap<String, RemoteVoiceEntry> =
        serde_json::from_str(json).context("Parsing voice index")?;
    let base = index_url
        .rsplit_once('/')
        .map(|(base, _)| base)
        .unwrap_or(index_url);

    let mut voices = Vec::new();
    for (name, entry) in entries {
        let Some(model_file) = entry.files.keys().find(|f| f.ends_with(".onnx")) else {
            continue;
        };
        let language = entry
            .language
            .and_then(|l| l.code)
            .unwrap_or_else(|| name.split('-').next().unwrap_or("").to_string());
        voices.push(Voice {
            download_url: Some(format!("{base}/{model_file}")),
            name,
            language,
            quality: entry.quality,
            local: false,
            model_path: None,
        });
    }
    Ok(voices)
}

#[cfg(test)]
mod tests {
    use super::{Voice, VoiceCatalog, lang_matches, parse_remote_index};

    fn voice(name: &str, language: &str, local: bool) -> Voice {
        Voice {
            name: name.to_string(),
            language: language.to_string(),
            quality: None,
            local,
            model_path: None,
            download_url: None,
        }
    }

    #[test]
    fn default_prefers_local_target_language_voice() {
        let catalog = VoiceCatalog::new(vec![
            voice("vi-online", "vi_VN", false),
            voice("vi-local", "vi_VN", true),
        ]);
        assert_eq!(catalog.default_voice("vi").map(|v| v.name.as_str()), Some("vi-local"));
    }

    #[test]
    fn default_falls_back_through_the_priority_ladder() {
        let lang_only = VoiceCatalog::new(vec![
            voice("en-local", "en_US", true),
            voice("vi-online", "vi_VN", false),
        ]);
        assert_eq!(
            lang_only.default_voice("vi").map(|v| v.name.as_str()),
            Some("vi-online")
        );

        let local_only = VoiceCatalog::new(vec![
            voice("fr-online", "fr_FR", false),
            voice("en-local", "en_US", true),
        ]);
        assert_eq!(
            local_only.default_voice("vi").map(|v| v.name.as_str()),
            Some("en-local")
        );

        let neither = VoiceCatalog::new(vec![voice("de-online", "de_DE", false)]);
        assert_eq!(
            neither.default_voice("vi").map(|v| v.name.as_str()),
            Some("de-online")
        );

        assert!(VoiceCatalog::default().default_voice("vi").is_none());
    }

    #[test]
    fn lang_matching_ignores_separator_and_case() {
        assert!(lang_matches("vi_VN", "vi"));
        assert!(lang_matches("vi-VN", "vi"));
        assert!(lang_matches("VI_VN", "vi"));
        assert!(!lang_matches("en_US", "vi"));
    }

    #[test]
    fn grouping_leads_with_target_language_and_orders_local_first() {
        let catalog = VoiceCatalog::new(vec![
            voice("en-b", "en_US", false),
            voice("en-a", "en_US", true),
            voice("vi-remote", "vi_VN", false),
        ]);
        let groups = catalog.grouped_by_language("vi");
        assert_eq!(groups[0].0, "vi");
        assert_eq!(groups[1].0, "en");
        let en_names: Vec<_> = groups[1].1.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(en_names, vec!["en-a", "en-b"]);
    }

    #[test]
    fn merge_prefers_local_duplicate() {
        let catalog = VoiceCatalog::new(vec![
            voice("vi_VN-vais1000-medium", "vi_VN", false),
            voice("vi_VN-vais1000-medium", "vi_VN", true),
        ]);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.find("vi_VN-vais1000-medium").is_some_and(|v| v.local));
    }

    #[test]
    fn remote_index_resolves_download_urls() {
        let json = r#"{
            "vi_VN-vais1000-medium": {
                "language": {"code": "vi_VN"},
                "quality": "medium",
                "files": {
                    "vi/vi_VN/vais1000/medium/vi_VN-vais1000-medium.onnx": {},
                    "vi/vi_VN/vais1000/medium/vi_VN-vais1000-medium.onnx.json": {}
                }
            }
        }"#;
        let voices =
            parse_remote_index("https://voices.example/index/voices.json", json).expect("parses");
        assert_eq!(voices.len(), 1);
        assert!(!voices[0].local);
        assert_eq!(
            voices[0].download_url.as_deref(),
            Some(
                "https://voices.example/index/vi/vi_VN/vais1000/medium/vi_VN-vais1000-medium.onnx"
            )
        );
    }
}
