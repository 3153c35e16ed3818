//! Disk cache for session and reading state.
//!
//! Everything lives under `.cache/<hash-of-server-url>/` so switching servers
//! never mixes tokens or bookmarks. Writes are best-effort: a failed save is
//! never allowed to disturb the UI.

use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const CACHE_DIR: &str = ".cache";

/// Directory holding all cached state for one server.
pub fn server_dir(server_url: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(server_url.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    Path::new(CACHE_DIR).join(hash)
}

pub fn tts_dir(server_url: &str) -> PathBuf {
    server_dir(server_url).join("tts")
}

pub fn covers_dir(server_url: &str) -> PathBuf {
    server_dir(server_url).join("covers")
}

/// Path for the reader's key-value settings file (speech preferences).
pub fn reader_settings_path(server_url: &str) -> PathBuf {
    server_dir(server_url).join("reader-settings.toml")
}

#[derive(serde::Serialize, serde::Deserialize)]
struct TokenEntry {
    token: String,
}

/// Restore a previously saved session token, if any.
pub fn load_token(server_url: &str) -> Option<String> {
    let data = fs::read_to_string(token_path(server_url)).ok()?;
    let entry: TokenEntry = toml::from_str(&data).ok()?;
    Some(entry.token)
}

pub fn save_token(server_url: &str, token: &str) {
    let path = token_path(server_url);
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let entry = TokenEntry {
        token: token.to_string(),
    };
    if let Ok(contents) = toml::to_string(&entry) {
        if let Ok(mut file) = fs::File::create(path) {
            let _ = file.write_all(contents.as_bytes());
        }
    }
}

pub fn clear_token(server_url: &str) {
    let _ = fs::remove_file(token_path(server_url));
}

fn token_path(server_url: &str) -> PathBuf {
    server_dir(server_url).join("token.toml")
}

/// Where the reader left off in one comic.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Bookmark {
    pub chapter_number: u32,
    pub paragraph: usize,
}

pub fn load_bookmark(server_url: &str, comic_id: u64) -> Option<Bookmark> {
    let data = fs::read_to_string(bookmark_path(server_url, comic_id)).ok()?;
    toml::from_str(&data).ok()
}

pub fn save_bookmark(server_url: &str, comic_id: u64, bookmark: Bookmark) {
    let path = bookmark_path(server_url, comic_id);
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Ok(contents) = toml::to_string(&bookmark) {
        let _ = fs::write(path, contents);
    }
}

fn bookmark_path(server_url: &str, comic_id: u64) -> PathBuf {
    server_dir(server_url)
        .join("bookmarks")
        .join(format!("{comic_id}.toml"))
}

/// Cached thumbnail path for a cover image URL.
pub fn cover_path(server_url: &str, cover_url: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(cover_url.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    covers_dir(server_url).join(format!("{hash}.png"))
}
