//! Client for the comic/novel web API.
//!
//! All endpoints speak JSON with a `{success, data, error}` envelope and
//! bearer-token authentication. Calls are blocking; the app dispatches them
//! from background tasks.

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
    token: Option<String>,
    http: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, token: Option<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("truyen-reader/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Building HTTP client")?;
        Ok(Self {
            base: base_url.trim_end_matches('/').to_string(),
            token,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Exchange credentials for a bearer token.
    pub fn login(&self, username: &str, password: &str) -> Result<String> {
        let url = format!("{}/auth/login", self.base);
        info!(username, "Logging in");
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .context("Sending login request")?;
        if !response.status().is_success() {
            bail!("Login failed with status {}", response.status());
        }
        let body: LoginResponse = response.json().context("Decoding login response")?;
        Ok(body.token)
    }

    /// Best-effort server-side logout; local state is cleared regardless.
    pub fn logout(&self) {
        let url = format!("{}/auth/logout", self.base);
        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Err(err) = request.send() {
            debug!("Logout request failed: {err}");
        }
    }

    /// Listing of comics or novels, one page at a time.
    pub fn listings(&self, kind: ListingKind, page: u32) -> Result<Vec<ComicSummary>> {
        let path = match kind {
            ListingKind::Comics => "/comics/",
            ListingKind::Novels => "/comics/novels",
        };
        self.get(path, &[("page", page.to_string())])
    }

    pub fn comic(&self, comic_id: u64) -> Result<ComicDetail> {
        self.get(&format!("/comics/{comic_id}"), &[])
    }

    pub fn chapter(&self, comic_id: u64, chapter_number: u32) -> Result<Chapter> {
        self.get(&format!("/comics/{comic_id}/chapter/{chapter_number}"), &[])
    }

    /// Ranking for one time window, already ordered by rank.
    pub fn ranking(&self, period: RankingPeriod) -> Result<Vec<RankingEntry>> {
        self.get(&format!("/api/ranking/{}", period.api_segment()), &[])
    }

    /// Live-search suggestions; the box shows at most five.
    pub fn search(&self, query: &str, limit: u32) -> Result<Vec<ComicSummary>> {
        self.get(
            "/comics/api/search",
            &[("q", query.to_string()), ("limit", limit.to_string())],
        )
    }

    /// Fetch a cover and cache a thumbnail under the server cache dir.
    pub fn ensure_cover_cached(&self, cover_url: &str) -> Result<PathBuf> {
        let path = crate::cache::cover_path(&self.base, cover_url);
        if path.exists() {
            return Ok(path);
        }
        let url = if cover_url.starts_with("http") {
            cover_url.to_string()
        } else {
            format!("{}/{}", self.base, cover_url.trim_start_matches('/'))
        };
        debug!(%url, "Fetching cover image");
        let bytes = self
            .http
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("Fetching cover {url}"))?
            .bytes()
            .context("Reading cover bytes")?;
        let thumbnail = image::load_from_memory(&bytes)
            .context("Decoding cover image")?
            .thumbnail(COVER_WIDTH, COVER_HEIGHT);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Creating covers directory")?;
        }
        thumbnail.save(&path).context("Saving cover thumbnail")?;
        Ok(path)
    }

    /// Plain-text GET against an absolute URL (used for the voice index).
    pub fn fetch_text(&self, url: &str) -> Result<String> {
        self.http
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("Fetching {url}"))?
            .text()
            .context("Reading response body")
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base, path);
        let mut request = self.http.get(&url).header("Accept", "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        debug!(%url, "API request");
        let response = request
            .send()
            .with_context(|| format!("Requesting {path}"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("{path} returned {status}");
        }
        let envelope: Envelope<T> = response
            .json()
            .with_context(|| format!("Decoding {path} response"))?;
        envelope.into_result(path)
    }
}

const COVER_WIDTH: u32 = 160;
const COVER_HEIGHT: u32 = 220;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Comics,
    Novels,
}

/// Ranking windows the server understands; the path segments are the
/// Vietnamese day/week/month the API was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingPeriod {
    Day,
    Week,
    Month,
}

impl RankingPeriod {
    pub const ALL: [RankingPeriod; 3] =
        [RankingPeriod::Day, RankingPeriod::Week, RankingPeriod::Month];

    pub fn api_segment(self) -> &'static str {
        match self {
            RankingPeriod::Day => "ngay",
            RankingPeriod::Week => "tuan",
            RankingPeriod::Month => "thang",
        }
    }
}

impl std::fmt::Display for RankingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RankingPeriod::Day => "Today",
            RankingPeriod::Week => "This Week",
            RankingPeriod::Month => "This Month",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

impl<T> Envelope<T> {
    fn into_result(self, path: &str) -> Result<T> {
        if self.success {
            self.data
                .ok_or_else(|| anyhow!("{path} succeeded but carried no data"))
        } else {
            Err(anyhow!(
                "{path} failed: {}",
                self.error.unwrap_or_else(|| "unknown server error".to_string())
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// One entry of a listing or the live-search suggestion list.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ComicSummary {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub chapters_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComicDetail {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub chapters: Vec<ChapterRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChapterRef {
    pub chapter_number: u32,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chapter {
    pub chapter_number: u32,
    pub title: String,
    /// Chapter body as HTML; the reader extracts paragraphs from it.
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingEntry {
    pub rank: u32,
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub chapters_count: u32,
}

#[cfg(test)]
mod tests {
    use super::{ComicSummary, Envelope, RankingEntry, RankingPeriod};

    #[test]
    fn ranking_periods_use_the_server_segments() {
        assert_eq!(RankingPeriod::Day.api_segment(), "ngay");
        assert_eq!(RankingPeriod::Week.api_segment(), "tuan");
        assert_eq!(RankingPeriod::Month.api_segment(), "thang");
    }

    #[test]
    fn successful_envelope_unwraps_data() {
        let json = r#"{
            "success": true,
            "total": 1,
            "data": [{
                "id": 7,
                "title": "Kiếm Lai",
                "author": "Phong Hỏa",
                "genre": "Tiên hiệp",
                "cover_image": "/static/covers/7.jpg",
                "views": 120345,
                "rating": 4.6,
                "status": "ongoing",
                "chapters_count": 812
            }]
        }"#;
        let envelope: Envelope<Vec<ComicSummary>> =
            serde_json::from_str(json).expect("parses");
        let comics = envelope.into_result("/comics/api/search").expect("success");
        assert_eq!(comics.len(), 1);
        assert_eq!(comics[0].title, "Kiếm Lai");
        assert_eq!(comics[0].chapters_count, 812);
    }

    #[test]
    fn failed_envelope_surfaces_the_server_message() {
        let json = r#"{"success": false, "error": "Invalid period"}"#;
        let envelope: Envelope<Vec<RankingEntry>> =
            serde_json::from_str(json).expect("parses");
        let err = envelope
            .into_result("/api/ranking/nam")
            .expect_err("must fail");
        assert!(err.to_string().contains("Invalid period"));
    }

    #[test]
    fn missing_optional_fields_fall_back() {
        let json = r#"{"id": 1, "title": "Truyện thử"}"#;
        let comic: ComicSummary = serde_json::from_str(json).expect("parses");
        assert_eq!(comic.views, 0);
        assert!(comic.author.is_none());
    }
}
