//! Live-search state for the title bar search box.
//!
//! Queries shorter than the minimum are ignored, results are cached for the
//! lifetime of the app (the query space is tiny), and network requests are
//! debounced so a fast typist fires one search, not one per keystroke.

use crate::api::ComicSummary;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const MIN_QUERY_LEN: usize = 2;
pub const SUGGESTION_LIMIT: u32 = 5;
pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Query → previously retrieved suggestions. Never evicted; session-scoped.
#[derive(Debug, Default)]
pub struct SuggestionCache {
    entries: HashMap<String, Vec<ComicSummary>>,
}

impl SuggestionCache {
    pub fn get(&self, query: &str) -> Option<&Vec<ComicSummary>> {
        self.entries.get(query)
    }

    pub fn insert(&mut self, query: String, suggestions: Vec<ComicSummary>) {
        self.entries.insert(query, suggestions);
    }
}

/// Everything the search box needs between keystroke and suggestion click.
#[derive(Debug, Default)]
pub struct SearchBox {
    pub query: String,
    pub suggestions: Vec<ComicSummary>,
    pub open: bool,
    pub active: Option<usize>,
    pub cache: SuggestionCache,
    pending_since: Option<Instant>,
}

impl SearchBox {
    /// Record a keystroke. Returns suggestions immediately on a cache hit;
    /// otherwise arms the debounce timer (or closes the box for short
    /// queries).
    pub fn input(&mut self, query: String, now: Instant) {
        self.query = query;
        self.active = None;
        if self.query.trim().len() < MIN_QUERY_LEN {
            self.open = false;
            self.suggestions.clear();
            self.pending_since = None;
            return;
        }
        if let Some(cached) = self.cache.get(self.query.trim()) {
            self.suggestions = cached.clone();
            self.open = true;
            self.pending_since = None;
        } else {
            self.pending_since = Some(now);
        }
    }

    /// True while a debounced search is waiting to fire.
    pub fn pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// The query to fire once the debounce window has elapsed.
    pub fn due_query(&mut self, now: Instant) -> Option<String> {
        let since = self.pending_since?;
        if now.duration_since(since) < DEBOUNCE {
            return None;
        }
        self.pending_since = None;
        Some(self.query.trim().to_string())
    }

    /// Store results for a finished search; stale responses (query changed
    /// meanwhile) still populate the cache but do not open the box.
    pub fn results(&mut self, query: &str, suggestions: Vec<ComicSummary>) {
        let current = self.query.trim() == query;
        if current {
            self.suggestions = suggestions.clone();
            self.open = true;
            self.active = None;
        }
        self.cache.insert(query.to_string(), suggestions);
    }

    pub fn close(&mut self) {
        self.open = false;
        self.active = None;
        self.pending_since = None;
    }

    /// Arrow-key navigation, clamped to the suggestion list.
    pub fn move_active(&mut self, down: bool) {
        if !self.open || self.suggestions.is_empty() {
            return;
        }
        let last = self.suggestions.len() - 1;
        self.active = Some(match (self.active, down) {
            (None, true) => 0,
            (None, false) => return,
            (Some(idx), true) => (idx + 1).min(last),
            (Some(idx), false) => idx.saturating_sub(1),
        });
    }

    /// The suggestion Enter should open, if any.
    pub fn active_suggestion(&self) -> Option<&ComicSummary> {
        self.active.and_then(|idx| self.suggestions.get(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::{DEBOUNCE, SearchBox};
    use crate::api::ComicSummary;
    use std::time::{Duration, Instant};

    fn comic(id: u64, title: &str) -> ComicSummary {
        ComicSummary {
            id,
            title: title.to_string(),
            author: None,
            genre: None,
            cover_image: None,
            views: 0,
            rating: 0.0,
            chapters_count: 0,
        }
    }

    #[test]
    fn short_queries_never_search() {
        let mut search = SearchBox::default();
        let now = Instant::now();
        search.input("k".to_string(), now);
        assert!(!search.open);
        assert_eq!(search.due_query(now + DEBOUNCE * 2), None);
    }

    #[test]
    fn queries_fire_only_after_the_debounce_window() {
        let mut search = SearchBox::default();
        let now = Instant::now();
        search.input("kiếm".to_string(), now);
        assert_eq!(search.due_query(now + Duration::from_millis(100)), None);
        assert_eq!(
            search.due_query(now + DEBOUNCE),
            Some("kiếm".to_string())
        );
        // Fired once; the pending timer is consumed.
        assert_eq!(search.due_query(now + DEBOUNCE * 2), None);
    }

    #[test]
    fn cache_hits_skip_the_network() {
        let mut search = SearchBox::default();
        let now = Instant::now();
        search.input("kiếm".to_string(), now);
        search.results("kiếm", vec![comic(1, "Kiếm Lai")]);

        search.input("kiếm l".to_string(), now);
        search.input("kiếm".to_string(), now);
        assert!(search.open);
        assert_eq!(search.suggestions.len(), 1);
        assert_eq!(search.due_query(now + DEBOUNCE * 2), None);
    }

    #[test]
    fn stale_results_fill_the_cache_without_opening() {
        let mut search = SearchBox::default();
        let now = Instant::now();
        search.input("tiên".to_string(), now);
        search.input("tiên hiệp".to_string(), now);
        search.results("tiên", vec![comic(2, "Tiên Nghịch")]);
        assert!(!search.open);
        assert!(search.cache.get("tiên").is_some());
    }

    #[test]
    fn keyboard_navigation_clamps_to_the_list() {
        let mut search = SearchBox::default();
        search.suggestions = vec![comic(1, "A"), comic(2, "B")];
        search.open = true;

        search.move_active(true);
        assert_eq!(search.active, Some(0));
        search.move_active(true);
        assert_eq!(search.active, Some(1));
        search.move_active(true);
        assert_eq!(search.active, Some(1));
        search.move_active(false);
        assert_eq!(search.active, Some(0));
        search.move_active(false);
        assert_eq!(search.active, Some(0));
        assert_eq!(search.active_suggestion().map(|c| c.id), Some(1));
    }
}
