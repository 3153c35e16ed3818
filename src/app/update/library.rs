use super::Effect;
use super::super::state::{App, Screen};
use crate::api::{ComicSummary, ListingKind, RankingEntry, RankingPeriod};
use crate::cache;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

impl App {
    pub(super) fn handle_show_listings(&mut self, kind: ListingKind, effects: &mut Vec<Effect>) {
        self.screen = Screen::Library;
        if self.library.kind != kind || self.library.comics.is_empty() {
            self.library.kind = kind;
            self.library.page = 1;
            effects.push(Effect::LoadListings { kind, page: 1 });
        }
    }

    pub(super) fn handle_show_rankings(&mut self, effects: &mut Vec<Effect>) {
        self.screen = Screen::Rankings;
        if self.ranking.entries.is_empty() && !self.ranking.loading {
            effects.push(Effect::LoadRanking {
                period: self.ranking.period,
            });
        }
    }

    pub(super) fn handle_back_to_comic(&mut self) {
        if let Some(controller) = &self.speech {
            controller.stop();
        }
        self.reader.chapter = None;
        if self.reader.comic.is_none() {
            self.screen = Screen::Library;
        }
    }

    pub(super) fn handle_toggle_login_panel(&mut self) {
        self.auth.panel_open = !self.auth.panel_open;
        self.auth.error = None;
    }

    pub(super) fn handle_submit_login(&mut self, effects: &mut Vec<Effect>) {
        if self.auth.in_flight {
            return;
        }
        let username = self.auth.username.trim().to_string();
        if username.is_empty() || self.auth.password.is_empty() {
            self.auth.error = Some("Username and password are required".to_string());
            return;
        }
        self.auth.in_flight = true;
        self.auth.error = None;
        effects.push(Effect::Login {
            username,
            password: self.auth.password.clone(),
        });
    }

    pub(super) fn handle_login_finished(&mut self, token: Option<String>, error: Option<String>) {
        self.auth.in_flight = false;
        match token {
            Some(token) => {
                info!("Login succeeded");
                cache::save_token(self.api.base_url(), &token);
                self.api.set_token(Some(token));
                self.auth.logged_in = true;
                self.auth.panel_open = false;
                self.auth.password.clear();
            }
            None => {
                warn!("Login failed: {:?}", error);
                self.auth.error = error.or_else(|| Some("Login failed".to_string()));
            }
        }
    }

    pub(super) fn handle_logout(&mut self) {
        self.api.logout();
        cache::clear_token(self.api.base_url());
        self.api.set_token(None);
        self.auth.logged_in = false;
        info!("Logged out");
    }

    pub(super) fn handle_listings_loaded(
        &mut self,
        kind: ListingKind,
        page: u32,
        comics: Vec<ComicSummary>,
        error: Option<String>,
        effects: &mut Vec<Effect>,
    ) {
        if kind != self.library.kind || page != self.library.page {
            return;
        }
        self.library.loading = false;
        self.library.error = error;
        if self.library.error.is_none() {
            self.queue_cover_fetches(
                comics
                    .iter()
                    .map(|comic| (comic.id, comic.cover_image.clone())),
                effects,
            );
            self.library.comics = comics;
        }
    }

    pub(super) fn handle_listing_page_change(&mut self, delta: i64, effects: &mut Vec<Effect>) {
        let next = self.library.page as i64 + delta;
        if next < 1 {
            return;
        }
        self.library.page = next as u32;
        effects.push(Effect::LoadListings {
            kind: self.library.kind,
            page: self.library.page,
        });
    }

    pub(super) fn handle_ranking_period_selected(
        &mut self,
        period: RankingPeriod,
        effects: &mut Vec<Effect>,
    ) {
        if self.ranking.period != period || self.ranking.entries.is_empty() {
            self.ranking.period = period;
            effects.push(Effect::LoadRanking { period });
        }
    }

    pub(super) fn handle_ranking_loaded(
        &mut self,
        period: RankingPeriod,
        entries: Vec<RankingEntry>,
        error: Option<String>,
        effects: &mut Vec<Effect>,
    ) {
        if period != self.ranking.period {
            return;
        }
        self.ranking.loading = false;
        self.ranking.error = error;
        if self.ranking.error.is_none() {
            self.queue_cover_fetches(
                entries
                    .iter()
                    .map(|entry| (entry.id, entry.cover_image.clone())),
                effects,
            );
            self.ranking.entries = entries;
        }
    }

    pub(super) fn handle_cover_ready(&mut self, comic_id: u64, path: PathBuf) {
        self.library.pending_covers.remove(&comic_id);
        self.library
            .covers
            .insert(comic_id, iced::widget::image::Handle::from_path(path));
    }

    pub(super) fn handle_search_query_changed(&mut self, query: String) {
        self.search.input(query, Instant::now());
    }

    pub(super) fn handle_search_results(
        &mut self,
        query: String,
        comics: Vec<ComicSummary>,
        error: Option<String>,
    ) {
        if let Some(error) = error {
            warn!(%query, "Live search failed: {error}");
            return;
        }
        self.search.results(&query, comics);
    }

    /// Enter in the search box opens the highlighted suggestion, or the
    /// first one when nothing is highlighted.
    pub(super) fn handle_search_submitted(&mut self, effects: &mut Vec<Effect>) {
        let target = self
            .search
            .active_suggestion()
            .or_else(|| self.search.suggestions.first())
            .map(|comic| comic.id);
        if let Some(comic_id) = target {
            self.search.close();
            self.handle_open_comic(comic_id, effects);
        }
    }

    pub(super) fn handle_tick(&mut self, now: Instant, effects: &mut Vec<Effect>) {
        if let Some(query) = self.search.due_query(now) {
            effects.push(Effect::LiveSearch { query });
        }

        let mut scroll_target = None;
        if let Some(events) = &self.speech_events {
            for event in events.try_iter() {
                match event {
                    crate::speech::ReaderEvent::ScrollTo { paragraph } => {
                        scroll_target = Some(paragraph);
                    }
                    crate::speech::ReaderEvent::HighlightsCleared => {}
                }
            }
        }
        if let Some(paragraph) = scroll_target {
            if self.screen == Screen::Reader {
                effects.push(Effect::ScrollToParagraph { paragraph });
                effects.push(Effect::SaveBookmark);
            }
        }
    }

    pub(super) fn queue_cover_fetches(
        &mut self,
        covers: impl Iterator<Item = (u64, Option<String>)>,
        effects: &mut Vec<Effect>,
    ) {
        for (comic_id, cover) in covers {
            let Some(url) = cover else { continue };
            if url.is_empty()
                || self.library.covers.contains_key(&comic_id)
                || !self.library.pending_covers.insert(comic_id)
            {
                continue;
            }
            effects.push(Effect::FetchCover { comic_id, url });
        }
    }
}
