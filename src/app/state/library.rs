use crate::api::{ComicSummary, ListingKind, RankingEntry, RankingPeriod};
use std::collections::{HashMap, HashSet};

/// Browse state: the current listing page plus cached cover thumbnails.
pub struct LibraryState {
    pub(in crate::app) kind: ListingKind,
    pub(in crate::app) page: u32,
    pub(in crate::app) comics: Vec<ComicSummary>,
    pub(in crate::app) loading: bool,
    pub(in crate::app) error: Option<String>,
    pub(in crate::app) covers: HashMap<u64, iced::widget::image::Handle>,
    pub(in crate::app) pending_covers: HashSet<u64>,
}

impl LibraryState {
    pub(in crate::app) fn new() -> Self {
        Self {
            kind: ListingKind::Novels,
            page: 1,
            comics: Vec::new(),
            loading: false,
            error: None,
            covers: HashMap::new(),
            pending_covers: HashSet::new(),
        }
    }
}

pub struct RankingState {
    pub(in crate::app) period: RankingPeriod,
    pub(in crate::app) entries: Vec<RankingEntry>,
    pub(in crate::app) loading: bool,
    pub(in crate::app) error: Option<String>,
}

impl RankingState {
    pub(in crate::app) fn new() -> Self {
        Self {
            period: RankingPeriod::Day,
            entries: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// Login panel and session state.
pub struct AuthState {
    pub(in crate::app) panel_open: bool,
    pub(in crate::app) username: String,
    pub(in crate::app) password: String,
    pub(in crate::app) in_flight: bool,
    pub(in crate::app) error: Option<String>,
    pub(in crate::app) logged_in: bool,
}

impl AuthState {
    pub(in crate::app) fn new(logged_in: bool) -> Self {
        Self {
            panel_open: false,
            username: String::new(),
            password: String::new(),
            in_flight: false,
            error: None,
            logged_in,
        }
    }
}
