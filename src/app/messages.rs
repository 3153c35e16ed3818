use crate::api::{Chapter, ComicDetail, ComicSummary, ListingKind, RankingEntry, RankingPeriod};
use crate::speech::Voice;
use iced::keyboard::{Key, Modifiers};
use std::path::PathBuf;
use std::time::Instant;

/// Messages emitted by the UI and the background tasks.
#[derive(Debug, Clone)]
pub enum Message {
    // Navigation between the three screens.
    ShowListings(ListingKind),
    ShowRankings,
    BackToComic,

    // Authentication.
    ToggleLoginPanel,
    UsernameChanged(String),
    PasswordChanged(String),
    SubmitLogin,
    LoginFinished {
        token: Option<String>,
        error: Option<String>,
    },
    Logout,

    // Listings and comic detail.
    ListingsLoaded {
        kind: ListingKind,
        page: u32,
        comics: Vec<ComicSummary>,
        error: Option<String>,
    },
    NextListingPage,
    PreviousListingPage,
    OpenComic(u64),
    ComicLoaded {
        detail: Option<Box<ComicDetail>>,
        error: Option<String>,
    },
    CoverReady {
        comic_id: u64,
        path: PathBuf,
    },
    CoverFailed {
        comic_id: u64,
    },

    // Rankings.
    RankingPeriodSelected(RankingPeriod),
    RankingLoaded {
        period: RankingPeriod,
        entries: Vec<RankingEntry>,
        error: Option<String>,
    },

    // Live search.
    SearchQueryChanged(String),
    SearchResults {
        query: String,
        comics: Vec<ComicSummary>,
        error: Option<String>,
    },
    SearchSubmitted,
    CloseSearch,

    // Reader.
    OpenChapter(u32),
    ChapterLoaded {
        comic_id: u64,
        chapter: Option<Box<Chapter>>,
        error: Option<String>,
    },
    ParagraphClicked(usize),

    // Speech transport and parameters.
    Play,
    Pause,
    StopSpeech,
    TogglePlayPause,
    SkipForward,
    SkipBackward,
    SpeedChanged(f32),
    PitchChanged(f32),
    VolumeChanged(f32),
    AutoScrollChanged(bool),
    VoicePicked(String),
    LocalVoicesScanned {
        voices: Vec<Voice>,
    },
    VoiceIndexFetched {
        voices: Vec<Voice>,
        error: Option<String>,
    },

    // Appearance and panels.
    ToggleTtsControls,
    ToggleSettings,
    ToggleTheme,
    FontSizeChanged(u32),
    LineSpacingChanged(f32),
    AutoOpenLastChapterChanged(bool),

    // Runtime events.
    WindowResized {
        width: f32,
        height: f32,
    },
    WindowMoved {
        x: f32,
        y: f32,
    },
    KeyPressed {
        key: Key,
        modifiers: Modifiers,
    },
    Tick(Instant),
}
