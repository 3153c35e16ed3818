mod library;
mod reader;

use crate::api::{ApiClient, ListingKind};
use crate::cache;
use crate::config::AppConfig;
use crate::search::SearchBox;
use crate::speech::{
    FileSettings, PARAGRAPH_GAP, PiperSpeaker, PlaybackPhase, ReaderEvent, SpeechController, Voice,
};
use iced::Task;
use iced::widget::scrollable::Id as ScrollId;
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, channel};
use tracing::{info, warn};

use super::messages::Message;
use super::update::Effect;

pub(in crate::app) use library::{AuthState, LibraryState, RankingState};
pub(in crate::app) use reader::{LoadedChapter, ReaderState};

pub(in crate::app) static READER_SCROLL_ID: Lazy<ScrollId> =
    Lazy::new(|| ScrollId::new("reader-scroll"));

pub(in crate::app) const CONFIG_PATH: &str = "conf/config.toml";

/// Limits for the appearance controls.
pub(in crate::app) const MIN_FONT_SIZE: u32 = 12;
pub(in crate::app) const MAX_FONT_SIZE: u32 = 32;
pub(in crate::app) const MIN_LINE_SPACING: f32 = 1.0;
pub(in crate::app) const MAX_LINE_SPACING: f32 = 2.2;

/// Which main surface is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(in crate::app) enum Screen {
    Library,
    Rankings,
    Reader,
}

/// Core application state composed of sub-models.
pub struct App {
    pub(in crate::app) config: AppConfig,
    pub(in crate::app) api: ApiClient,
    pub(in crate::app) screen: Screen,
    pub(in crate::app) auth: AuthState,
    pub(in crate::app) library: LibraryState,
    pub(in crate::app) ranking: RankingState,
    pub(in crate::app) search: SearchBox,
    pub(in crate::app) reader: ReaderState,
    pub(in crate::app) speech: Option<SpeechController>,
    pub(in crate::app) speech_events: Option<Receiver<ReaderEvent>>,
    pub(in crate::app) local_voices: Vec<Voice>,
    pub(in crate::app) remote_voices: Vec<Voice>,
}

impl App {
    pub(in crate::app) fn bootstrap(config: AppConfig, api: ApiClient) -> (Self, Task<Message>) {
        let logged_in = api.is_authenticated();
        let (speech, speech_events) = speech_from_config(&config);

        let mut app = App {
            config,
            api,
            screen: Screen::Library,
            auth: AuthState::new(logged_in),
            library: LibraryState::new(),
            ranking: RankingState::new(),
            search: SearchBox::default(),
            reader: ReaderState::new(),
            speech,
            speech_events,
            local_voices: Vec::new(),
            remote_voices: Vec::new(),
        };

        let startup = vec![
            Effect::LoadListings {
                kind: app.library.kind,
                page: app.library.page,
            },
            Effect::ScanVoices,
            Effect::FetchVoiceIndex,
        ];
        let task = Task::batch(
            startup
                .into_iter()
                .map(|effect| app.run_effect(effect))
                .collect::<Vec<_>>(),
        );
        (app, task)
    }

    pub(in crate::app) fn speech_phase(&self) -> PlaybackPhase {
        self.speech
            .as_ref()
            .map(|controller| controller.phase())
            .unwrap_or(PlaybackPhase::Idle)
    }

    pub(in crate::app) fn chapter_open(&self) -> bool {
        self.reader.chapter.is_some()
    }

    pub(in crate::app) fn open_comic_id(&self) -> Option<u64> {
        self.reader.comic.as_ref().map(|comic| comic.id)
    }

    pub(in crate::app) fn persist_config(&self) {
        crate::config::save_config(Path::new(CONFIG_PATH), &self.config);
    }

    pub(in crate::app) fn persist_bookmark(&self) {
        let Some(comic_id) = self.open_comic_id() else {
            return;
        };
        let Some(chapter) = &self.reader.chapter else {
            return;
        };
        let paragraph = self
            .speech
            .as_ref()
            .map(|controller| controller.current_index())
            .unwrap_or(0);
        cache::save_bookmark(
            self.api.base_url(),
            comic_id,
            cache::Bookmark {
                chapter_number: chapter.number,
                paragraph,
            },
        );
    }
}

/// Build the speech stack from config; a failed engine leaves the reader
/// usable with the TTS controls disabled.
fn speech_from_config(
    config: &AppConfig,
) -> (Option<SpeechController>, Option<Receiver<ReaderEvent>>) {
    let engine = match PiperSpeaker::new(
        cache::tts_dir(&config.server_url),
        PathBuf::from(&config.voices_dir),
        PathBuf::from(&config.default_voice_model),
        PathBuf::from(&config.espeak_data_dir),
    ) {
        Ok(engine) => Arc::new(engine),
        Err(err) => {
            warn!("Speech engine unavailable: {err:#}");
            return (None, None);
        }
    };

    let (events_tx, events_rx) = channel();
    let store = FileSettings::open(cache::reader_settings_path(&config.server_url));
    let controller = SpeechController::new(
        engine,
        Box::new(store),
        events_tx,
        config.target_lang.clone(),
        PARAGRAPH_GAP,
    );
    info!(lang = %config.target_lang, "Speech controller ready");
    (Some(controller), Some(events_rx))
}

pub(in crate::app) fn listing_label(kind: ListingKind) -> &'static str {
    match kind {
        ListingKind::Comics => "Comics",
        ListingKind::Novels => "Novels",
    }
}
