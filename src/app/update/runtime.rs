use super::Effect;
use super::super::messages::Message;
use super::super::state::{App, READER_SCROLL_ID};
use crate::search::SUGGESTION_LIMIT;
use crate::speech::{parse_remote_index, scan_local_voices};
use iced::widget::scrollable::RelativeOffset;
use iced::{Event, Task, event, keyboard, window};
use std::path::PathBuf;
use tracing::{debug, info};

impl App {
    pub(in crate::app) fn run_effect(&mut self, effect: Effect) -> Task<Message> {
        match effect {
            Effect::SaveConfig => {
                self.persist_config();
                Task::none()
            }
            Effect::SaveBookmark => {
                self.persist_bookmark();
                Task::none()
            }
            Effect::LoadListings { kind, page } => {
                self.library.loading = true;
                self.library.error = None;
                let api = self.api.clone();
                info!(?kind, page, "Dispatching listings load");
                Task::perform(
                    async move {
                        match api.listings(kind, page) {
                            Ok(comics) => Message::ListingsLoaded {
                                kind,
                                page,
                                comics,
                                error: None,
                            },
                            Err(err) => Message::ListingsLoaded {
                                kind,
                                page,
                                comics: Vec::new(),
                                error: Some(err.to_string()),
                            },
                        }
                    },
                    |message| message,
                )
            }
            Effect::LoadComic { comic_id } => {
                let api = self.api.clone();
                Task::perform(
                    async move {
                        match api.comic(comic_id) {
                            Ok(detail) => Message::ComicLoaded {
                                detail: Some(Box::new(detail)),
                                error: None,
                            },
                            Err(err) => Message::ComicLoaded {
                                detail: None,
                                error: Some(err.to_string()),
                            },
                        }
                    },
                    |message| message,
                )
            }
            Effect::LoadChapter {
                comic_id,
                chapter_number,
            } => {
                let api = self.api.clone();
                info!(comic_id, chapter_number, "Dispatching chapter load");
                Task::perform(
                    async move {
                        match api.chapter(comic_id, chapter_number) {
                            Ok(chapter) => Message::ChapterLoaded {
                                comic_id,
                                chapter: Some(Box::new(chapter)),
                                error: None,
                            },
                            Err(err) => Message::ChapterLoaded {
                                comic_id,
                                chapter: None,
                                error: Some(err.to_string()),
                            },
                        }
                    },
                    |message| message,
                )
            }
            Effect::LoadRanking { period } => {
                self.ranking.loading = true;
                self.ranking.error = None;
                let api = self.api.clone();
                Task::perform(
                    async move {
                        match api.ranking(period) {
                            Ok(entries) => Message::RankingLoaded {
                                period,
                                entries,
                                error: None,
                            },
                            Err(err) => Message::RankingLoaded {
                                period,
                                entries: Vec::new(),
                                error: Some(err.to_string()),
                            },
                        }
                    },
                    |message| message,
                )
            }
            Effect::LiveSearch { query } => {
                let api = self.api.clone();
                debug!(%query, "Dispatching live search");
                Task::perform(
                    async move {
                        match api.search(&query, SUGGESTION_LIMIT) {
                            Ok(comics) => Message::SearchResults {
                                query,
                                comics,
                                error: None,
                            },
                            Err(err) => Message::SearchResults {
                                query,
                                comics: Vec::new(),
                                error: Some(err.to_string()),
                            },
                        }
                    },
                    |message| message,
                )
            }
            Effect::FetchCover { comic_id, url } => {
                let api = self.api.clone();
                Task::perform(
                    async move {
                        match api.ensure_cover_cached(&url) {
                            Ok(path) => Message::CoverReady { comic_id, path },
                            Err(err) => {
                                debug!(comic_id, "Cover fetch failed: {err:#}");
                                Message::CoverFailed { comic_id }
                            }
                        }
                    },
                    |message| message,
                )
            }
            Effect::ScanVoices => {
                let dir = PathBuf::from(&self.config.voices_dir);
                Task::perform(
                    async move {
                        let voices = scan_local_voices(&dir);
                        Message::LocalVoicesScanned { voices }
                    },
                    |message| message,
                )
            }
            Effect::FetchVoiceIndex => {
                let api = self.api.clone();
                let url = self.config.voice_index_url.clone();
                Task::perform(
                    async move {
                        let fetched = api
                            .fetch_text(&url)
                            .and_then(|body| parse_remote_index(&url, &body));
                        match fetched {
                            Ok(voices) => Message::VoiceIndexFetched {
                                voices,
                                error: None,
                            },
                            Err(err) => Message::VoiceIndexFetched {
                                voices: Vec::new(),
                                error: Some(err.to_string()),
                            },
                        }
                    },
                    |message| message,
                )
            }
            Effect::Login { username, password } => {
                let api = self.api.clone();
                Task::perform(
                    async move {
                        match api.login(&username, &password) {
                            Ok(token) => Message::LoginFinished {
                                token: Some(token),
                                error: None,
                            },
                            Err(err) => Message::LoginFinished {
                                token: None,
                                error: Some(err.to_string()),
                            },
                        }
                    },
                    |message| message,
                )
            }
            Effect::ScrollToParagraph { paragraph } => {
                let count = self
                    .reader
                    .chapter
                    .as_ref()
                    .map(|chapter| chapter.paragraphs.len())
                    .unwrap_or(0);
                if count < 2 {
                    return Task::none();
                }
                let y = (paragraph as f32 / (count - 1) as f32).clamp(0.0, 1.0);
                iced::widget::scrollable::snap_to(
                    READER_SCROLL_ID.clone(),
                    RelativeOffset { x: 0.0, y },
                )
            }
        }
    }
}

pub(super) fn runtime_event_to_message(
    event: Event,
    status: event::Status,
    _window_id: window::Id,
) -> Option<Message> {
    if status == event::Status::Captured {
        return None;
    }
    match event {
        Event::Window(window::Event::Resized(size)) => Some(Message::WindowResized {
            width: size.width,
            height: size.height,
        }),
        Event::Window(window::Event::Moved(position)) => Some(Message::WindowMoved {
            x: position.x,
            y: position.y,
        }),
        Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. }) => {
            Some(Message::KeyPressed { key, modifiers })
        }
        _ => None,
    }
}
