mod appearance;
mod library;
mod reader;
mod reducer;
mod runtime;
mod shortcuts;
mod speech;

use super::messages::Message;
use super::state::App;
use crate::api::{ListingKind, RankingPeriod};
use crate::speech::PlaybackPhase;
use iced::{Subscription, Task, event, time};
use std::time::Duration;

/// Describes work that must be performed outside the pure reducer.
pub(in crate::app) enum Effect {
    SaveConfig,
    SaveBookmark,
    LoadListings { kind: ListingKind, page: u32 },
    LoadComic { comic_id: u64 },
    LoadChapter { comic_id: u64, chapter_number: u32 },
    LoadRanking { period: RankingPeriod },
    LiveSearch { query: String },
    FetchCover { comic_id: u64, url: String },
    ScanVoices,
    FetchVoiceIndex,
    Login { username: String, password: String },
    ScrollToParagraph { paragraph: usize },
}

impl App {
    pub fn subscription(app: &App) -> Subscription<Message> {
        let mut subscriptions: Vec<Subscription<Message>> =
            vec![event::listen_with(runtime::runtime_event_to_message)];

        // The tick drains speech events and fires debounced searches; skip it
        // entirely when neither can happen.
        if app.speech_phase() != PlaybackPhase::Idle || app.search.pending() {
            subscriptions.push(time::every(Duration::from_millis(100)).map(Message::Tick));
        }

        Subscription::batch(subscriptions)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        let effects = self.reduce(message);
        if effects.is_empty() {
            Task::none()
        } else {
            Task::batch(
                effects
                    .into_iter()
                    .map(|effect| self.run_effect(effect))
                    .collect::<Vec<_>>(),
            )
        }
    }
}
