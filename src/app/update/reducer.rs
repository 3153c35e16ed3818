use super::Effect;
use super::super::messages::Message;
use super::super::state::App;

impl App {
    pub(super) fn reduce(&mut self, message: Message) -> Vec<Effect> {
        let mut effects = Vec::new();

        match message {
            Message::ShowListings(kind) => self.handle_show_listings(kind, &mut effects),
            Message::ShowRankings => self.handle_show_rankings(&mut effects),
            Message::BackToComic => self.handle_back_to_comic(),

            Message::ToggleLoginPanel => self.handle_toggle_login_panel(),
            Message::UsernameChanged(username) => self.auth.username = username,
            Message::PasswordChanged(password) => self.auth.password = password,
            Message::SubmitLogin => self.handle_submit_login(&mut effects),
            Message::LoginFinished { token, error } => {
                self.handle_login_finished(token, error);
            }
            Message::Logout => self.handle_logout(),

            Message::ListingsLoaded {
                kind,
                page,
                comics,
                error,
            } => self.handle_listings_loaded(kind, page, comics, error, &mut effects),
            Message::NextListingPage => self.handle_listing_page_change(1, &mut effects),
            Message::PreviousListingPage => self.handle_listing_page_change(-1, &mut effects),
            Message::OpenComic(comic_id) => self.handle_open_comic(comic_id, &mut effects),
            Message::ComicLoaded { detail, error } => {
                self.handle_comic_loaded(detail, error, &mut effects);
            }
            Message::CoverReady { comic_id, path } => self.handle_cover_ready(comic_id, path),
            Message::CoverFailed { comic_id } => {
                self.library.pending_covers.remove(&comic_id);
            }

            Message::RankingPeriodSelected(period) => {
                self.handle_ranking_period_selected(period, &mut effects);
            }
            Message::RankingLoaded {
                period,
                entries,
                error,
            } => self.handle_ranking_loaded(period, entries, error, &mut effects),

            Message::SearchQueryChanged(query) => self.handle_search_query_changed(query),
            Message::SearchResults {
                query,
                comics,
                error,
            } => self.handle_search_results(query, comics, error),
            Message::SearchSubmitted => self.handle_search_submitted(&mut effects),
            Message::CloseSearch => self.search.close(),

            Message::OpenChapter(chapter_number) => {
                self.handle_open_chapter(chapter_number, &mut effects);
            }
            Message::ChapterLoaded {
                comic_id,
                chapter,
                error,
            } => self.handle_chapter_loaded(comic_id, chapter, error, &mut effects),
            Message::ParagraphClicked(paragraph) => {
                self.handle_paragraph_clicked(paragraph, &mut effects);
            }

            Message::Play => self.handle_play(&mut effects),
            Message::Pause => self.handle_pause(),
            Message::StopSpeech => self.handle_stop_speech(&mut effects),
            Message::TogglePlayPause => self.handle_toggle_play_pause(&mut effects),
            Message::SkipForward => self.handle_skip(true, &mut effects),
            Message::SkipBackward => self.handle_skip(false, &mut effects),
            Message::SpeedChanged(speed) => self.handle_speed_changed(speed),
            Message::PitchChanged(pitch) => self.handle_pitch_changed(pitch),
            Message::VolumeChanged(volume) => self.handle_volume_changed(volume),
            Message::AutoScrollChanged(enabled) => self.handle_auto_scroll_changed(enabled),
            Message::VoicePicked(name) => self.handle_voice_picked(name),
            Message::LocalVoicesScanned { voices } => self.handle_local_voices_scanned(voices),
            Message::VoiceIndexFetched { voices, error } => {
                self.handle_voice_index_fetched(voices, error);
            }

            Message::ToggleTtsControls => {
                self.config.show_tts = !self.config.show_tts;
                effects.push(Effect::SaveConfig);
            }
            Message::ToggleSettings => {
                self.config.show_settings = !self.config.show_settings;
                effects.push(Effect::SaveConfig);
            }
            Message::ToggleTheme => self.handle_toggle_theme(&mut effects),
            Message::FontSizeChanged(size) => self.handle_font_size_changed(size, &mut effects),
            Message::LineSpacingChanged(spacing) => {
                self.handle_line_spacing_changed(spacing, &mut effects);
            }
            Message::AutoOpenLastChapterChanged(enabled) => {
                self.config.auto_open_last_chapter = enabled;
                effects.push(Effect::SaveConfig);
            }

            Message::WindowResized { width, height } => {
                self.config.window_width = width;
                self.config.window_height = height;
                effects.push(Effect::SaveConfig);
            }
            Message::WindowMoved { x, y } => {
                self.config.window_pos_x = Some(x);
                self.config.window_pos_y = Some(y);
                effects.push(Effect::SaveConfig);
            }
            Message::KeyPressed { key, modifiers } => {
                if let Some(shortcut) = self.shortcut_message_for_key(key, modifiers) {
                    effects.extend(self.reduce(shortcut));
                }
            }
            Message::Tick(now) => self.handle_tick(now, &mut effects),
        }

        effects
    }
}
