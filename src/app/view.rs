use super::messages::Message;
use super::state::{
    App, MAX_FONT_SIZE, MAX_LINE_SPACING, MIN_FONT_SIZE, MIN_LINE_SPACING, READER_SCROLL_ID,
    Screen, listing_label,
};
use crate::api::{ComicSummary, ListingKind, RankingEntry, RankingPeriod};
use crate::speech::{MAX_PITCH, MAX_SPEED, MAX_VOLUME, MIN_PITCH, MIN_SPEED, MIN_VOLUME};
use crate::speech::{PlaybackPhase, SpeechController};
use iced::alignment::Vertical;
use iced::widget::text::{LineHeight, Wrapping};
use iced::widget::{
    Column, Row, button, checkbox, column, container, horizontal_space, image, pick_list, row,
    scrollable, slider, text, text_input,
};
use iced::{Element, Length};

const COVER_WIDTH: f32 = 140.0;
const COVER_HEIGHT: f32 = 190.0;
const CARDS_PER_ROW: usize = 4;

/// Entry in the voice picker; shows the grouped label, sends the voice name.
#[derive(Debug, Clone, PartialEq)]
struct VoiceChoice {
    name: String,
    label: String,
}

impl std::fmt::Display for VoiceChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

impl App {
    pub fn view(&self) -> Element<'_, Message> {
        let mut content: Column<'_, Message> = column![self.top_bar()].spacing(12);

        if self.auth.panel_open && !self.auth.logged_in {
            content = content.push(self.login_panel());
        }
        if self.search.open {
            content = content.push(self.search_suggestions());
        }

        let body: Element<'_, Message> = match self.screen {
            Screen::Library => self.library_view(),
            Screen::Rankings => self.rankings_view(),
            Screen::Reader => self.reader_view(),
        };
        content = content.push(container(body).height(Length::Fill));

        if self.config.show_tts && self.screen == Screen::Reader && self.chapter_open() {
            content = content.push(self.tts_controls());
        }

        let mut layout: Row<'_, Message> = row![
            container(content.padding(16).height(Length::Fill)).width(Length::Fill)
        ]
        .spacing(16);
        if self.config.show_settings {
            layout = layout.push(self.settings_panel());
        }
        layout.into()
    }

    fn top_bar(&self) -> Element<'_, Message> {
        let nav = |kind: ListingKind, current: &Self| {
            let label = listing_label(kind);
            if current.screen == Screen::Library && current.library.kind == kind {
                button(label)
            } else {
                button(label).on_press(Message::ShowListings(kind))
            }
        };

        let rankings = if self.screen == Screen::Rankings {
            button("Rankings")
        } else {
            button("Rankings").on_press(Message::ShowRankings)
        };

        let search_input = text_input("Search titles, authors, genres…", &self.search.query)
            .on_input(Message::SearchQueryChanged)
            .on_submit(Message::SearchSubmitted)
            .width(Length::Fixed(280.0));

        let auth: Element<'_, Message> = if self.auth.logged_in {
            row![
                text("Signed in"),
                button("Log out").on_press(Message::Logout)
            ]
            .spacing(8)
            .align_y(Vertical::Center)
            .into()
        } else {
            button("Log in").on_press(Message::ToggleLoginPanel).into()
        };

        row![
            text("Truyện Reader").size(20),
            nav(ListingKind::Novels, self),
            nav(ListingKind::Comics, self),
            rankings,
            horizontal_space(),
            search_input,
            auth,
            button("Settings").on_press(Message::ToggleSettings),
        ]
        .spacing(10)
        .align_y(Vertical::Center)
        .width(Length::Fill)
        .into()
    }

    fn login_panel(&self) -> Element<'_, Message> {
        let submit = if self.auth.in_flight {
            button("Signing in…")
        } else {
            button("Sign in").on_press(Message::SubmitLogin)
        };
        let mut panel = row![
            text_input("Username", &self.auth.username)
                .on_input(Message::UsernameChanged)
                .width(Length::Fixed(180.0)),
            text_input("Password", &self.auth.password)
                .on_input(Message::PasswordChanged)
                .on_submit(Message::SubmitLogin)
                .secure(true)
                .width(Length::Fixed(180.0)),
            submit,
        ]
        .spacing(8)
        .align_y(Vertical::Center);
        if let Some(error) = &self.auth.error {
            panel = panel.push(text(error.clone()).size(14.0));
        }
        panel.into()
    }

    fn search_suggestions(&self) -> Element<'_, Message> {
        let mut list: Column<'_, Message> = column![].spacing(2);
        if self.search.suggestions.is_empty() {
            list = list.push(text("No results").size(14.0));
        }
        for (idx, comic) in self.search.suggestions.iter().enumerate() {
            let marker = if self.search.active == Some(idx) {
                "▸ "
            } else {
                "   "
            };
            let line = format!(
                "{marker}{} — {} · {} views",
                comic.title,
                comic.author.as_deref().unwrap_or("unknown"),
                comic.views
            );
            list = list.push(
                button(text(line).size(14.0))
                    .on_press(Message::OpenComic(comic.id))
                    .width(Length::Fixed(460.0)),
            );
        }
        list = list.push(text("Enter opens the highlighted result").size(12.0));
        container(list).padding(6).into()
    }

    fn library_view(&self) -> Element<'_, Message> {
        if self.library.loading && self.library.comics.is_empty() {
            return centered_note("Loading…");
        }
        if let Some(error) = &self.library.error {
            return centered_note(error);
        }
        if self.library.comics.is_empty() {
            return centered_note("Nothing here yet");
        }

        let mut grid: Column<'_, Message> = column![].spacing(14);
        for chunk in self.library.comics.chunks(CARDS_PER_ROW) {
            let mut cards: Row<'_, Message> = row![].spacing(14);
            for comic in chunk {
                cards = cards.push(self.comic_card(comic));
            }
            grid = grid.push(cards);
        }

        let prev = if self.library.page > 1 {
            button("Previous").on_press(Message::PreviousListingPage)
        } else {
            button("Previous")
        };
        let pager = row![
            prev,
            text(format!("Page {}", self.library.page)),
            button("Next").on_press(Message::NextListingPage),
        ]
        .spacing(10)
        .align_y(Vertical::Center);

        column![scrollable(grid).height(Length::Fill), pager]
            .spacing(10)
            .into()
    }

    fn comic_card(&self, comic: &ComicSummary) -> Element<'_, Message> {
        let cover: Element<'_, Message> = match self.library.covers.get(&comic.id) {
            Some(handle) => image(handle.clone())
                .width(Length::Fixed(COVER_WIDTH))
                .height(Length::Fixed(COVER_HEIGHT))
                .into(),
            None => container(text("…"))
                .width(Length::Fixed(COVER_WIDTH))
                .height(Length::Fixed(COVER_HEIGHT))
                .center_x(Length::Fixed(COVER_WIDTH))
                .center_y(Length::Fixed(COVER_HEIGHT))
                .into(),
        };
        let details = column![
            text(comic.title.clone()).size(15.0),
            text(format!(
                "{} · {}",
                comic.author.as_deref().unwrap_or("unknown"),
                comic.genre.as_deref().unwrap_or("unsorted"),
            ))
            .size(13.0),
            text(format!(
                "{} views · {} ch · ★ {:.1}",
                comic.views, comic.chapters_count, comic.rating
            ))
            .size(12.0),
        ]
        .spacing(2)
        .width(Length::Fixed(COVER_WIDTH));

        button(column![cover, details].spacing(6))
            .on_press(Message::OpenComic(comic.id))
            .into()
    }

    fn rankings_view(&self) -> Element<'_, Message> {
        let mut tabs: Row<'_, Message> = row![].spacing(8);
        for period in RankingPeriod::ALL {
            let label = period.to_string();
            tabs = tabs.push(if period == self.ranking.period {
                button(text(label))
            } else {
                button(text(label)).on_press(Message::RankingPeriodSelected(period))
            });
        }

        let body: Element<'_, Message> = if self.ranking.loading {
            centered_note("Loading…")
        } else if let Some(error) = &self.ranking.error {
            centered_note(error)
        } else if self.ranking.entries.is_empty() {
            centered_note("No activity in this window")
        } else {
            let mut list: Column<'_, Message> = column![].spacing(8);
            for entry in &self.ranking.entries {
                list = list.push(self.ranking_row(entry));
            }
            scrollable(list).height(Length::Fill).into()
        };

        column![tabs, body].spacing(12).into()
    }

    fn ranking_row(&self, entry: &RankingEntry) -> Element<'_, Message> {
        let cover: Element<'_, Message> = match self.library.covers.get(&entry.id) {
            Some(handle) => image(handle.clone())
                .width(Length::Fixed(48.0))
                .height(Length::Fixed(64.0))
                .into(),
            None => container(text(""))
                .width(Length::Fixed(48.0))
                .height(Length::Fixed(64.0))
                .into(),
        };
        button(
            row![
                text(format!("#{}", entry.rank)).size(18.0).width(Length::Fixed(44.0)),
                cover,
                column![
                    text(entry.title.clone()).size(15.0),
                    text(entry.author.as_deref().unwrap_or("unknown").to_string()).size(13.0),
                ]
                .spacing(2),
                horizontal_space(),
                column![
                    text(format!("{} views", entry.views)).size(13.0),
                    text(format!("{} chapters", entry.chapters_count)).size(13.0),
                ]
                .spacing(2),
            ]
            .spacing(12)
            .align_y(Vertical::Center)
            .width(Length::Fill),
        )
        .on_press(Message::OpenComic(entry.id))
        .into()
    }

    fn reader_view(&self) -> Element<'_, Message> {
        if self.reader.loading {
            return centered_note("Loading…");
        }
        if let Some(error) = &self.reader.error {
            return centered_note(error);
        }
        if let Some(chapter) = &self.reader.chapter {
            return self.chapter_view(chapter);
        }
        if self.reader.comic.is_some() {
            return self.comic_detail_view();
        }
        centered_note("Pick a comic from the library")
    }

    fn comic_detail_view(&self) -> Element<'_, Message> {
        let Some(comic) = &self.reader.comic else {
            return centered_note("Pick a comic from the library");
        };

        let cover: Element<'_, Message> = match self.library.covers.get(&comic.id) {
            Some(handle) => image(handle.clone())
                .width(Length::Fixed(COVER_WIDTH))
                .height(Length::Fixed(COVER_HEIGHT))
                .into(),
            None => container(text(""))
                .width(Length::Fixed(COVER_WIDTH))
                .height(Length::Fixed(COVER_HEIGHT))
                .into(),
        };

        let mut header_info = column![
            text(comic.title.clone()).size(22.0),
            text(format!(
                "{} · {}",
                comic.author.as_deref().unwrap_or("unknown"),
                comic.genre.as_deref().unwrap_or("unsorted"),
            ))
            .size(14.0),
            text(format!(
                "{} views · rating {:.1} · {}",
                comic.views,
                comic.rating,
                comic.status.as_deref().unwrap_or("ongoing"),
            ))
            .size(14.0),
        ]
        .spacing(4);
        if let Some(description) = &comic.description {
            header_info = header_info.push(text(description.clone()).size(14.0));
        }
        if let Some(bookmark) = self.reader.bookmark {
            header_info = header_info.push(
                button(text(format!(
                    "Resume chapter {}",
                    bookmark.chapter_number
                )))
                .on_press(Message::OpenChapter(bookmark.chapter_number)),
            );
        }

        let mut chapters: Column<'_, Message> = column![].spacing(4);
        for chapter in &comic.chapters {
            chapters = chapters.push(
                button(
                    text(format!(
                        "Chapter {} — {}",
                        chapter.chapter_number, chapter.title
                    ))
                    .size(14.0),
                )
                .on_press(Message::OpenChapter(chapter.chapter_number))
                .width(Length::Fill),
            );
        }

        column![
            row![cover, header_info].spacing(16),
            text(format!("{} chapters", comic.chapters.len())).size(16.0),
            scrollable(chapters).height(Length::Fill),
        ]
        .spacing(12)
        .into()
    }

    fn chapter_view(&self, chapter: &super::state::LoadedChapter) -> Element<'_, Message> {
        let header = row![
            button("← Chapters").on_press(Message::BackToComic),
            text(format!("Chapter {} — {}", chapter.number, chapter.title)).size(18.0),
        ]
        .spacing(12)
        .align_y(Vertical::Center);

        let highlight_idx = self
            .speech
            .as_ref()
            .and_then(SpeechController::highlighted_paragraph)
            .filter(|idx| *idx < chapter.paragraphs.len());
        let highlight = self.highlight_color();

        let mut spans: Vec<iced::widget::text::Span<'_, Message>> = Vec::new();
        for paragraph in &chapter.paragraphs {
            let mut span: iced::widget::text::Span<'_, Message> =
                iced::widget::text::Span::new(paragraph.text.clone())
                    .size(self.config.font_size as f32)
                    .line_height(LineHeight::Relative(self.config.line_spacing))
                    .link(Message::ParagraphClicked(paragraph.index));
            if Some(paragraph.index) == highlight_idx {
                span = span
                    .background(iced::Background::Color(highlight))
                    .padding(iced::Padding::from(2u16));
            }
            spans.push(span);
            spans.push(
                iced::widget::text::Span::new("\n\n")
                    .size(self.config.font_size as f32)
                    .line_height(LineHeight::Relative(self.config.line_spacing)),
            );
        }

        let rich: iced::widget::text::Rich<'_, Message> =
            iced::widget::text::Rich::with_spans(spans);

        let body = scrollable(
            container(
                rich.width(Length::Fill)
                    .wrapping(Wrapping::WordOrGlyph),
            )
            .width(Length::Fill)
            .padding([
                self.config.margin_vertical,
                self.config.margin_horizontal,
            ]),
        )
        .id(READER_SCROLL_ID.clone())
        .height(Length::Fill);

        column![header, body].spacing(10).into()
    }

    fn tts_controls(&self) -> Element<'_, Message> {
        let Some(controller) = &self.speech else {
            return text("Speech engine unavailable").size(14.0).into();
        };
        let phase = controller.phase();
        let total = controller.paragraph_count();

        let status = match phase {
            PlaybackPhase::Playing => format!(
                "Reading paragraph {} of {}",
                controller.current_index() + 1,
                total
            ),
            PlaybackPhase::Paused => "Paused".to_string(),
            PlaybackPhase::Idle => "Stopped".to_string(),
        };

        let play_pause = match phase {
            PlaybackPhase::Playing => button("Pause").on_press(Message::Pause),
            PlaybackPhase::Paused => button("Resume").on_press(Message::Play),
            PlaybackPhase::Idle => button("Play").on_press(Message::Play),
        };
        let stop = if phase == PlaybackPhase::Idle {
            button("Stop")
        } else {
            button("Stop").on_press(Message::StopSpeech)
        };

        let transport = row![
            button("⏮").on_press(Message::SkipBackward),
            play_pause,
            stop,
            button("⏭").on_press(Message::SkipForward),
            text(status),
        ]
        .spacing(8)
        .align_y(Vertical::Center);

        let sliders = row![
            column![
                text(format!("Speed {:.2}x", controller.speed())).size(13.0),
                slider(MIN_SPEED..=MAX_SPEED, controller.speed(), Message::SpeedChanged)
                    .step(0.05)
            ]
            .spacing(2)
            .width(Length::FillPortion(1)),
            column![
                text(format!("Pitch {:.2}", controller.pitch())).size(13.0),
                slider(MIN_PITCH..=MAX_PITCH, controller.pitch(), Message::PitchChanged)
                    .step(0.05)
            ]
            .spacing(2)
            .width(Length::FillPortion(1)),
            column![
                text(format!("Volume {:.0}%", controller.volume() * 100.0)).size(13.0),
                slider(
                    MIN_VOLUME..=MAX_VOLUME,
                    controller.volume(),
                    Message::VolumeChanged
                )
                .step(0.01)
            ]
            .spacing(2)
            .width(Length::FillPortion(1)),
        ]
        .spacing(12);

        let voice_row = row![
            self.voice_picker(controller),
            checkbox("Follow reading", controller.auto_scroll())
                .on_toggle(Message::AutoScrollChanged),
        ]
        .spacing(12)
        .align_y(Vertical::Center);

        column![transport, sliders, voice_row].spacing(8).into()
    }

    fn voice_picker(&self, controller: &SpeechController) -> Element<'_, Message> {
        let mut options: Vec<VoiceChoice> = Vec::new();
        for (family, voices) in controller.voices_grouped() {
            for voice in voices {
                options.push(VoiceChoice {
                    label: format!("{family} · {}", voice.display_label()),
                    name: voice.name,
                });
            }
        }
        if options.is_empty() {
            return text("No voices found").size(14.0).into();
        }
        let selected = controller
            .selected_voice()
            .and_then(|voice| options.iter().find(|option| option.name == voice.name))
            .cloned();
        pick_list(options, selected, |choice: VoiceChoice| {
            Message::VoicePicked(choice.name)
        })
        .placeholder("Voice")
        .into()
    }

    fn settings_panel(&self) -> Element<'_, Message> {
        let theme_label = if matches!(self.config.theme, crate::config::ThemeMode::Night) {
            "Day Mode"
        } else {
            "Night Mode"
        };

        column![
            text("Settings").size(18.0),
            button(theme_label).on_press(Message::ToggleTheme),
            column![
                text(format!("Font: {}", self.config.font_size)).size(13.0),
                slider(
                    MIN_FONT_SIZE as f32..=MAX_FONT_SIZE as f32,
                    self.config.font_size as f32,
                    |value| Message::FontSizeChanged(value.round() as u32),
                )
            ]
            .spacing(2),
            column![
                text(format!("Line spacing: {:.2}", self.config.line_spacing)).size(13.0),
                slider(
                    MIN_LINE_SPACING..=MAX_LINE_SPACING,
                    self.config.line_spacing,
                    Message::LineSpacingChanged
                )
                .step(0.05)
            ]
            .spacing(2),
            checkbox(
                "Reopen last chapter",
                self.config.auto_open_last_chapter
            )
            .on_toggle(Message::AutoOpenLastChapterChanged),
            button("Hide TTS bar").on_press(Message::ToggleTtsControls),
        ]
        .spacing(12)
        .padding(16)
        .width(Length::Fixed(260.0))
        .into()
    }

    fn highlight_color(&self) -> iced::Color {
        let highlight = match self.config.theme {
            crate::config::ThemeMode::Day => self.config.day_highlight,
            crate::config::ThemeMode::Night => self.config.night_highlight,
        };
        iced::Color {
            r: highlight.r,
            g: highlight.g,
            b: highlight.b,
            a: highlight.a,
        }
    }
}

fn centered_note(note: &str) -> Element<'_, Message> {
    container(text(note.to_string()))
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
