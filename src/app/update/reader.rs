use super::Effect;
use super::super::state::{App, LoadedChapter, Screen};
use crate::api::{Chapter, ComicDetail};
use crate::cache;
use crate::paragraphs;
use tracing::{info, warn};

impl App {
    pub(super) fn handle_open_comic(&mut self, comic_id: u64, effects: &mut Vec<Effect>) {
        if let Some(controller) = &self.speech {
            controller.stop();
        }
        self.reader.close();
        self.reader.loading = true;
        self.reader.bookmark = cache::load_bookmark(self.api.base_url(), comic_id);
        self.screen = Screen::Reader;
        info!(comic_id, "Opening comic");
        effects.push(Effect::LoadComic { comic_id });
    }

    pub(super) fn handle_comic_loaded(
        &mut self,
        detail: Option<Box<ComicDetail>>,
        error: Option<String>,
        effects: &mut Vec<Effect>,
    ) {
        self.reader.loading = false;
        match detail {
            Some(detail) => {
                self.queue_cover_fetches(
                    std::iter::once((detail.id, detail.cover_image.clone())),
                    effects,
                );
                let resume = self
                    .reader
                    .bookmark
                    .filter(|_| self.config.auto_open_last_chapter)
                    .map(|bookmark| bookmark.chapter_number)
                    .filter(|number| {
                        detail
                            .chapters
                            .iter()
                            .any(|chapter| chapter.chapter_number == *number)
                    });
                let comic_id = detail.id;
                self.reader.comic = Some(*detail);
                if let Some(chapter_number) = resume {
                    info!(comic_id, chapter_number, "Resuming bookmarked chapter");
                    self.handle_open_chapter(chapter_number, effects);
                }
            }
            None => {
                warn!("Comic failed to load: {:?}", error);
                self.reader.error = error.or_else(|| Some("Comic failed to load".to_string()));
            }
        }
    }

    pub(super) fn handle_open_chapter(&mut self, chapter_number: u32, effects: &mut Vec<Effect>) {
        let Some(comic_id) = self.open_comic_id() else {
            return;
        };
        if let Some(controller) = &self.speech {
            controller.stop();
        }
        self.reader.chapter = None;
        self.reader.loading = true;
        self.reader.error = None;
        effects.push(Effect::LoadChapter {
            comic_id,
            chapter_number,
        });
    }

    pub(super) fn handle_chapter_loaded(
        &mut self,
        comic_id: u64,
        chapter: Option<Box<Chapter>>,
        error: Option<String>,
        effects: &mut Vec<Effect>,
    ) {
        if self.open_comic_id() != Some(comic_id) {
            info!(comic_id, "Ignoring chapter for a comic no longer open");
            return;
        }
        self.reader.loading = false;
        let Some(chapter) = chapter else {
            warn!(comic_id, "Chapter failed to load: {:?}", error);
            self.reader.error = error.or_else(|| Some("Chapter failed to load".to_string()));
            return;
        };

        let extracted = paragraphs::extract_paragraphs(&chapter.content);
        info!(
            comic_id,
            chapter = chapter.chapter_number,
            paragraphs = extracted.len(),
            "Chapter ready"
        );

        if let Some(controller) = &self.speech {
            controller.set_source(chapter.content.clone());
            let resume_paragraph = self
                .reader
                .bookmark
                .filter(|bookmark| bookmark.chapter_number == chapter.chapter_number)
                .map(|bookmark| bookmark.paragraph)
                .filter(|paragraph| *paragraph > 0 && *paragraph < extracted.len());
            if let Some(paragraph) = resume_paragraph {
                controller.seek(paragraph);
            }
        }

        self.reader.chapter = Some(LoadedChapter {
            number: chapter.chapter_number,
            title: chapter.title,
            paragraphs: extracted,
        });
        effects.push(Effect::SaveBookmark);
    }

    pub(super) fn handle_paragraph_clicked(&mut self, paragraph: usize, effects: &mut Vec<Effect>) {
        let Some(controller) = &self.speech else {
            return;
        };
        if !self.chapter_open() {
            return;
        }
        info!(paragraph, "Paragraph clicked; reading from there");
        controller.play_from(paragraph);
        effects.push(Effect::SaveBookmark);
    }
}
