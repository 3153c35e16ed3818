use crate::api::ComicDetail;
use crate::cache::Bookmark;
use crate::paragraphs::Paragraph;

/// A chapter ready for display and speech.
pub struct LoadedChapter {
    pub(in crate::app) number: u32,
    pub(in crate::app) title: String,
    pub(in crate::app) paragraphs: Vec<Paragraph>,
}

/// Reader screen state: the open comic and, once picked, the open chapter.
pub struct ReaderState {
    pub(in crate::app) comic: Option<ComicDetail>,
    pub(in crate::app) bookmark: Option<Bookmark>,
    pub(in crate::app) chapter: Option<LoadedChapter>,
    pub(in crate::app) loading: bool,
    pub(in crate::app) error: Option<String>,
}

impl ReaderState {
    pub(in crate::app) fn new() -> Self {
        Self {
            comic: None,
            bookmark: None,
            chapter: None,
            loading: false,
            error: None,
        }
    }

    pub(in crate::app) fn close(&mut self) {
        self.comic = None;
        self.bookmark = None;
        self.chapter = None;
        self.loading = false;
        self.error = None;
    }
}
