//! Paragraph extraction for the reader and the speech loop.
//!
//! Chapter bodies arrive from the API as HTML. We render them to plain text,
//! split on blank lines, and normalize each paragraph so the synthesizer and
//! the view agree on one ordered, immutable paragraph list per session.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;
use unicode_normalization::UnicodeNormalization;

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// One readable unit of a chapter, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub index: usize,
    pub text: String,
}

/// Render chapter HTML and split it into ordered, non-empty paragraphs.
///
/// Indices are assigned after empty paragraphs are dropped, so they are
/// always contiguous from zero.
pub fn extract_paragraphs(html: &str) -> Vec<Paragraph> {
    let plain = match html2text::from_read(html.as_bytes(), 10_000) {
        Ok(text) => text,
        Err(err) => {
            warn!("html2text failed, treating chapter as plain text: {err}");
            html.to_string()
        }
    };

    split_blocks(&plain)
        .into_iter()
        .filter_map(|block| {
            let text = normalize(&block);
            (!text.is_empty()).then_some(text)
        })
        .enumerate()
        .map(|(index, text)| Paragraph { index, text })
        .collect()
}

/// Split text into blocks separated by blank lines, preserving order.
fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !buffer.is_empty() {
                blocks.push(buffer.join(" "));
                buffer.clear();
            }
        } else {
            buffer.push(line);
        }
    }

    if !buffer.is_empty() {
        blocks.push(buffer.join(" "));
    }

    blocks
}

/// Collapse runs of whitespace and apply NFC so Vietnamese diacritics read
/// identically regardless of how the server composed them.
fn normalize(block: &str) -> String {
    let collapsed = RE_WHITESPACE.replace_all(block, " ");
    collapsed.trim().nfc().collect()
}

#[cfg(test)]
mod tests {
    use super::extract_paragraphs;

    #[test]
    fn splits_on_blank_lines_in_document_order() {
        let html = "<p>Chương một mở đầu.</p><p>Đoạn thứ hai.</p><p>Kết thúc.</p>";
        let paragraphs = extract_paragraphs(html);
        assert_eq!(paragraphs.len(), 3);
        assert_eq!(paragraphs[0].text, "Chương một mở đầu.");
        assert_eq!(paragraphs[2].index, 2);
    }

    #[test]
    fn drops_empty_paragraphs_and_keeps_indices_contiguous() {
        let html = "<p>First.</p><p>   </p><p>Second.</p>";
        let paragraphs = extract_paragraphs(html);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[1].index, 1);
        assert_eq!(paragraphs[1].text, "Second.");
    }

    #[test]
    fn collapses_internal_whitespace() {
        let paragraphs = extract_paragraphs("<p>spaced   out\n text</p>");
        assert_eq!(paragraphs[0].text, "spaced out text");
    }

    #[test]
    fn normalizes_composed_form() {
        // Decomposed "ế" (e + circumflex + acute) must match the composed char.
        let paragraphs = extract_paragraphs("<p>tie\u{0302}\u{0301}p</p>");
        assert_eq!(paragraphs[0].text, "tiếp");
    }

    #[test]
    fn empty_input_yields_no_paragraphs() {
        assert!(extract_paragraphs("").is_empty());
        assert!(extract_paragraphs("<div>   </div>").is_empty());
    }
}
