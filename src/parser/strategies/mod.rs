//! Layout recognizers. Each strategy scans the whole message on its own and
//! reports every resource it recognizes; ranking and conflicts are settled
//! later by the deduplicator.

pub mod bold_block;
pub mod heading_section;
pub mod plain_block;
pub mod raw_url;
pub mod triple_anchor;
pub mod view_link;

use std::sync::LazyLock;

use regex::Regex;

use super::candidate::RawCandidate;
use super::code::{fenced_blocks, in_any};
use super::normalize::clean_title;
use crate::config::Windows;

pub use bold_block::BoldBlock;
pub use heading_section::HeadingSection;
pub use plain_block::PlainBlock;
pub use raw_url::RawUrl;
pub use triple_anchor::TripleAnchor;
pub use view_link::ViewLink;

/// A markdown heading line; group 1 is the heading text. Closing hashes are
/// only stripped when whitespace separates them from the text.
static HEADING_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]{0,3}#{1,6}[ \t]*([^#\s][^\n]*?)(?:[ \t]+#+)?[ \t]*$").unwrap()
});
/// `[View on <Platform> →](url)`; group 1 is the URL.
pub(crate) static VIEW_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[[ \t]*View\b[^\]\n]*\]\([ \t]*<?(https?://[^)\s>]+)>?[ \t]*\)").unwrap()
});
/// Any URL following the library detail-page convention.
pub(crate) static LIBRARY_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[^\s/()\[\]<>]+/library/view/[^\s()\[\]<>*`]+").unwrap()
});
/// `Cover: <url>`; group 1 is the URL.
pub(crate) static COVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Cover(?:\*\*)?[ \t]*:(?:\*\*)?[ \t]*<?(https?://[^\s)>]+)").unwrap()
});
static BOLD_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*\n]+?)\*\*").unwrap());
static NEXT_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\*\*)?\b(?:Author\(s\)|Authors?|Type|Level|Duration|Description|Cover|Title)(?:\*\*)?[ \t]*:",
    )
    .unwrap()
});

static AUTHOR_RE: LazyLock<Regex> = LazyLock::new(|| label_re(r"Author(?:\(s\)|s)?"));
static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| label_re("Type"));
static LEVEL_RE: LazyLock<Regex> = LazyLock::new(|| label_re("Level"));
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| label_re("Duration"));
static DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| label_re("Description"));
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| label_re("Title"));

/// Titles too vague to stand for a resource on their own.
const GENERIC_TITLES: &[&str] = &[
    "book", "books", "course", "courses", "video", "videos", "tutorial", "resource", "resources",
    "learning path", "link", "here",
];

fn label_re(name: &str) -> Regex {
    Regex::new(&format!(
        r"(?m)(?:^|[^\w*])(?:\*\*)?{}(?:\*\*)?[ \t]*:(?:\*\*)?[ \t]*([^\n]*)",
        name
    ))
    .unwrap()
}

/// One known layout of resource descriptions.
pub trait Strategy: Sync {
    fn name(&self) -> &'static str;

    /// Priority; lower ranks win deduplication.
    fn rank(&self) -> u8;

    fn scan(&self, text: &str, windows: &Windows) -> Vec<RawCandidate>;

    /// Drop candidates whose detail URL a higher-ranked strategy already reported.
    fn skips_claimed(&self) -> bool {
        false
    }
}

/// Every strategy, highest priority first.
pub fn all() -> [&'static dyn Strategy; 6] {
    [
        &PlainBlock,
        &BoldBlock,
        &HeadingSection,
        &TripleAnchor,
        &ViewLink,
        &RawUrl,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Author,
    Type,
    Level,
    Duration,
    Description,
    Title,
}

impl Label {
    fn regex(self) -> &'static Regex {
        match self {
            Label::Author => &AUTHOR_RE,
            Label::Type => &TYPE_RE,
            Label::Level => &LEVEL_RE,
            Label::Duration => &DURATION_RE,
            Label::Description => &DESCRIPTION_RE,
            Label::Title => &TITLE_RE,
        }
    }
}

/// First value for `label` in `window`, cut at the next label on the same line.
pub fn labeled(window: &str, label: Label) -> Option<String> {
    label.regex().captures_iter(window).find_map(|caps| {
        let value = cut_at_next_label(caps.get(1)?.as_str());
        let value = match label {
            Label::Type | Label::Level => value.split('|').next().unwrap_or(""),
            _ => value,
        };
        let value = value.trim().trim_end_matches("**").trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    })
}

/// Truncate a field value where the next `Label:` or view link begins.
pub fn cut_at_next_label(value: &str) -> &str {
    let mut end = value.len();
    if let Some(m) = NEXT_LABEL_RE.find_iter(value).find(|m| m.start() > 0) {
        end = end.min(m.start());
    }
    if let Some(m) = VIEW_LINK_RE.find(value) {
        end = end.min(m.start());
    }
    value[..end].trim()
}

pub fn is_generic_title(title: &str) -> bool {
    let t = clean_title(title).to_lowercase();
    GENERIC_TITLES.contains(&t.as_str())
}

/// A heading line outside fenced code; offsets index the full text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub start: usize,
    pub end: usize,
    pub title: String,
}

/// Headings found in `text[from..to]`, skipping `#` lines inside code fences.
pub fn headings(text: &str, from: usize, to: usize) -> Vec<Heading> {
    let fences = fenced_blocks(text);
    HEADING_LINE_RE
        .captures_iter(&text[from..to])
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let start = from + whole.start();
            if in_any(&fences, start) {
                return None;
            }
            Some(Heading {
                start,
                end: from + whole.end(),
                title: caps[1].to_string(),
            })
        })
        .collect()
}

/// Text from `start` for at most `len` bytes, stopping before the next heading
/// that starts after the window's first line.
pub fn forward(text: &str, start: usize, len: usize) -> &str {
    let start = floor_boundary(text, start);
    let end = floor_boundary(text, start.saturating_add(len));
    let window = &text[start..end];
    let first_line_end = start + window.find('\n').map_or(window.len(), |i| i + 1);
    match headings(text, first_line_end, end).first() {
        Some(next) => &text[start..next.start],
        None => window,
    }
}

/// Start offset and text of the `len` bytes before `end`.
pub fn backward(text: &str, end: usize, len: usize) -> (usize, &str) {
    let end = floor_boundary(text, end);
    let start = ceil_boundary(text, end.saturating_sub(len));
    (start, &text[start..end])
}

pub struct TitleHit<'a> {
    pub title: String,
    /// Text from the title up to the anchor, for locating other fields.
    pub block: &'a str,
}

/// Nearest heading before `end`, else nearest non-label bold span.
/// `None` when nothing is found or the title is a generic placeholder.
pub fn title_before(text: &str, end: usize, len: usize) -> Option<TitleHit<'_>> {
    let (window_start, window) = backward(text, end, len);
    let window_end = window_start + window.len();

    let (title, from) = match headings(text, window_start, window_end).pop() {
        Some(h) => (h.title, h.start - window_start),
        None => {
            let span = BOLD_SPAN_RE
                .captures_iter(window)
                .filter(|caps| {
                    let whole = caps.get(0).map_or(0, |m| m.end());
                    let inner = caps[1].trim_end();
                    !inner.ends_with(':') && !window[whole..].trim_start_matches([' ', '\t']).starts_with(':')
                })
                .last()?;
            (span[1].to_string(), span.get(0)?.start())
        }
    };

    if clean_title(&title).is_empty() || is_generic_title(&title) {
        return None;
    }
    Some(TitleHit {
        title,
        block: &window[from..],
    })
}

/// Detail URL in `window`: a view link first, then any library URL.
pub fn detail_url_in(window: &str) -> Option<String> {
    VIEW_LINK_RE
        .captures(window)
        .map(|c| c[1].to_string())
        .or_else(|| LIBRARY_URL_RE.find(window).map(|m| m.as_str().to_string()))
}

pub fn cover_url_in(window: &str) -> Option<String> {
    COVER_RE.captures(window).map(|c| c[1].to_string())
}

pub(crate) fn floor_boundary(text: &str, idx: usize) -> usize {
    let mut i = idx.min(text.len());
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

pub(crate) fn ceil_boundary(text: &str, idx: usize) -> usize {
    let mut i = idx.min(text.len());
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_ordered_and_unique() {
        let ranks: Vec<u8> = all().iter().map(|s| s.rank()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn heading_line() {
        let text = "intro\n### Learning Python ###\nbody";
        let found = headings(text, 0, text.len());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Learning Python");
        assert_eq!((found[0].start, found[0].end), (6, 29));
        assert!(headings("no heading here", 0, 15).is_empty());
        assert!(headings("####", 0, 4).is_empty());
    }

    #[test]
    fn heading_keeps_hash_in_title() {
        let text = "### C#\n## F# ##\n# Learning C# #";
        let titles: Vec<String> = headings(text, 0, text.len()).into_iter().map(|h| h.title).collect();
        assert_eq!(titles, vec!["C#", "F#", "Learning C#"]);
    }

    #[test]
    fn comment_lines_in_code_are_not_headings() {
        let text = "### Fluent Python\n```python\n# Example usage\nprint(1)\n```\nAfter.";
        let titles: Vec<String> = headings(text, 0, text.len()).into_iter().map(|h| h.title).collect();
        assert_eq!(titles, vec!["Fluent Python"]);

        // a window starting inside the fence still knows it is code
        let inner = text.find("# Example").unwrap();
        assert!(headings(text, inner, text.len()).is_empty());
        assert_eq!(forward(text, 0, 800), text);

        let hit = title_before(text, text.len(), 1000).unwrap();
        assert_eq!(hit.title, "Fluent Python");
    }

    #[test]
    fn labeled_plain_and_bold() {
        let line = "Type: Book | Level: Beginner | Duration: 500 pages Author: Mark Lutz Description: Great intro.";
        assert_eq!(labeled(line, Label::Type).as_deref(), Some("Book"));
        assert_eq!(labeled(line, Label::Level).as_deref(), Some("Beginner"));
        assert_eq!(labeled(line, Label::Duration).as_deref(), Some("500 pages"));
        assert_eq!(labeled(line, Label::Author).as_deref(), Some("Mark Lutz"));
        assert_eq!(labeled(line, Label::Description).as_deref(), Some("Great intro."));

        let bold = "**Authors**: Jane Doe, John Roe\n**Description:** Deep dive.";
        assert_eq!(labeled(bold, Label::Author).as_deref(), Some("Jane Doe, John Roe"));
        assert_eq!(labeled(bold, Label::Description).as_deref(), Some("Deep dive."));
    }

    #[test]
    fn labeled_ignores_embedded_words() {
        assert_eq!(labeled("Subtype: nope", Label::Type), None);
        assert_eq!(labeled("Author(s): A. Person", Label::Author).as_deref(), Some("A. Person"));
    }

    #[test]
    fn forward_stops_at_next_heading() {
        let text = "### One\nCover: https://a.example/1.jpg\n### Two\nCover: https://a.example/2.jpg";
        let w = forward(text, 0, 800);
        assert!(w.contains("1.jpg"));
        assert!(!w.contains("2.jpg"));
    }

    #[test]
    fn windows_respect_char_boundaries() {
        let text = "### Café → ünïcödé\n📚📚📚 [View on X →](https://h.example/library/view/a/1/)";
        for i in 0..text.len() {
            let _ = forward(text, i, 7);
            let _ = backward(text, i, 5);
            let _ = title_before(text, i, 3);
        }
    }

    #[test]
    fn title_before_prefers_heading() {
        let text = "### Designing Data-Intensive Applications\nSome **emphasis** here\n";
        let hit = title_before(text, text.len(), 1000).unwrap();
        assert_eq!(hit.title, "Designing Data-Intensive Applications");
        assert!(hit.block.starts_with("### Designing"));
    }

    #[test]
    fn title_before_falls_back_to_bold_skipping_labels() {
        let text = "Try **Refactoring** next. **Type**: Book\n";
        let hit = title_before(text, text.len(), 1000).unwrap();
        assert_eq!(hit.title, "Refactoring");
    }

    #[test]
    fn title_before_rejects_generic() {
        assert!(title_before("### Resource\n", 13, 1000).is_none());
        assert!(title_before("Check this **Course**", 21, 1000).is_none());
        assert!(title_before("nothing bold", 12, 1000).is_none());
    }

    #[test]
    fn detail_url_prefers_view_link() {
        let w = "see https://h.example/library/view/raw/1/ and [View on H →](https://h.example/library/view/linked/2/)";
        assert_eq!(
            detail_url_in(w).as_deref(),
            Some("https://h.example/library/view/linked/2/")
        );
    }
}
