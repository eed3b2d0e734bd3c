use std::sync::LazyLock;

use regex::Regex;

use super::{
    backward, cover_url_in, cut_at_next_label, detail_url_in, forward, headings, labeled, Label,
    Strategy,
};
use crate::config::Windows;
use crate::parser::candidate::RawCandidate;

/// `Type: t | Level: l | Duration: d`, with or without bold labels.
static TRIPLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?:\*\*)?\bType\b(?:\*\*)?[ \t]*:(?:\*\*)?[ \t]*([^|\n]+?)[ \t]*\|",
        r"[ \t]*(?:\*\*)?Level(?:\*\*)?[ \t]*:(?:\*\*)?[ \t]*([^|\n]+?)[ \t]*\|",
        r"[ \t]*(?:\*\*)?Duration(?:\*\*)?[ \t]*:(?:\*\*)?[ \t]*([^\n]*)",
    ))
    .unwrap()
});
static TITLE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*(?:\*\*)?Title(?:\*\*)?[ \t]*:(?:\*\*)?[ \t]*(.+)$").unwrap()
});

/// Finds the Type/Level/Duration line first, then names it from a `Title:`
/// line right below or the nearest heading above.
pub struct TripleAnchor;

impl Strategy for TripleAnchor {
    fn name(&self) -> &'static str {
        "triple_anchor"
    }

    fn rank(&self) -> u8 {
        4
    }

    fn scan(&self, text: &str, windows: &Windows) -> Vec<RawCandidate> {
        TRIPLE_RE
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let at = whole.start();
                let title = title_line_after(&text[whole.end()..])
                    .or_else(|| heading_before(text, at, windows.triple_lookbehind))?;

                // stop before the next triple so its fields stay with it
                let mut after = forward(text, at, windows.triple_lookahead);
                if let Some(next) = TRIPLE_RE.find(&after[whole.len().min(after.len())..]) {
                    after = &after[..whole.len() + next.start()];
                }

                let mut c = RawCandidate::new(&title, self.rank(), at);
                c.resource_type = Some(caps[1].to_string());
                c.level = Some(caps[2].to_string());
                c.duration = Some(cut_at_next_label(&caps[3]).trim_end_matches("**").to_string());
                c.author = labeled(after, Label::Author);
                c.description = labeled(after, Label::Description);
                c.cover_url = cover_url_in(after);
                c.detail_url = detail_url_in(after);
                Some(c)
            })
            .collect()
    }
}

fn title_line_after(rest: &str) -> Option<String> {
    let line = rest.lines().skip(1).find(|l| !l.trim().is_empty())?;
    let caps = TITLE_LINE_RE.captures(line)?;
    let title = cut_at_next_label(&caps[1]);
    (!title.is_empty()).then(|| title.to_string())
}

/// Nearest heading above `at`, unless another Type line sits between them.
fn heading_before(text: &str, at: usize, len: usize) -> Option<String> {
    let (start, window) = backward(text, at, len);
    let end = start + window.len();
    let heading = headings(text, start, end).pop()?;
    if TRIPLE_RE.is_match(&text[heading.end..end]) {
        return None;
    }
    Some(heading.title)
}
