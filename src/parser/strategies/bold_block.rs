use std::sync::LazyLock;

use regex::Regex;

use super::{forward, Strategy, LIBRARY_URL_RE};
use crate::config::Windows;
use crate::parser::candidate::RawCandidate;
use crate::parser::code::{fenced_blocks, in_any};

// ### Title
// **Type**: t | **Level**: l | **Duration**: d
static BOLD_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?m)^[ \t]{0,3}#{1,6}[ \t]*([^\n]+)\n",
        r"[ \t]*\*\*Type(?:\*\*:|:\*\*)[ \t]*([^|\n]+?)[ \t]*\|",
        r"[ \t]*\*\*Level(?:\*\*:|:\*\*)[ \t]*([^|\n]+?)[ \t]*\|",
        r"[ \t]*\*\*Duration(?:\*\*:|:\*\*)[ \t]*([^\n]*)",
    ))
    .unwrap()
});
static BOLD_AUTHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*Author(?:\(s\)|s)?(?:\*\*:|:\*\*)[ \t]*(.*)$").unwrap());
static BOLD_DESCRIPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*Description(?:\*\*:|:\*\*)[ \t]*(.*)$").unwrap());

/// Heading followed by a `**Type** | **Level** | **Duration**` line.
pub struct BoldBlock;

impl Strategy for BoldBlock {
    fn name(&self) -> &'static str {
        "bold_block"
    }

    fn rank(&self) -> u8 {
        2
    }

    fn scan(&self, text: &str, windows: &Windows) -> Vec<RawCandidate> {
        let fences = fenced_blocks(text);
        BOLD_BLOCK_RE
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                if in_any(&fences, whole.start()) {
                    return None;
                }
                let (author, description) = trailing_fields(&text[whole.end()..]);

                let mut c = RawCandidate::new(&caps[1], self.rank(), whole.start());
                c.resource_type = Some(caps[2].to_string());
                c.level = Some(caps[3].to_string());
                c.duration = Some(caps[4].trim_end_matches("**").to_string());
                c.author = author;
                c.description = description;
                // cover comes from the detail URL, not from a Cover: line
                c.detail_url = LIBRARY_URL_RE
                    .find(forward(text, whole.start(), windows.bold_lookahead))
                    .map(|m| m.as_str().to_string());
                Some(c)
            })
            .collect()
    }
}

#[derive(Clone, Copy)]
enum Field {
    Author,
    Description,
}

/// Bold Author/Description lines right after the Type line. Each may wrap onto
/// one extra line that is not another label.
fn trailing_fields(rest: &str) -> (Option<String>, Option<String>) {
    let mut author: Option<String> = None;
    let mut description: Option<String> = None;
    let mut last: Option<(Field, bool)> = None;

    // first item is the remainder of the Type line
    for line in rest.lines().skip(1) {
        let line = line.trim();
        if let Some(caps) = BOLD_AUTHOR_RE.captures(line) {
            if author.is_some() {
                break;
            }
            author = Some(caps[1].to_string());
            last = Some((Field::Author, false));
            continue;
        }
        if let Some(caps) = BOLD_DESCRIPTION_RE.captures(line) {
            if description.is_some() {
                break;
            }
            description = Some(caps[1].to_string());
            last = Some((Field::Description, false));
            continue;
        }
        let continues = !line.is_empty()
            && !line.starts_with("**")
            && !line.starts_with('#')
            && !line.starts_with('[')
            && !line.to_ascii_lowercase().starts_with("cover:");
        match last {
            Some((field, false)) if continues => {
                let slot = match field {
                    Field::Author => &mut author,
                    Field::Description => &mut description,
                };
                if let Some(value) = slot.as_mut() {
                    value.push(' ');
                    value.push_str(line);
                }
                last = Some((field, true));
            }
            _ => break,
        }
    }

    (author, description)
}
