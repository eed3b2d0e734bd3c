use std::sync::LazyLock;

use regex::Regex;

use super::{cover_url_in, forward, Strategy, VIEW_LINK_RE};
use crate::config::Windows;
use crate::parser::candidate::RawCandidate;
use crate::parser::code::{fenced_blocks, in_any};

// ### Title
// Type: t | Level: l | Duration: d Author: a Description: desc
static PLAIN_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?m)^[ \t]{0,3}#{1,6}[ \t]*([^\n]+)\n",
        r"[ \t]*Type:[ \t]*([^|\n]+?)[ \t]*\|[ \t]*Level:[ \t]*([^|\n]+?)[ \t]*\|",
        r"[ \t]*Duration:[ \t]*([^\n]*?)\s+Author(?:\(s\)|s)?:[ \t]*([^\n]+?)",
        r"\s+Description:[ \t]*([^\n]+)",
    ))
    .unwrap()
});

/// Heading followed by a plain `Type: | Level: | Duration:` line.
pub struct PlainBlock;

impl Strategy for PlainBlock {
    fn name(&self) -> &'static str {
        "plain_block"
    }

    fn rank(&self) -> u8 {
        1
    }

    fn scan(&self, text: &str, windows: &Windows) -> Vec<RawCandidate> {
        let fences = fenced_blocks(text);
        PLAIN_BLOCK_RE
            .captures_iter(text)
            .filter_map(|caps| {
                let at = caps.get(0)?.start();
                if in_any(&fences, at) {
                    return None;
                }
                let after = forward(text, at, windows.plain_lookahead);

                let mut c = RawCandidate::new(&caps[1], self.rank(), at);
                c.resource_type = Some(caps[2].to_string());
                c.level = Some(caps[3].to_string());
                c.duration = Some(caps[4].to_string());
                c.author = Some(caps[5].to_string());
                c.description = Some(caps[6].to_string());
                c.cover_url = cover_url_in(after);
                c.detail_url = VIEW_LINK_RE.captures(after).map(|l| l[1].to_string());
                Some(c)
            })
            .collect()
    }
}
