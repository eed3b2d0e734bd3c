use super::{cover_url_in, labeled, title_before, Label, Strategy, VIEW_LINK_RE};
use crate::config::Windows;
use crate::parser::candidate::RawCandidate;

/// Every `[View on … →](url)` link, titled from what precedes it.
pub struct ViewLink;

impl Strategy for ViewLink {
    fn name(&self) -> &'static str {
        "view_link"
    }

    fn rank(&self) -> u8 {
        5
    }

    fn scan(&self, text: &str, windows: &Windows) -> Vec<RawCandidate> {
        VIEW_LINK_RE
            .captures_iter(text)
            .filter_map(|caps| {
                let at = caps.get(0)?.start();
                let hit = title_before(text, at, windows.view_link_lookbehind)?;

                let mut c = RawCandidate::new(&hit.title, self.rank(), at);
                c.resource_type = labeled(hit.block, Label::Type);
                c.level = labeled(hit.block, Label::Level);
                c.author = labeled(hit.block, Label::Author);
                c.description = labeled(hit.block, Label::Description);
                c.cover_url = cover_url_in(hit.block);
                c.detail_url = Some(caps[1].to_string());
                Some(c)
            })
            .collect()
    }
}
