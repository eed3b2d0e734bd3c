use std::collections::HashSet;

use super::{cover_url_in, labeled, title_before, Label, Strategy, LIBRARY_URL_RE};
use crate::config::Windows;
use crate::parser::candidate::RawCandidate;
use crate::parser::normalize::clean_url;

/// Every library URL in the text, linked or bare. URLs already reported by a
/// higher-ranked strategy are skipped by the extractor.
pub struct RawUrl;

impl Strategy for RawUrl {
    fn name(&self) -> &'static str {
        "raw_url"
    }

    fn rank(&self) -> u8 {
        6
    }

    fn skips_claimed(&self) -> bool {
        true
    }

    fn scan(&self, text: &str, windows: &Windows) -> Vec<RawCandidate> {
        let mut seen = HashSet::new();
        LIBRARY_URL_RE
            .find_iter(text)
            .filter_map(|m| {
                let url = clean_url(m.as_str())?;
                if !seen.insert(url.clone()) {
                    return None;
                }
                let hit = title_before(text, m.start(), windows.raw_url_lookbehind)?;

                let mut c = RawCandidate::new(&hit.title, self.rank(), m.start());
                c.resource_type = labeled(hit.block, Label::Type);
                c.author = labeled(hit.block, Label::Author);
                c.cover_url = cover_url_in(hit.block);
                c.detail_url = Some(url);
                Some(c)
            })
            .collect()
    }
}
