use super::{cover_url_in, detail_url_in, headings, labeled, Label, Strategy};
use crate::config::Windows;
use crate::parser::candidate::RawCandidate;

/// Fallback: every heading opens a section; labels may appear anywhere in it.
/// Only sections carrying a cover or detail link count as resources.
pub struct HeadingSection;

impl Strategy for HeadingSection {
    fn name(&self) -> &'static str {
        "heading_section"
    }

    fn rank(&self) -> u8 {
        3
    }

    fn scan(&self, text: &str, _windows: &Windows) -> Vec<RawCandidate> {
        let sections = headings(text, 0, text.len());

        sections
            .iter()
            .enumerate()
            .filter_map(|(i, heading)| {
                let section_end = sections.get(i + 1).map_or(text.len(), |next| next.start);
                let body = &text[heading.end..section_end];

                let cover_url = cover_url_in(body);
                let detail_url = detail_url_in(body);
                if cover_url.is_none() && detail_url.is_none() {
                    return None;
                }

                let mut c = RawCandidate::new(&heading.title, self.rank(), heading.start);
                c.author = labeled(body, Label::Author);
                c.resource_type = labeled(body, Label::Type);
                c.level = labeled(body, Label::Level);
                c.duration = labeled(body, Label::Duration);
                c.description = labeled(body, Label::Description);
                c.cover_url = cover_url;
                c.detail_url = detail_url;
                Some(c)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_in_any_order() {
        let text = "# Answer\nHere is what I found.\n\n\
### The Rust Programming Language\n\
**Description**: The official book.\n\
**Type**: Book\n\
**Author**: Steve Klabnik, Carol Nichols\n\
Cover: https://img.example.com/trpl.jpg\n\n\
### Closing thoughts\nHappy learning!\n";
        let found = HeadingSection.scan(text, &Windows::default());
        assert_eq!(found.len(), 1);
        let c = &found[0];
        assert_eq!(c.title, "The Rust Programming Language");
        assert_eq!(c.description.as_deref(), Some("The official book."));
        assert_eq!(c.resource_type.as_deref(), Some("Book"));
        assert_eq!(c.author.as_deref(), Some("Steve Klabnik, Carol Nichols"));
        assert_eq!(c.cover_url.as_deref(), Some("https://img.example.com/trpl.jpg"));
        assert_eq!(c.detail_url, None);
        assert_eq!(c.strategy_rank, 3);
    }

    #[test]
    fn code_comments_stay_in_the_section() {
        let text = "### Fluent Python\n\
```python\n\
# Example usage\n\
print(\"hi\")\n\
```\n\
[View on O'Reilly →](https://learning.oreilly.com/library/view/fluent-python-2nd/9781492056348/)\n";
        let found = HeadingSection.scan(text, &Windows::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Fluent Python");
        assert_eq!(
            found[0].detail_url.as_deref(),
            Some("https://learning.oreilly.com/library/view/fluent-python-2nd/9781492056348/")
        );
    }

    #[test]
    fn raw_library_url_is_a_fallback_link() {
        let text = "## Designing Data-Intensive Applications\nSee https://learning.oreilly.com/library/view/designing-data-intensive-applications/9781491903063/ for details.";
        let found = HeadingSection.scan(text, &Windows::default());
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].detail_url.as_deref(),
            Some("https://learning.oreilly.com/library/view/designing-data-intensive-applications/9781491903063/")
        );
    }

    #[test]
    fn sections_without_links_are_skipped() {
        let text = "## Overview\nNo links.\n## Details\nStill none.";
        assert!(HeadingSection.scan(text, &Windows::default()).is_empty());
    }
}
