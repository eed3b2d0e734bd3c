use std::collections::HashSet;

use super::candidate::Resource;

/// Order by (strategy rank, text offset) and keep the first resource for each
/// title (case-insensitive) and each real detail URL. Later duplicates never
/// fill in fields of the kept entry.
pub fn dedup(mut candidates: Vec<Resource>) -> Vec<Resource> {
    candidates.sort_by_key(|c| (c.strategy_rank, c.text_offset));

    let mut titles = HashSet::new();
    let mut urls = HashSet::new();
    let mut kept = Vec::with_capacity(candidates.len());

    for c in candidates {
        let title_key = c.title.to_lowercase();
        if titles.contains(&title_key) || (c.has_link() && urls.contains(&c.detail_url)) {
            continue;
        }
        titles.insert(title_key);
        if c.has_link() {
            urls.insert(c.detail_url.clone());
        }
        kept.push(c);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::candidate::NO_LINK;

    fn res(title: &str, url: &str, rank: u8, offset: usize) -> Resource {
        Resource {
            title: title.into(),
            author: None,
            resource_type: None,
            level: None,
            duration: None,
            description: None,
            cover_url: None,
            detail_url: url.into(),
            strategy_rank: rank,
            text_offset: offset,
        }
    }

    #[test]
    fn same_title_keeps_higher_priority() {
        let mut rich = res("Learning Python", NO_LINK, 1, 50);
        rich.author = Some("Mark Lutz".into());
        let out = dedup(vec![res("LEARNING PYTHON", "https://h.example/a", 5, 0), rich]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].strategy_rank, 1);
        assert_eq!(out[0].author.as_deref(), Some("Mark Lutz"));
        // not enriched from the dropped duplicate
        assert_eq!(out[0].detail_url, NO_LINK);
    }

    #[test]
    fn same_url_collapses() {
        let out = dedup(vec![
            res("Fluent Python", "https://h.example/library/view/fp/1/", 2, 10),
            res("Python Book", "https://h.example/library/view/fp/1/", 6, 5),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Fluent Python");
    }

    #[test]
    fn sentinel_urls_do_not_collide() {
        let out = dedup(vec![res("A", NO_LINK, 1, 0), res("B", NO_LINK, 1, 10)]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn ordered_by_rank_then_offset() {
        let out = dedup(vec![
            res("C", NO_LINK, 3, 0),
            res("B", NO_LINK, 1, 90),
            res("A", NO_LINK, 1, 10),
        ]);
        let titles: Vec<&str> = out.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }
}
