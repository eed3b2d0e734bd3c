use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::code::{code_ranges, in_any};
use super::normalize::library_path;
use crate::config::Platform;

/// A line holding nothing but a cover link, newline included.
static COVER_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:[-*+][ \t]+)?(?:\*\*)?Cover(?:\*\*)?[ \t]*:(?:\*\*)?[ \t]*<?https?[^\s]*[ \t]*(?:\n|$)")
        .unwrap()
});
static COVER_INLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\bCover:[ \t]*https?[^\s)]*").unwrap());
/// Any `Cover: http` left glued to a preceding word.
static COVER_SPLICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Cover:[ \t]*https?[^\s)]*").unwrap());
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>()\[\]"`*]+"#).unwrap());
static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t\r]*\n){2,}").unwrap());

const URL_TRAILING_PUNCT: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Cleans message prose for display: drops `Cover:` scaffolding and turns bare
/// platform URLs into labeled markdown links.
pub struct Sanitizer {
    platform: Platform,
}

impl Sanitizer {
    pub fn new(platform: Platform) -> Self {
        Sanitizer { platform }
    }

    pub fn sanitize(&self, raw: &str) -> String {
        let without_covers = strip_covers(raw);
        let linked = self.rewrite_bare_urls(&without_covers);
        BLANK_RUN_RE.replace_all(&linked, "\n\n").trim().to_string()
    }

    fn rewrite_bare_urls(&self, text: &str) -> String {
        let protected = code_ranges(text);
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for m in URL_RE.find_iter(text) {
            if in_any(&protected, m.start()) || inside_link(text, m.start()) {
                continue;
            }
            let url = m.as_str().trim_end_matches(URL_TRAILING_PUNCT);
            let label = match library_path(url) {
                Some(path) => format!("📖 {}", title_case(&path.slug)),
                None if self.is_platform(url) => format!("🔗 {} Resource", self.platform.name),
                None => continue,
            };
            out.push_str(&text[last..m.start()]);
            out.push_str(&format!("[{}]({})", label, url));
            last = m.start() + url.len();
        }

        out.push_str(&text[last..]);
        out
    }

    fn is_platform(&self, url: &str) -> bool {
        let domain = self.platform.domain.to_lowercase();
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
            .is_some_and(|host| host == domain || host.ends_with(&format!(".{}", domain)))
    }
}

fn strip_covers(raw: &str) -> String {
    let mut text = COVER_LINE_RE.replace_all(raw, "").into_owned();
    text = COVER_INLINE_RE.replace_all(&text, "").into_owned();
    // removal can splice a new occurrence together; repeat until none is left
    while text.contains("Cover: http") {
        text = COVER_SPLICE_RE.replace_all(&text, "").into_owned();
    }
    text
}

/// True when the URL at `start` is already a link target, autolink,
/// reference definition or part of link text.
fn inside_link(text: &str, start: usize) -> bool {
    let before = &text[..start];
    let tight = before.trim_end_matches([' ', '\t', '<']);
    if tight.ends_with("](") || tight.ends_with("]:") || before.ends_with('<') {
        return true;
    }
    let line = before.rsplit('\n').next().unwrap_or(before);
    match (line.rfind('['), line.rfind(']')) {
        (Some(open), Some(close)) => open > close,
        (Some(_), None) => true,
        _ => false,
    }
}

fn title_case(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitizer() -> Sanitizer {
        Sanitizer::new(Platform::default())
    }

    #[test]
    fn cover_lines_removed() {
        let text = "### Book\nCover: https://img.example.com/c.jpg\n[View on O'Reilly →](https://learning.oreilly.com/library/view/b/1/)";
        let out = sanitizer().sanitize(text);
        assert_eq!(
            out,
            "### Book\n[View on O'Reilly →](https://learning.oreilly.com/library/view/b/1/)"
        );
    }

    #[test]
    fn inline_and_bold_covers_removed() {
        let out = sanitizer().sanitize("Great read. Cover: https://img.example.com/c.jpg Enjoy!\n- **Cover:** https://img.example.com/d.jpg\nEnd");
        assert_eq!(out, "Great read. Enjoy!\nEnd");
        assert!(!out.contains("Cover: http"));
    }

    #[test]
    fn spliced_cover_removed() {
        let out = sanitizer().sanitize("CoCover: httpx ver: http://y.example/z");
        assert!(!out.contains("Cover: http"));
    }

    #[test]
    fn words_ending_in_cover_are_prose() {
        let out = sanitizer().sanitize("Discover: https://www.oreilly.com/online-learning/ has many books.");
        assert_eq!(
            out,
            "Discover: [🔗 O'Reilly Resource](https://www.oreilly.com/online-learning/) has many books."
        );
        let out = sanitizer().sanitize("Recover: http://docs.example.com/backups then retry.");
        assert_eq!(out, "Recover: http://docs.example.com/backups then retry.");
    }

    #[test]
    fn spaced_link_targets_untouched() {
        let text = "[the book]( https://www.oreilly.com/x/ ) and [ch. 2](\t<https://learning.oreilly.com/library/view/a/1/>)\n[ref]:   https://www.oreilly.com/y/";
        assert_eq!(sanitizer().sanitize(text), text);
    }

    #[test]
    fn bare_library_url_becomes_titled_link() {
        let out = sanitizer().sanitize(
            "Start with https://learning.oreilly.com/library/view/learning-python-5th/9781449355722/.",
        );
        assert_eq!(
            out,
            "Start with [📖 Learning Python 5th](https://learning.oreilly.com/library/view/learning-python-5th/9781449355722/)."
        );
    }

    #[test]
    fn general_platform_url_gets_generic_label() {
        let out = sanitizer().sanitize("Browse https://www.oreilly.com/online-learning/ today");
        assert_eq!(
            out,
            "Browse [🔗 O'Reilly Resource](https://www.oreilly.com/online-learning/) today"
        );
    }

    #[test]
    fn other_urls_and_existing_links_untouched() {
        let text = "See https://docs.rs/regex and [the book](https://learning.oreilly.com/library/view/x/1/) or <https://www.oreilly.com/about/>\n[https://www.oreilly.com/x](https://www.oreilly.com/x)";
        assert_eq!(sanitizer().sanitize(text), text);
    }

    #[test]
    fn code_is_untouched() {
        let text = "Run `curl https://www.oreilly.com/api` then:\n```\nGET https://learning.oreilly.com/library/view/a/1/\n```";
        assert_eq!(sanitizer().sanitize(text), text);
    }

    #[test]
    fn blank_runs_collapse_and_trim() {
        assert_eq!(sanitizer().sanitize("\n\n  Hello\n\n\n\nWorld\n \n\n"), "Hello\n\nWorld");
        assert_eq!(sanitizer().sanitize("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn custom_platform() {
        let s = Sanitizer::new(Platform {
            domain: "example.com".into(),
            name: "Example".into(),
        });
        assert_eq!(
            s.sanitize("https://learning.example.com/playlists/42"),
            "[🔗 Example Resource](https://learning.example.com/playlists/42)"
        );
        assert_eq!(s.sanitize("https://notexample.com/a"), "https://notexample.com/a");
    }

    #[test]
    fn slug_title_case() {
        assert_eq!(title_case("designing-data-intensive-applications"), "Designing Data Intensive Applications");
        assert_eq!(title_case("rust"), "Rust");
    }
}
