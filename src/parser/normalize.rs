use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::candidate::{RawCandidate, Resource, NO_LINK};

static MD_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());
static LIST_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,3}[.)]\s+").unwrap());

const URL_TRAILING_PUNCT: &[char] = &['.', ',', ';', ':', '!', '?'];

/// `/library/view/<slug>/<id>/` parts of a detail-page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryPath {
    pub host: String,
    pub slug: String,
    pub id: Option<String>,
}

pub fn library_path(url: &str) -> Option<LibraryPath> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_string();
    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    let at = segments.windows(2).position(|w| w == ["library", "view"])?;
    let slug = segments.get(at + 2)?.to_string();
    let id = segments.get(at + 3).map(|s| s.to_string());
    Some(LibraryPath { host, slug, id })
}

/// Canonical cover image for a detail URL, when it follows the library convention.
pub fn cover_url_for(detail_url: &str) -> Option<String> {
    let path = library_path(detail_url)?;
    let id = path.id?;
    Some(format!("https://{}/covers/{}/400w/", path.host, id))
}

/// Plain field value: no emphasis or link markup, single spaces, trimmed.
pub fn clean_text(s: &str) -> String {
    let unlinked = MD_LINK_RE.replace_all(s, "$1");
    let stripped = unlinked.replace("**", "").replace("__", "");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    strip_wrapping(&collapsed).to_string()
}

pub fn clean_title(s: &str) -> String {
    let text = clean_text(s);
    LIST_NUMBER_RE.replace(&text, "").trim().to_string()
}

fn clean_opt(s: Option<&str>) -> Option<String> {
    s.map(clean_text).filter(|v| !v.is_empty())
}

// *x* or _x_ left over after removing the double markers
fn strip_wrapping(s: &str) -> &str {
    let mut out = s.trim();
    while out.len() >= 2
        && ((out.starts_with('*') && out.ends_with('*'))
            || (out.starts_with('_') && out.ends_with('_')))
    {
        out = out[1..out.len() - 1].trim();
    }
    out
}

/// Absolute http(s) URL with wrapping brackets and sentence punctuation removed.
pub fn clean_url(s: &str) -> Option<String> {
    let trimmed = s
        .trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .trim_end_matches(URL_TRAILING_PUNCT);
    let parsed = Url::parse(trimmed).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return None;
    }
    Some(trimmed.to_string())
}

/// Turn a raw candidate into a resource; `None` when no title survives cleaning.
pub fn normalize(raw: RawCandidate) -> Option<Resource> {
    let title = clean_title(&raw.title);
    if title.is_empty() {
        return None;
    }

    let kind = clean_opt(raw.resource_type.as_deref());
    let level = clean_opt(raw.level.as_deref());
    let resource_type = match (kind, &level) {
        (Some(k), Some(l)) => Some(format!("{} | {}", k, l)),
        (k, _) => k,
    };

    let detail_url = raw.detail_url.as_deref().and_then(clean_url);
    let cover_url = raw
        .cover_url
        .as_deref()
        .and_then(clean_url)
        .or_else(|| detail_url.as_deref().and_then(cover_url_for));

    Some(Resource {
        title,
        author: clean_opt(raw.author.as_deref()),
        resource_type,
        level,
        duration: clean_opt(raw.duration.as_deref()),
        description: clean_opt(raw.description.as_deref()),
        cover_url,
        detail_url: detail_url.unwrap_or_else(|| NO_LINK.to_string()),
        strategy_rank: raw.strategy_rank,
        text_offset: raw.text_offset,
    })
}
