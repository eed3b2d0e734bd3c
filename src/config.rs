//! Tunables for the extraction pipeline and the CLI.

/// Forward window for `Cover:` lines and view links after a plain labeled block.
pub const PLAIN_BLOCK_LOOKAHEAD: usize = 800;
/// Forward window for a library URL after a bold labeled block.
pub const BOLD_BLOCK_LOOKAHEAD: usize = 600;
/// Backward window for the heading that names a Type/Level/Duration line.
pub const TRIPLE_LOOKBEHIND: usize = 500;
/// Forward window for author, description and links after a Type/Level/Duration line.
pub const TRIPLE_LOOKAHEAD: usize = 1000;
/// Backward window for the title of a bare view link.
pub const VIEW_LINK_LOOKBEHIND: usize = 1000;
/// Backward window for the title of a raw library URL.
pub const RAW_URL_LOOKBEHIND: usize = 800;

pub const DEFAULT_PLATFORM_DOMAIN: &str = "oreilly.com";
pub const DEFAULT_PLATFORM_NAME: &str = "O'Reilly";

const DEFAULT_DB_PATH: &str = "data/sources.sqlite";

/// Bounded scan distances, in bytes of message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windows {
    pub plain_lookahead: usize,
    pub bold_lookahead: usize,
    pub triple_lookbehind: usize,
    pub triple_lookahead: usize,
    pub view_link_lookbehind: usize,
    pub raw_url_lookbehind: usize,
}

impl Default for Windows {
    fn default() -> Self {
        Windows {
            plain_lookahead: PLAIN_BLOCK_LOOKAHEAD,
            bold_lookahead: BOLD_BLOCK_LOOKAHEAD,
            triple_lookbehind: TRIPLE_LOOKBEHIND,
            triple_lookahead: TRIPLE_LOOKAHEAD,
            view_link_lookbehind: VIEW_LINK_LOOKBEHIND,
            raw_url_lookbehind: RAW_URL_LOOKBEHIND,
        }
    }
}

/// The learning platform whose links get friendly labels in display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub domain: String,
    pub name: String,
}

impl Default for Platform {
    fn default() -> Self {
        Platform {
            domain: DEFAULT_PLATFORM_DOMAIN.to_string(),
            name: DEFAULT_PLATFORM_NAME.to_string(),
        }
    }
}

impl Platform {
    /// Defaults overridden by `PLATFORM_DOMAIN` / `PLATFORM_NAME` when set.
    pub fn from_env() -> Self {
        let mut platform = Platform::default();
        if let Some(domain) = non_empty_env("PLATFORM_DOMAIN") {
            platform.domain = domain;
        }
        if let Some(name) = non_empty_env("PLATFORM_NAME") {
            platform.name = name;
        }
        platform
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub windows: Windows,
    pub platform: Platform,
}

pub fn db_path() -> String {
    non_empty_env("SOURCES_DB").unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
