pub mod candidate;
pub mod code;
pub mod dedup;
pub mod normalize;
pub mod sanitize;
pub mod strategies;

use std::collections::HashSet;
use std::sync::LazyLock;

use tracing::debug;

use crate::config::{ExtractorConfig, Platform};
use candidate::{Message, ProcessedContent, Resource, Role};
use sanitize::Sanitizer;

static DEFAULT_EXTRACTOR: LazyLock<Extractor> =
    LazyLock::new(|| Extractor::new(ExtractorConfig::default()));

/// Pipeline: strategies → normalize → dedup for the resource list, and the
/// sanitizer for display text. Holds no state between runs.
pub struct Extractor {
    config: ExtractorConfig,
    sanitizer: Sanitizer,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        let sanitizer = Sanitizer::new(config.platform.clone());
        Extractor { config, sanitizer }
    }

    pub fn platform(&self) -> &Platform {
        &self.config.platform
    }

    pub fn process(&self, raw: &str) -> ProcessedContent {
        let mut candidates: Vec<Resource> = Vec::new();
        let mut claimed: HashSet<String> = HashSet::new();
        for strategy in strategies::all() {
            let found: Vec<Resource> = strategy
                .scan(raw, &self.config.windows)
                .into_iter()
                .filter_map(normalize::normalize)
                .filter(|r| !(strategy.skips_claimed() && r.has_link() && claimed.contains(&r.detail_url)))
                .collect();
            debug!(
                strategy = strategy.name(),
                rank = strategy.rank(),
                found = found.len(),
                "scan"
            );
            claimed.extend(found.iter().filter(|r| r.has_link()).map(|r| r.detail_url.clone()));
            candidates.extend(found);
        }

        let total = candidates.len();
        let resources = dedup::dedup(candidates);
        debug!(kept = resources.len(), dropped = total - resources.len(), "dedup");

        ProcessedContent {
            display_text: self.sanitizer.sanitize(raw),
            resources,
        }
    }

    /// Only settled assistant answers are processed; user turns and loading
    /// placeholders are shown as typed. Error turns carry the text shown for a
    /// failed request and run through the pipeline like any other answer.
    pub fn process_message(&self, message: &Message) -> ProcessedContent {
        match message.role {
            Role::Assistant if !message.is_loading => self.process(&message.content),
            _ => ProcessedContent {
                display_text: message.content.clone(),
                resources: Vec::new(),
            },
        }
    }
}

/// Run the pipeline with default windows and platform.
pub fn process(raw: &str) -> ProcessedContent {
    DEFAULT_EXTRACTOR.process(raw)
}
