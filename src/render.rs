//! Plain-text rendering of the sources list.

use crate::parser::candidate::Resource;

/// Fallback icon shown when a resource has no cover image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Book,
    Video,
    Course,
    LearningPath,
    Document,
}

impl Icon {
    pub fn for_type(resource_type: Option<&str>) -> Icon {
        let t = resource_type.unwrap_or("").to_lowercase();
        if t.contains("book") {
            Icon::Book
        } else if t.contains("video") {
            Icon::Video
        } else if t.contains("course") {
            Icon::Course
        } else if t.contains("learning path") {
            Icon::LearningPath
        } else {
            Icon::Document
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Icon::Book => "📚",
            Icon::Video => "🎥",
            Icon::Course => "🎓",
            Icon::LearningPath => "🗺️",
            Icon::Document => "📖",
        }
    }
}

/// Numbered markdown list; resources without a detail page are not linked.
pub fn sources_list(resources: &[Resource]) -> String {
    resources
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let icon = Icon::for_type(r.resource_type.as_deref()).glyph();
            let title = if r.has_link() {
                format!("[{}]({})", r.title, r.detail_url)
            } else {
                r.title.clone()
            };
            let mut line = format!("{}. {} {}", i + 1, icon, title);
            if let Some(author) = &r.author {
                line.push_str(&format!(" by {}", author));
            }
            if let Some(kind) = &r.resource_type {
                line.push_str(&format!(" ({})", kind));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
