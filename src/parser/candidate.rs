use serde::{Deserialize, Serialize};

/// Placeholder detail URL for resources found without a link.
pub const NO_LINK: &str = "#";

/// A resource mention as a strategy found it, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCandidate {
    pub title: String,
    pub author: Option<String>,
    pub resource_type: Option<String>,
    pub level: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub detail_url: Option<String>,
    pub strategy_rank: u8,
    /// Byte offset into the message where the strategy matched.
    pub text_offset: usize,
}

impl RawCandidate {
    pub fn new(title: &str, strategy_rank: u8, text_offset: usize) -> Self {
        RawCandidate {
            title: title.to_string(),
            strategy_rank,
            text_offset,
            ..Default::default()
        }
    }
}

/// A normalized resource, ready for the sources list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// `"<type> | <level>"` when both are known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    /// Absolute URL, or [`NO_LINK`].
    pub detail_url: String,
    pub strategy_rank: u8,
    pub text_offset: usize,
}

impl Resource {
    pub fn has_link(&self) -> bool {
        self.detail_url != NO_LINK
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedContent {
    pub display_text: String,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One chat turn, as the client keeps it in its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub is_loading: bool,
    /// Marks the text substituted for a failed request. Informational only:
    /// such turns are processed like any other answer and yield no resources.
    #[serde(default)]
    pub is_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_json_uses_camel_case_and_skips_missing() {
        let r = Resource {
            title: "Learning Python".into(),
            author: None,
            resource_type: Some("Book | Beginner".into()),
            level: None,
            duration: None,
            description: None,
            cover_url: None,
            detail_url: NO_LINK.into(),
            strategy_rank: 1,
            text_offset: 0,
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["resourceType"], "Book | Beginner");
        assert_eq!(json["detailUrl"], "#");
        assert!(json.get("author").is_none());
        assert!(json.get("coverUrl").is_none());
        assert!(!r.has_link());
    }

    #[test]
    fn transcript_message_defaults() {
        let m: Message = serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).unwrap();
        assert_eq!(m.role, Role::Assistant);
        assert!(!m.is_loading);
        assert!(!m.is_error);

        let m: Message =
            serde_json::from_str(r#"{"role":"user","content":"q","isLoading":true}"#).unwrap();
        assert_eq!(m.role, Role::User);
        assert!(m.is_loading);
    }
}
