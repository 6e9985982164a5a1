pub mod snapshot;
pub mod twitter;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Textual timestamp format used by the remote service,
/// e.g. `Wed Oct 10 20:19:24 +0000 2018`.
pub const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// One record as delivered by the remote feed.
///
/// Every field has a default so partial records (older snapshots, trimmed
/// API responses) still decode. Fields are read through the accessors below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawItem {
    pub id: u64,
    pub created_at: String,
    pub user: RawUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub entities: RawEntities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retweeted_status: Option<Box<RawItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_reply_to_status_id: Option<u64>,
    pub favorited: bool,
    pub retweeted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawUser {
    pub name: String,
    pub screen_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEntities {
    pub user_mentions: Vec<RawMention>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMention {
    pub screen_name: String,
}

impl RawItem {
    pub fn author(&self) -> &str {
        &self.user.name
    }

    pub fn handle(&self) -> &str {
        &self.user.screen_name
    }

    /// Body text with the HTML entities the service escapes decoded.
    pub fn body(&self) -> String {
        let raw = self
            .full_text
            .as_deref()
            .or(self.text.as_deref())
            .unwrap_or("");
        raw.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&")
    }

    pub fn mentions(&self) -> impl Iterator<Item = &str> {
        self.entities
            .user_mentions
            .iter()
            .map(|m| m.screen_name.as_str())
    }

    pub fn shared(&self) -> Option<&RawItem> {
        self.retweeted_status.as_deref()
    }

    pub fn in_reply_to(&self) -> Option<u64> {
        self.in_reply_to_status_id
    }

    /// Parsed creation time; `None` when the field is missing or malformed.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_str(&self.created_at, CREATED_AT_FORMAT)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// The remote social feed, as seen by the sync engine and the handlers.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Home timeline, newest first as the service returns it. `since_id`
    /// restricts the result to items with a larger id.
    async fn home_timeline(&self, since_id: Option<u64>) -> Result<Vec<RawItem>>;

    async fn item(&self, id: u64) -> Result<RawItem>;

    async fn post(&self, text: &str, in_reply_to: Option<u64>) -> Result<RawItem>;

    async fn favorite(&self, id: u64) -> Result<()>;

    async fn repost(&self, id: u64) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_partial_record() {
        let item: RawItem = serde_json::from_str(r#"{"id": 7, "text": "hi"}"#).unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.body(), "hi");
        assert_eq!(item.author(), "");
        assert!(item.shared().is_none());
        assert!(item.created_at().is_none());
        assert!(!item.favorited);
    }

    #[test]
    fn test_decode_full_record() {
        let json = r#"{
            "id": 10,
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "user": {"name": "Carol", "screen_name": "carol"},
            "full_text": "RT @alice: hello",
            "text": "truncated",
            "entities": {"user_mentions": [{"screen_name": "alice", "id": 1}]},
            "retweeted_status": {
                "id": 9,
                "user": {"name": "Alice", "screen_name": "alice"},
                "text": "hello"
            },
            "favorited": true,
            "unknown_field": 1
        }"#;
        let item: RawItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.body(), "RT @alice: hello");
        assert_eq!(item.mentions().collect::<Vec<_>>(), vec!["alice"]);
        assert_eq!(item.shared().map(|s| s.handle()), Some("alice"));
        assert!(item.favorited);
        let created = item.created_at().unwrap();
        assert_eq!(created.to_rfc3339(), "2018-10-10T20:19:24+00:00");
    }

    #[test]
    fn test_body_decodes_entities() {
        let item = RawItem {
            text: Some("a &lt;b&gt; &amp;amp; c".to_string()),
            ..Default::default()
        };
        assert_eq!(item.body(), "a <b> &amp; c");
    }
}
