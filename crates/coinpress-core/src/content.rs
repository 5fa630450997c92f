//! Content records served by the HTTP surface.
//!
//! These serialize in camelCase because they go straight into API responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post, with the writer's coin id resolved if the writer has one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub writer_id: String,
    pub title: String,
    /// `None` when the writer has not launched a coin; badge resolution is
    /// skipped for such posts.
    pub coin_id: Option<String>,
}

/// The public slice of a comment author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// A comment with its author attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub user: CommentAuthor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_wire_format() {
        let comment = Comment {
            id: "comment_1".to_string(),
            body: "gm".to_string(),
            created_at: Utc::now(),
            user: CommentAuthor {
                id: "user_1".to_string(),
                display_name: "0x1234...abcd".to_string(),
                avatar_url: None,
            },
        };

        let json = serde_json::to_value(&comment).expect("serialize");
        assert_eq!(json["user"]["displayName"], "0x1234...abcd");
        assert!(json["user"]["avatarUrl"].is_null());
        assert!(json.get("createdAt").is_some());
    }
}
