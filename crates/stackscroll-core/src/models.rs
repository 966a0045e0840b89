//! Domain records: users, sessions and articles.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque, stable user identifier assigned by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The authenticated actor behind a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Proof of authentication held by the client.
///
/// Tokens are never logged; `Debug` redacts them.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry as seconds since the Unix epoch.
    pub expires_at: i64,
    pub user: User,
}

impl Session {
    /// Returns true if the access token has expired or expires within `leeway_secs`.
    pub fn expires_within(&self, leeway_secs: i64) -> bool {
        Utc::now().timestamp() + leeway_secs >= self.expires_at
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Server-assigned article identifier.
///
/// Accepts both numeric and string ids on the wire; compared as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArticleId(pub String);

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArticleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ArticleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

/// A published article as stored in the `posts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    /// Markdown body.
    #[serde(rename = "content")]
    pub body: String,
    #[serde(rename = "user_id")]
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Returns true if `user` wrote this article.
    pub fn is_authored_by(&self, user: &User) -> bool {
        self.author_id == user.id
    }
}

/// Client-supplied fields for a new article; the server fills id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewArticle {
    pub title: String,
    #[serde(rename = "content")]
    pub body: String,
    #[serde(rename = "user_id")]
    pub author_id: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_accepts_numeric_id_and_table_columns() {
        let json = r##"{
            "id": 42,
            "title": "Hello",
            "content": "# Body",
            "user_id": "u-1",
            "created_at": "2024-05-01T10:00:00+00:00"
        }"##;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.id, ArticleId::from("42"));
        assert_eq!(article.body, "# Body");
        assert_eq!(article.author_id, UserId::from("u-1"));
    }

    #[test]
    fn test_new_article_serializes_table_columns() {
        let draft = NewArticle {
            title: "T".to_string(),
            body: "B".to_string(),
            author_id: UserId::from("u-1"),
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["content"], "B");
        assert_eq!(value["user_id"], "u-1");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_session_debug_redacts_tokens() {
        let session = Session {
            access_token: "secret-access".to_string(),
            refresh_token: "secret-refresh".to_string(),
            expires_at: 0,
            user: User {
                id: UserId::from("u-1"),
                email: None,
            },
        };
        let debug = format!("{session:?}");
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
        assert!(session.expires_within(0));
    }
}
