//! Anonymous read-only share links
//!
//! The one place a security-relevant low-level detail is implemented rather
//! than delegated: the stored token comparison is an explicit constant-time
//! XOR-accumulate over bytes, not a short-circuiting equality.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::Serialize;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::AppError;

/// Tokens are 32 random bytes rendered as hex (64 chars). Validation caps
/// accepted input at the same length.
pub const SHARE_TOKEN_MAX_LEN: usize = 64;

/// At most this many messages are returned to anonymous readers.
pub const SHARED_MESSAGE_LIMIT: i64 = 500;

/// Constant-time byte comparison. Length mismatch returns immediately
/// without touching content; equal lengths always scan every byte.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut acc: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        acc |= x ^ y;
    }
    acc == 0
}

/// Accept only hex-shaped tokens of bounded length before any lookup.
pub fn is_valid_token_format(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= SHARE_TOKEN_MAX_LEN
        && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Generate a fresh opaque share token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Conversation header exposed to anonymous readers.
#[derive(Debug, Clone, Serialize)]
pub struct SharedHeader {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Message shape exposed to anonymous readers: author identifiers omitted.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SharedMessage {
    pub id: Uuid,
    pub role: String,
    pub content: String,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SharedConversationView {
    pub conversation: SharedHeader,
    pub messages: Vec<SharedMessage>,
}

pub struct ShareService;

impl ShareService {
    /// Set a fresh token on the conversation and return it.
    pub async fn issue(db: &Pool<Postgres>, conversation_id: Uuid) -> Result<String, AppError> {
        let token = generate_token();
        let result =
            sqlx::query("UPDATE conversations SET share_token = $2, updated_at = now() WHERE id = $1")
                .bind(conversation_id)
                .bind(&token)
                .execute(db)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(token)
    }

    pub async fn revoke(db: &Pool<Postgres>, conversation_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE conversations SET share_token = NULL, updated_at = now() WHERE id = $1")
            .bind(conversation_id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Resolve an anonymous share link. Runs on the service connection (the
    /// caller has no identity to scope by). Missing conversation, missing
    /// stored token and mismatching token are indistinguishable to the
    /// caller.
    pub async fn resolve(
        db: &Pool<Postgres>,
        conversation_id: Uuid,
        token: &str,
    ) -> Result<SharedConversationView, AppError> {
        let row = sqlx::query_as::<_, ShareRecord>(
            "SELECT id, title, share_token, created_at FROM conversations WHERE id = $1",
        )
        .bind(conversation_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::Forbidden)?;

        let stored = row.share_token.as_deref().ok_or(AppError::Forbidden)?;
        if !constant_time_eq(stored.as_bytes(), token.as_bytes()) {
            return Err(AppError::Forbidden);
        }

        let messages = sqlx::query_as::<_, SharedMessage>(
            r#"
            SELECT id, role, content, pinned, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC
            LIMIT $2
            "#,
        )
        .bind(conversation_id)
        .bind(SHARED_MESSAGE_LIMIT)
        .fetch_all(db)
        .await?;

        Ok(SharedConversationView {
            conversation: SharedHeader {
                id: row.id,
                title: row.title,
                created_at: row.created_at,
            },
            messages,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ShareRecord {
    id: Uuid,
    title: String,
    share_token: Option<String>,
    created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_mismatch_rejected_without_content_compare() {
        assert!(!constant_time_eq(b"abcd", b"abc"));
        assert!(!constant_time_eq(b"", b"a"));
    }

    #[test]
    fn single_byte_difference_rejected() {
        let a = "aaaaaaaaaaaaaaaa";
        let b = "aaaaaaaaXaaaaaaa";
        assert!(!constant_time_eq(a.as_bytes(), b.as_bytes()));
    }

    #[test]
    fn identical_tokens_accepted() {
        let token = generate_token();
        assert!(constant_time_eq(token.as_bytes(), token.as_bytes()));
    }

    #[test]
    fn generated_tokens_are_valid_hex_of_full_length() {
        let token = generate_token();
        assert_eq!(token.len(), SHARE_TOKEN_MAX_LEN);
        assert!(is_valid_token_format(&token));
    }

    #[test]
    fn format_validation_rejects_bad_shapes() {
        assert!(!is_valid_token_format(""));
        assert!(!is_valid_token_format("zz-not-hex"));
        assert!(!is_valid_token_format(&"a".repeat(SHARE_TOKEN_MAX_LEN + 1)));
        assert!(is_valid_token_format("deadbeef"));
    }

    #[test]
    fn shared_message_payload_has_no_author_field() {
        let message = SharedMessage {
            id: Uuid::new_v4(),
            role: "assistant".into(),
            content: "hello".into(),
            pinned: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert!(json.get("author_id").is_none());
        assert!(json.get("user_id").is_none());
    }
}
