//! Collaboration invites
//!
//! The invite endpoint must not leak whether a username exists. Every branch
//! funnels through the same response constructor and returns HTTP 200 with
//! the same message; the not-found branch additionally sleeps a randomized
//! 100–300 ms so its timing resembles the branches that do database writes.
//! Only the audit log distinguishes the cases.

use rand::Rng;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::member::{ConversationMemberRow, ROLE_MEMBER};
use crate::models::profile::Profile;
use crate::services::member_service::MemberService;

/// The one message every invite outcome returns.
pub const INVITE_RESPONSE_MESSAGE: &str =
    "If that user exists, they have been invited to the conversation.";

#[derive(Debug)]
pub enum InviteOutcome {
    Added {
        member: ConversationMemberRow,
        invitee: Uuid,
    },
    AlreadyMember {
        invitee: Uuid,
    },
    NotFound,
}

impl InviteOutcome {
    /// Identical body for all outcomes.
    pub fn uniform_response(&self) -> serde_json::Value {
        serde_json::json!({
            "success": true,
            "message": INVITE_RESPONSE_MESSAGE,
        })
    }

    /// Artificial delay applied before responding. Only the fast branch
    /// (no lookup hit, no write) gets padded.
    pub fn artificial_delay(&self) -> Option<Duration> {
        match self {
            InviteOutcome::NotFound => {
                let ms = rand::thread_rng().gen_range(100..=300);
                Some(Duration::from_millis(ms))
            }
            _ => None,
        }
    }
}

pub struct InviteService;

impl InviteService {
    /// Case-insensitive username lookup. Runs on the service connection and
    /// deliberately crosses the per-user scoping boundary: ordinary callers
    /// cannot query other users' profiles.
    pub async fn lookup_invitee(
        db: &Pool<Postgres>,
        username: &str,
    ) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT user_id, username, display_name, created_at
            FROM profiles
            WHERE LOWER(username) = LOWER($1)
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    /// Resolve an invite. Caller must already have verified that the inviter
    /// owns the conversation and that collaboration is enabled.
    pub async fn invite(
        db: &Pool<Postgres>,
        conversation_id: Uuid,
        username: &str,
    ) -> Result<InviteOutcome, AppError> {
        let Some(profile) = Self::lookup_invitee(db, username).await? else {
            return Ok(InviteOutcome::NotFound);
        };

        if MemberService::is_member(db, conversation_id, profile.user_id).await? {
            return Ok(InviteOutcome::AlreadyMember {
                invitee: profile.user_id,
            });
        }

        let member =
            MemberService::add_member(db, conversation_id, profile.user_id, ROLE_MEMBER).await?;
        Ok(InviteOutcome::Added {
            member,
            invitee: profile.user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn member_row() -> ConversationMemberRow {
        ConversationMemberRow {
            conversation_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            color: "#E57373".into(),
            role: ROLE_MEMBER.into(),
            joined_at: Utc::now(),
        }
    }

    #[test]
    fn all_outcomes_share_one_response_body() {
        let invitee = Uuid::new_v4();
        let outcomes = [
            InviteOutcome::Added {
                member: member_row(),
                invitee,
            },
            InviteOutcome::AlreadyMember { invitee },
            InviteOutcome::NotFound,
        ];

        let bodies: Vec<String> = outcomes
            .iter()
            .map(|o| o.uniform_response().to_string())
            .collect();
        assert_eq!(bodies[0], bodies[1]);
        assert_eq!(bodies[1], bodies[2]);
        assert!(bodies[0].contains(INVITE_RESPONSE_MESSAGE));
    }

    #[test]
    fn only_not_found_is_padded() {
        let invitee = Uuid::new_v4();
        assert!(InviteOutcome::NotFound.artificial_delay().is_some());
        assert!(InviteOutcome::AlreadyMember { invitee }
            .artificial_delay()
            .is_none());
        assert!(InviteOutcome::Added {
            member: member_row(),
            invitee,
        }
        .artificial_delay()
        .is_none());
    }

    #[test]
    fn padding_stays_within_bounds() {
        for _ in 0..64 {
            let delay = InviteOutcome::NotFound.artificial_delay().unwrap();
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(300));
        }
    }
}
