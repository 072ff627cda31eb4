//! Scenario tests against a live Postgres.
//!
//! Run with a database provided via TEST_DATABASE_URL, e.g.
//! `TEST_DATABASE_URL=postgres://localhost/huddle_test cargo test -- --ignored`

use chat_service::error::AppError;
use chat_service::models::member::{ROLE_MEMBER, ROLE_OWNER};
use chat_service::services::conversation_service::ConversationService;
use chat_service::services::invite_service::{InviteOutcome, InviteService};
use chat_service::services::member_service::{MemberService, COLOR_PALETTE};
use chat_service::services::share_service::ShareService;
use sqlx::PgPool;
use uuid::Uuid;

async fn test_pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must point at a scratch database");
    let pool = PgPool::connect(&url).await.expect("connect test database");
    chat_service::db::MIGRATOR
        .run(&pool)
        .await
        .expect("run migrations");
    pool
}

async fn create_profile(pool: &PgPool, username: &str) -> Uuid {
    let user_id = Uuid::new_v4();
    sqlx::query("INSERT INTO profiles (user_id, username) VALUES ($1, $2)")
        .bind(user_id)
        .bind(username)
        .execute(pool)
        .await
        .expect("insert profile");
    user_id
}

fn unique_username(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "requires postgres via TEST_DATABASE_URL"]
async fn enabling_collaboration_creates_owner_membership() {
    let pool = test_pool().await;
    let owner = create_profile(&pool, &unique_username("owner")).await;
    let conversation = ConversationService::create(&pool, owner, "pairing session")
        .await
        .unwrap();

    let updated = ConversationService::set_collaborative(&pool, conversation.id, owner, true)
        .await
        .unwrap();
    assert!(updated.is_collaborative);

    let members = MemberService::list_members(&pool, conversation.id).await.unwrap();
    let owner_row = members
        .iter()
        .find(|m| m.user_id == owner)
        .expect("owner membership row");
    assert_eq!(owner_row.role, ROLE_OWNER);

    // Enabling twice is idempotent.
    ConversationService::set_collaborative(&pool, conversation.id, owner, true)
        .await
        .unwrap();
    let members = MemberService::list_members(&pool, conversation.id).await.unwrap();
    assert_eq!(members.iter().filter(|m| m.user_id == owner).count(), 1);
}

#[tokio::test]
#[ignore = "requires postgres via TEST_DATABASE_URL"]
async fn invite_adds_member_with_unused_color() {
    let pool = test_pool().await;
    let owner = create_profile(&pool, &unique_username("owner")).await;
    let alice_name = unique_username("alice");
    let alice = create_profile(&pool, &alice_name).await;

    let conversation = ConversationService::create(&pool, owner, "c1").await.unwrap();
    ConversationService::set_collaborative(&pool, conversation.id, owner, true)
        .await
        .unwrap();

    // Lookup is case-insensitive.
    let outcome = InviteService::invite(&pool, conversation.id, &alice_name.to_uppercase())
        .await
        .unwrap();
    let member = match &outcome {
        InviteOutcome::Added { member, invitee } => {
            assert_eq!(*invitee, alice);
            member.clone()
        }
        other => panic!("expected Added, got {other:?}"),
    };
    assert_eq!(member.role, ROLE_MEMBER);

    // Owner holds palette[0]; the first invitee gets the next unused color.
    assert_eq!(member.color, COLOR_PALETTE[1]);

    let colors: Vec<String> = MemberService::used_colors(&pool, conversation.id).await.unwrap();
    let distinct: std::collections::HashSet<_> = colors.iter().collect();
    assert_eq!(colors.len(), distinct.len());

    // Re-inviting reports AlreadyMember but produces the same response body.
    let repeat = InviteService::invite(&pool, conversation.id, &alice_name)
        .await
        .unwrap();
    assert!(matches!(repeat, InviteOutcome::AlreadyMember { .. }));
    assert_eq!(
        repeat.uniform_response().to_string(),
        outcome.uniform_response().to_string()
    );
}

#[tokio::test]
#[ignore = "requires postgres via TEST_DATABASE_URL"]
async fn unknown_username_reports_not_found_without_side_effects() {
    let pool = test_pool().await;
    let owner = create_profile(&pool, &unique_username("owner")).await;
    let conversation = ConversationService::create(&pool, owner, "c1").await.unwrap();
    ConversationService::set_collaborative(&pool, conversation.id, owner, true)
        .await
        .unwrap();

    let outcome = InviteService::invite(&pool, conversation.id, "nobody-here")
        .await
        .unwrap();
    assert!(matches!(outcome, InviteOutcome::NotFound));

    let members = MemberService::list_members(&pool, conversation.id).await.unwrap();
    assert_eq!(members.len(), 1); // owner only
}

#[tokio::test]
#[ignore = "requires postgres via TEST_DATABASE_URL"]
async fn wrong_share_token_is_rejected_without_content() {
    let pool = test_pool().await;
    let owner = create_profile(&pool, &unique_username("owner")).await;
    let conversation = ConversationService::create(&pool, owner, "shared notes")
        .await
        .unwrap();

    let token = ShareService::issue(&pool, conversation.id).await.unwrap();

    // Correct token resolves and omits author ids.
    let view = ShareService::resolve(&pool, conversation.id, &token)
        .await
        .unwrap();
    assert_eq!(view.conversation.id, conversation.id);
    let payload = serde_json::to_value(&view).unwrap();
    assert!(payload["messages"]
        .as_array()
        .unwrap()
        .iter()
        .all(|m| m.get("author_id").is_none()));

    // A token of the right shape but wrong value is forbidden.
    let wrong = "a".repeat(token.len());
    match ShareService::resolve(&pool, conversation.id, &wrong).await {
        Err(AppError::Forbidden) => {}
        other => panic!("expected Forbidden, got {other:?}"),
    }

    // Revocation forbids even the previously valid token.
    ShareService::revoke(&pool, conversation.id).await.unwrap();
    assert!(matches!(
        ShareService::resolve(&pool, conversation.id, &token).await,
        Err(AppError::Forbidden)
    ));
}
