//! Authorization gate tests: token issue/resolve/revoke and the one-time
//! password-reset token lifecycle.

use quill_core::SessionRepository;
use quill_db::test_fixtures::{connect_test, TestDataBuilder};

#[tokio::test]
async fn test_issue_and_resolve_token() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db).with_user("session").await.build();
    let user = &data.users[0];

    let issued = db.sessions.issue(user.id).await.expect("issue");
    assert!(issued.token.starts_with("qn_at_"));
    // The stored record carries the hash, never the token itself.
    assert_ne!(issued.session.token_hash, issued.token);

    let resolved = db
        .sessions
        .resolve(&issued.token)
        .await
        .expect("resolve")
        .expect("token should resolve");
    assert_eq!(resolved.id, user.id);
    assert_eq!(resolved.email, user.email);
}

#[tokio::test]
async fn test_resolve_rejects_garbage_tokens() {
    let db = connect_test().await;

    assert!(db.sessions.resolve("").await.expect("resolve").is_none());
    assert!(db
        .sessions
        .resolve("not-a-token")
        .await
        .expect("resolve")
        .is_none());
    assert!(db
        .sessions
        .resolve("qn_at_00000000000000000000000000000000000000000000000000")
        .await
        .expect("resolve")
        .is_none());
}

#[tokio::test]
async fn test_revoked_token_stops_resolving() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db).with_user("logout").await.build();

    let issued = db.sessions.issue(data.users[0].id).await.expect("issue");
    assert!(db
        .sessions
        .resolve(&issued.token)
        .await
        .expect("resolve")
        .is_some());

    assert!(db.sessions.revoke(&issued.token).await.expect("revoke"));
    assert!(db
        .sessions
        .resolve(&issued.token)
        .await
        .expect("resolve")
        .is_none());

    // Revoking again reports nothing left to revoke.
    assert!(!db.sessions.revoke(&issued.token).await.expect("revoke"));
}

#[tokio::test]
async fn test_expired_token_stops_resolving() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db).with_user("expiry").await.build();

    let issued = db.sessions.issue(data.users[0].id).await.expect("issue");

    // Force the session into the past.
    sqlx::query("UPDATE session SET expires_at = now() - interval '1 hour' WHERE id = $1")
        .bind(issued.session.id)
        .execute(db.pool())
        .await
        .expect("expire session");

    assert!(db
        .sessions
        .resolve(&issued.token)
        .await
        .expect("resolve")
        .is_none());
}

#[tokio::test]
async fn test_reset_token_is_single_use() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db).with_user("reset").await.build();
    let user_id = data.users[0].id;

    let token = db
        .sessions
        .create_reset_token(user_id)
        .await
        .expect("create reset token");
    assert!(token.starts_with("qn_rt_"));

    let consumed = db
        .sessions
        .consume_reset_token(&token)
        .await
        .expect("consume");
    assert_eq!(consumed, Some(user_id));

    // Second use fails.
    let again = db
        .sessions
        .consume_reset_token(&token)
        .await
        .expect("consume again");
    assert_eq!(again, None);
}

#[tokio::test]
async fn test_expired_reset_token_is_rejected() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db).with_user("reset").await.build();
    let user_id = data.users[0].id;

    let token = db
        .sessions
        .create_reset_token(user_id)
        .await
        .expect("create reset token");

    sqlx::query(
        "UPDATE password_reset SET expires_at = now() - interval '1 minute' WHERE user_id = $1",
    )
    .bind(user_id)
    .execute(db.pool())
    .await
    .expect("expire reset token");

    let consumed = db
        .sessions
        .consume_reset_token(&token)
        .await
        .expect("consume");
    assert_eq!(consumed, None);
}

#[tokio::test]
async fn test_session_tokens_are_unique_per_issue() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db).with_user("multi").await.build();
    let user_id = data.users[0].id;

    let a = db.sessions.issue(user_id).await.expect("issue a");
    let b = db.sessions.issue(user_id).await.expect("issue b");
    assert_ne!(a.token, b.token);

    // Revoking one leaves the other live.
    db.sessions.revoke(&a.token).await.expect("revoke a");
    assert!(db
        .sessions
        .resolve(&b.token)
        .await
        .expect("resolve")
        .is_some());
}
