//! End-to-end flow over the repository layer: register, login, create a
//! note, pin it, check the views, archive it, check again.

use quill_core::{
    CreateNoteRequest, CreateUserRequest, NoteQueryRepository, NoteRepository, SessionRepository,
    UserRepository,
};
use quill_db::test_fixtures::{connect_test, unique_email, FIXTURE_PASSWORD_HASH};

#[tokio::test]
async fn test_register_login_pin_archive_flow() {
    let db = connect_test().await;

    // Register user A.
    let user = db
        .users
        .create(CreateUserRequest {
            firstname: "Ada".to_string(),
            lastname: "Lovelace".to_string(),
            email: unique_email("e2e"),
            password_hash: FIXTURE_PASSWORD_HASH.to_string(),
        })
        .await
        .expect("register");

    // Login A: issue and resolve a session token.
    let issued = db.sessions.issue(user.id).await.expect("login");
    let session_user = db
        .sessions
        .resolve(&issued.token)
        .await
        .expect("resolve")
        .expect("live session");
    assert_eq!(session_user.id, user.id);

    // Create note N.
    let note = db
        .notes
        .create(
            session_user.id,
            CreateNoteRequest {
                title: "Groceries".to_string(),
                description: "Oat milk, rye bread, coffee".to_string(),
            },
        )
        .await
        .expect("create note");

    // Pin N: it appears in the pinned view and leaves the default list.
    db.notes.pin(session_user.id, note.id).await.expect("pin");

    let pinned = db.queries.pinned(&session_user).await.expect("pinned view");
    assert!(pinned.iter().any(|n| n.id == note.id));

    let active = db
        .queries
        .list_active(&session_user, 1)
        .await
        .expect("default list");
    assert!(active.notes.iter().all(|n| n.id != note.id));

    // Archive N: pinned flag clears, note moves to the archived view.
    let archived_note = db
        .notes
        .archive(session_user.id, note.id)
        .await
        .expect("archive");
    assert!(!archived_note.pinned);
    assert!(archived_note.archived);

    let pinned = db.queries.pinned(&session_user).await.expect("pinned view");
    assert!(pinned.iter().all(|n| n.id != note.id));

    let archived = db
        .queries
        .archived(&session_user, 1)
        .await
        .expect("archived view");
    assert!(archived.notes.iter().any(|n| n.id == note.id));

    // Logout ends the session.
    assert!(db.sessions.revoke(&issued.token).await.expect("logout"));
    assert!(db
        .sessions
        .resolve(&issued.token)
        .await
        .expect("resolve")
        .is_none());
}
