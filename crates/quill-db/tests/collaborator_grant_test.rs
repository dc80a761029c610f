//! Collaborator grant tests: creation rules, duplicate conflicts,
//! content-update rights, and removal.

use quill_core::{
    CollaboratorRepository, Error, NoteRepository, UpdateNoteContentRequest,
};
use quill_db::test_fixtures::{connect_test, TestDataBuilder};
use uuid::Uuid;

async fn grant_count(db: &quill_db::Database, note_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM collaborator WHERE note_id = $1")
        .bind(note_id)
        .fetch_one(db.pool())
        .await
        .expect("count collaborator rows")
}

#[tokio::test]
async fn test_add_grant_and_duplicate_conflict() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db)
        .with_user("owner")
        .await
        .with_user("collab")
        .await
        .with_note(0, "Shared", "worked on together")
        .await
        .build();

    let owner = data.users[0].id;
    let collab_email = data.users[1].email.clone();
    let note_id = data.notes[0].id;

    let grant = db
        .collaborators
        .add(owner, note_id, &collab_email)
        .await
        .expect("add collaborator");
    assert_eq!(grant.email, collab_email);
    assert_eq!(grant_count(&db, note_id).await, 1);

    match db.collaborators.add(owner, note_id, &collab_email).await {
        Err(Error::Conflict(_)) => {}
        other => panic!("expected Conflict, got {:?}", other),
    }
    assert_eq!(grant_count(&db, note_id).await, 1);
}

#[tokio::test]
async fn test_add_grant_requires_registered_email() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db)
        .with_user("owner")
        .await
        .with_note(0, "Shared", "invite someone unknown")
        .await
        .build();

    let owner = data.users[0].id;

    match db
        .collaborators
        .add(owner, data.notes[0].id, "nobody@example.com")
        .await
    {
        Err(Error::NotFound(msg)) => assert!(msg.contains("not registered")),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_add_grant_requires_note_ownership() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db)
        .with_user("owner")
        .await
        .with_user("impostor")
        .await
        .with_note(0, "Private", "not the impostor's to share")
        .await
        .build();

    let impostor = data.users[1].id;
    let impostor_email = data.users[1].email.clone();

    match db
        .collaborators
        .add(impostor, data.notes[0].id, &impostor_email)
        .await
    {
        Err(Error::NoteNotFound(_)) => {}
        other => panic!("expected NoteNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_collaborator_can_update_content() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db)
        .with_user("owner")
        .await
        .with_user("collab")
        .await
        .with_note(0, "Draft", "initial wording")
        .await
        .build();

    let owner = data.users[0].id;
    let collab = data.users[1].clone();
    let note_id = data.notes[0].id;

    db.collaborators
        .add(owner, note_id, &collab.email)
        .await
        .expect("add collaborator");

    let updated = db
        .notes
        .update_content(
            &collab,
            note_id,
            UpdateNoteContentRequest {
                title: "Draft v2".to_string(),
                description: "rewritten by the collaborator".to_string(),
            },
        )
        .await
        .expect("collaborator update");

    assert_eq!(updated.title, "Draft v2");
    // Content updates never touch state flags.
    assert!(!updated.pinned);
    assert!(!updated.archived);
}

#[tokio::test]
async fn test_stranger_cannot_update_content() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db)
        .with_user("owner")
        .await
        .with_user("stranger")
        .await
        .with_note(0, "Draft", "initial wording")
        .await
        .build();

    let stranger = data.users[1].clone();
    let note_id = data.notes[0].id;

    match db
        .notes
        .update_content(
            &stranger,
            note_id,
            UpdateNoteContentRequest {
                title: "Hijacked".to_string(),
                description: "should never land".to_string(),
            },
        )
        .await
    {
        Err(Error::NoteNotFound(_)) => {}
        other => panic!("expected NoteNotFound, got {:?}", other),
    }

    // The note is untouched.
    let note = db
        .notes
        .fetch(data.users[0].id, note_id)
        .await
        .expect("fetch");
    assert_eq!(note.title, "Draft");
}

#[tokio::test]
async fn test_remove_grant() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db)
        .with_user("owner")
        .await
        .with_user("collab")
        .await
        .with_note(0, "Shared", "soon unshared")
        .await
        .build();

    let owner = data.users[0].id;
    let collab_email = data.users[1].email.clone();
    let note_id = data.notes[0].id;

    db.collaborators
        .add(owner, note_id, &collab_email)
        .await
        .expect("add");
    db.collaborators
        .remove(owner, note_id, &collab_email)
        .await
        .expect("remove");
    assert_eq!(grant_count(&db, note_id).await, 0);

    match db.collaborators.remove(owner, note_id, &collab_email).await {
        Err(Error::NotFound(_)) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_note_delete_cascades_grants() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db)
        .with_user("owner")
        .await
        .with_user("collab")
        .await
        .with_note(0, "Doomed", "deleted with its grants")
        .await
        .build();

    let owner = data.users[0].id;
    let note_id = data.notes[0].id;

    db.collaborators
        .add(owner, note_id, &data.users[1].email)
        .await
        .expect("add");
    db.notes.delete(owner, note_id).await.expect("delete note");

    assert_eq!(grant_count(&db, note_id).await, 0);
}

#[tokio::test]
async fn test_is_collaborator() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db)
        .with_user("owner")
        .await
        .with_user("collab")
        .await
        .with_note(0, "Shared", "membership check")
        .await
        .build();

    let owner = data.users[0].id;
    let note_id = data.notes[0].id;
    let collab_email = data.users[1].email.clone();

    assert!(!db
        .collaborators
        .is_collaborator(note_id, &collab_email)
        .await
        .expect("is_collaborator"));

    db.collaborators
        .add(owner, note_id, &collab_email)
        .await
        .expect("add");

    assert!(db
        .collaborators
        .is_collaborator(note_id, &collab_email)
        .await
        .expect("is_collaborator"));
}
