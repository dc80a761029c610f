//! State-flag transition tests: pinned/archived exclusivity, atomic
//! transitions, idempotent no-ops, and colour handling.

use quill_core::{Error, NoteRepository};
use quill_db::test_fixtures::{connect_test, TestDataBuilder};
use uuid::Uuid;

#[tokio::test]
async fn test_pin_clears_archived_atomically() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db)
        .with_user("flags")
        .await
        .with_note(0, "Groceries", "Oat milk, rye bread")
        .await
        .build();

    let owner = data.users[0].id;
    let note_id = data.notes[0].id;

    let archived = db.notes.archive(owner, note_id).await.expect("archive");
    assert!(archived.archived);
    assert!(!archived.pinned);

    // Pinning an archived note clears archived in the same statement.
    let pinned = db.notes.pin(owner, note_id).await.expect("pin");
    assert!(pinned.pinned);
    assert!(!pinned.archived);
}

#[tokio::test]
async fn test_archive_clears_pinned_atomically() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db)
        .with_user("flags")
        .await
        .with_note(0, "Meeting notes", "Quarterly planning")
        .await
        .build();

    let owner = data.users[0].id;
    let note_id = data.notes[0].id;

    db.notes.pin(owner, note_id).await.expect("pin");
    let archived = db.notes.archive(owner, note_id).await.expect("archive");

    assert!(archived.archived);
    assert!(!archived.pinned);
}

#[tokio::test]
async fn test_flags_are_never_both_set() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db)
        .with_user("flags")
        .await
        .with_note(0, "Invariant", "pinned and archived never coexist")
        .await
        .build();

    let owner = data.users[0].id;
    let note_id = data.notes[0].id;

    // Walk through every transition and check the invariant after each.
    for _ in 0..2 {
        let n = db.notes.pin(owner, note_id).await.expect("pin");
        assert!(!(n.pinned && n.archived));
        let n = db.notes.archive(owner, note_id).await.expect("archive");
        assert!(!(n.pinned && n.archived));
        let n = db.notes.unarchive(owner, note_id).await.expect("unarchive");
        assert!(!(n.pinned && n.archived));
        let n = db.notes.unpin(owner, note_id).await.expect("unpin");
        assert!(!(n.pinned && n.archived));
    }
}

#[tokio::test]
async fn test_transitions_are_idempotent_no_ops() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db)
        .with_user("flags")
        .await
        .with_note(0, "Idempotent", "repeat transitions silently no-op")
        .await
        .build();

    let owner = data.users[0].id;
    let note_id = data.notes[0].id;

    let first = db.notes.pin(owner, note_id).await.expect("pin");
    let second = db.notes.pin(owner, note_id).await.expect("pin again");
    assert!(first.pinned && second.pinned);

    let first = db.notes.unpin(owner, note_id).await.expect("unpin");
    let second = db.notes.unpin(owner, note_id).await.expect("unpin again");
    assert!(!first.pinned && !second.pinned);
}

#[tokio::test]
async fn test_transition_on_missing_note_fails() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db).with_user("flags").await.build();

    let owner = data.users[0].id;
    let missing = Uuid::new_v4();

    match db.notes.pin(owner, missing).await {
        Err(Error::NoteNotFound(id)) => assert_eq!(id, missing),
        other => panic!("expected NoteNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_transition_is_owner_only() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db)
        .with_user("owner")
        .await
        .with_user("stranger")
        .await
        .with_note(0, "Private", "only the owner may pin this")
        .await
        .build();

    let stranger = data.users[1].id;
    let note_id = data.notes[0].id;

    // A foreign note reads as not-found, not as forbidden.
    match db.notes.archive(stranger, note_id).await {
        Err(Error::NoteNotFound(_)) => {}
        other => panic!("expected NoteNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_set_colour_from_palette() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db)
        .with_user("colour")
        .await
        .with_note(0, "Palette", "colour me purple")
        .await
        .build();

    let owner = data.users[0].id;
    let note_id = data.notes[0].id;

    let note = db
        .notes
        .set_colour(owner, note_id, "Purple")
        .await
        .expect("set colour");
    assert_eq!(note.colour, "rgb(128,0,128)");
}

#[tokio::test]
async fn test_set_colour_unknown_name_leaves_note_unchanged() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db)
        .with_user("colour")
        .await
        .with_note(0, "Palette", "neon is not a colour we know")
        .await
        .build();

    let owner = data.users[0].id;
    let note_id = data.notes[0].id;

    db.notes
        .set_colour(owner, note_id, "teal")
        .await
        .expect("set colour");

    match db.notes.set_colour(owner, note_id, "neon").await {
        Err(Error::InvalidColour(name)) => assert_eq!(name, "neon"),
        other => panic!("expected InvalidColour, got {:?}", other),
    }

    // Prior colour survives the rejected update.
    let note = db.notes.fetch(owner, note_id).await.expect("fetch");
    assert_eq!(note.colour, "rgb(0,128,128)");
}

#[tokio::test]
async fn test_delete_is_owner_scoped() {
    let db = connect_test().await;
    let data = TestDataBuilder::new(&db)
        .with_user("owner")
        .await
        .with_user("other")
        .await
        .with_note(0, "Keep", "deletion requires ownership")
        .await
        .build();

    let owner = data.users[0].id;
    let other = data.users[1].id;
    let note_id = data.notes[0].id;

    match db.notes.delete(other, note_id).await {
        Err(Error::NoteNotFound(_)) => {}
        other => panic!("expected NoteNotFound, got {:?}", other),
    }

    // Still there for the owner, then actually deletable.
    db.notes.fetch(owner, note_id).await.expect("fetch");
    db.notes.delete(owner, note_id).await.expect("delete");

    match db.notes.fetch(owner, note_id).await {
        Err(Error::NoteNotFound(_)) => {}
        other => panic!("expected NoteNotFound after delete, got {:?}", other),
    }
}
