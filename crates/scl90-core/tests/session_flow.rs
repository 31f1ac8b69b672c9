//! End-to-end session tests: redeem, answer, resume, submit.

use scl90_core::{
    redeem_code, AssessmentError, AssessmentItem, AssessmentSession, AuthContext, Catalog,
    CodeRegistry, FsKvStore, KvStore, MemoryKvStore, SessionState,
};
use scl90_store::keys;

fn three_item_catalog() -> Catalog {
    Catalog::from_items(vec![
        AssessmentItem::new(1, "A", "Headaches"),
        AssessmentItem::new(2, "A", "Nervousness or shakiness inside"),
        AssessmentItem::new(3, "B", "Faintness or dizziness"),
    ])
    .unwrap()
}

fn redeemed_ctx<S: KvStore>(registry: &CodeRegistry<S>) -> AuthContext {
    let mut ctx = AuthContext::new();
    redeem_code(&mut ctx, registry, "12345678").unwrap();
    ctx
}

#[test]
fn test_full_walk_produces_reference_report() {
    let catalog = three_item_catalog();
    let store = MemoryKvStore::new();
    let registry = CodeRegistry::new(&store);
    registry.ensure_bootstrap().unwrap();
    let ctx = redeemed_ctx(&registry);

    let mut session = AssessmentSession::start(&catalog, &store, &ctx).unwrap();
    for score in [5, 3, 1] {
        session.answer_current(score).unwrap();
        session.advance().unwrap();
    }
    let report = session.submit().unwrap();

    assert_eq!(report.per_dimension["A"], 4.0);
    assert_eq!(report.per_dimension["B"], 1.0);
    assert_eq!(report.total_sum, 9);
    assert_eq!(report.total_average, 3.0);
    assert_eq!(report.positive_item_count, 2);
    assert_eq!(session.state(), SessionState::Completed);

    // Progress is cleared once the report exists.
    assert_eq!(store.get(keys::ANSWERS).unwrap(), None);
    assert_eq!(store.get(keys::CURSOR).unwrap(), None);
}

#[test]
fn test_incomplete_submit_relocates_cursor() {
    let catalog = three_item_catalog();
    let store = MemoryKvStore::new();
    let ctx = AuthContext {
        code_redeemed: true,
        is_admin: false,
    };

    let mut session = AssessmentSession::start(&catalog, &store, &ctx).unwrap();
    session.answer(1, 5).unwrap();
    session.answer(2, 3).unwrap();

    match session.submit().unwrap_err() {
        AssessmentError::IncompleteSubmission {
            missing,
            first_unanswered,
        } => {
            assert_eq!(missing, 1);
            assert_eq!(first_unanswered, 2);
        }
        other => panic!("expected IncompleteSubmission, got {other:?}"),
    }
    assert_eq!(session.view().cursor, 2);
    assert_eq!(session.state(), SessionState::InProgress);
    assert_eq!(store.get(keys::CURSOR).unwrap().as_deref(), Some("2"));
}

#[test]
fn test_answers_survive_restart() {
    let catalog = three_item_catalog();
    let dir = tempfile::tempdir().unwrap();
    let ctx = AuthContext {
        code_redeemed: true,
        is_admin: false,
    };

    {
        let store = FsKvStore::new(dir.path()).unwrap();
        let mut session = AssessmentSession::start(&catalog, store, &ctx).unwrap();
        session.answer_current(4).unwrap();
        session.advance().unwrap();
        session.answer_current(2).unwrap();
    }

    let store = FsKvStore::new(dir.path()).unwrap();
    let session = AssessmentSession::start(&catalog, store, &ctx).unwrap();
    let view = session.view();
    assert_eq!(view.cursor, 1);
    assert_eq!(view.answered, Some(2));
    assert_eq!(view.answered_count, 2);
    assert_eq!(session.answers().get(1).map(|s| s.value()), Some(4));
}

#[test]
fn test_stale_answers_are_dropped_and_rewritten() {
    let catalog = three_item_catalog();
    let store = MemoryKvStore::new();
    store.set(keys::ANSWERS, r#"{"1":3,"77":5}"#).unwrap();
    let ctx = AuthContext {
        code_redeemed: true,
        is_admin: false,
    };

    let session = AssessmentSession::start(&catalog, &store, &ctx).unwrap();
    assert_eq!(session.answers().len(), 1);
    assert!(session.answers().is_answered(1));
    assert_eq!(store.get(keys::ANSWERS).unwrap().as_deref(), Some(r#"{"1":3}"#));
}

#[test]
fn test_corrupt_answers_start_fresh() {
    let catalog = three_item_catalog();
    let store = MemoryKvStore::new();
    store.set(keys::ANSWERS, "{not json").unwrap();
    let ctx = AuthContext {
        code_redeemed: true,
        is_admin: false,
    };

    let session = AssessmentSession::start(&catalog, &store, &ctx).unwrap();
    assert!(session.answers().is_empty());
    assert_eq!(store.get(keys::ANSWERS).unwrap(), None);
}

#[test]
fn test_out_of_range_persisted_value_is_discarded() {
    let catalog = three_item_catalog();
    let store = MemoryKvStore::new();
    store.set(keys::ANSWERS, r#"{"1":0,"2":4}"#).unwrap();
    let ctx = AuthContext {
        code_redeemed: true,
        is_admin: false,
    };

    let session = AssessmentSession::start(&catalog, &store, &ctx).unwrap();
    assert!(session.answers().is_empty());
}

#[test]
fn test_session_gate_needs_redeemed_code() {
    let catalog = three_item_catalog();
    let store = MemoryKvStore::new();
    let registry = CodeRegistry::new(&store);
    registry.ensure_bootstrap().unwrap();

    let mut ctx = AuthContext::new();
    assert!(matches!(
        AssessmentSession::start(&catalog, &store, &ctx).err(),
        Some(AssessmentError::NotRedeemed)
    ));

    assert!(matches!(
        redeem_code(&mut ctx, &registry, "1234567").unwrap_err(),
        AssessmentError::MalformedCode
    ));
    assert!(AssessmentSession::start(&catalog, &store, &ctx).is_err());

    redeem_code(&mut ctx, &registry, " 87654321 ").unwrap();
    assert!(AssessmentSession::start(&catalog, &store, &ctx).is_ok());
}

#[test]
fn test_back_navigation_keeps_answers() {
    let catalog = three_item_catalog();
    let ctx = AuthContext {
        code_redeemed: true,
        is_admin: false,
    };
    let mut session = AssessmentSession::start(&catalog, MemoryKvStore::new(), &ctx).unwrap();

    session.answer_current(3).unwrap();
    session.advance().unwrap();
    let view = session.retreat().unwrap();
    assert_eq!(view.cursor, 0);
    assert_eq!(view.answered, Some(3));

    // Overwriting an answer keeps a single entry.
    session.answer_current(1).unwrap();
    assert_eq!(session.answers().len(), 1);
    assert_eq!(session.answers().get(1).map(|s| s.value()), Some(1));
}
