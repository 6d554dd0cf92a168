//! Tests for the lifecycle transition table and reason validation.

use care_shared::error::{CareError, ReasonError, ValidationError};
use care_shared::lifecycle::{validate_close_reason, Transition, TransitionKind, TRANSITION_TABLE};
use care_shared::msoc::MsocReasonCatalog;
use care_shared::snapshot::{CaseSnapshot, CaseStatus};
use care_shared::user::ActingUser;
use chrono::Utc;

fn owner() -> ActingUser {
    ActingUser::member("a@x.com")
}

fn open_case() -> CaseSnapshot {
    CaseSnapshot::open("C-42").with_assignee("a@x.com")
}

/// Plan and apply against a local snapshot.
fn run(snap: &mut CaseSnapshot, transition: Transition) -> Result<(), CareError> {
    let (_, delta) =
        transition.plan(snap, &owner(), &MsocReasonCatalog::default(), Utc::now())?;
    snap.apply(&delta);
    Ok(())
}

// === Close reason validation ===

#[test]
fn test_close_reason_messages() {
    let cases: &[(&str, &str)] = &[
        ("", "Reason cannot consist of only spaces."),
        ("   ", "Reason cannot consist of only spaces."),
        ("1234", "Reason cannot be numeric-only."),
        ("ok", "Reason must be at least 5 characters long."),
    ];
    for (input, message) in cases {
        let err = validate_close_reason(input).unwrap_err();
        assert_eq!(err.to_string(), *message, "input {:?}", input);
    }

    let long = "A".repeat(501);
    assert_eq!(
        validate_close_reason(&long).unwrap_err().to_string(),
        "Reason cannot exceed 500 characters."
    );
}

#[test]
fn test_valid_close_reason() {
    assert_eq!(validate_close_reason("Valid reason"), Ok("Valid reason".to_string()));
}

#[test]
fn test_length_counts_characters_not_bytes() {
    // Five multi-byte characters
    assert!(validate_close_reason("ñañañ").is_ok());
    assert_eq!(
        validate_close_reason(&"é".repeat(501)),
        Err(ReasonError::TooLong { max: 500 })
    );
}

// === Toggle round trips ===

#[test]
fn test_escalate_round_trip() {
    let mut snap = open_case();
    run(&mut snap, Transition::Escalate).unwrap();
    assert!(snap.escalated);
    run(&mut snap, Transition::UndoEscalate).unwrap();
    assert!(!snap.escalated);
}

#[test]
fn test_msoc_round_trip() {
    let mut snap = open_case();
    run(&mut snap, Transition::SetMsoc { reason: "Referral incomplete".into() }).unwrap();
    assert_eq!(snap.msoc.as_ref().unwrap().reason, "Referral incomplete");
    run(&mut snap, Transition::UndoMsoc).unwrap();
    assert!(!snap.is_msoc());
}

#[test]
fn test_pre_state_must_hold() {
    let mut snap = open_case().with_escalated(true);
    assert_eq!(run(&mut snap, Transition::Escalate), Err(CareError::NotPermitted));

    let mut snap = open_case();
    assert_eq!(run(&mut snap, Transition::UndoMsoc), Err(CareError::NotPermitted));
}

// === Ordering ===

#[test]
fn test_escalate_then_close_and_close_then_escalate() {
    let mut snap = open_case();
    run(&mut snap, Transition::Escalate).unwrap();
    run(&mut snap, Transition::Close { reason: "Services started".into() }).unwrap();
    assert_eq!(snap.status, CaseStatus::Closed);
    assert!(snap.escalated);

    // Closed dominates: every further transition is refused.
    for t in [
        Transition::UndoEscalate,
        Transition::SetMsoc { reason: "Other".into() },
        Transition::Close { reason: "Closing again".into() },
        Transition::Assign { assignee: "b@x.com".into() },
    ] {
        assert_eq!(run(&mut snap, t), Err(CareError::NotPermitted));
    }
}

#[test]
fn test_both_tags_together() {
    let mut snap = open_case();
    run(&mut snap, Transition::SetMsoc { reason: "Other".into() }).unwrap();
    run(&mut snap, Transition::Escalate).unwrap();
    assert!(snap.escalated && snap.is_msoc());
}

#[test]
fn test_close_records_reason_and_time() {
    let mut snap = open_case();
    run(&mut snap, Transition::Close { reason: " Patient moved away ".into() }).unwrap();
    assert_eq!(snap.close_reason.as_deref(), Some("Patient moved away"));
    assert!(snap.closed_at.is_some());
}

#[test]
fn test_short_reason_never_reaches_delta() {
    let mut snap = open_case();
    let err = run(&mut snap, Transition::Close { reason: "ok".into() }).unwrap_err();
    assert_eq!(
        err,
        CareError::Validation(ValidationError::Reason(ReasonError::TooShort { min: 5 }))
    );
    assert!(snap.is_open());
    assert_eq!(snap.generation, 0);
}

#[test]
fn test_assign_transfers_ownership() {
    let mut snap = open_case();
    run(&mut snap, Transition::Assign { assignee: "b@x.com".into() }).unwrap();
    assert_eq!(snap.assigned_to.as_ref().map(|u| u.as_str()), Some("b@x.com"));
    // Former owner lost edit rights.
    assert!(!Transition::Escalate.permitted(&snap, &owner()));
}

#[test]
fn test_table_inputs() {
    let with_input: Vec<TransitionKind> = TRANSITION_TABLE
        .iter()
        .filter(|r| r.input != care_shared::lifecycle::InputRequirement::None)
        .map(|r| r.kind)
        .collect();
    assert_eq!(
        with_input,
        vec![TransitionKind::SetMsoc, TransitionKind::Close, TransitionKind::Assign]
    );
}
