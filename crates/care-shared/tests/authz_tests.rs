//! Golden tests for the authorization predicate.
//!
//! Enumerates every combination of status, tags, ownership and role.

use care_shared::authz::{
    can_act, can_close, can_edit_case, can_escalate, can_set_msoc, can_undo_escalate,
    can_undo_msoc, ActionClass, Permissions,
};
use care_shared::snapshot::{CaseSnapshot, SectionName};
use care_shared::user::{ActingUser, SupervisorRoles};

const OWNER: &str = "a@x.com";

fn all_snapshots() -> Vec<CaseSnapshot> {
    let mut out = Vec::new();
    for closed in [false, true] {
        for escalated in [false, true] {
            for msoc in [false, true] {
                for assignee in [None, Some(OWNER), Some("c@x.com")] {
                    let mut snap = CaseSnapshot::open("C-1").with_escalated(escalated);
                    if msoc {
                        snap = snap.with_msoc("Other");
                    }
                    if let Some(a) = assignee {
                        snap = snap.with_assignee(a);
                    }
                    if closed {
                        snap = snap.closed("Care completed");
                    }
                    out.push(snap);
                }
            }
        }
    }
    out
}

fn all_users() -> Vec<ActingUser> {
    vec![
        ActingUser::member(OWNER),
        ActingUser::member("b@x.com"),
        ActingUser::supervisor(OWNER),
        ActingUser::supervisor("b@x.com"),
    ]
}

const ALL_CLASSES: [ActionClass; 13] = [
    ActionClass::Escalate,
    ActionClass::UndoEscalate,
    ActionClass::SetMsoc,
    ActionClass::UndoMsoc,
    ActionClass::Close,
    ActionClass::Assign,
    ActionClass::EditSection(SectionName::FollowUp),
    ActionClass::EditSection(SectionName::CareCoordination),
    ActionClass::EditSection(SectionName::CaseManager),
    ActionClass::EditSection(SectionName::ProcedureCodes),
    ActionClass::EditSection(SectionName::Notes),
    ActionClass::EditSection(SectionName::Attachments),
    ActionClass::EditSection(SectionName::Provider),
];

// === Closed dominates ===

#[test]
fn test_closed_case_denies_every_action() {
    for snap in all_snapshots().into_iter().filter(|s| s.is_closed()) {
        for user in all_users() {
            assert!(!can_edit_case(&snap, &user));
            assert!(!can_escalate(&snap, &user));
            assert!(!can_undo_escalate(&snap, &user));
            assert!(!can_set_msoc(&snap, &user));
            assert!(!can_undo_msoc(&snap, &user));
            assert!(!can_close(&snap, &user));
            for class in ALL_CLASSES {
                assert!(!can_act(&snap, &user, class), "{} allowed on closed case", class);
            }
        }
    }
}

// === Ownership and role ===

#[test]
fn test_open_case_edit_rule() {
    for snap in all_snapshots().into_iter().filter(|s| s.is_open()) {
        let owned = snap.assigned_to.as_ref().map(|a| a.as_str()) == Some(OWNER);

        assert_eq!(can_edit_case(&snap, &ActingUser::member(OWNER)), owned);
        assert!(!can_edit_case(&snap, &ActingUser::member("b@x.com")));
        assert!(can_edit_case(&snap, &ActingUser::supervisor("b@x.com")));
        assert!(can_edit_case(&snap, &ActingUser::supervisor(OWNER)));
    }
}

#[test]
fn test_tag_gates_are_exclusive_pairs() {
    let user = ActingUser::supervisor("s@x.com");
    for snap in all_snapshots().into_iter().filter(|s| s.is_open()) {
        assert_ne!(can_escalate(&snap, &user), can_undo_escalate(&snap, &user));
        assert_ne!(can_set_msoc(&snap, &user), can_undo_msoc(&snap, &user));
        assert_eq!(can_escalate(&snap, &user), !snap.escalated);
        assert_eq!(can_set_msoc(&snap, &user), !snap.is_msoc());
    }
}

#[test]
fn test_escalation_independent_of_msoc() {
    let user = ActingUser::member(OWNER);
    let plain = CaseSnapshot::open("C-1").with_assignee(OWNER);
    let tagged = plain.clone().with_msoc("Patient hospitalized");
    assert_eq!(can_escalate(&plain, &user), can_escalate(&tagged, &user));
    assert_eq!(can_undo_escalate(&plain, &user), can_undo_escalate(&tagged, &user));
}

// === Permission summary ===

#[test]
fn test_permissions_agree_with_can_act() {
    for snap in all_snapshots() {
        for user in all_users() {
            let perms = Permissions::evaluate(&snap, &user);
            for class in ALL_CLASSES {
                assert_eq!(perms.allows(class), can_act(&snap, &user, class));
            }
        }
    }
}

#[test]
fn test_supervisor_flag_from_roles() {
    let roles = SupervisorRoles::default();
    let lead = ActingUser::from_roles("b@x.com", &["member", "supervisor"], &roles);
    let snap = CaseSnapshot::open("C-1").with_assignee(OWNER);
    assert!(can_edit_case(&snap, &lead));

    let member = ActingUser::from_roles("b@x.com", &["member"], &roles);
    assert!(!can_edit_case(&snap, &member));
}
