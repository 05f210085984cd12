use super::common::*;
use crate::housing::assignments::{
    AssignmentError, AssignmentOutcome, RedirectTarget, RoomAssignmentService, SUCCESS_NOTICE,
};
use crate::housing::domain::{GroupId, RoomId};
use crate::housing::store::StoreError;
use std::collections::BTreeMap;
use std::sync::Arc;

#[test]
fn assign_commits_and_redirects_to_the_draw() {
    let (service, store) = build_service();

    let outcome = service
        .assign(TRIO, &valid_trio_fields())
        .expect("assign runs");

    assert_eq!(
        outcome,
        AssignmentOutcome::Assigned {
            redirect: RedirectTarget::Draw {
                draw_id: FALL_DRAW,
                group_id: TRIO,
            },
            notice: SUCCESS_NOTICE.to_string(),
        }
    );
    assert_eq!(committed_rooms(&store).len(), 3);
}

#[test]
fn group_without_draw_redirects_to_itself() {
    let (service, _) = build_service();
    let members = quint_members();

    let outcome = service
        .assign(
            QUINT,
            &fields(&[
                (members[0], Q_TRIPLE),
                (members[1], Q_TRIPLE),
                (members[2], Q_DOUBLE),
                (members[3], Q_DOUBLE),
                (members[4], Q_TRIPLE),
            ]),
        )
        .expect("assign runs");

    match outcome {
        AssignmentOutcome::Assigned { redirect, .. } => {
            assert_eq!(redirect, RedirectTarget::Group { group_id: QUINT });
            assert_eq!(redirect.path(), "/groups/20");
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[test]
fn invalid_mapping_is_rejected_without_writes() {
    let (service, store) = build_service();

    let outcome = service
        .assign(TRIO, &fields(&[(A, R1), (B, R1), (C, R1)]))
        .expect("assign runs");

    match &outcome {
        AssignmentOutcome::Rejected { errors, .. } => {
            assert_eq!(
                errors,
                &vec!["All rooms must have no more members than beds.".to_string()]
            );
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    let message = outcome.error_message().expect("message present");
    assert!(message.contains("no more members than beds"));
    assert!(store.assignments().expect("list").is_empty());
}

#[test]
fn non_numeric_room_is_rejected_without_writes() {
    let (service, store) = build_service();
    let mut submitted = fields(&[(A, R1), (B, R1)]);
    submitted.insert("room_id_for_3".to_string(), "abc".to_string());

    let outcome = service.assign(TRIO, &submitted).expect("assign runs");

    assert_eq!(
        outcome,
        AssignmentOutcome::Rejected {
            error: "Please review the errors below:\nAll rooms must exist.".to_string(),
            errors: vec!["All rooms must exist.".to_string()],
        }
    );
    assert!(store.assignments().expect("list").is_empty());

    let preview = service.preview(TRIO, &submitted).expect("preview runs");
    assert!(!preview.valid);
    assert!(preview.preview.is_none());
}

#[test]
fn second_assign_fails_as_duplicate_and_keeps_first_commit() {
    let (service, store) = build_service();
    service
        .assign(TRIO, &valid_trio_fields())
        .expect("first assign");
    let before = store.assignments().expect("list");

    let outcome = service
        .assign(TRIO, &fields(&[(A, R2), (B, R1), (C, R1)]))
        .expect("second assign runs");

    match &outcome {
        AssignmentOutcome::Failed { error } => {
            assert!(error.contains("already has a room assignment"));
        }
        other => panic!("expected persistence failure, got {other:?}"),
    }
    assert_eq!(store.assignments().expect("list"), before);
}

#[test]
fn reassign_requires_existing_assignments() {
    let (service, store) = build_service();

    let outcome = service
        .reassign(TRIO, &valid_trio_fields())
        .expect("reassign runs");

    match &outcome {
        AssignmentOutcome::Failed { error } => assert!(error.contains("record not found")),
        other => panic!("expected not found failure, got {other:?}"),
    }
    assert!(store.assignments().expect("list").is_empty());
}

#[test]
fn reassign_moves_existing_assignments() {
    let (service, store) = build_service();
    service
        .assign(TRIO, &valid_trio_fields())
        .expect("first assign");

    let outcome = service
        .reassign(TRIO, &fields(&[(A, R2), (B, R1), (C, R1)]))
        .expect("reassign runs");

    assert!(outcome.is_success());
    let rooms = committed_rooms(&store);
    assert_eq!(rooms.get(&A), Some(&R2));
    assert_eq!(rooms.get(&B), Some(&R1));
    assert_eq!(rooms.get(&C), Some(&R1));
    assert_eq!(store.assignments().expect("list").len(), 3);
}

#[test]
fn reassign_validates_before_touching_the_store() {
    let (service, store) = build_service();
    service
        .assign(TRIO, &valid_trio_fields())
        .expect("first assign");
    let before = store.assignments().expect("list");

    let outcome = service
        .reassign(TRIO, &fields(&[(A, R2), (B, R2)]))
        .expect("reassign runs");

    match outcome {
        AssignmentOutcome::Rejected { errors, .. } => assert_eq!(errors.len(), 2),
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(store.assignments().expect("list"), before);
}

#[test]
fn malformed_fields_surface_as_errors() {
    let (service, store) = build_service();
    let mut submitted = valid_trio_fields();
    submitted.insert("room_choice".to_string(), R1.to_string());

    match service.assign(TRIO, &submitted) {
        Err(err @ AssignmentError::MalformedField(_)) => assert!(err.is_contract_violation()),
        other => panic!("expected malformed field error, got {other:?}"),
    }
    assert!(store.assignments().expect("list").is_empty());
}

#[test]
fn unknown_group_is_not_found() {
    let (service, _) = build_service();
    assert!(matches!(
        service.assign(GroupId(404), &valid_trio_fields()),
        Err(AssignmentError::GroupNotFound(GroupId(404)))
    ));
}

#[test]
fn unavailable_store_propagates() {
    let service = RoomAssignmentService::new(Arc::new(UnavailableStore));
    match service.prepare(TRIO, &valid_trio_fields()) {
        Err(AssignmentError::Store(StoreError::Unavailable(reason))) => {
            assert_eq!(reason, "database offline")
        }
        other => panic!("expected unavailable store, got {other:?}"),
    }
}

#[test]
fn preview_groups_members_by_room() {
    let (service, store) = build_service();

    let response = service
        .preview(TRIO, &valid_trio_fields())
        .expect("preview builds");

    assert!(response.valid);
    let preview = response.preview.expect("preview present");
    let names = |number: &str| -> Vec<String> {
        preview
            .room(number)
            .expect("room in preview")
            .members
            .iter()
            .map(|member| member.name.clone())
            .collect()
    };
    assert_eq!(preview.rooms.len(), 2);
    assert_eq!(names("100A"), vec!["Avery", "Blake"]);
    assert_eq!(names("100B"), vec!["Casey"]);
    assert!(store.assignments().expect("list").is_empty());
}

#[test]
fn preview_of_invalid_mapping_carries_errors_only() {
    let (service, _) = build_service();

    let response = service
        .preview(TRIO, &fields(&[(A, R1), (B, RoomId(77))]))
        .expect("preview runs");

    assert!(!response.valid);
    assert!(response.preview.is_none());
    assert_eq!(
        response.errors,
        vec![
            "All members must have a room assigned.".to_string(),
            "All rooms must exist.".to_string()
        ]
    );
}

#[test]
fn preview_rejects_rooms_outside_the_suite() {
    let (service, _) = build_service();
    let form = service.form(TRIO).expect("form loads");
    let mut mapping = BTreeMap::new();
    mapping.insert(A, Q_TRIPLE);
    let request = crate::housing::assignments::AssignmentRequest::new(TRIO, mapping);

    assert!(matches!(
        form.preview(&request),
        Err(AssignmentError::RoomOutOfScope(room)) if room == Q_TRIPLE
    ));
}

#[test]
fn current_view_reflects_committed_rooms() {
    let (service, _) = build_service();

    let before = service.current(TRIO).expect("current view");
    assert!(!before.valid);
    assert!(before.fields.values().all(String::is_empty));
    assert_eq!(
        before.errors,
        vec!["All members must have a room assigned.".to_string()]
    );

    service
        .assign(TRIO, &valid_trio_fields())
        .expect("assign runs");

    let after = service.current(TRIO).expect("current view");
    assert!(after.valid);
    assert_eq!(after.fields, valid_trio_fields());
    assert_eq!(after.field_ids.len(), 3);
}
