use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::form::AssignmentRequest;
use crate::housing::domain::{Member, MemberId, Room, RoomId};

/// A broken assignment rule, reported back to the person filling in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFailure {
    IncompleteAssignment,
    UnknownRoom,
    OverCapacity,
}

impl ValidationFailure {
    pub const fn message(self) -> &'static str {
        match self {
            Self::IncompleteAssignment => "All members must have a room assigned.",
            Self::UnknownRoom => "All rooms must exist.",
            Self::OverCapacity => "All rooms must have no more members than beds.",
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    pub fn contains(&self, failure: ValidationFailure) -> bool {
        self.failures.contains(&failure)
    }

    pub fn messages(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|failure| failure.message().to_string())
            .collect()
    }
}

/// Checks completeness, room existence and bed capacity.
///
/// Every rule is evaluated; capacity is skipped when a room cannot be resolved.
pub fn validate(
    members: &[Member],
    rooms: &[Room],
    request: &AssignmentRequest,
) -> ValidationReport {
    let mut failures = Vec::new();

    let expected: BTreeSet<MemberId> = members.iter().map(|member| member.id).collect();
    let assigned: BTreeSet<MemberId> = request.member_ids().collect();
    if expected != assigned {
        failures.push(ValidationFailure::IncompleteAssignment);
    }

    let known: BTreeSet<RoomId> = rooms.iter().map(|room| room.id).collect();
    let rooms_exist = request.unresolved().is_empty()
        && request
            .mapping()
            .values()
            .all(|room_id| known.contains(room_id));

    if !rooms_exist {
        failures.push(ValidationFailure::UnknownRoom);
    } else if over_capacity(rooms, request) {
        failures.push(ValidationFailure::OverCapacity);
    }

    ValidationReport { failures }
}

fn over_capacity(rooms: &[Room], request: &AssignmentRequest) -> bool {
    request
        .members_per_room()
        .iter()
        .any(|(room_id, occupants)| {
            rooms
                .iter()
                .find(|room| room.id == *room_id)
                .is_some_and(|room| occupants.len() > room.beds as usize)
        })
}
