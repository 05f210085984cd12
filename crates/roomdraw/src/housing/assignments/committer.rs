use tracing::debug;

use super::form::AssignmentRequest;
use crate::housing::domain::Assignment;
use crate::housing::store::{AssignmentTransaction, EntityStore, StoreError};

/// Whether a commit writes first-time assignments or moves existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    Create,
    Update,
}

impl CommitMode {
    pub const fn label(self) -> &'static str {
        match self {
            CommitMode::Create => "create",
            CommitMode::Update => "update",
        }
    }
}

/// Writes the request in one transaction. Any failure leaves the store untouched.
pub fn commit<S: EntityStore>(
    store: &S,
    request: &AssignmentRequest,
    mode: CommitMode,
) -> Result<Vec<Assignment>, StoreError> {
    if let Some((member_id, value)) = request.unresolved().iter().next() {
        return Err(StoreError::Invalid(format!(
            "member {member_id} names room '{value}', which is not a room id"
        )));
    }

    store.transaction(|tx| {
        let written = match mode {
            CommitMode::Create => create_all(tx, request)?,
            CommitMode::Update => update_all(tx, request)?,
        };
        ensure_capacity(tx, request)?;
        Ok(written)
    })
}

pub fn create_assignments<S: EntityStore>(
    store: &S,
    request: &AssignmentRequest,
) -> Result<Vec<Assignment>, StoreError> {
    commit(store, request, CommitMode::Create)
}

pub fn update_assignments<S: EntityStore>(
    store: &S,
    request: &AssignmentRequest,
) -> Result<Vec<Assignment>, StoreError> {
    commit(store, request, CommitMode::Update)
}

fn create_all(
    tx: &mut dyn AssignmentTransaction,
    request: &AssignmentRequest,
) -> Result<Vec<Assignment>, StoreError> {
    let mut written = Vec::with_capacity(request.len());
    for (member_id, room_id) in request.iter() {
        if tx.find_member(member_id)?.is_none() {
            return Err(StoreError::NotFound(format!("member {member_id}")));
        }
        if tx.find_room(room_id)?.is_none() {
            return Err(StoreError::NotFound(format!("room {room_id}")));
        }
        if tx.find_assignment(member_id)?.is_some() {
            return Err(StoreError::Conflict(format!(
                "member {member_id} already has a room assignment"
            )));
        }
        written.push(tx.create_assignment(member_id, room_id)?);
    }
    Ok(written)
}

fn update_all(
    tx: &mut dyn AssignmentTransaction,
    request: &AssignmentRequest,
) -> Result<Vec<Assignment>, StoreError> {
    let mut written = Vec::with_capacity(request.len());
    for (member_id, room_id) in request.iter() {
        let existing = tx.find_assignment(member_id)?.ok_or_else(|| {
            StoreError::NotFound(format!("room assignment for member {member_id}"))
        })?;
        written.push(tx.update_assignment(existing.id, room_id)?);
    }
    Ok(written)
}

// Occupancy is re-read after the writes so a concurrent commit that already filled a
// bed fails here instead of overbooking the room.
fn ensure_capacity(
    tx: &dyn AssignmentTransaction,
    request: &AssignmentRequest,
) -> Result<(), StoreError> {
    for room_id in request.members_per_room().into_keys() {
        let room = tx
            .find_room(room_id)?
            .ok_or_else(|| StoreError::NotFound(format!("room {room_id}")))?;
        let occupied = tx.occupants(room_id)?.len();
        if occupied > room.beds as usize {
            debug!(%room_id, occupied, beds = room.beds, "capacity exceeded inside transaction");
            return Err(StoreError::Invalid(format!(
                "room {} has {} beds but {} occupants",
                room.number, room.beds, occupied
            )));
        }
    }
    Ok(())
}
