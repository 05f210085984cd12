use serde::Serialize;

use super::error::AssignmentError;
use super::form::{field_for, AssignmentRequest, GroupScope};
use crate::housing::domain::{Member, Room};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomPreview {
    pub room: Room,
    pub members: Vec<Member>,
}

/// Rooms with the members headed into them, for confirmation screens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssignmentPreview {
    pub rooms: Vec<RoomPreview>,
}

impl AssignmentPreview {
    pub fn room(&self, number: &str) -> Option<&RoomPreview> {
        self.rooms.iter().find(|entry| entry.room.number == number)
    }
}

pub fn build_preview(
    scope: &GroupScope,
    request: &AssignmentRequest,
) -> Result<AssignmentPreview, AssignmentError> {
    if let Some((member_id, value)) = request.unresolved().iter().next() {
        return Err(AssignmentError::InvalidRoomValue {
            field: field_for(*member_id),
            value: value.clone(),
        });
    }

    let mut rooms = Vec::new();

    for (room_id, member_ids) in request.members_per_room() {
        let room = scope
            .room(room_id)
            .cloned()
            .ok_or(AssignmentError::RoomOutOfScope(room_id))?;

        let members = member_ids
            .into_iter()
            .map(|member_id| {
                scope
                    .member(member_id)
                    .cloned()
                    .ok_or(AssignmentError::MemberOutOfScope {
                        group_id: scope.group.id,
                        member_id,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        rooms.push(RoomPreview { room, members });
    }

    Ok(AssignmentPreview { rooms })
}
