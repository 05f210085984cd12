use crate::housing::domain::{GroupId, MemberId, RoomId};
use crate::housing::store::StoreError;

/// Hard failures of the assignment workflow.
///
/// Validation problems are not errors; they are reported through
/// [`super::ValidationReport`] and [`super::AssignmentOutcome`]. The variants here mean
/// the request and the engine disagree about the group, or the store could not be read.
#[derive(Debug, thiserror::Error)]
pub enum AssignmentError {
    #[error("group {0} not found")]
    GroupNotFound(GroupId),
    #[error("field '{0}' is not a room assignment field")]
    MalformedField(String),
    #[error("field '{field}' carries '{value}', which is not a room id")]
    InvalidRoomValue { field: String, value: String },
    #[error("member {0} appears in more than one field")]
    DuplicateMember(MemberId),
    #[error("member {member_id} does not belong to group {group_id}")]
    MemberOutOfScope { group_id: GroupId, member_id: MemberId },
    #[error("room {0} is not part of the group's suite")]
    RoomOutOfScope(RoomId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AssignmentError {
    /// True when the caller sent something the form never produces.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            AssignmentError::MalformedField(_)
                | AssignmentError::DuplicateMember(_)
                | AssignmentError::MemberOutOfScope { .. }
                | AssignmentError::RoomOutOfScope(_)
        )
    }
}
