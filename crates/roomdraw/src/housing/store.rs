use std::collections::BTreeSet;

use super::domain::{
    Assignment, AssignmentId, Group, GroupId, Member, MemberId, Room, RoomId, Suite, SuiteId,
};

/// Read and transaction seam over the durable housing records.
///
/// Reads outside [`EntityStore::transaction`] see only committed state. Writes happen
/// exclusively through an [`AssignmentTransaction`]; the store applies every write made
/// inside `work` when it returns `Ok` and discards all of them when it returns `Err`.
pub trait EntityStore: Send + Sync {
    fn find_group(&self, id: GroupId) -> Result<Option<Group>, StoreError>;
    fn find_members(&self, group_id: GroupId) -> Result<Vec<Member>, StoreError>;
    fn find_rooms(&self, suite_id: SuiteId) -> Result<Vec<Room>, StoreError>;
    fn find_assignment(&self, member_id: MemberId) -> Result<Option<Assignment>, StoreError>;
    fn suites(&self) -> Result<Vec<Suite>, StoreError>;
    /// Suites attached to at least one draw.
    fn drawn_suite_ids(&self) -> Result<BTreeSet<SuiteId>, StoreError>;

    fn transaction<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut dyn AssignmentTransaction) -> Result<T, StoreError>;
}

/// Operations available inside one atomic unit of work.
pub trait AssignmentTransaction {
    fn find_member(&self, id: MemberId) -> Result<Option<Member>, StoreError>;
    fn find_room(&self, id: RoomId) -> Result<Option<Room>, StoreError>;
    fn find_assignment(&self, member_id: MemberId) -> Result<Option<Assignment>, StoreError>;
    /// Members currently assigned to `room_id`, including writes made in this transaction.
    fn occupants(&self, room_id: RoomId) -> Result<Vec<MemberId>, StoreError>;
    fn create_assignment(
        &mut self,
        member_id: MemberId,
        room_id: RoomId,
    ) -> Result<Assignment, StoreError>;
    fn update_assignment(
        &mut self,
        assignment_id: AssignmentId,
        room_id: RoomId,
    ) -> Result<Assignment, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("record already exists: {0}")]
    Conflict(String),
    #[error("record invalid: {0}")]
    Invalid(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
