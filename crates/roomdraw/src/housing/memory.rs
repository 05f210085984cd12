use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::debug;

use super::domain::{
    Assignment, AssignmentId, Draw, DrawId, Group, GroupId, Member, MemberId, Room, RoomId,
    Suite, SuiteId,
};
use super::store::{AssignmentTransaction, EntityStore, StoreError};

#[derive(Debug, Clone, Default)]
struct Tables {
    draws: BTreeMap<DrawId, Draw>,
    suites: BTreeMap<SuiteId, Suite>,
    draw_suites: BTreeSet<(DrawId, SuiteId)>,
    rooms: BTreeMap<RoomId, Room>,
    groups: BTreeMap<GroupId, Group>,
    members: BTreeMap<MemberId, Member>,
    assignments: BTreeMap<AssignmentId, Assignment>,
    next_assignment_id: u64,
}

impl Tables {
    fn assignment_for(&self, member_id: MemberId) -> Option<&Assignment> {
        self.assignments
            .values()
            .find(|assignment| assignment.member_id == member_id)
    }
}

/// Entity store kept in process memory.
///
/// A transaction runs against a copy of the tables while holding the store lock, so
/// commits are serialized and a failed unit of work never touches the shared state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntityStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }

    pub fn insert_draw(&self, draw: Draw) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.draws.contains_key(&draw.id) {
            return Err(StoreError::Conflict(format!("draw {}", draw.id)));
        }
        tables.draws.insert(draw.id, draw);
        Ok(())
    }

    pub fn insert_suite(&self, suite: Suite) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.suites.contains_key(&suite.id) {
            return Err(StoreError::Conflict(format!("suite {}", suite.id)));
        }
        tables.suites.insert(suite.id, suite);
        Ok(())
    }

    pub fn attach_suite(&self, draw_id: DrawId, suite_id: SuiteId) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if !tables.draws.contains_key(&draw_id) {
            return Err(StoreError::NotFound(format!("draw {draw_id}")));
        }
        if !tables.suites.contains_key(&suite_id) {
            return Err(StoreError::NotFound(format!("suite {suite_id}")));
        }
        tables.draw_suites.insert((draw_id, suite_id));
        Ok(())
    }

    pub fn insert_room(&self, room: Room) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if !tables.suites.contains_key(&room.suite_id) {
            return Err(StoreError::NotFound(format!("suite {}", room.suite_id)));
        }
        if tables.rooms.contains_key(&room.id) {
            return Err(StoreError::Conflict(format!("room {}", room.id)));
        }
        tables.rooms.insert(room.id, room);
        Ok(())
    }

    pub fn insert_group(&self, group: Group) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if !tables.suites.contains_key(&group.suite_id) {
            return Err(StoreError::NotFound(format!("suite {}", group.suite_id)));
        }
        if let Some(draw_id) = group.draw_id {
            if !tables.draws.contains_key(&draw_id) {
                return Err(StoreError::NotFound(format!("draw {draw_id}")));
            }
        }
        if tables.groups.contains_key(&group.id) {
            return Err(StoreError::Conflict(format!("group {}", group.id)));
        }
        tables.groups.insert(group.id, group);
        Ok(())
    }

    pub fn insert_member(&self, member: Member) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if !tables.groups.contains_key(&member.group_id) {
            return Err(StoreError::NotFound(format!("group {}", member.group_id)));
        }
        if tables.members.contains_key(&member.id) {
            return Err(StoreError::Conflict(format!("member {}", member.id)));
        }
        tables.members.insert(member.id, member);
        Ok(())
    }

    /// Removes a member and any assignment it holds.
    pub fn remove_member(&self, member_id: MemberId) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.members.remove(&member_id).is_none() {
            return Err(StoreError::NotFound(format!("member {member_id}")));
        }
        tables
            .assignments
            .retain(|_, assignment| assignment.member_id != member_id);
        Ok(())
    }

    /// Committed assignments ordered by id.
    pub fn assignments(&self) -> Result<Vec<Assignment>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.assignments.values().cloned().collect())
    }
}

impl EntityStore for InMemoryEntityStore {
    fn find_group(&self, id: GroupId) -> Result<Option<Group>, StoreError> {
        Ok(self.lock()?.groups.get(&id).cloned())
    }

    fn find_members(&self, group_id: GroupId) -> Result<Vec<Member>, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .members
            .values()
            .filter(|member| member.group_id == group_id)
            .cloned()
            .collect())
    }

    fn find_rooms(&self, suite_id: SuiteId) -> Result<Vec<Room>, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .rooms
            .values()
            .filter(|room| room.suite_id == suite_id)
            .cloned()
            .collect())
    }

    fn find_assignment(&self, member_id: MemberId) -> Result<Option<Assignment>, StoreError> {
        Ok(self.lock()?.assignment_for(member_id).cloned())
    }

    fn suites(&self) -> Result<Vec<Suite>, StoreError> {
        Ok(self.lock()?.suites.values().cloned().collect())
    }

    fn drawn_suite_ids(&self) -> Result<BTreeSet<SuiteId>, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .draw_suites
            .iter()
            .map(|(_, suite_id)| *suite_id)
            .collect())
    }

    fn transaction<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut dyn AssignmentTransaction) -> Result<T, StoreError>,
    {
        let mut committed = self.lock()?;
        let mut transaction = MemoryTransaction {
            tables: (*committed).clone(),
        };

        match work(&mut transaction) {
            Ok(value) => {
                *committed = transaction.tables;
                Ok(value)
            }
            Err(err) => {
                debug!(error = %err, "in-memory transaction rolled back");
                Err(err)
            }
        }
    }
}

struct MemoryTransaction {
    tables: Tables,
}

impl AssignmentTransaction for MemoryTransaction {
    fn find_member(&self, id: MemberId) -> Result<Option<Member>, StoreError> {
        Ok(self.tables.members.get(&id).cloned())
    }

    fn find_room(&self, id: RoomId) -> Result<Option<Room>, StoreError> {
        Ok(self.tables.rooms.get(&id).cloned())
    }

    fn find_assignment(&self, member_id: MemberId) -> Result<Option<Assignment>, StoreError> {
        Ok(self.tables.assignment_for(member_id).cloned())
    }

    fn occupants(&self, room_id: RoomId) -> Result<Vec<MemberId>, StoreError> {
        Ok(self
            .tables
            .assignments
            .values()
            .filter(|assignment| assignment.room_id == room_id)
            .map(|assignment| assignment.member_id)
            .collect())
    }

    fn create_assignment(
        &mut self,
        member_id: MemberId,
        room_id: RoomId,
    ) -> Result<Assignment, StoreError> {
        if !self.tables.members.contains_key(&member_id) {
            return Err(StoreError::NotFound(format!("member {member_id}")));
        }
        if !self.tables.rooms.contains_key(&room_id) {
            return Err(StoreError::NotFound(format!("room {room_id}")));
        }
        if self.tables.assignment_for(member_id).is_some() {
            return Err(StoreError::Conflict(format!(
                "member {member_id} already has a room assignment"
            )));
        }

        self.tables.next_assignment_id += 1;
        let now = Utc::now();
        let assignment = Assignment {
            id: AssignmentId(self.tables.next_assignment_id),
            member_id,
            room_id,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .assignments
            .insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    fn update_assignment(
        &mut self,
        assignment_id: AssignmentId,
        room_id: RoomId,
    ) -> Result<Assignment, StoreError> {
        if !self.tables.rooms.contains_key(&room_id) {
            return Err(StoreError::NotFound(format!("room {room_id}")));
        }
        let assignment = self
            .tables
            .assignments
            .get_mut(&assignment_id)
            .ok_or_else(|| StoreError::NotFound(format!("room assignment {assignment_id}")))?;
        assignment.room_id = room_id;
        assignment.updated_at = Utc::now();
        Ok(assignment.clone())
    }
}
