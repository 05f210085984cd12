use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::housing::assignments::{room_assignment_router, RoomAssignmentService};
use crate::housing::domain::{
    Assignment, AssignmentId, Draw, DrawId, Group, GroupId, Member, MemberId, Room, RoomId,
    Suite, SuiteId,
};
use crate::housing::memory::InMemoryEntityStore;
use crate::housing::store::{AssignmentTransaction, EntityStore, StoreError};

pub(super) const FALL_DRAW: DrawId = DrawId(7);

pub(super) const TRIO: GroupId = GroupId(10);
pub(super) const QUINT: GroupId = GroupId(20);
pub(super) const EMPTY: GroupId = GroupId(30);
pub(super) const SOLO: GroupId = GroupId(40);

pub(super) const TRIO_SUITE: SuiteId = SuiteId(100);
pub(super) const QUINT_SUITE: SuiteId = SuiteId(200);

pub(super) const A: MemberId = MemberId(1);
pub(super) const B: MemberId = MemberId(2);
pub(super) const C: MemberId = MemberId(3);
pub(super) const D: MemberId = MemberId(4);

pub(super) const R1: RoomId = RoomId(1001);
pub(super) const R2: RoomId = RoomId(1002);

pub(super) const Q_TRIPLE: RoomId = RoomId(2001);
pub(super) const Q_DOUBLE: RoomId = RoomId(2002);
pub(super) const Q_CLOSET: RoomId = RoomId(2003);

pub(super) fn quint_members() -> [MemberId; 5] {
    [
        MemberId(21),
        MemberId(22),
        MemberId(23),
        MemberId(24),
        MemberId(25),
    ]
}

fn room(id: RoomId, suite_id: SuiteId, number: &str, beds: u32) -> Room {
    Room {
        id,
        suite_id,
        number: number.to_string(),
        beds,
    }
}

fn member(id: MemberId, group_id: GroupId, name: &str) -> Member {
    Member {
        id,
        group_id,
        name: name.to_string(),
    }
}

/// Trio {A, B, C} in a suite with R1 (2 beds) and R2 (1 bed), attached to the fall draw.
/// Solo {D} shares that suite. Quint (five members, no draw) lives in a second suite
/// with a triple, a double and a zero-bed closet. Empty has no members.
pub(super) fn scenario_store() -> InMemoryEntityStore {
    let store = InMemoryEntityStore::new();
    store
        .insert_draw(Draw {
            id: FALL_DRAW,
            name: "Fall Draw".to_string(),
        })
        .expect("draw");
    store
        .insert_suite(Suite {
            id: TRIO_SUITE,
            number: "Suite 100".to_string(),
        })
        .expect("trio suite");
    store
        .insert_suite(Suite {
            id: QUINT_SUITE,
            number: "Suite 200".to_string(),
        })
        .expect("quint suite");
    store
        .attach_suite(FALL_DRAW, TRIO_SUITE)
        .expect("attach suite");

    for room in [
        room(R1, TRIO_SUITE, "100A", 2),
        room(R2, TRIO_SUITE, "100B", 1),
        room(Q_TRIPLE, QUINT_SUITE, "200A", 3),
        room(Q_DOUBLE, QUINT_SUITE, "200B", 2),
        room(Q_CLOSET, QUINT_SUITE, "200C", 0),
    ] {
        store.insert_room(room).expect("room");
    }

    for group in [
        Group {
            id: TRIO,
            name: "Trio".to_string(),
            suite_id: TRIO_SUITE,
            draw_id: Some(FALL_DRAW),
        },
        Group {
            id: QUINT,
            name: "Quint".to_string(),
            suite_id: QUINT_SUITE,
            draw_id: None,
        },
        Group {
            id: EMPTY,
            name: "Empty".to_string(),
            suite_id: QUINT_SUITE,
            draw_id: None,
        },
        Group {
            id: SOLO,
            name: "Solo".to_string(),
            suite_id: TRIO_SUITE,
            draw_id: Some(FALL_DRAW),
        },
    ] {
        store.insert_group(group).expect("group");
    }

    for entry in [
        member(A, TRIO, "Avery"),
        member(B, TRIO, "Blake"),
        member(C, TRIO, "Casey"),
        member(D, SOLO, "Devon"),
    ] {
        store.insert_member(entry).expect("member");
    }
    for (index, id) in quint_members().into_iter().enumerate() {
        store
            .insert_member(member(id, QUINT, &format!("Quint {}", index + 1)))
            .expect("quint member");
    }

    store
}

pub(super) fn build_service() -> (
    RoomAssignmentService<InMemoryEntityStore>,
    Arc<InMemoryEntityStore>,
) {
    let store = Arc::new(scenario_store());
    let service = RoomAssignmentService::new(store.clone());
    (service, store)
}

/// Form fields for `pairs`, as the assignment form would submit them.
pub(super) fn fields(pairs: &[(MemberId, RoomId)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(member_id, room_id)| (format!("room_id_for_{member_id}"), room_id.to_string()))
        .collect()
}

pub(super) fn valid_trio_fields() -> BTreeMap<String, String> {
    fields(&[(A, R1), (B, R1), (C, R2)])
}

pub(super) fn committed_rooms(store: &InMemoryEntityStore) -> BTreeMap<MemberId, RoomId> {
    store
        .assignments()
        .expect("list assignments")
        .into_iter()
        .map(|assignment| (assignment.member_id, assignment.room_id))
        .collect()
}

/// Wraps the in-memory store and fails the `fail_on`-th write of every transaction.
pub(super) struct FailingWriteStore {
    pub(super) inner: InMemoryEntityStore,
    pub(super) fail_on: usize,
}

impl EntityStore for FailingWriteStore {
    fn find_group(&self, id: GroupId) -> Result<Option<Group>, StoreError> {
        self.inner.find_group(id)
    }

    fn find_members(&self, group_id: GroupId) -> Result<Vec<Member>, StoreError> {
        self.inner.find_members(group_id)
    }

    fn find_rooms(&self, suite_id: SuiteId) -> Result<Vec<Room>, StoreError> {
        self.inner.find_rooms(suite_id)
    }

    fn find_assignment(&self, member_id: MemberId) -> Result<Option<Assignment>, StoreError> {
        self.inner.find_assignment(member_id)
    }

    fn suites(&self) -> Result<Vec<Suite>, StoreError> {
        self.inner.suites()
    }

    fn drawn_suite_ids(&self) -> Result<BTreeSet<SuiteId>, StoreError> {
        self.inner.drawn_suite_ids()
    }

    fn transaction<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut dyn AssignmentTransaction) -> Result<T, StoreError>,
    {
        let fail_on = self.fail_on;
        self.inner.transaction(move |tx| {
            let mut counting = CountingTransaction {
                inner: tx,
                writes: 0,
                fail_on,
            };
            work(&mut counting)
        })
    }
}

struct CountingTransaction<'a> {
    inner: &'a mut dyn AssignmentTransaction,
    writes: usize,
    fail_on: usize,
}

impl CountingTransaction<'_> {
    fn record_write(&mut self) -> Result<(), StoreError> {
        self.writes += 1;
        if self.writes == self.fail_on {
            return Err(StoreError::Invalid(format!("write {} refused", self.writes)));
        }
        Ok(())
    }
}

impl AssignmentTransaction for CountingTransaction<'_> {
    fn find_member(&self, id: MemberId) -> Result<Option<Member>, StoreError> {
        self.inner.find_member(id)
    }

    fn find_room(&self, id: RoomId) -> Result<Option<Room>, StoreError> {
        self.inner.find_room(id)
    }

    fn find_assignment(&self, member_id: MemberId) -> Result<Option<Assignment>, StoreError> {
        self.inner.find_assignment(member_id)
    }

    fn occupants(&self, room_id: RoomId) -> Result<Vec<MemberId>, StoreError> {
        self.inner.occupants(room_id)
    }

    fn create_assignment(
        &mut self,
        member_id: MemberId,
        room_id: RoomId,
    ) -> Result<Assignment, StoreError> {
        self.record_write()?;
        self.inner.create_assignment(member_id, room_id)
    }

    fn update_assignment(
        &mut self,
        assignment_id: AssignmentId,
        room_id: RoomId,
    ) -> Result<Assignment, StoreError> {
        self.record_write()?;
        self.inner.update_assignment(assignment_id, room_id)
    }
}

pub(super) struct UnavailableStore;

impl EntityStore for UnavailableStore {
    fn find_group(&self, _id: GroupId) -> Result<Option<Group>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn find_members(&self, _group_id: GroupId) -> Result<Vec<Member>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn find_rooms(&self, _suite_id: SuiteId) -> Result<Vec<Room>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn find_assignment(&self, _member_id: MemberId) -> Result<Option<Assignment>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn suites(&self) -> Result<Vec<Suite>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn drawn_suite_ids(&self) -> Result<BTreeSet<SuiteId>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn transaction<T, F>(&self, _work: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut dyn AssignmentTransaction) -> Result<T, StoreError>,
    {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn router_with_service(
    service: RoomAssignmentService<InMemoryEntityStore>,
) -> axum::Router {
    room_assignment_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
