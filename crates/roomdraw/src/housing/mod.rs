//! Housing records, the entity store seam and the room assignment workflow.

pub mod assignments;
pub mod domain;
pub mod memory;
pub mod seed;
pub mod store;
pub mod suites;

pub use domain::{
    Assignment, AssignmentId, Draw, DrawId, Group, GroupId, Member, MemberId, Room, RoomId,
    Suite, SuiteId,
};
pub use memory::InMemoryEntityStore;
pub use seed::{HousingSeed, SeedError};
pub use store::{AssignmentTransaction, EntityStore, StoreError};
pub use suites::UndrawnSuitesQuery;
