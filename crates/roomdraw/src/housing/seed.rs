use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{Draw, DrawId, Group, Member, MemberId, Room, RoomId, Suite, SuiteId};
use super::memory::InMemoryEntityStore;
use super::store::{EntityStore, StoreError};

/// JSON fixture describing the housing records an in-memory store starts with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HousingSeed {
    #[serde(default)]
    pub draws: Vec<Draw>,
    #[serde(default)]
    pub suites: Vec<Suite>,
    #[serde(default)]
    pub draw_suites: Vec<DrawSuite>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub assignments: Vec<SeedAssignment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawSuite {
    pub draw_id: DrawId,
    pub suite_id: SuiteId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedAssignment {
    pub member_id: MemberId,
    pub room_id: RoomId,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid seed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("seed references are inconsistent: {0}")]
    Store(#[from] StoreError),
}

impl HousingSeed {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SeedError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SeedError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Loads every record into a fresh store, parents before children.
    pub fn into_store(self) -> Result<InMemoryEntityStore, SeedError> {
        let store = InMemoryEntityStore::new();
        for draw in self.draws {
            store.insert_draw(draw)?;
        }
        for suite in self.suites {
            store.insert_suite(suite)?;
        }
        for link in self.draw_suites {
            store.attach_suite(link.draw_id, link.suite_id)?;
        }
        for room in self.rooms {
            store.insert_room(room)?;
        }
        for group in self.groups {
            store.insert_group(group)?;
        }
        for member in self.members {
            store.insert_member(member)?;
        }
        if !self.assignments.is_empty() {
            store.transaction(|tx| {
                for seeded in &self.assignments {
                    tx.create_assignment(seeded.member_id, seeded.room_id)?;
                }
                Ok(())
            })?;
        }
        Ok(store)
    }
}
