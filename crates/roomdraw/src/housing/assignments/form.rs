use std::collections::BTreeMap;

use serde::Serialize;

use super::error::AssignmentError;
use super::preview::{build_preview, AssignmentPreview};
use super::validation::{validate, ValidationReport};
use crate::housing::domain::{Group, GroupId, Member, MemberId, Room, RoomId};

/// Prefix of every submitted field; the member id follows it.
pub const FIELD_PREFIX: &str = "room_id_for_";

/// Field name carrying the room choice for `member_id`.
pub fn field_for(member_id: MemberId) -> String {
    format!("{FIELD_PREFIX}{member_id}")
}

/// Decodes a `room_id_for_<member-id>` field name.
pub fn member_id_from_field(field: &str) -> Result<MemberId, AssignmentError> {
    let digits = field
        .strip_prefix(FIELD_PREFIX)
        .filter(|rest| !rest.is_empty() && rest.bytes().all(|byte| byte.is_ascii_digit()))
        .ok_or_else(|| AssignmentError::MalformedField(field.to_string()))?;

    digits
        .parse::<u64>()
        .map(MemberId)
        .map_err(|_| AssignmentError::MalformedField(field.to_string()))
}

/// The group together with the members and suite rooms an assignment may reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupScope {
    pub group: Group,
    pub members: Vec<Member>,
    pub rooms: Vec<Room>,
}

impl GroupScope {
    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == id)
    }
}

/// Parsed member-to-room mapping for one group, built fresh for every request.
///
/// Values that do not read as a room id are kept apart in `unresolved`; they can never
/// name a room of the suite, so validation reports them as unknown rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentRequest {
    pub group_id: GroupId,
    mapping: BTreeMap<MemberId, RoomId>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    unresolved: BTreeMap<MemberId, String>,
}

impl AssignmentRequest {
    pub fn new(group_id: GroupId, mapping: BTreeMap<MemberId, RoomId>) -> Self {
        Self {
            group_id,
            mapping,
            unresolved: BTreeMap::new(),
        }
    }

    /// Raw room values, keyed by member, that could not be read as a room id.
    pub fn unresolved(&self) -> &BTreeMap<MemberId, String> {
        &self.unresolved
    }

    /// Every member named by the request, resolved or not.
    pub fn member_ids(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.mapping.keys().chain(self.unresolved.keys()).copied()
    }

    pub fn room_for(&self, member_id: MemberId) -> Option<RoomId> {
        self.mapping.get(&member_id).copied()
    }

    pub fn mapping(&self) -> &BTreeMap<MemberId, RoomId> {
        &self.mapping
    }

    pub fn iter(&self) -> impl Iterator<Item = (MemberId, RoomId)> + '_ {
        self.mapping
            .iter()
            .map(|(member_id, room_id)| (*member_id, *room_id))
    }

    pub fn len(&self) -> usize {
        self.mapping.len() + self.unresolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty() && self.unresolved.is_empty()
    }

    /// Inverts the mapping; members within a room are in ascending id order.
    pub fn members_per_room(&self) -> BTreeMap<RoomId, Vec<MemberId>> {
        let mut per_room: BTreeMap<RoomId, Vec<MemberId>> = BTreeMap::new();
        for (member_id, room_id) in self.iter() {
            per_room.entry(room_id).or_default().push(member_id);
        }
        per_room
    }
}

/// A parsed request paired with its validation report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedAssignment {
    pub request: AssignmentRequest,
    pub report: ValidationReport,
}

impl PreparedAssignment {
    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }

    pub fn errors(&self) -> Vec<String> {
        self.report.messages()
    }
}

/// Room assignment form for one group.
///
/// Exposes one field per member (see [`RoomAssignmentForm::valid_field_ids`]) and turns
/// submitted field values into a validated [`PreparedAssignment`].
#[derive(Debug, Clone)]
pub struct RoomAssignmentForm {
    scope: GroupScope,
}

impl RoomAssignmentForm {
    pub fn new(scope: GroupScope) -> Self {
        Self { scope }
    }

    pub fn group(&self) -> &Group {
        &self.scope.group
    }

    pub fn scope(&self) -> &GroupScope {
        &self.scope
    }

    pub fn valid_field_ids(&self) -> Vec<String> {
        self.scope
            .members
            .iter()
            .map(|member| field_for(member.id))
            .collect()
    }

    /// Parses submitted fields. Blank values mean "not yet assigned" and are dropped.
    ///
    /// A value that is not a room id is kept as an unresolved room, which validation
    /// reports like any other room missing from the suite.
    pub fn parse(
        &self,
        fields: &BTreeMap<String, String>,
    ) -> Result<AssignmentRequest, AssignmentError> {
        let mut request = AssignmentRequest::new(self.scope.group.id, BTreeMap::new());

        for (field, value) in fields {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            let member_id = member_id_from_field(field)?;
            if self.scope.member(member_id).is_none() {
                return Err(AssignmentError::MemberOutOfScope {
                    group_id: self.scope.group.id,
                    member_id,
                });
            }

            if request.mapping.contains_key(&member_id)
                || request.unresolved.contains_key(&member_id)
            {
                return Err(AssignmentError::DuplicateMember(member_id));
            }

            match value.parse::<u64>() {
                Ok(room_id) => {
                    request.mapping.insert(member_id, RoomId(room_id));
                }
                Err(_) => {
                    request.unresolved.insert(member_id, value.to_string());
                }
            }
        }

        Ok(request)
    }

    pub fn validate(&self, request: &AssignmentRequest) -> ValidationReport {
        validate(&self.scope.members, &self.scope.rooms, request)
    }

    pub fn prepare(
        &self,
        fields: &BTreeMap<String, String>,
    ) -> Result<PreparedAssignment, AssignmentError> {
        let request = self.parse(fields)?;
        let report = self.validate(&request);
        Ok(PreparedAssignment { request, report })
    }

    pub fn preview(
        &self,
        request: &AssignmentRequest,
    ) -> Result<AssignmentPreview, AssignmentError> {
        build_preview(&self.scope, request)
    }

    /// Field values reflecting `current`, the room each member holds today.
    ///
    /// Members without a room get a blank value so the form still lists them.
    pub fn fields_from(&self, current: &BTreeMap<MemberId, RoomId>) -> BTreeMap<String, String> {
        self.scope
            .members
            .iter()
            .map(|member| {
                let value = current
                    .get(&member.id)
                    .map(|room_id| room_id.to_string())
                    .unwrap_or_default();
                (field_for(member.id), value)
            })
            .collect()
    }
}
