use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::committer::{commit, CommitMode};
use super::error::AssignmentError;
use super::form::{GroupScope, PreparedAssignment, RoomAssignmentForm};
use super::preview::AssignmentPreview;
use crate::housing::domain::{DrawId, Group, GroupId, MemberId, RoomId};
use crate::housing::store::{EntityStore, StoreError};

pub const SUCCESS_NOTICE: &str = "Successfully assigned rooms";

/// Where the admin lands after a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RedirectTarget {
    Draw { draw_id: DrawId, group_id: GroupId },
    Group { group_id: GroupId },
}

impl RedirectTarget {
    pub fn for_group(group: &Group) -> Self {
        match group.draw_id {
            Some(draw_id) => RedirectTarget::Draw {
                draw_id,
                group_id: group.id,
            },
            None => RedirectTarget::Group { group_id: group.id },
        }
    }

    pub fn path(&self) -> String {
        match self {
            RedirectTarget::Draw { draw_id, group_id } => {
                format!("/draws/{draw_id}/groups/{group_id}")
            }
            RedirectTarget::Group { group_id } => format!("/groups/{group_id}"),
        }
    }
}

/// Result of an assign or reassign request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AssignmentOutcome {
    Assigned {
        redirect: RedirectTarget,
        notice: String,
    },
    /// The mapping broke an assignment rule; nothing was written.
    Rejected { error: String, errors: Vec<String> },
    /// The store refused the commit; nothing was written.
    Failed { error: String },
}

impl AssignmentOutcome {
    fn rejected(errors: Vec<String>) -> Self {
        AssignmentOutcome::Rejected {
            error: format_errors(&errors),
            errors,
        }
    }

    fn failed(err: &StoreError) -> Self {
        AssignmentOutcome::Failed {
            error: format!("Room assignment could not be saved: {err}"),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AssignmentOutcome::Assigned { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            AssignmentOutcome::Assigned { .. } => None,
            AssignmentOutcome::Rejected { error, .. } | AssignmentOutcome::Failed { error } => {
                Some(error)
            }
        }
    }
}

fn format_errors(errors: &[String]) -> String {
    format!("Please review the errors below:\n{}", errors.join("\n"))
}

/// Prepared request plus its preview, for confirmation screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewResponse {
    pub valid: bool,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<AssignmentPreview>,
}

/// Field values pre-filled from the group's current assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentAssignmentView {
    pub group_id: GroupId,
    pub field_ids: Vec<String>,
    pub fields: BTreeMap<String, String>,
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Service composing the form, the validator and the committer over an entity store.
pub struct RoomAssignmentService<S> {
    store: Arc<S>,
}

impl<S> RoomAssignmentService<S>
where
    S: EntityStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Loads the group, its members and its suite's rooms into a form.
    pub fn form(&self, group_id: GroupId) -> Result<RoomAssignmentForm, AssignmentError> {
        let group = self
            .store
            .find_group(group_id)?
            .ok_or(AssignmentError::GroupNotFound(group_id))?;
        let members = self.store.find_members(group.id)?;
        let rooms = self.store.find_rooms(group.suite_id)?;

        Ok(RoomAssignmentForm::new(GroupScope {
            group,
            members,
            rooms,
        }))
    }

    /// Parses and validates without touching the store.
    pub fn prepare(
        &self,
        group_id: GroupId,
        fields: &BTreeMap<String, String>,
    ) -> Result<PreparedAssignment, AssignmentError> {
        self.form(group_id)?.prepare(fields)
    }

    pub fn preview(
        &self,
        group_id: GroupId,
        fields: &BTreeMap<String, String>,
    ) -> Result<PreviewResponse, AssignmentError> {
        let form = self.form(group_id)?;
        let prepared = form.prepare(fields)?;
        let preview = if prepared.is_valid() {
            Some(form.preview(&prepared.request)?)
        } else {
            None
        };

        Ok(PreviewResponse {
            valid: prepared.is_valid(),
            errors: prepared.errors(),
            preview,
        })
    }

    /// First-time commit of a group's room assignments.
    pub fn assign(
        &self,
        group_id: GroupId,
        fields: &BTreeMap<String, String>,
    ) -> Result<AssignmentOutcome, AssignmentError> {
        self.execute(group_id, fields, CommitMode::Create)
    }

    /// Moves members whose assignments already exist.
    pub fn reassign(
        &self,
        group_id: GroupId,
        fields: &BTreeMap<String, String>,
    ) -> Result<AssignmentOutcome, AssignmentError> {
        self.execute(group_id, fields, CommitMode::Update)
    }

    /// Builds form values from the members' current rooms and prepares them.
    pub fn current(&self, group_id: GroupId) -> Result<CurrentAssignmentView, AssignmentError> {
        let form = self.form(group_id)?;
        let mut current: BTreeMap<MemberId, RoomId> = BTreeMap::new();
        for member in &form.scope().members {
            if let Some(assignment) = self.store.find_assignment(member.id)? {
                current.insert(member.id, assignment.room_id);
            }
        }

        let fields = form.fields_from(&current);
        let prepared = form.prepare(&fields)?;

        Ok(CurrentAssignmentView {
            group_id,
            field_ids: form.valid_field_ids(),
            fields,
            valid: prepared.is_valid(),
            errors: prepared.errors(),
        })
    }

    fn execute(
        &self,
        group_id: GroupId,
        fields: &BTreeMap<String, String>,
        mode: CommitMode,
    ) -> Result<AssignmentOutcome, AssignmentError> {
        let form = self.form(group_id)?;
        let prepared = form.prepare(fields)?;

        if !prepared.is_valid() {
            warn!(
                %group_id,
                mode = mode.label(),
                errors = ?prepared.errors(),
                "room assignment rejected"
            );
            return Ok(AssignmentOutcome::rejected(prepared.errors()));
        }

        match commit(self.store.as_ref(), &prepared.request, mode) {
            Ok(written) => {
                info!(
                    %group_id,
                    mode = mode.label(),
                    assignments = written.len(),
                    "room assignment committed"
                );
                Ok(AssignmentOutcome::Assigned {
                    redirect: RedirectTarget::for_group(form.group()),
                    notice: SUCCESS_NOTICE.to_string(),
                })
            }
            Err(StoreError::Unavailable(reason)) => {
                Err(AssignmentError::Store(StoreError::Unavailable(reason)))
            }
            Err(err) => {
                warn!(%group_id, mode = mode.label(), error = %err, "room assignment rolled back");
                Ok(AssignmentOutcome::failed(&err))
            }
        }
    }
}
