//! Room assignment for housing groups.
//!
//! Submitted form fields (`room_id_for_<member-id>` → room id) are parsed into an
//! [`AssignmentRequest`], validated against the group's members and suite rooms, shown
//! as an [`AssignmentPreview`], and committed as either first-time assignments or moves
//! of existing ones.

pub mod committer;
mod error;
pub mod form;
pub mod preview;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use committer::{create_assignments, update_assignments, CommitMode};
pub use error::AssignmentError;
pub use form::{
    field_for, member_id_from_field, AssignmentRequest, GroupScope, PreparedAssignment,
    RoomAssignmentForm, FIELD_PREFIX,
};
pub use preview::{build_preview, AssignmentPreview, RoomPreview};
pub use router::room_assignment_router;
pub use service::{
    AssignmentOutcome, CurrentAssignmentView, PreviewResponse, RedirectTarget,
    RoomAssignmentService, SUCCESS_NOTICE,
};
pub use validation::{validate, ValidationFailure, ValidationReport};
