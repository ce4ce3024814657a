//! Semantic checks applied to decoded `PATCH` commands.

use serde_json::value::RawValue;

use standhub_core::types::StandId;

use super::types::{MessageKind, PatchCommand};
use crate::error::CodecError;

/// A `PATCH` command that passed validation.
#[derive(Debug)]
pub struct ValidPatch {
    /// Target stand.
    pub id: StandId,
    /// Update object.
    pub update: Box<RawValue>,
}

/// Check that the id is usable and the update is a JSON object.
pub fn validate_patch(cmd: PatchCommand) -> Result<ValidPatch, CodecError> {
    let id: StandId = cmd.id.parse().map_err(|_| invalid("id must not be empty"))?;

    // RawValue holds the exact input slice, so the first byte tells the type.
    if !cmd.update_data.get().starts_with('{') {
        return Err(invalid("updateData must be a JSON object"));
    }

    Ok(ValidPatch {
        id,
        update: cmd.update_data,
    })
}

fn invalid(reason: &str) -> CodecError {
    CodecError::InvalidPayload {
        kind: MessageKind::Patch.as_str(),
        reason: reason.to_string(),
    }
}
