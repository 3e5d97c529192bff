//! JSON Patch (RFC 6902) application for partial updates

use error_common::EmrError;
use json_patch::{Patch, PatchOperation};

use crate::entity::Entity;

/// Parse a JSON Patch document
pub fn parse_patch(json: &str) -> Result<Patch, EmrError> {
    serde_json::from_str(json)
        .map_err(|e| EmrError::validation(format!("Invalid patch document: {e}")))
}

/// Merge `patch` onto `entity`, returning the patched copy
///
/// The entity's `id` is immutable; any operation targeting it is rejected.
pub fn apply_patch<E: Entity>(entity: &E, patch: &Patch) -> Result<E, EmrError> {
    validate_operations(&patch.0)?;

    let mut document = serde_json::to_value(entity)?;
    json_patch::patch(&mut document, &patch.0)
        .map_err(|e| EmrError::validation(format!("Patch operation failed: {e}")))?;

    let mut patched: E = serde_json::from_value(document)
        .map_err(|e| EmrError::validation(format!("Patched {} is invalid: {e}", E::NAME)))?;
    patched.set_id(entity.id());
    Ok(patched)
}

fn validate_operations(operations: &[PatchOperation]) -> Result<(), EmrError> {
    for op in operations {
        let path = operation_path(op);
        if path == "/id" || path.starts_with("/id/") {
            return Err(EmrError::validation("Cannot modify id with patch"));
        }
        if let PatchOperation::Move(move_op) = op {
            let from = move_op.from.as_str();
            if from == "/id" || from.starts_with("/id/") {
                return Err(EmrError::validation("Cannot modify id with patch"));
            }
        }
    }
    Ok(())
}

fn operation_path(op: &PatchOperation) -> &str {
    match op {
        PatchOperation::Add(add_op) => add_op.path.as_str(),
        PatchOperation::Remove(remove_op) => remove_op.path.as_str(),
        PatchOperation::Replace(replace_op) => replace_op.path.as_str(),
        PatchOperation::Move(move_op) => move_op.path.as_str(),
        PatchOperation::Copy(copy_op) => copy_op.path.as_str(),
        PatchOperation::Test(test_op) => test_op.path.as_str(),
    }
}
