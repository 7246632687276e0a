//! Schema extension: the annotations applied exactly once to every
//! compiled non-primary node, whatever compiler produced it.

use lexc_validator::Validator;
use serde_json::Value;

use crate::context::CompileContext;

/// Attach a description and default. A description the validator already
/// carries is kept, so a referenced definition's own description wins
/// over the one on the ref.
pub fn annotate(
    mut validator: Validator,
    description: Option<&str>,
    default: Option<&Value>,
) -> Validator {
    if let Some(description) = description {
        if validator.description().is_none() {
            validator = validator.describe(description);
        }
    }
    if let Some(default) = default {
        validator = validator.default_value(default.clone());
    }
    validator
}

/// [`annotate`], then make the node optional unless the override table
/// marks `path` required, and record caller metadata for `path` in the
/// side table.
pub fn extend_schema(
    validator: Validator,
    description: Option<&str>,
    default: Option<&Value>,
    path: &str,
    ctx: &mut CompileContext,
) -> Validator {
    let mut validator = annotate(validator, description, default);
    let options = ctx.path_options().get(path);
    let required = options.and_then(|o| o.is_required) == Some(true);
    let metadata = options.and_then(|o| o.metadata.clone());

    validator = if required {
        validator.required()
    } else {
        validator.optional()
    };
    if let Some(metadata) = metadata {
        ctx.record_metadata(path, metadata);
    }
    validator
}
