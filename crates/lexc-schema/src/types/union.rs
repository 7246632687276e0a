use lexc_core::{union_path, LexDef, RefDef, UnionDef};
use lexc_validator::Validator;
use tracing::trace;

use crate::context::CompileContext;
use crate::error::CompileError;
use crate::extend::extend_schema;
use crate::options::Override;

/// Discriminator field of union members.
pub const TYPE_FIELD: &str = "$type";

/// Compile each ref at `<path>.__union__.<i>` through the `ref` compiler
/// and combine them into a union discriminated on `$type`. Omitted
/// branches are skipped but keep their index, so later branches keep
/// their addresses.
pub fn compile_union(
    def: &UnionDef,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<Validator, CompileError> {
    let compile_ref = ctx.registry().resolve("ref", true)?;
    let mut branches = Vec::with_capacity(def.refs.len());
    for (index, reference) in def.refs.iter().enumerate() {
        let branch_path = union_path(path, index);
        let tag = ctx.qualify(reference).discriminator();
        let branch = match ctx.override_at(&branch_path) {
            Some(Override::Omit) => {
                trace!(path = branch_path.as_str(), "union branch omitted");
                continue;
            }
            Some(Override::Replace(validator)) => validator,
            None => {
                let branch_def = LexDef::Ref(RefDef::to(reference.as_str()));
                let branch = compile_ref(&branch_def, &branch_path, ctx)?;
                extend_schema(branch, None, None, &branch_path, ctx)
            }
        };
        branches.push((tag, branch));
    }
    Ok(Validator::tagged_union(TYPE_FIELD, branches, def.closed))
}
