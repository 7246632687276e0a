use lexc_core::{array_path, ArrayDef};
use lexc_validator::Validator;

use crate::context::CompileContext;
use crate::error::CompileError;
use crate::types::compile_node;

/// Elements are compiled at `<path>.__array__`. An omitted element type
/// leaves an array that only accepts `[]`.
pub fn compile_array(
    def: &ArrayDef,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<Validator, CompileError> {
    let items_path = array_path(path);
    let items = compile_node(&def.items, &items_path, ctx)?.unwrap_or_else(Validator::never);

    let mut v = Validator::array(items);
    if let Some(min) = def.min_length {
        v = v.min_length(min);
    }
    if let Some(max) = def.max_length {
        v = v.max_length(max);
    }
    Ok(v)
}
