//! Applies compiled predicates to record collections.

use crate::compile::{compile, CompiledPredicate};
use crate::types::{CompileError, Record, RuleNode, Schema};

/// Collections that can be narrowed by a compiled predicate.
pub trait Filterable {
    /// The records that satisfy `predicate`, in their original order.
    #[must_use]
    fn filtered(&self, predicate: &CompiledPredicate) -> Self;
}

impl Filterable for Vec<Record> {
    fn filtered(&self, predicate: &CompiledPredicate) -> Self {
        self.iter()
            .filter(|rec| predicate.matches(rec))
            .cloned()
            .collect()
    }
}

/// Compile `tree` against `schema` and keep the records that match.
pub fn apply_filter(
    records: &[Record],
    tree: &RuleNode,
    schema: &Schema,
) -> Result<Vec<Record>, CompileError> {
    let predicate = compile(tree, schema)?;
    Ok(apply_predicate(records, &predicate))
}

/// Keep the records matching an already-compiled predicate.
#[must_use]
pub fn apply_predicate(records: &[Record], predicate: &CompiledPredicate) -> Vec<Record> {
    records
        .iter()
        .filter(|rec| predicate.matches(rec))
        .cloned()
        .collect()
}
