mod apply;
mod coerce;
mod compile;
mod operators;
mod resolve;
mod types;

pub use apply::{apply_filter, apply_predicate, Filterable};
pub use compile::{compile, CompiledPredicate, FilterCompiler};
pub use types::{
    CompileError, CompileOptions, Condition, DataType, DateHook, FieldDefinition, FieldResolver,
    FieldShape, FieldValue, InputKind, Locale, Operator, PredicateFragment, Record,
    ResolverRegistry, RuleNode, RuleValue, Schema, SchemaField,
};
