mod error;
mod field_def;
mod options;
mod resolver;
mod rule;
mod schema;
mod value;

pub use error::CompileError;
pub use field_def::{FieldDefinition, InputKind};
pub use options::{CompileOptions, DateHook, Locale};
pub use resolver::{FieldResolver, PredicateFragment, ResolverRegistry};
pub use rule::{Condition, DataType, Operator, RuleNode, RuleValue};
pub use schema::{FieldShape, Schema, SchemaField};
pub use value::{FieldValue, Record};
