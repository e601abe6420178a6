//! Compiles a rule tree into a single reusable predicate.
//!
//! Compilation front-loads all validation and value conversion: parsing
//! tokens, coercing constants, resolving field paths. What comes out is a
//! closure tree that evaluates against any number of records without
//! re-touching the rule tree.

use std::sync::Arc;

use crate::resolve::compile_leaf;
use crate::types::{
    CompileError, CompileOptions, Condition, DateHook, FieldResolver, PredicateFragment, Record,
    ResolverRegistry, RuleNode, Schema,
};

/// Compiles rule trees against one schema.
///
/// Construction wires in everything the host can plug: named field
/// resolvers and the string-to-date conversion hook. Each compile call takes
/// its own [`CompileOptions`].
#[derive(Clone)]
pub struct FilterCompiler {
    schema: Schema,
    registry: ResolverRegistry,
    date_hook: Option<DateHook>,
}

impl FilterCompiler {
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            registry: ResolverRegistry::new(),
            date_hook: None,
        }
    }

    /// Register a field resolver under `name`.
    #[must_use]
    pub fn with_resolver(mut self, name: &str, resolver: Arc<dyn FieldResolver>) -> Self {
        self.registry = self.registry.register(name, resolver);
        self
    }

    /// Supply the string-to-date conversion used by `between` over textual
    /// date fields.
    #[must_use]
    pub fn with_date_converter(mut self, hook: DateHook) -> Self {
        self.date_hook = Some(hook);
        self
    }

    /// Compile `tree` with default options.
    ///
    /// A node with neither a field nor children compiles to an always-true
    /// predicate: it filters nothing, like an empty filter form.
    pub fn compile(&self, tree: &RuleNode) -> Result<CompiledPredicate, CompileError> {
        self.compile_with(tree, &CompileOptions::default())
    }

    /// Compile `tree` with explicit options. Malformed nodes follow the same
    /// always-true policy as [`compile`](Self::compile).
    pub fn compile_with(
        &self,
        tree: &RuleNode,
        options: &CompileOptions,
    ) -> Result<CompiledPredicate, CompileError> {
        let test = self.compile_node(tree, options)?;
        Ok(CompiledPredicate { test })
    }

    fn compile_node(
        &self,
        node: &RuleNode,
        options: &CompileOptions,
    ) -> Result<PredicateFragment, CompileError> {
        if let Some(field) = node.field.as_deref() {
            return compile_leaf(
                field,
                node,
                &self.schema,
                options,
                &self.registry,
                self.date_hook.clone(),
            );
        }

        // A node with neither a field nor children filters nothing.
        if node.rules.is_empty() {
            return Ok(Arc::new(|_| true));
        }

        let condition = Condition::parse_token(node.condition.as_deref().unwrap_or(""));
        let children = node
            .rules
            .iter()
            .map(|child| self.compile_node(child, options))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match condition {
            Condition::And => Arc::new(move |rec| children.iter().all(|child| child(rec))),
            Condition::Or => Arc::new(move |rec| children.iter().any(|child| child(rec))),
        })
    }
}

impl std::fmt::Debug for FilterCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterCompiler")
            .field("schema", &self.schema)
            .field("registry", &self.registry)
            .field("date_hook", &self.date_hook.is_some())
            .finish()
    }
}

/// A compiled, reusable boolean predicate over records.
///
/// Cheap to clone and safe to share across threads; evaluation allocates
/// nothing and touches no shared state.
#[derive(Clone)]
pub struct CompiledPredicate {
    test: PredicateFragment,
}

impl CompiledPredicate {
    /// Evaluate against one record.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        (self.test)(record)
    }
}

impl std::fmt::Debug for CompiledPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CompiledPredicate")
    }
}

/// Compile `tree` against `schema` with default options and no plugged-in
/// resolvers or hooks.
pub fn compile(tree: &RuleNode, schema: &Schema) -> Result<CompiledPredicate, CompileError> {
    FilterCompiler::new(schema.clone()).compile(tree)
}
