use std::collections::HashMap;
use std::sync::Arc;

use super::error::CompileError;
use super::options::CompileOptions;
use super::rule::{DataType, RuleNode};
use super::value::Record;

/// A compiled predicate fragment over one record level. Fragments close only
/// over immutable constants, so they are freely shareable across threads.
pub type PredicateFragment = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

/// Pluggable resolution for path segments with no direct structural member.
///
/// When the path walk hits a segment the schema does not know, the in-scope
/// resolver takes over: it receives the path consumed so far, the leaf rule,
/// the remaining segments (the unmatched one first), and builds the predicate
/// fragment for the rest of the path. The registry is passed through so a
/// resolver can hand deeper segments to a different resolver.
pub trait FieldResolver: Send + Sync {
    fn build_predicate(
        &self,
        current_path: &str,
        rule: &RuleNode,
        options: &CompileOptions,
        declared: DataType,
        remaining: &[&str],
        registry: &ResolverRegistry,
    ) -> Result<PredicateFragment, CompileError>;
}

/// Named lookup of [`FieldResolver`]s, injected once into the compiler.
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<String, Arc<dyn FieldResolver>>,
}

impl ResolverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver under `name`, replacing any previous entry.
    #[must_use]
    pub fn register(mut self, name: &str, resolver: Arc<dyn FieldResolver>) -> Self {
        self.resolvers.insert(name.to_owned(), resolver);
        self
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn FieldResolver>> {
        self.resolvers.get(name).cloned()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.resolvers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ResolverRegistry")
            .field("resolvers", &names)
            .finish()
    }
}
