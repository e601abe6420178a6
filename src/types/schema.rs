use std::collections::HashMap;

use super::rule::DataType;

/// Describes the structure of one record shape: each member's kind,
/// nullability, and an optionally attached field resolver.
///
/// This is the explicit member registry that replaces ad-hoc reflection:
/// the compiler validates field paths against it, detects one-to-many hops,
/// and decides nullability semantics from it.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: HashMap<String, SchemaField>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member with an explicit [`SchemaField`] description.
    #[must_use]
    pub fn with(mut self, name: &str, field: SchemaField) -> Self {
        self.fields.insert(name.to_owned(), field);
        self
    }

    /// Add a non-nullable scalar member.
    #[must_use]
    pub fn scalar(self, name: &str, ty: DataType) -> Self {
        self.with(name, SchemaField::scalar(ty))
    }

    /// Add a nullable scalar member.
    #[must_use]
    pub fn nullable(self, name: &str, ty: DataType) -> Self {
        self.with(name, SchemaField::scalar(ty).nullable())
    }

    /// Add a list-of-scalars member.
    #[must_use]
    pub fn list(self, name: &str, ty: DataType) -> Self {
        self.with(name, SchemaField::list(ty))
    }

    /// Add a nested single record member.
    #[must_use]
    pub fn nested(self, name: &str, schema: Schema) -> Self {
        self.with(name, SchemaField::nested(schema))
    }

    /// Add a one-to-many member: a list of nested records. Paths crossing it
    /// take existential ("any element") semantics.
    #[must_use]
    pub fn nested_list(self, name: &str, schema: Schema) -> Self {
        self.with(name, SchemaField::nested_list(schema))
    }

    /// Add a dynamic member whose inner fields are handled entirely by the
    /// named resolver.
    #[must_use]
    pub fn delegated(self, name: &str, resolver: &str) -> Self {
        self.with(name, SchemaField::nested(Schema::new()).with_resolver(resolver))
    }

    /// Look up a member description.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One member of a [`Schema`].
#[derive(Debug, Clone)]
pub struct SchemaField {
    shape: FieldShape,
    nullable: bool,
    resolver: Option<String>,
}

impl SchemaField {
    #[must_use]
    pub fn scalar(ty: DataType) -> Self {
        Self {
            shape: FieldShape::Scalar(ty),
            nullable: false,
            resolver: None,
        }
    }

    #[must_use]
    pub fn list(ty: DataType) -> Self {
        Self {
            shape: FieldShape::ScalarList(ty),
            nullable: false,
            resolver: None,
        }
    }

    #[must_use]
    pub fn nested(schema: Schema) -> Self {
        Self {
            shape: FieldShape::Nested(schema),
            nullable: false,
            resolver: None,
        }
    }

    #[must_use]
    pub fn nested_list(schema: Schema) -> Self {
        Self {
            shape: FieldShape::NestedList(schema),
            nullable: false,
            resolver: None,
        }
    }

    /// Mark the member as nullable. `is_null` over a non-nullable scalar
    /// compiles to a constant-false predicate.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Attach a field resolver: unmatched path segments beneath this member
    /// delegate to the named resolver.
    #[must_use]
    pub fn with_resolver(mut self, name: &str) -> Self {
        self.resolver = Some(name.to_owned());
        self
    }

    #[must_use]
    pub fn shape(&self) -> &FieldShape {
        &self.shape
    }

    /// Whether the member can hold null. Lists and nested records are
    /// reference-like and always nullable; scalars follow the explicit flag.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        match self.shape {
            FieldShape::Scalar(_) => self.nullable,
            _ => true,
        }
    }

    #[must_use]
    pub fn resolver(&self) -> Option<&str> {
        self.resolver.as_deref()
    }
}

/// The kind of a schema member.
#[derive(Debug, Clone)]
pub enum FieldShape {
    Scalar(DataType),
    ScalarList(DataType),
    Nested(Schema),
    NestedList(Schema),
}

impl FieldShape {
    /// Whether the stored representation is text (drives textual fallbacks
    /// like the date-conversion hook for `between`).
    #[must_use]
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            FieldShape::Scalar(DataType::String) | FieldShape::ScalarList(DataType::String)
        )
    }
}
