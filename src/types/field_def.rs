use serde::Serialize;

use super::rule::{DataType, Operator};

/// Descriptive metadata for one filterable field, consumed by a builder UI
/// to render inputs and offer operators. Not consumed by compilation.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDefinition {
    pub label: String,
    pub field: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub operators: Vec<String>,
    pub id: String,
}

impl FieldDefinition {
    /// Build a definition with the input kind's default operator list.
    #[must_use]
    pub fn new(label: &str, field: &str, data_type: DataType, input: InputKind) -> Self {
        Self {
            label: label.to_owned(),
            field: field.to_owned(),
            data_type: data_type.token().to_owned(),
            input: input.widget().to_owned(),
            source: None,
            operators: input
                .default_operators()
                .iter()
                .map(|op| op.token().to_owned())
                .collect(),
            id: field.to_owned(),
        }
    }

    /// Key of the external source feeding this field's choices (dropdowns).
    #[must_use]
    pub fn with_source(mut self, key: &str) -> Self {
        self.source = Some(key.to_owned());
        self
    }

    /// Replace the default operator list.
    #[must_use]
    pub fn with_operators(mut self, operators: &[Operator]) -> Self {
        self.operators = operators.iter().map(|op| op.token().to_owned()).collect();
        self
    }
}

/// The input widget kind a field uses in the builder UI, with its default
/// allowed operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Number,
    Select,
    Date,
    DateTime,
    Boolean,
}

impl InputKind {
    /// The UI widget token rendered for this kind.
    #[must_use]
    pub fn widget(self) -> &'static str {
        match self {
            InputKind::Text | InputKind::Date | InputKind::DateTime => "text",
            InputKind::Number => "number",
            InputKind::Select => "select",
            InputKind::Boolean => "radio",
        }
    }

    /// Operators offered by default for this kind.
    #[must_use]
    pub fn default_operators(self) -> &'static [Operator] {
        match self {
            InputKind::Text => &[Operator::Equal, Operator::NotEqual, Operator::Contains],
            InputKind::Number => &[
                Operator::Equal,
                Operator::NotEqual,
                Operator::Greater,
                Operator::Less,
                Operator::GreaterOrEqual,
                Operator::LessOrEqual,
            ],
            InputKind::Select => &[Operator::In, Operator::NotIn],
            InputKind::Date | InputKind::DateTime => &[Operator::Between],
            InputKind::Boolean => &[Operator::Equal, Operator::NotEqual],
        }
    }
}
