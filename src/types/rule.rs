use std::fmt;

use serde::Deserialize;

use super::error::CompileError;

/// One node of a filter rule tree, mirroring the wire shape a query-builder
/// UI emits.
///
/// An interior node carries a `condition` token and child `rules`; a leaf
/// carries a `field` path plus `data_type`, `operator` and `value`. The
/// condition, type and operator are kept as raw tokens and parsed
/// case-insensitively at compile time, so unknown tokens surface as
/// [`CompileError`]s rather than deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuleNode {
    pub condition: Option<String>,
    pub rules: Vec<RuleNode>,
    pub field: Option<String>,
    #[serde(rename = "type")]
    pub data_type: Option<String>,
    pub operator: Option<String>,
    pub value: Option<RuleValue>,
}

impl RuleNode {
    /// Build an interior node combining `rules` under `condition`
    /// (`"and"`/`"or"`, case-insensitive).
    #[must_use]
    pub fn group(condition: &str, rules: Vec<RuleNode>) -> Self {
        Self {
            condition: Some(condition.to_owned()),
            rules,
            ..Self::default()
        }
    }

    /// Build a leaf node testing `field` with `operator` against `value`.
    #[must_use]
    pub fn leaf(
        field: &str,
        data_type: &str,
        operator: &str,
        value: impl Into<RuleValue>,
    ) -> Self {
        Self {
            field: Some(field.to_owned()),
            data_type: Some(data_type.to_owned()),
            operator: Some(operator.to_owned()),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Build a value-less leaf node (`is_null`, `is_empty` and friends).
    #[must_use]
    pub fn nullary(field: &str, data_type: &str, operator: &str) -> Self {
        Self {
            field: Some(field.to_owned()),
            data_type: Some(data_type.to_owned()),
            operator: Some(operator.to_owned()),
            ..Self::default()
        }
    }
}

/// The raw value of a leaf rule: a single scalar token or an ordered list of
/// tokens. Numbers and booleans arriving through serde are stringified;
/// typed conversion happens during compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleValue {
    Single(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for RuleValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Scalar {
            Bool(bool),
            Int(i64),
            Float(f64),
            Text(String),
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(Scalar),
            Many(Vec<Scalar>),
        }

        fn stringify(s: Scalar) -> String {
            match s {
                Scalar::Bool(b) => b.to_string(),
                Scalar::Int(n) => n.to_string(),
                Scalar::Float(f) => f.to_string(),
                Scalar::Text(t) => t,
            }
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::One(s) => RuleValue::Single(stringify(s)),
            Raw::Many(items) => RuleValue::Many(items.into_iter().map(stringify).collect()),
        })
    }
}

impl From<&str> for RuleValue {
    fn from(v: &str) -> Self {
        RuleValue::Single(v.to_owned())
    }
}

impl From<String> for RuleValue {
    fn from(v: String) -> Self {
        RuleValue::Single(v)
    }
}

impl From<i64> for RuleValue {
    fn from(v: i64) -> Self {
        RuleValue::Single(v.to_string())
    }
}

impl From<f64> for RuleValue {
    fn from(v: f64) -> Self {
        RuleValue::Single(v.to_string())
    }
}

impl From<bool> for RuleValue {
    fn from(v: bool) -> Self {
        RuleValue::Single(v.to_string())
    }
}

impl From<Vec<&str>> for RuleValue {
    fn from(v: Vec<&str>) -> Self {
        RuleValue::Many(v.into_iter().map(ToOwned::to_owned).collect())
    }
}

impl From<Vec<String>> for RuleValue {
    fn from(v: Vec<String>) -> Self {
        RuleValue::Many(v)
    }
}

/// How an interior node combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    And,
    Or,
}

impl Condition {
    /// Parse a condition token. `"or"` (case-insensitive) selects [`Or`];
    /// anything else, including a missing token, selects [`And`].
    ///
    /// [`Or`]: Condition::Or
    /// [`And`]: Condition::And
    #[must_use]
    pub fn parse_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("or") {
            Condition::Or
        } else {
            Condition::And
        }
    }
}

/// The declared comparison type of a leaf rule, independent of the field's
/// stored representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Double,
    String,
    DateTime,
    Boolean,
}

impl DataType {
    /// Parse a declared-type token, case-insensitively. Both `"date"` and
    /// `"datetime"` map to [`DataType::DateTime`].
    pub fn parse_token(token: &str) -> Result<Self, CompileError> {
        match token.to_ascii_lowercase().as_str() {
            "integer" => Ok(DataType::Integer),
            "double" => Ok(DataType::Double),
            "string" => Ok(DataType::String),
            "date" | "datetime" => Ok(DataType::DateTime),
            "boolean" => Ok(DataType::Boolean),
            _ => Err(CompileError::UnsupportedType {
                token: token.to_owned(),
            }),
        }
    }

    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            DataType::Integer => "integer",
            DataType::Double => "double",
            DataType::String => "string",
            DataType::DateTime => "datetime",
            DataType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Comparison operators supported in leaf rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Between,
    NotBetween,
    In,
    NotIn,
    Contains,
    NotContains,
    BeginsWith,
    NotBeginsWith,
    EndsWith,
    NotEndsWith,
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
}

impl Operator {
    /// Parse an operator token, case-insensitively.
    pub fn parse_token(token: &str) -> Result<Self, CompileError> {
        match token.to_ascii_lowercase().as_str() {
            "equal" => Ok(Operator::Equal),
            "not_equal" => Ok(Operator::NotEqual),
            "less" => Ok(Operator::Less),
            "less_or_equal" => Ok(Operator::LessOrEqual),
            "greater" => Ok(Operator::Greater),
            "greater_or_equal" => Ok(Operator::GreaterOrEqual),
            "between" => Ok(Operator::Between),
            "not_between" => Ok(Operator::NotBetween),
            "in" => Ok(Operator::In),
            "not_in" => Ok(Operator::NotIn),
            "contains" => Ok(Operator::Contains),
            "not_contains" => Ok(Operator::NotContains),
            "begins_with" => Ok(Operator::BeginsWith),
            "not_begins_with" => Ok(Operator::NotBeginsWith),
            "ends_with" => Ok(Operator::EndsWith),
            "not_ends_with" => Ok(Operator::NotEndsWith),
            "is_null" => Ok(Operator::IsNull),
            "is_not_null" => Ok(Operator::IsNotNull),
            "is_empty" => Ok(Operator::IsEmpty),
            "is_not_empty" => Ok(Operator::IsNotEmpty),
            _ => Err(CompileError::UnknownOperator {
                token: token.to_owned(),
            }),
        }
    }

    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Operator::Equal => "equal",
            Operator::NotEqual => "not_equal",
            Operator::Less => "less",
            Operator::LessOrEqual => "less_or_equal",
            Operator::Greater => "greater",
            Operator::GreaterOrEqual => "greater_or_equal",
            Operator::Between => "between",
            Operator::NotBetween => "not_between",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::BeginsWith => "begins_with",
            Operator::NotBeginsWith => "not_begins_with",
            Operator::EndsWith => "ends_with",
            Operator::NotEndsWith => "not_ends_with",
            Operator::IsNull => "is_null",
            Operator::IsNotNull => "is_not_null",
            Operator::IsEmpty => "is_empty",
            Operator::IsNotEmpty => "is_not_empty",
        }
    }

    /// Whether this operator consumes a value at all.
    #[must_use]
    pub fn takes_value(self) -> bool {
        !matches!(
            self,
            Operator::IsNull | Operator::IsNotNull | Operator::IsEmpty | Operator::IsNotEmpty
        )
    }

    /// Whether the raw value is tokenized into multiple constants
    /// (`between`, `in` and their negations).
    #[must_use]
    pub fn is_multi_valued(self) -> bool {
        matches!(
            self,
            Operator::Between | Operator::NotBetween | Operator::In | Operator::NotIn
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
