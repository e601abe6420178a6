//! The operator table: one predicate builder per operator token.
//!
//! Each builder closes over the coerced constants and returns a test over a
//! single resolved [`FieldValue`]. Evaluation is maximally permissive:
//! missing, null or mistyped values fail the comparison instead of raising.
//! Pairings the declared type can never satisfy (substring operators on
//! numbers, ordering on booleans) are rejected here, at compile time.
//!
//! Scalar comparisons lift existentially over list-valued fields: the leaf
//! holds if any element satisfies the (possibly negated) scalar test.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::types::{CompileError, DataType, DateHook, FieldValue, Operator};

/// A compiled test over one resolved field value.
pub(crate) type ValueTest = Arc<dyn Fn(&FieldValue) -> bool + Send + Sync>;

/// What the compiler knows about the field a leaf targets. Unknown storage
/// (indexed access, resolver-delegated fields) assumes a nullable,
/// non-textual field.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldInfo {
    /// The stored representation is text (enables the date-hook path for
    /// `between` over textual date fields).
    pub textual: bool,
    pub nullable: bool,
}

impl FieldInfo {
    pub(crate) fn unknown() -> Self {
        Self {
            textual: false,
            nullable: true,
        }
    }
}

/// Build the value test for `op` from the coerced `constants`.
pub(crate) fn build_test(
    op: Operator,
    declared: DataType,
    constants: Vec<FieldValue>,
    info: FieldInfo,
    date_hook: Option<DateHook>,
) -> Result<ValueTest, CompileError> {
    match op {
        Operator::Equal => Ok(lift(equality(declared, first_constant(op, constants)?))),
        Operator::NotEqual => Ok(lift(negate(equality(
            declared,
            first_constant(op, constants)?,
        )))),
        Operator::Less | Operator::LessOrEqual | Operator::Greater | Operator::GreaterOrEqual => {
            reject_boolean(op, declared)?;
            Ok(lift(ordering(op, declared, first_constant(op, constants)?)))
        }
        Operator::Between => {
            reject_boolean(op, declared)?;
            let (lo, hi) = exactly_two(op, constants)?;
            Ok(lift(between(declared, lo, hi, info, date_hook, op)?))
        }
        Operator::NotBetween => {
            reject_boolean(op, declared)?;
            let (lo, hi) = exactly_two(op, constants)?;
            Ok(lift(negate(between(declared, lo, hi, info, date_hook, op)?)))
        }
        Operator::In => Ok(one_of(declared, non_empty(op, constants)?)),
        Operator::NotIn => Ok(negate(one_of(declared, non_empty(op, constants)?))),
        Operator::Contains => Ok(lift(substring(op, declared, constants, |h, n| h.contains(n))?)),
        Operator::NotContains => Ok(lift(negate(substring(op, declared, constants, |h, n| {
            h.contains(n)
        })?))),
        Operator::BeginsWith => Ok(lift(substring(op, declared, constants, |h, n| {
            h.starts_with(n)
        })?)),
        Operator::NotBeginsWith => Ok(lift(negate(substring(op, declared, constants, |h, n| {
            h.starts_with(n)
        })?))),
        Operator::EndsWith => Ok(lift(substring(op, declared, constants, |h, n| {
            h.ends_with(n)
        })?)),
        Operator::NotEndsWith => Ok(lift(negate(substring(op, declared, constants, |h, n| {
            h.ends_with(n)
        })?))),
        Operator::IsNull => Ok(null_test(info)),
        Operator::IsNotNull => Ok(negate(null_test(info))),
        Operator::IsEmpty => Ok(empty_test()),
        Operator::IsNotEmpty => Ok(negate(empty_test())),
    }
}

fn negate(test: ValueTest) -> ValueTest {
    Arc::new(move |v| !test(v))
}

/// Existential lift: a list-valued field satisfies the leaf when any element
/// satisfies the scalar test. Non-list values pass straight through.
fn lift(test: ValueTest) -> ValueTest {
    Arc::new(move |v| match v {
        FieldValue::List(items) => items.iter().any(|item| test(item)),
        _ => test(v),
    })
}

/// Case-insensitive equality for declared strings; numeric fallback when the
/// declared type is Integer but the stored value is text; native comparison
/// otherwise. Null never equals anything.
fn equality(declared: DataType, constant: FieldValue) -> ValueTest {
    if declared == DataType::String {
        if let FieldValue::String(c) = &constant {
            let needle = c.to_lowercase();
            return Arc::new(move |v| match v {
                FieldValue::String(s) => s.to_lowercase() == needle,
                _ => false,
            });
        }
    }
    if declared == DataType::Integer {
        if let FieldValue::Int(n) = constant {
            return Arc::new(move |v| match v {
                FieldValue::String(s) => s.trim().parse::<i64>() == Ok(n),
                _ => v.partial_cmp_value(&FieldValue::Int(n)) == Some(Ordering::Equal),
            });
        }
    }
    Arc::new(move |v| v.partial_cmp_value(&constant) == Some(Ordering::Equal))
}

fn ordering_matches(op: Operator, ord: Ordering) -> bool {
    match op {
        Operator::Less => ord == Ordering::Less,
        Operator::LessOrEqual => ord != Ordering::Greater,
        Operator::Greater => ord == Ordering::Greater,
        Operator::GreaterOrEqual => ord != Ordering::Less,
        _ => unreachable!("not an ordering operator"),
    }
}

fn ordering(op: Operator, declared: DataType, constant: FieldValue) -> ValueTest {
    Arc::new(move |v| {
        let ord = match v {
            FieldValue::String(s) if declared == DataType::Integer => s
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(|n| FieldValue::Int(n).partial_cmp_value(&constant)),
            _ => v.partial_cmp_value(&constant),
        };
        ord.is_some_and(|o| ordering_matches(op, o))
    })
}

fn in_range(v: &FieldValue, lo: &FieldValue, hi: &FieldValue) -> bool {
    v.partial_cmp_value(lo).is_some_and(|o| o != Ordering::Less)
        && v.partial_cmp_value(hi).is_some_and(|o| o != Ordering::Greater)
}

/// Inclusive range test. A textual date field needs the host's string-to-date
/// hook; without it the comparison would silently miscompare, so compilation
/// fails instead.
fn between(
    declared: DataType,
    lo: FieldValue,
    hi: FieldValue,
    info: FieldInfo,
    date_hook: Option<DateHook>,
    op: Operator,
) -> Result<ValueTest, CompileError> {
    if declared == DataType::DateTime && info.textual && date_hook.is_none() {
        return Err(CompileError::MissingExternalCapability {
            capability: format!("date conversion hook (required for '{op}' on a textual field)"),
        });
    }
    Ok(Arc::new(move |v| match v {
        FieldValue::String(s) if declared == DataType::DateTime => date_hook
            .as_ref()
            .and_then(|hook| hook(s))
            .is_some_and(|d| in_range(&FieldValue::DateTime(d), &lo, &hi)),
        FieldValue::String(s) if declared == DataType::Integer => s
            .trim()
            .parse::<i64>()
            .is_ok_and(|n| in_range(&FieldValue::Int(n), &lo, &hi)),
        _ => in_range(v, &lo, &hi),
    }))
}

/// Membership test. List-valued fields use native per-element equality;
/// scalar strings compare case-insensitively; other scalars are a
/// disjunction of native equalities.
fn one_of(declared: DataType, constants: Vec<FieldValue>) -> ValueTest {
    let lowered: Vec<String> = constants
        .iter()
        .filter_map(|c| match c {
            FieldValue::String(s) => Some(s.to_lowercase()),
            _ => None,
        })
        .collect();
    Arc::new(move |v| match v {
        FieldValue::Null => false,
        FieldValue::List(items) => items.iter().any(|item| {
            constants
                .iter()
                .any(|c| item.partial_cmp_value(c) == Some(Ordering::Equal))
        }),
        FieldValue::String(s) if declared == DataType::String => {
            let lv = s.to_lowercase();
            lowered.iter().any(|c| *c == lv)
        }
        other => constants
            .iter()
            .any(|c| other.partial_cmp_value(c) == Some(Ordering::Equal)),
    })
}

/// Case-insensitive substring/prefix/suffix family. Only declared strings
/// can satisfy these, so any other declared type is rejected at compile
/// time. Null fields fail the positive form.
fn substring(
    op: Operator,
    declared: DataType,
    constants: Vec<FieldValue>,
    matcher: fn(&str, &str) -> bool,
) -> Result<ValueTest, CompileError> {
    if declared != DataType::String {
        return Err(CompileError::IncompatibleOperator {
            operator: op.token().to_owned(),
            declared: declared.token().to_owned(),
        });
    }
    // Declared String means coercion produced string constants.
    let FieldValue::String(needle) = first_constant(op, constants)? else {
        return Err(CompileError::MalformedValue {
            detail: format!("'{op}' expects a string value"),
        });
    };
    let needle = needle.to_lowercase();
    Ok(Arc::new(move |v| match v {
        FieldValue::String(s) => matcher(&s.to_lowercase(), &needle),
        _ => false,
    }))
}

/// Null identity. A non-nullable scalar is definitionally never null, so the
/// positive form compiles to constant false (and its negation to constant
/// true).
fn null_test(info: FieldInfo) -> ValueTest {
    if info.nullable {
        Arc::new(|v| v.is_null())
    } else {
        Arc::new(|_| false)
    }
}

/// Zero-length test. Null is not empty; only strings and lists can be empty.
fn empty_test() -> ValueTest {
    Arc::new(|v| match v {
        FieldValue::String(s) => s.is_empty(),
        FieldValue::List(items) => items.is_empty(),
        _ => false,
    })
}

fn reject_boolean(op: Operator, declared: DataType) -> Result<(), CompileError> {
    if declared == DataType::Boolean {
        return Err(CompileError::IncompatibleOperator {
            operator: op.token().to_owned(),
            declared: declared.token().to_owned(),
        });
    }
    Ok(())
}

fn first_constant(op: Operator, constants: Vec<FieldValue>) -> Result<FieldValue, CompileError> {
    constants
        .into_iter()
        .next()
        .ok_or_else(|| CompileError::MalformedValue {
            detail: format!("'{op}' expects a value, got none"),
        })
}

fn exactly_two(
    op: Operator,
    constants: Vec<FieldValue>,
) -> Result<(FieldValue, FieldValue), CompileError> {
    let count = constants.len();
    let mut it = constants.into_iter();
    match (it.next(), it.next(), it.next()) {
        (Some(lo), Some(hi), None) => Ok((lo, hi)),
        _ => Err(CompileError::MalformedValue {
            detail: format!("'{op}' expects exactly two values, got {count}"),
        }),
    }
}

fn non_empty(op: Operator, constants: Vec<FieldValue>) -> Result<Vec<FieldValue>, CompileError> {
    if constants.is_empty() {
        return Err(CompileError::MalformedValue {
            detail: format!("'{op}' expects at least one value, got none"),
        });
    }
    Ok(constants)
}
