//! Resolves a leaf rule's dotted field path against the schema and produces
//! the predicate fragment for it.
//!
//! The walk validates every segment at compile time, so a typo surfaces as an
//! [`CompileError::UnresolvedField`] instead of a silently-false predicate.
//! Crossing a one-to-many member gives the rest of the path existential
//! semantics: the leaf holds when any element of the collection satisfies it.
//! Segments with no structural member delegate to the resolver in scope (the
//! one attached to the enclosing member, else the configured fallback).

use std::sync::Arc;

use crate::coerce::coerce;
use crate::operators::{build_test, FieldInfo};
use crate::types::{
    CompileError, CompileOptions, DataType, DateHook, FieldShape, FieldValue, Operator,
    PredicateFragment, ResolverRegistry, RuleNode, Schema,
};

/// Compile one leaf rule into a predicate fragment over the root record.
pub(crate) fn compile_leaf(
    field: &str,
    rule: &RuleNode,
    schema: &Schema,
    options: &CompileOptions,
    registry: &ResolverRegistry,
    date_hook: Option<DateHook>,
) -> Result<PredicateFragment, CompileError> {
    let declared = match rule.data_type.as_deref() {
        Some(token) => DataType::parse_token(token)?,
        None => {
            return Err(CompileError::UnsupportedType {
                token: "<missing>".to_owned(),
            })
        }
    };
    let op = match rule.operator.as_deref() {
        Some(token) => Operator::parse_token(token)?,
        None => {
            return Err(CompileError::UnknownOperator {
                token: "<missing>".to_owned(),
            })
        }
    };
    let constants = if op.takes_value() {
        let raw = rule
            .value
            .as_ref()
            .ok_or_else(|| CompileError::MalformedValue {
                detail: format!("'{op}' expects a value, got none"),
            })?;
        coerce(declared, raw, op.is_multi_valued(), options)?
    } else {
        Vec::new()
    };

    if options.use_indexed_access {
        return compile_indexed(field, op, declared, constants, options, date_hook);
    }

    let segments: Vec<&str> = field.split('.').collect();
    let cx = LeafCx {
        rule,
        options,
        registry,
        op,
        declared,
        full_path: field,
    };
    walk(&cx, schema, None, "", &segments, constants, date_hook)
}

/// Indexed mode: the whole dotted field string is one key inside a uniform
/// accessor member, so there is no structural walk and nothing is known about
/// the field's storage.
fn compile_indexed(
    field: &str,
    op: Operator,
    declared: DataType,
    constants: Vec<FieldValue>,
    options: &CompileOptions,
    date_hook: Option<DateHook>,
) -> Result<PredicateFragment, CompileError> {
    let accessor = options
        .indexed_accessor_name
        .clone()
        .ok_or_else(|| CompileError::MissingExternalCapability {
            capability: "indexed accessor member name".to_owned(),
        })?;
    let test = build_test(op, declared, constants, FieldInfo::unknown(), date_hook)?;
    let key = field.to_owned();
    Ok(Arc::new(move |rec| {
        let value = match rec.field(&accessor) {
            Some(FieldValue::Nested(bag)) => bag.field(&key).unwrap_or(&FieldValue::Null),
            _ => &FieldValue::Null,
        };
        test(value)
    }))
}

struct LeafCx<'a> {
    rule: &'a RuleNode,
    options: &'a CompileOptions,
    registry: &'a ResolverRegistry,
    op: Operator,
    declared: DataType,
    full_path: &'a str,
}

fn walk(
    cx: &LeafCx<'_>,
    schema: &Schema,
    scope_resolver: Option<&str>,
    consumed: &str,
    segments: &[&str],
    constants: Vec<FieldValue>,
    date_hook: Option<DateHook>,
) -> Result<PredicateFragment, CompileError> {
    let seg = segments[0];
    let Some(member) = schema.field(seg) else {
        return delegate(cx, scope_resolver, consumed, segments);
    };

    let rest = &segments[1..];
    if rest.is_empty() {
        let info = FieldInfo {
            textual: member.shape().is_textual(),
            nullable: member.is_nullable(),
        };
        let test = build_test(cx.op, cx.declared, constants, info, date_hook)?;
        let name = seg.to_owned();
        return Ok(Arc::new(move |rec| {
            test(rec.field(&name).unwrap_or(&FieldValue::Null))
        }));
    }

    let next_consumed = if consumed.is_empty() {
        seg.to_owned()
    } else {
        format!("{consumed}.{seg}")
    };
    match member.shape() {
        FieldShape::Nested(inner) => {
            let frag = walk(
                cx,
                inner,
                member.resolver(),
                &next_consumed,
                rest,
                constants,
                date_hook,
            )?;
            let name = seg.to_owned();
            Ok(Arc::new(move |rec| match rec.field(&name) {
                Some(FieldValue::Nested(nested)) => frag(nested),
                _ => false,
            }))
        }
        // One-to-many hop: the rest of the path quantifies existentially
        // over the collection's elements.
        FieldShape::NestedList(inner) => {
            let frag = walk(
                cx,
                inner,
                member.resolver(),
                &next_consumed,
                rest,
                constants,
                date_hook,
            )?;
            let name = seg.to_owned();
            Ok(Arc::new(move |rec| match rec.field(&name) {
                Some(FieldValue::List(items)) => items
                    .iter()
                    .any(|item| matches!(item, FieldValue::Nested(nested) if frag(nested))),
                _ => false,
            }))
        }
        // The path continues past a scalar member.
        FieldShape::Scalar(_) | FieldShape::ScalarList(_) => Err(CompileError::UnresolvedField {
            segment: rest[0].to_owned(),
            path: cx.full_path.to_owned(),
        }),
    }
}

fn delegate(
    cx: &LeafCx<'_>,
    scope_resolver: Option<&str>,
    consumed: &str,
    segments: &[&str],
) -> Result<PredicateFragment, CompileError> {
    let name = scope_resolver
        .or(cx.options.fallback_resolver.as_deref())
        .ok_or_else(|| CompileError::UnresolvedField {
            segment: segments[0].to_owned(),
            path: cx.full_path.to_owned(),
        })?;
    let resolver =
        cx.registry
            .lookup(name)
            .ok_or_else(|| CompileError::MissingExternalCapability {
                capability: format!("field resolver '{name}'"),
            })?;
    resolver.build_predicate(consumed, cx.rule, cx.options, cx.declared, segments, cx.registry)
}
