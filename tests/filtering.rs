use std::sync::Arc;

use sift::{
    apply_filter, compile, CompileError, CompileOptions, DataType, FieldValue, FilterCompiler,
    Locale, Record, RuleNode, Schema,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn customer_schema() -> Schema {
    Schema::new()
        .scalar("name", DataType::String)
        .nullable("nickname", DataType::String)
        .scalar("age", DataType::Integer)
        .scalar("status", DataType::String)
        .scalar("country", DataType::String)
        .scalar("balance", DataType::Double)
        .scalar("signup", DataType::DateTime)
        .list("tags", DataType::String)
        .nested_list(
            "orders",
            Schema::new()
                .scalar("total", DataType::Double)
                .nested_list("items", Schema::new().scalar("sku", DataType::String)),
        )
}

fn customers() -> Vec<Record> {
    vec![
        Record::new()
            .set("name", "Ada")
            .set("age", 36_i64)
            .set("status", "active")
            .set("country", "US")
            .set("balance", 120.5)
            .set("tags", vec!["vip", "early"]),
        Record::new()
            .set("name", "Bo")
            .set("nickname", Option::<&str>::None)
            .set("age", 17_i64)
            .set("status", "active")
            .set("country", "CA")
            .set("balance", 3.0)
            .set("tags", Vec::<&str>::new()),
        Record::new()
            .set("name", "Cy")
            .set("nickname", "The Snake")
            .set("age", 64_i64)
            .set("status", "closed")
            .set("country", "MX")
            .set("balance", 0.0),
    ]
}

fn names(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| match r.get("name") {
            Some(FieldValue::String(s)) => s.clone(),
            other => panic!("expected name, got {other:?}"),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Boolean composition
// ---------------------------------------------------------------------------

#[test]
fn or_of_and_groups() {
    // (status == active AND age >= 18) OR country == MX
    let tree = RuleNode::group(
        "OR",
        vec![
            RuleNode::group(
                "AND",
                vec![
                    RuleNode::leaf("status", "string", "equal", "active"),
                    RuleNode::leaf("age", "integer", "greater_or_equal", 18),
                ],
            ),
            RuleNode::leaf("country", "string", "equal", "MX"),
        ],
    );
    let kept = apply_filter(&customers(), &tree, &customer_schema()).unwrap();
    assert_eq!(names(&kept), vec!["Ada", "Cy"]);
}

#[test]
fn json_tree_end_to_end() {
    let tree: RuleNode = serde_json::from_str(
        r#"{
            "condition": "AND",
            "rules": [
                {"field": "status", "type": "string", "operator": "equal", "value": "ACTIVE"},
                {"field": "age", "type": "integer", "operator": "between", "value": [10, 40]}
            ]
        }"#,
    )
    .unwrap();
    let kept = apply_filter(&customers(), &tree, &customer_schema()).unwrap();
    assert_eq!(names(&kept), vec!["Ada", "Bo"]);
}

#[test]
fn json_records_end_to_end() {
    let raw: Vec<serde_json::Value> = serde_json::from_str(
        r#"[
            {"name": "x", "age": 30, "status": "active"},
            {"name": "y", "age": 50, "status": "active"},
            {"name": "z", "age": 30, "status": "closed"}
        ]"#,
    )
    .unwrap();
    let records: Vec<Record> = raw
        .into_iter()
        .map(|v| match v {
            serde_json::Value::Object(map) => map.into(),
            other => panic!("expected object, got {other}"),
        })
        .collect();

    let tree = RuleNode::group(
        "AND",
        vec![
            RuleNode::leaf("status", "string", "equal", "active"),
            RuleNode::leaf("age", "integer", "less", 40),
        ],
    );
    let kept = apply_filter(&records, &tree, &customer_schema()).unwrap();
    assert_eq!(names(&kept), vec!["x"]);
}

// ---------------------------------------------------------------------------
// Operator semantics over real collections
// ---------------------------------------------------------------------------

#[test]
fn null_string_comparisons_degrade_to_false() {
    let equal = RuleNode::leaf("nickname", "string", "equal", "anything");
    let kept = apply_filter(&customers(), &equal, &customer_schema()).unwrap();
    assert_eq!(names(&kept), Vec::<String>::new());

    let contains = RuleNode::leaf("nickname", "string", "contains", "snake");
    let kept = apply_filter(&customers(), &contains, &customer_schema()).unwrap();
    assert_eq!(names(&kept), vec!["Cy"]);
}

#[test]
fn between_is_inclusive() {
    let schema = Schema::new().scalar("n", DataType::Integer);
    let tree = RuleNode::leaf("n", "integer", "between", vec!["10", "20"]);
    let p = compile(&tree, &schema).unwrap();
    assert!(p.matches(&Record::new().set("n", 15_i64)));
    assert!(!p.matches(&Record::new().set("n", 9_i64)));
    assert!(p.matches(&Record::new().set("n", 10_i64)));
    assert!(p.matches(&Record::new().set("n", 20_i64)));
    assert!(!p.matches(&Record::new().set("n", 21_i64)));
}

#[test]
fn in_is_case_insensitive_for_strings() {
    let tree = RuleNode::leaf("country", "string", "in", vec!["us", "ca"]);
    let kept = apply_filter(&customers(), &tree, &customer_schema()).unwrap();
    assert_eq!(names(&kept), vec!["Ada", "Bo"]);

    // Delimited single-string form tokenizes the same way.
    let tree = RuleNode::leaf("country", "string", "in", "[us, ca]");
    let kept = apply_filter(&customers(), &tree, &customer_schema()).unwrap();
    assert_eq!(names(&kept), vec!["Ada", "Bo"]);
}

#[test]
fn is_empty_does_not_match_missing_list() {
    // Cy has no tags member at all: null, not empty.
    let tree = RuleNode::nullary("tags", "string", "is_empty");
    let kept = apply_filter(&customers(), &tree, &customer_schema()).unwrap();
    assert_eq!(names(&kept), vec!["Bo"]);
}

#[test]
fn tags_contains_lifts_over_list() {
    let tree = RuleNode::leaf("tags", "string", "contains", "VIP");
    let kept = apply_filter(&customers(), &tree, &customer_schema()).unwrap();
    assert_eq!(names(&kept), vec!["Ada"]);
}

#[test]
fn deep_existential_path() {
    let mut records = customers();
    records[0].insert(
        "orders",
        vec![
            Record::new()
                .set("total", 40.0)
                .set("items", vec![Record::new().set("sku", "bolt-1")]),
            Record::new()
                .set("total", 80.5)
                .set("items", vec![Record::new().set("sku", "WIDGET-9")]),
        ]
        .into(),
    );
    records[1].insert(
        "orders",
        vec![Record::new()
            .set("total", 3.0)
            .set("items", vec![Record::new().set("sku", "bolt-1")])]
        .into(),
    );

    let tree = RuleNode::leaf("orders.items.sku", "string", "equal", "widget-9");
    let kept = apply_filter(&records, &tree, &customer_schema()).unwrap();
    assert_eq!(names(&kept), vec!["Ada"]);
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

#[test]
fn date_tokens_are_utc_midnight() {
    let schema = Schema::new().scalar("signup", DataType::DateTime);
    let tree = RuleNode::leaf(
        "signup",
        "datetime",
        "between",
        vec!["2024-01-01", "2024-06-30"],
    );
    let p = compile(&tree, &schema).unwrap();

    use chrono::{TimeZone, Utc};
    let inside = Record::new().set("signup", Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    assert!(p.matches(&inside));
    // The lower bound is midnight UTC on Jan 1, inclusive.
    let boundary =
        Record::new().set("signup", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    assert!(p.matches(&boundary));
    let before =
        Record::new().set("signup", Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap());
    assert!(!p.matches(&before));
}

#[test]
fn unparseable_date_never_matches() {
    let schema = Schema::new().scalar("signup", DataType::DateTime);
    let tree = RuleNode::leaf("signup", "datetime", "equal", "not a date");
    let p = compile(&tree, &schema).unwrap();

    use chrono::{TimeZone, Utc};
    let rec = Record::new().set("signup", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    assert!(!p.matches(&rec));
}

#[test]
fn locale_changes_date_component_order() {
    use chrono::{TimeZone, Utc};
    let schema = Schema::new().scalar("signup", DataType::DateTime);
    let compiler = FilterCompiler::new(schema);
    let tree = RuleNode::leaf("signup", "datetime", "equal", "02/03/2024");

    let feb3 = Record::new().set("signup", Utc.with_ymd_and_hms(2024, 2, 3, 0, 0, 0).unwrap());
    let mar2 = Record::new().set("signup", Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap());

    let us = compiler
        .compile_with(&tree, &CompileOptions::new().locale(Locale::EnUs))
        .unwrap();
    assert!(us.matches(&feb3));
    assert!(!us.matches(&mar2));

    let gb = compiler
        .compile_with(&tree, &CompileOptions::new().locale(Locale::EnGb))
        .unwrap();
    assert!(gb.matches(&mar2));
    assert!(!gb.matches(&feb3));
}

#[test]
fn locale_changes_decimal_separator() {
    let schema = Schema::new().scalar("balance", DataType::Double);
    let compiler = FilterCompiler::new(schema);
    let tree = RuleNode::leaf("balance", "double", "greater", "100,5");

    let p = compiler
        .compile_with(&tree, &CompileOptions::new().locale(Locale::DeDe))
        .unwrap();
    assert!(p.matches(&Record::new().set("balance", 120.5)));
    assert!(!p.matches(&Record::new().set("balance", 3.0)));

    // The same token is malformed under the en-US separator.
    let err = compiler
        .compile_with(&tree, &CompileOptions::new().locale(Locale::EnUs))
        .unwrap_err();
    assert!(matches!(err, CompileError::MalformedValue { .. }));
}

// ---------------------------------------------------------------------------
// Plugged-in capabilities
// ---------------------------------------------------------------------------

#[test]
fn textual_date_between_via_hook() {
    let schema = Schema::new().nullable("signup_text", DataType::String);
    let tree = RuleNode::leaf(
        "signup_text",
        "datetime",
        "between",
        vec!["2024-01-01", "2024-12-31"],
    );

    let compiler = FilterCompiler::new(schema)
        .with_date_converter(Arc::new(|s| Locale::EnUs.parse_datetime(s, true)));
    let p = compiler.compile(&tree).unwrap();
    assert!(p.matches(&Record::new().set("signup_text", "2024-06-15")));
    assert!(!p.matches(&Record::new().set("signup_text", "2025-06-15")));
    assert!(!p.matches(&Record::new().set("signup_text", "garbage")));
}

#[test]
fn fallback_resolver_end_to_end() {
    use sift::{FieldResolver, PredicateFragment, ResolverRegistry};

    // Resolves any unknown member as an equality over a flat "extras" bag.
    struct ExtrasResolver;

    impl FieldResolver for ExtrasResolver {
        fn build_predicate(
            &self,
            _current_path: &str,
            rule: &RuleNode,
            _options: &CompileOptions,
            _declared: DataType,
            remaining: &[&str],
            _registry: &ResolverRegistry,
        ) -> Result<PredicateFragment, CompileError> {
            let key = remaining.join(".");
            let want = match rule.value.as_ref() {
                Some(sift::RuleValue::Single(s)) => s.clone(),
                _ => String::new(),
            };
            Ok(Arc::new(move |rec| {
                match rec.get("extras") {
                    Some(FieldValue::Nested(bag)) => matches!(
                        bag.field(&key),
                        Some(FieldValue::String(s)) if s.eq_ignore_ascii_case(&want)
                    ),
                    _ => false,
                }
            }))
        }
    }

    let compiler = FilterCompiler::new(customer_schema())
        .with_resolver("extras", Arc::new(ExtrasResolver));
    let options = CompileOptions::new().fallback_resolver("extras");
    let tree = RuleNode::leaf("tier", "string", "equal", "gold");
    let p = compiler.compile_with(&tree, &options).unwrap();

    let hit = Record::new()
        .set("name", "Ada")
        .set("extras", Record::new().set("tier", "GOLD"));
    assert!(p.matches(&hit));
    let miss = Record::new()
        .set("name", "Bo")
        .set("extras", Record::new().set("tier", "silver"));
    assert!(!p.matches(&miss));
}

#[test]
fn indexed_access_end_to_end() {
    let compiler = FilterCompiler::new(Schema::new());
    let options = CompileOptions::new().indexed_access("answers");
    let tree = RuleNode::leaf("survey.q1", "string", "equal", "yes");
    let p = compiler.compile_with(&tree, &options).unwrap();

    let hit = Record::new().set("answers", Record::new().set_member("survey.q1", "YES"));
    assert!(p.matches(&hit));
    let miss = Record::new().set("answers", Record::new().set_member("survey.q1", "no"));
    assert!(!p.matches(&miss));
    assert!(!p.matches(&Record::new()));
}

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

#[test]
fn errors_name_their_cause() {
    let schema = customer_schema();

    let err = compile(
        &RuleNode::leaf("age", "decimal", "equal", 1),
        &schema,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "unsupported data type 'decimal'");

    let err = compile(
        &RuleNode::leaf("age", "integer", "starts_with_fuzzy", 1),
        &schema,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "unknown operator 'starts_with_fuzzy'");

    let err = compile(
        &RuleNode::leaf("address.zip", "string", "equal", "x"),
        &schema,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnresolvedField { segment, path }
            if segment == "address" && path == "address.zip"
    ));

    let err = compile(
        &RuleNode::leaf("age", "integer", "contains", 5),
        &schema,
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::IncompatibleOperator { .. }));

    let err = compile(
        &RuleNode::leaf("age", "integer", "between", "10"),
        &schema,
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::MalformedValue { .. }));
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn repeated_evaluation_is_stable() {
    let tree = RuleNode::group(
        "OR",
        vec![
            RuleNode::leaf("status", "string", "equal", "active"),
            RuleNode::leaf("balance", "double", "greater", 100.0),
        ],
    );
    let p = compile(&tree, &customer_schema()).unwrap();
    let records = customers();
    let first: Vec<bool> = records.iter().map(|r| p.matches(r)).collect();
    for _ in 0..10 {
        let again: Vec<bool> = records.iter().map(|r| p.matches(r)).collect();
        assert_eq!(first, again);
    }
}
