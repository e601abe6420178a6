use sift::{compile, DataType, Record, RuleNode, Schema};

fn main() {
    // The wire shape a query-builder UI emits
    let tree: RuleNode = serde_json::from_str(
        r#"{
            "condition": "AND",
            "rules": [
                {"field": "status", "type": "string", "operator": "equal", "value": "active"},
                {"field": "age", "type": "integer", "operator": "greater_or_equal", "value": 18}
            ]
        }"#,
    )
    .expect("failed to parse rule tree");

    let schema = Schema::new()
        .scalar("name", DataType::String)
        .scalar("age", DataType::Integer)
        .scalar("status", DataType::String);

    let predicate = compile(&tree, &schema).expect("failed to compile filter");

    let people = vec![
        Record::new()
            .set("name", "Ada")
            .set("age", 36_i64)
            .set("status", "active"),
        Record::new()
            .set("name", "Bo")
            .set("age", 17_i64)
            .set("status", "active"),
        Record::new()
            .set("name", "Cy")
            .set("age", 64_i64)
            .set("status", "closed"),
    ];

    for person in &people {
        let name = person.get("name").map(ToString::to_string);
        println!(
            "{}: {}",
            name.unwrap_or_default(),
            if predicate.matches(person) {
                "matches"
            } else {
                "filtered out"
            }
        );
    }
}
