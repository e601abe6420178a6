use sift::{apply_filter, DataType, Record, RuleNode, Schema};

fn main() {
    // Customers with one-to-many orders; the path crosses the collection
    // existentially: keep customers with at least one order over 100.
    let schema = Schema::new()
        .scalar("name", DataType::String)
        .nested("profile", Schema::new().nullable("city", DataType::String))
        .nested_list("orders", Schema::new().scalar("total", DataType::Double));

    let tree = RuleNode::group(
        "OR",
        vec![
            RuleNode::leaf("orders.total", "double", "greater", 100.0),
            RuleNode::leaf("profile.city", "string", "equal", "Oslo"),
        ],
    );

    let customers = vec![
        Record::new()
            .set("name", "Ada")
            .set("profile.city", "Lima")
            .set(
                "orders",
                vec![
                    Record::new().set("total", 40.0),
                    Record::new().set("total", 250.0),
                ],
            ),
        Record::new()
            .set("name", "Bo")
            .set("profile.city", "OSLO")
            .set("orders", Vec::<Record>::new()),
        Record::new()
            .set("name", "Cy")
            .set("profile.city", "Bergen")
            .set("orders", vec![Record::new().set("total", 12.5)]),
    ];

    let kept = apply_filter(&customers, &tree, &schema).expect("failed to compile filter");
    for customer in &kept {
        if let Some(name) = customer.get("name") {
            println!("kept {name}");
        }
    }
}
