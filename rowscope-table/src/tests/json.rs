use super::*;

use serde_json::json;

fn records() -> Vec<Arc<serde_json::Value>> {
    vec![
        Arc::new(json!({"name": "Ada", "address": {"city": "London"}, "tags": ["math", "engines"]})),
        Arc::new(json!({"name": "Grace", "address": {"city": "New York"}, "tags": ["navy"]})),
        Arc::new(json!({"name": "Linus", "tags": []})),
    ]
}

fn json_table() -> Table<serde_json::Value> {
    let columns = vec![
        ColumnDef::accessor_key("name"),
        ColumnDef::accessor_key("address.city"),
        ColumnDef::accessor_key("tags.0"),
        ColumnDef::accessor_key("tags"),
    ];
    Table::new(TableOptions::new(records(), columns)).unwrap()
}

#[test]
fn dotted_paths_walk_objects_and_arrays() {
    let table = json_table();
    let ids: Vec<String> = table.leaf_columns().iter().map(|c| c.id().to_string()).collect();
    assert_eq!(ids, ["name", "address_city", "tags_0", "tags"]);

    let rows = table.row_model().unwrap();
    assert_eq!(table.row_value(&rows.rows[0], "address_city").unwrap(), Value::from("London"));
    assert_eq!(table.row_value(&rows.rows[0], "tags_0").unwrap(), Value::from("math"));
    assert_eq!(
        table.row_value(&rows.rows[1], "tags").unwrap(),
        Value::list([Value::from("navy")])
    );
}

#[test]
fn missing_keys_read_as_undefined() {
    let table = json_table();
    let linus = table.row("2").unwrap();
    assert_eq!(table.row_value(&linus, "address_city").unwrap(), Value::Undefined);
    assert_eq!(table.row_value(&linus, "tags_0").unwrap(), Value::Undefined);
    assert_eq!(table.row_model().unwrap().rows.len(), 3);

    // Both misses take the warning path.
    let city = table.column("address_city").unwrap();
    assert_eq!(
        city.try_read(&linus.original).unwrap_err(),
        AccessorError::missing_key("address.city")
    );
    assert_eq!(
        table.column("tags_0").unwrap().try_read(&linus.original).unwrap_err(),
        AccessorError::missing_key("tags.0")
    );
}

#[test]
fn json_columns_filter_and_sort() {
    let mut table = json_table();
    table.set_column_filter_value("tags", "navy").unwrap();
    assert_eq!(ids(&table.row_model().unwrap().rows), ["1"]);

    table.reset_column_filters();
    table.set_sorting(|_| vec![ColumnSort::asc("address_city")]);
    // Undefined sorts after defined values ascending.
    assert_eq!(ids(&table.row_model().unwrap().rows), ["0", "1", "2"]);
    table.set_sorting(|_| vec![ColumnSort::desc("address_city")]);
    assert_eq!(ids(&table.row_model().unwrap().rows), ["2", "1", "0"]);
}

#[test]
fn json_values_convert_by_type() {
    assert_eq!(Value::from(&json!(null)), Value::Null);
    assert_eq!(Value::from(&json!(true)), Value::from(true));
    assert_eq!(Value::from(&json!(2.5)), Value::from(2.5));
    assert_eq!(Value::from(&json!([1, "a"])), Value::list([Value::from(1), Value::from("a")]));
    // Objects are kept as their JSON text.
    assert_eq!(Value::from(&json!({"a": 1})), Value::from(r#"{"a":1}"#));
}
