use super::*;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

fn staff() -> Vec<Arc<Employee>> {
    vec![
        employee("Ada", "Sales", 100.0, 40),
        employee("Brian", "Eng", 200.0, 25),
        employee("Cleo", "Sales", 300.0, 35),
        employee("Dana", "Eng", 50.0, 20),
    ]
}

fn paged_options(data: Vec<Arc<Employee>>, page_size: usize) -> TableOptions<Employee> {
    employee_options(data)
        .with_pagination(true)
        .with_initial_state(TableState::default().with_pagination(0, page_size))
}

fn expected_sorted_ids(data: &[Arc<Employee>], desc: bool) -> Vec<String> {
    let mut order: Vec<usize> = (0..data.len()).collect();
    order.sort_by(|&a, &b| {
        let ord = data[a].age.cmp(&data[b].age);
        let ord = if desc { ord.reverse() } else { ord };
        ord.then(a.cmp(&b))
    });
    order.iter().map(|i| i.to_string()).collect()
}

fn expected_page(len: usize, page_index: usize, page_size: usize) -> Vec<String> {
    let start = (page_index * page_size).min(len);
    let end = (start + page_size).min(len);
    (start..end).map(|i| i.to_string()).collect()
}

fn expand_all_names(table: &mut Table<Node>) -> Vec<&'static str> {
    table.set_expanded(|_| ExpandedState::All);
    tree_names(&table.row_model().unwrap().rows)
}

#[test]
fn core_rows_use_position_paths_as_ids() {
    let table = Table::new(tree_options(file_tree())).unwrap();
    let core = table.core_row_model().unwrap();
    assert_eq!(ids(&core.rows), ["0", "1", "2"]);
    assert_eq!(
        ids(&core.flat_rows),
        ["0", "0.0", "0.1", "0.1.0", "1", "2", "2.0"]
    );

    let plan = core.get("0.1.0").unwrap();
    assert_eq!(plan.original.name, "plan");
    assert_eq!(plan.depth, 2);
    assert_eq!(plan.parent_id.as_deref(), Some("0.1"));
    assert_eq!(plan.index, 0);
    assert_eq!(tree_names(&core.rows[0].leaf_rows()), ["notes", "drafts", "plan"]);
}

#[test]
fn duplicate_row_ids_fail_the_core_read() {
    let options = employee_options(staff())
        .with_get_row_id(|e: &Employee, _, _| e.department.into());
    let table = Table::new(options).unwrap();
    assert_eq!(
        table.core_row_model().unwrap_err(),
        TableError::duplicate_row_id("Sales")
    );
    // Everything downstream reports the same failure.
    assert!(table.row_model().is_err());
}

#[test]
fn custom_row_ids_are_used_for_lookup() {
    let options = employee_options(staff()).with_get_row_id(|e: &Employee, _, _| {
        e.name.to_lowercase().into()
    });
    let table = Table::new(options).unwrap();
    assert_eq!(table.row("cleo").unwrap().original.salary, 300.0);
    assert_eq!(
        table.row("nobody").unwrap_err(),
        TableError::row_not_found("nobody")
    );
}

#[test]
fn duplicate_column_ids_fail_construction() {
    let mut columns = employee_columns();
    columns.push(ColumnDef::group(
        "details",
        vec![ColumnDef::accessor("age", |e: &Employee| e.age)],
    ));
    let err = Table::new(TableOptions::new(staff(), columns)).unwrap_err();
    assert_eq!(err, TableError::duplicate_column_id("age"));
}

#[test]
fn empty_column_ids_fail_construction() {
    let mut columns = employee_columns();
    columns.push(ColumnDef::accessor("", |e: &Employee| e.age));
    let err = Table::new(TableOptions::new(staff(), columns)).unwrap_err();
    assert_eq!(err, TableError::MissingColumnId);

    let mut columns = employee_columns();
    columns.push(ColumnDef::group(
        "",
        vec![ColumnDef::accessor("height", |e: &Employee| e.age)],
    ));
    let err = Table::new(TableOptions::new(staff(), columns)).unwrap_err();
    assert_eq!(err, TableError::MissingColumnId);

    // Nested leaves are checked too.
    let columns = vec![ColumnDef::group(
        "details",
        vec![ColumnDef::display("")],
    )];
    let err = Table::new(TableOptions::new(staff(), columns)).unwrap_err();
    assert_eq!(err, TableError::MissingColumnId);
}

#[test]
fn unknown_named_strategies_fail_construction() {
    let columns = vec![ColumnDef::accessor("name", |e: &Employee| e.name.clone()).with_sorting_fn("nope")];
    let err = Table::new(TableOptions::new(staff(), columns)).unwrap_err();
    assert_eq!(err, TableError::unknown_function("sorting", "nope"));

    let columns = vec![ColumnDef::accessor("salary", |e: &Employee| e.salary).with_aggregation_fn("total")];
    let err = Table::new(TableOptions::new(staff(), columns)).unwrap_err();
    assert_eq!(err, TableError::unknown_function("aggregation", "total"));
}

#[test]
fn unchanged_inputs_return_the_same_models() {
    let mut table = employee_table(staff());
    table.set_sorting(|_| vec![ColumnSort::asc("salary")]);

    let first = table.row_model().unwrap();
    assert!(Rc::ptr_eq(&first, &table.row_model().unwrap()));

    // An updater producing an equal value keeps the slice and every model.
    let sorting = Arc::clone(&table.state().sorting);
    table.set_sorting(|old| old.clone());
    assert!(Arc::ptr_eq(&sorting, &table.state().sorting));
    assert!(Rc::ptr_eq(&first, &table.row_model().unwrap()));

    // A deep-equal state built from fresh allocations is just as cheap.
    table.set_state(|s| TableState {
        sorting: Arc::new((*s.sorting).clone()),
        column_filters: Arc::new(Vec::new()),
        ..s.clone()
    });
    assert!(Arc::ptr_eq(&sorting, &table.state().sorting));
    assert!(Rc::ptr_eq(&first, &table.row_model().unwrap()));

    // Slices a stage does not read leave it alone.
    let sorted = table.sorted_row_model().unwrap();
    table.set_column_visibility(|_| [(ColumnId::from("age"), false)].into_iter().collect());
    table.set_expanded(|_| ExpandedState::All);
    assert!(Rc::ptr_eq(&sorted, &table.sorted_row_model().unwrap()));

    // Without active state a stage hands its input through.
    table.set_sorting(|_| Vec::new());
    let core = table.core_row_model().unwrap();
    assert!(Rc::ptr_eq(&core, &table.sorted_row_model().unwrap()));
}

#[test]
fn sorting_is_stable_and_matches_a_reference_sort() {
    for seed in 0..40 {
        let mut rng = Lcg::new(seed);
        let len = rng.gen_range_usize(0, 80);
        let mut data = random_employees(&mut rng, len);
        // Shuffle ages so ties land in arbitrary positions.
        for e in &mut data {
            Arc::make_mut(e).age = rng.gen_range_u64(18, 24) as u32;
        }
        let desc = rng.gen_bool();

        let mut table = employee_table(data.clone());
        table.set_sorting(|_| vec![ColumnSort { id: "age".into(), desc }]);
        let model = table.row_model().unwrap();
        assert_eq!(ids(&model.rows), expected_sorted_ids(&data, desc), "seed {seed}");
        assert_eq!(model.flat_rows.len(), len);
    }
}

#[test]
fn sorting_sorted_data_changes_nothing() {
    let mut rng = Lcg::new(7);
    let data = random_employees(&mut rng, 50);
    let mut table = employee_table(data);
    table.set_sorting(|_| vec![ColumnSort::desc("salary"), ColumnSort::asc("name")]);
    let once: Vec<Arc<Employee>> = table
        .row_model()
        .unwrap()
        .rows
        .iter()
        .map(|row| Arc::clone(&row.original))
        .collect();

    let mut again = employee_table(once.clone());
    again.set_sorting(|_| vec![ColumnSort::desc("salary"), ColumnSort::asc("name")]);
    let twice: Vec<Arc<Employee>> = again
        .row_model()
        .unwrap()
        .rows
        .iter()
        .map(|row| Arc::clone(&row.original))
        .collect();
    assert_eq!(once, twice);
    assert_eq!(ids(&again.row_model().unwrap().rows), expected_page(50, 0, 50));
}

#[test]
fn multi_key_sort_applies_keys_in_order() {
    let mut table = employee_table(staff());
    table.set_sorting(|_| vec![ColumnSort::asc("department"), ColumnSort::desc("salary")]);
    assert_eq!(
        names(&table.row_model().unwrap().rows),
        ["Brian", "Dana", "Cleo", "Ada"]
    );
}

#[test]
fn inverted_columns_sort_backwards() {
    let mut columns = employee_columns();
    columns[2] = ColumnDef::accessor("salary", |e: &Employee| e.salary).with_invert_sorting(true);
    let mut table = Table::new(TableOptions::new(staff(), columns)).unwrap();
    table.set_sorting(|_| vec![ColumnSort::asc("salary")]);
    assert_eq!(
        names(&table.row_model().unwrap().rows),
        ["Cleo", "Brian", "Ada", "Dana"]
    );
}

#[test]
fn accessors_yielding_undefined_are_reported_and_kept() {
    let mut columns = employee_columns();
    columns.push(ColumnDef::accessor("mentor", |e: &Employee| {
        if e.age > 30 { Value::from(e.name.as_str()) } else { Value::Undefined }
    }));
    columns.push(ColumnDef::display("actions"));
    let table = Table::new(TableOptions::new(staff(), columns)).unwrap();

    let brian = table.row("1").unwrap();
    let mentor = table.column("mentor").unwrap();
    assert_eq!(mentor.try_read(&brian.original).unwrap_err(), AccessorError::UndefinedValue);
    assert_eq!(table.row_value(&brian, "mentor").unwrap(), Value::Undefined);

    let ada = table.row("0").unwrap();
    assert_eq!(mentor.try_read(&ada.original).unwrap(), Value::from("Ada"));
    // No accessor is not a failure.
    let actions = table.column("actions").unwrap();
    assert_eq!(actions.try_read(&brian.original).unwrap(), Value::Undefined);
    assert_eq!(table.row_model().unwrap().rows.len(), 4);
}

#[test]
fn undefined_values_follow_the_column_policy() {
    fn bonus_table(policy: SortUndefined) -> Table<Employee> {
        let mut columns = employee_columns();
        columns.push(
            ColumnDef::try_accessor("bonus", |e: &Employee| {
                if e.age > 30 {
                    Ok(Value::from(e.salary))
                } else {
                    Err(AccessorError::failed("no bonus"))
                }
            })
            .with_sort_undefined(policy),
        );
        Table::new(TableOptions::new(staff(), columns)).unwrap()
    }

    let cases = [
        (SortUndefined::Offset(1), false, ["Ada", "Cleo", "Brian", "Dana"]),
        (SortUndefined::Offset(1), true, ["Brian", "Dana", "Cleo", "Ada"]),
        (SortUndefined::Last, false, ["Ada", "Cleo", "Brian", "Dana"]),
        (SortUndefined::Last, true, ["Cleo", "Ada", "Brian", "Dana"]),
        (SortUndefined::First, false, ["Brian", "Dana", "Ada", "Cleo"]),
        (SortUndefined::First, true, ["Brian", "Dana", "Cleo", "Ada"]),
    ];
    for (policy, desc, expected) in cases {
        let mut table = bonus_table(policy);
        table.set_sorting(|_| vec![ColumnSort { id: "bonus".into(), desc }]);
        assert_eq!(
            names(&table.row_model().unwrap().rows),
            expected,
            "{policy:?} desc={desc}"
        );
    }

    // A failed accessor reads as Undefined and the row stays in the model.
    let table = bonus_table(SortUndefined::default());
    let dana = table.row("3").unwrap();
    assert_eq!(table.row_value(&dana, "bonus").unwrap(), Value::Undefined);
    assert_eq!(table.row_model().unwrap().rows.len(), 4);
}

#[test]
fn named_sorting_fns_come_from_the_registry() {
    let columns = vec![
        ColumnDef::accessor("name", |e: &Employee| e.name.clone()).with_sorting_fn("by_length"),
    ];
    let options = TableOptions::new(staff(), columns).with_named_sorting_fn("by_length", |a, b| {
        a.to_string().len().cmp(&b.to_string().len())
    });
    let mut table = Table::new(options).unwrap();
    table.set_sorting(|_| vec![ColumnSort::asc("name")]);
    assert_eq!(
        names(&table.row_model().unwrap().rows),
        ["Ada", "Cleo", "Dana", "Brian"]
    );
}

#[test]
fn column_filters_narrow_and_removing_them_restores_the_core() {
    let mut table = employee_table(staff());
    table.set_column_filters(|_| vec![ColumnFilter::new("department", "sales")]);
    assert_eq!(names(&table.row_model().unwrap().rows), ["Ada", "Cleo"]);

    table.set_column_filters(|old| {
        let mut next = old.clone();
        next.push(ColumnFilter::new("salary", Value::list([Value::from(150), Value::Null])));
        next
    });
    assert_eq!(names(&table.row_model().unwrap().rows), ["Cleo"]);

    table.set_column_filters(|_| Vec::new());
    let core = table.core_row_model().unwrap();
    assert!(Rc::ptr_eq(&core, &table.filtered_row_model().unwrap()));
}

#[test]
fn adding_filters_never_grows_the_result() {
    for seed in 0..25 {
        let mut rng = Lcg::new(seed);
        let len = rng.gen_range_usize(1, 60);
        let data = random_employees(&mut rng, len);
        let mut table = employee_table(data.clone());

        let department = DEPARTMENTS[rng.gen_range_usize(0, DEPARTMENTS.len())];
        table.set_column_filters(|_| vec![ColumnFilter::new("department", department)]);
        let by_department: BTreeSet<String> =
            ids(&table.row_model().unwrap().rows).into_iter().collect();
        let expected: BTreeSet<String> = data
            .iter()
            .enumerate()
            .filter(|(_, e)| e.department == department)
            .map(|(i, _)| i.to_string())
            .collect();
        assert_eq!(by_department, expected, "seed {seed}");

        let floor = rng.gen_range_u64(1, 200) as f64 * 10.0;
        table.set_column_filters(|old| {
            let mut next = old.clone();
            next.push(ColumnFilter::new("salary", Value::list([Value::from(floor), Value::Null])));
            next
        });
        let narrowed: BTreeSet<String> =
            ids(&table.row_model().unwrap().rows).into_iter().collect();
        assert!(narrowed.is_subset(&by_department), "seed {seed}");
    }
}

#[test]
fn global_filter_searches_text_and_number_columns() {
    let data = vec![
        employee("Ada", "Sales", 1234.0, 40),
        employee("Brian", "Eng", 50.0, 25),
        employee("Cleo", "Ops", 70.0, 35),
    ];
    let mut table = employee_table(data);
    table.set_global_filter(|_| Value::from("23"));
    assert_eq!(names(&table.row_model().unwrap().rows), ["Ada"]);

    table.set_global_filter(|_| Value::from("ENG"));
    assert_eq!(names(&table.row_model().unwrap().rows), ["Brian"]);

    let state = table.row_filter_state("1").unwrap().unwrap();
    assert_eq!(state.passes.get(GLOBAL_FILTER_ID), Some(&true));
    assert_eq!(
        table.row_filter_state("0").unwrap().unwrap().passes.get(GLOBAL_FILTER_ID),
        Some(&false)
    );

    // An empty search is removed from state rather than stored.
    table.set_global_filter(|_| Value::from(""));
    assert_eq!(*table.state().global_filter, Value::Undefined);
    assert_eq!(table.row_model().unwrap().rows.len(), 3);
    assert_eq!(table.row_filter_state("0").unwrap(), None);
}

#[test]
fn custom_filters_record_their_meta() {
    let columns = vec![
        ColumnDef::accessor("name", |e: &Employee| e.name.clone()).with_filter_fn(FilterFn::custom(
            |row: &Value, query: &Value| {
                let name = row.to_string();
                let query = query.to_string();
                match name.find(&query) {
                    Some(at) => FilterResult::with_meta(true, at as f64),
                    None => FilterResult::from(false),
                }
            },
        )),
    ];
    let mut table = Table::new(TableOptions::new(staff(), columns)).unwrap();
    table.set_column_filters(|_| vec![ColumnFilter::new("name", "an")]);
    assert_eq!(names(&table.row_model().unwrap().rows), ["Brian", "Dana"]);

    let dana = table.row_filter_state("3").unwrap().unwrap();
    assert_eq!(dana.meta.get("name"), Some(&Value::from(1)));
    let ada = table.row_filter_state("0").unwrap().unwrap();
    assert_eq!(ada.passes.get("name"), Some(&false));
    assert!(ada.meta.is_empty());
}

#[test]
fn blank_filter_values_are_dropped_from_state() {
    let mut table = employee_table(staff());
    table.set_column_filters(|_| {
        vec![
            ColumnFilter::new("name", ""),
            ColumnFilter::new("salary", Value::list([Value::Undefined, Value::Undefined])),
            ColumnFilter::new("department", "Eng"),
        ]
    });
    assert_eq!(
        *table.state().column_filters,
        vec![ColumnFilter::new("department", "Eng")]
    );
}

#[test]
fn tree_filter_from_root_drops_rejected_subtrees() {
    let mut table = Table::new(tree_options(file_tree())).unwrap();
    table.set_column_filters(|_| vec![ColumnFilter::new("name", "o")]);
    // "plan" matches nothing, and its parent "drafts" has no "o".
    assert_eq!(tree_names(&table.row_model().unwrap().rows), ["docs", "photos"]);
    assert_eq!(expand_all_names(&mut table), ["docs", "notes", "photos"]);

    // A parent that fails takes matching children with it.
    table.set_column_filters(|_| vec![ColumnFilter::new("name", "plan")]);
    assert!(table.row_model().unwrap().rows.is_empty());
}

#[test]
fn tree_filter_from_leaf_rows_keeps_ancestors_of_matches() {
    let options = tree_options(file_tree()).with_filter_from_leaf_rows(true);
    let mut table = Table::new(options).unwrap();
    table.set_column_filters(|_| vec![ColumnFilter::new("name", "plan")]);
    assert_eq!(expand_all_names(&mut table), ["docs", "drafts", "plan"]);

    table.set_column_filters(|_| vec![ColumnFilter::new("name", "trips")]);
    assert_eq!(expand_all_names(&mut table), ["photos", "trips"]);
}

#[test]
fn max_filter_depth_limits_how_deep_filtering_looks() {
    // From the leaves: rows at the limit are tested as leaves and lose their children.
    let options = tree_options(file_tree())
        .with_filter_from_leaf_rows(true)
        .with_max_leaf_row_filter_depth(1);
    let mut table = Table::new(options).unwrap();
    table.set_column_filters(|_| vec![ColumnFilter::new("name", "dr")]);
    assert_eq!(expand_all_names(&mut table), ["docs", "drafts"]);
    let filtered = table.filtered_row_model().unwrap();
    assert!(filtered.get("0.1").unwrap().sub_rows.is_empty());

    // From the root: rows past the limit are kept untouched.
    let options = tree_options(file_tree()).with_max_leaf_row_filter_depth(0);
    let mut table = Table::new(options).unwrap();
    table.set_column_filters(|_| vec![ColumnFilter::new("name", "docs")]);
    assert_eq!(expand_all_names(&mut table), ["docs", "notes", "drafts", "plan"]);
}

#[test]
fn grouping_partitions_rows_in_first_seen_order() {
    let data = vec![
        employee("a", "Sales", 100.0, 30),
        employee("b", "Sales", 200.0, 40),
        employee("c", "Eng", 50.0, 30),
    ];
    let mut table = employee_table(data);
    table.set_grouping(|_| vec!["department".into()]);

    let model = table.row_model().unwrap();
    assert_eq!(ids(&model.rows), ["department:Sales", "department:Eng"]);
    let sales = &model.rows[0];
    assert!(sales.is_grouped());
    assert_eq!(sales.grouping_column_id().map(|id| &**id), Some("department"));
    assert_eq!(table.row_value(sales, "department").unwrap(), Value::from("Sales"));
    assert_eq!(table.row_value(sales, "salary").unwrap(), Value::from(300.0));
    assert_eq!(table.row_value(&model.rows[1], "salary").unwrap(), Value::from(50.0));
    // Text columns have no automatic aggregation.
    assert_eq!(table.row_value(sales, "name").unwrap(), Value::Undefined);

    assert_eq!(names(&sales.sub_rows), ["a", "b"]);
    assert_eq!(sales.sub_rows[0].depth, 1);
    assert_eq!(sales.sub_rows[0].parent_id.as_deref(), Some("department:Sales"));
    assert_eq!(sales.group.as_ref().unwrap().leaf_rows.len(), 2);
}

#[test]
fn nested_grouping_builds_a_group_tree() {
    let data = vec![
        employee("a", "Sales", 100.0, 30),
        employee("b", "Sales", 200.0, 40),
        employee("c", "Eng", 50.0, 30),
        employee("d", "Sales", 400.0, 30),
    ];
    let mut table = employee_table(data);
    table.set_grouping(|_| vec!["department".into(), "age".into()]);

    let model = table.grouped_row_model().unwrap();
    let sales = &model.rows[0];
    assert_eq!(
        ids(&sales.sub_rows),
        ["department:Sales>age:30", "department:Sales>age:40"]
    );
    let sales_30 = &sales.sub_rows[0];
    assert_eq!(sales_30.depth, 1);
    assert_eq!(names(&sales_30.sub_rows), ["a", "d"]);
    assert_eq!(sales_30.sub_rows[0].depth, 2);
    assert_eq!(names(&sales.group.as_ref().unwrap().leaf_rows), ["a", "d", "b"]);

    assert_eq!(table.row_value(sales, "salary").unwrap(), Value::from(700.0));
    assert_eq!(table.row_value(sales_30, "salary").unwrap(), Value::from(500.0));
    assert_eq!(table.row_value(sales_30, "age").unwrap(), Value::from(30));
}

#[test]
fn group_sums_add_up_to_the_ungrouped_total() {
    for seed in 0..20 {
        let mut rng = Lcg::new(seed);
        let len = rng.gen_range_usize(1, 60);
        let data = random_employees(&mut rng, len);
        let total: f64 = data.iter().map(|e| e.salary).sum();

        let mut table = employee_table(data);
        table.set_grouping(|_| vec!["department".into()]);
        let model = table.grouped_row_model().unwrap();
        let grouped_total: f64 = model
            .rows
            .iter()
            .map(|row| table.row_value(row, "salary").unwrap().as_number().unwrap())
            .sum();
        assert_eq!(grouped_total, total, "seed {seed}");
        let leaves: usize = model
            .rows
            .iter()
            .map(|row| row.group.as_ref().unwrap().leaf_rows.len())
            .sum();
        assert_eq!(leaves, len);
    }
}

#[test]
fn explicit_and_named_aggregations() {
    let mut columns = employee_columns();
    columns[2] = ColumnDef::accessor("salary", |e: &Employee| e.salary).with_aggregation_fn("mean");
    columns[3] = ColumnDef::accessor("age", |e: &Employee| e.age).with_aggregation_fn("spread");
    columns[0] = ColumnDef::accessor("name", |e: &Employee| e.name.clone())
        .with_aggregation_fn(BuiltinAggregation::Count);
    let options = TableOptions::new(staff(), columns).with_named_aggregation_fn("spread", |values| {
        let ages: Vec<f64> = values.iter().filter_map(Value::as_number).collect();
        let max = ages.iter().copied().fold(f64::MIN, f64::max);
        let min = ages.iter().copied().fold(f64::MAX, f64::min);
        Value::from(max - min)
    });
    let mut table = Table::new(options).unwrap();
    table.set_grouping(|_| vec!["department".into()]);

    let model = table.row_model().unwrap();
    let sales = &model.rows[0];
    assert_eq!(table.row_value(sales, "salary").unwrap(), Value::from(200.0));
    assert_eq!(table.row_value(sales, "age").unwrap(), Value::from(5.0));
    assert_eq!(table.row_value(sales, "name").unwrap(), Value::from(2));
}

#[test]
fn groups_sort_by_their_aggregates() {
    let data = vec![
        employee("a", "Sales", 100.0, 30),
        employee("b", "Sales", 200.0, 40),
        employee("c", "Eng", 50.0, 30),
        employee("d", "Ops", 400.0, 30),
    ];
    let mut table = employee_table(data);
    table.set_grouping(|_| vec!["department".into()]);
    table.set_sorting(|_| vec![ColumnSort::desc("salary")]);
    table.set_expanded(|_| ExpandedState::All);

    assert_eq!(
        ids(&table.row_model().unwrap().rows),
        ["department:Ops", "3", "department:Sales", "1", "0", "department:Eng", "2"]
    );
}

#[test]
fn grouping_by_a_display_column_is_an_error() {
    let mut columns = employee_columns();
    columns.push(ColumnDef::display("actions"));
    let mut table = Table::new(TableOptions::new(staff(), columns)).unwrap();
    table.set_grouping(|_| vec!["actions".into()]);
    assert_eq!(
        table.row_model().unwrap_err(),
        TableError::missing_accessor("actions", "grouping")
    );
}

#[test]
fn state_naming_unknown_columns_fails_the_read() {
    let mut table = employee_table(staff());
    table.set_sorting(|_| vec![ColumnSort::asc("height")]);
    assert_eq!(table.row_model().unwrap_err(), TableError::column_not_found("height"));

    table.set_sorting(|_| Vec::new());
    table.set_column_filters(|_| vec![ColumnFilter::new("height", 3)]);
    assert_eq!(table.row_model().unwrap_err(), TableError::column_not_found("height"));

    // Fixing the state recovers.
    table.set_column_filters(|_| Vec::new());
    assert_eq!(table.row_model().unwrap().rows.len(), 4);
}

#[test]
fn expansion_inlines_children_of_expanded_rows() {
    let mut table = Table::new(tree_options(file_tree())).unwrap();
    assert_eq!(tree_names(&table.row_model().unwrap().rows), ["docs", "music", "photos"]);

    table.set_expanded(|_| ExpandedState::Rows([RowId::from("0")].into_iter().collect()));
    assert_eq!(
        tree_names(&table.row_model().unwrap().rows),
        ["docs", "notes", "drafts", "music", "photos"]
    );

    assert_eq!(
        expand_all_names(&mut table),
        ["docs", "notes", "drafts", "plan", "music", "photos", "trips"]
    );

    // Flat rows of the expanded model still cover the whole tree.
    assert_eq!(table.expanded_row_model().unwrap().flat_rows.len(), 7);
}

#[test]
fn pages_cover_the_rows_exactly_once() {
    let data: Vec<Arc<Employee>> = (0..10)
        .map(|i| employee(&format!("e{i}"), "Ops", 10.0, 20 + i))
        .collect();
    let mut table = Table::new(paged_options(data, 3)).unwrap();
    assert_eq!(table.page_count().unwrap(), 4);

    let mut pages = Vec::new();
    for page_index in 0..4 {
        table.set_pagination(|p| PaginationState { page_index, ..*p });
        pages.push(ids(&table.row_model().unwrap().rows));
    }
    assert_eq!(pages[0], ["0", "1", "2"]);
    assert_eq!(pages[3], ["9"]);

    // Past the end is empty, not an error.
    table.set_pagination(|p| PaginationState { page_index: 9, ..*p });
    assert!(table.row_model().unwrap().rows.is_empty());
}

#[test]
fn random_pagination_matches_a_reference_slice() {
    for seed in 0..30 {
        let mut rng = Lcg::new(seed);
        let len = rng.gen_range_usize(0, 70);
        let page_size = rng.gen_range_usize(1, 12);
        let data = random_employees(&mut rng, len);
        let mut table = Table::new(paged_options(data, page_size)).unwrap();

        let page_count = table.page_count().unwrap();
        assert_eq!(page_count, len.div_ceil(page_size));
        let mut seen = Vec::new();
        for page_index in 0..page_count {
            table.set_pagination(|p| PaginationState { page_index, ..*p });
            let page = ids(&table.row_model().unwrap().rows);
            assert_eq!(page, expected_page(len, page_index, page_size), "seed {seed}");
            seen.extend(page);
        }
        assert_eq!(seen, expected_page(len, 0, len.max(1)), "seed {seed}");
    }
}

#[test]
fn expanded_rows_count_toward_the_page_by_default() {
    let options = tree_options(file_tree())
        .with_pagination(true)
        .with_initial_state(
            TableState::default()
                .with_pagination(0, 3)
                .with_expanded(ExpandedState::All),
        );
    let table = Table::new(options).unwrap();
    assert_eq!(tree_names(&table.row_model().unwrap().rows), ["docs", "notes", "drafts"]);
    assert_eq!(table.page_count().unwrap(), 3);
}

#[test]
fn deferred_expansion_pages_top_level_rows() {
    let options = tree_options(file_tree())
        .with_pagination(true)
        .with_paginate_expanded_rows(false)
        .with_initial_state(
            TableState::default()
                .with_pagination(0, 2)
                .with_expanded(ExpandedState::All),
        );
    let mut table = Table::new(options).unwrap();
    assert_eq!(
        tree_names(&table.row_model().unwrap().rows),
        ["docs", "notes", "drafts", "plan", "music"]
    );
    assert_eq!(table.page_count().unwrap(), 2);

    table.set_pagination(|p| PaginationState { page_index: 1, ..*p });
    let page = table.row_model().unwrap();
    assert_eq!(tree_names(&page.rows), ["photos", "trips"]);
    assert_eq!(ids(&page.flat_rows), ["2", "2.0"]);

    // With pagination off, expansion still happens after the sorted stage.
    table.update_options(|o| o.enable_pagination = false).unwrap();
    assert_eq!(table.row_model().unwrap().rows.len(), 7);
    assert_eq!(table.pre_pagination_row_model().unwrap().rows.len(), 3);
}

#[test]
fn filter_and_sort_changes_reset_the_page() {
    let mut rng = Lcg::new(3);
    let data = random_employees(&mut rng, 40);
    let mut table = Table::new(paged_options(data, 5)).unwrap();

    table.set_page_index(3).unwrap();
    assert_eq!(table.state().pagination.page_index, 3);
    table.set_sorting(|_| vec![ColumnSort::asc("salary")]);
    assert_eq!(table.state().pagination.page_index, 0);

    table.set_page_index(2).unwrap();
    table.set_column_filters(|_| vec![ColumnFilter::new("age", Value::list([Value::from(25), Value::Null]))]);
    assert_eq!(table.state().pagination.page_index, 0);

    table.set_page_index(2).unwrap();
    table.set_global_filter(|_| Value::from("emp"));
    assert_eq!(table.state().pagination.page_index, 0);

    // Not when the page is controlled by the caller.
    table.update_options(|o| o.manual_pagination = true).unwrap();
    table.set_pagination(|p| PaginationState { page_index: 2, ..*p });
    table.set_sorting(|_| vec![ColumnSort::desc("salary")]);
    assert_eq!(table.state().pagination.page_index, 2);

    // An explicit option wins over the manual default.
    table.update_options(|o| o.auto_reset_page_index = Some(true)).unwrap();
    table.set_sorting(|_| vec![ColumnSort::asc("age")]);
    assert_eq!(table.state().pagination.page_index, 0);
}

#[test]
fn grouping_changes_reset_expansion_and_data_changes_reset_both() {
    let options = employee_options(staff())
        .with_pagination(true)
        .with_initial_state(TableState::default().with_pagination(0, 1));
    let mut table = Table::new(options).unwrap();

    table.set_grouping(|_| vec!["department".into()]);
    table.set_expanded(|_| ExpandedState::All);
    table.set_page_index(1).unwrap();
    table.set_grouping(|_| vec!["age".into()]);
    assert_eq!(*table.state().expanded, ExpandedState::default());
    assert_eq!(table.state().pagination.page_index, 0);

    table.set_expanded(|_| ExpandedState::All);
    table.set_page_index(2).unwrap();
    table.set_data(staff());
    assert_eq!(*table.state().expanded, ExpandedState::default());
    assert_eq!(table.state().pagination.page_index, 0);

    // Direct state replacement queues nothing.
    table.set_state(|s| TableState {
        expanded: Arc::new(ExpandedState::All),
        sorting: Arc::new(vec![ColumnSort::asc("age")]),
        ..s.clone()
    });
    assert_eq!(*table.state().expanded, ExpandedState::All);
}

#[test]
fn state_change_fires_once_per_outermost_batch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let options = paged_options(staff(), 2)
        .with_on_state_change(move |_| {
            counter.fetch_add(1, AtomicOrdering::SeqCst);
        });
    let mut table = Table::new(options).unwrap();

    table.set_sorting(|_| vec![ColumnSort::asc("age")]);
    assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);

    // No-op updates stay silent.
    table.set_sorting(|old| old.clone());
    assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);

    let page = table.batch_update(|t| {
        t.set_page_index(1).unwrap();
        t.batch_update(|t| {
            t.set_column_filters(|_| vec![ColumnFilter::new("department", "Eng")]);
            t.set_grouping(|_| vec!["department".into()]);
        });
        // Effects wait for the outermost batch.
        t.state().pagination.page_index
    });
    assert_eq!(page, 1);
    assert_eq!(calls.load(AtomicOrdering::SeqCst), 2);
    assert_eq!(table.state().pagination.page_index, 0);
}

#[test]
fn manual_modes_pass_rows_through() {
    let options = paged_options(staff(), 2)
        .with_manual_filtering(true)
        .with_manual_sorting(true)
        .with_manual_grouping(true)
        .with_manual_pagination(true)
        .with_initial_state(
            TableState::default()
                .with_column_filters(vec![ColumnFilter::new("department", "Eng")])
                .with_sorting(vec![ColumnSort::desc("salary")])
                .with_grouping(["department"])
                .with_pagination(1, 2),
        );
    let table = Table::new(options).unwrap();
    let core = table.core_row_model().unwrap();
    let rows = table.row_model().unwrap();
    assert!(Rc::ptr_eq(&core, &rows));
    assert_eq!(names(&rows.rows), ["Ada", "Brian", "Cleo", "Dana"]);
}

#[test]
fn row_lookup_prefers_the_final_model() {
    let mut table = employee_table(staff());
    table.set_grouping(|_| vec!["department".into()]);
    let grouped = table.row("department:Eng").unwrap();
    assert!(grouped.is_grouped());

    // Data rows resolve with their grouped placement.
    let dana = table.row("3").unwrap();
    assert_eq!(dana.parent_id.as_deref(), Some("department:Eng"));
    assert_eq!(dana.depth, 1);
}
