use super::*;

fn staff() -> Vec<Arc<Employee>> {
    vec![
        employee("Ada", "Sales", 100.0, 40),
        employee("Brian", "Eng", 200.0, 25),
        employee("Cleo", "Sales", 300.0, 35),
        employee("Dana", "Eng", 50.0, 20),
    ]
}

fn sort_keys<T>(table: &Table<T>) -> Vec<(String, bool)> {
    table
        .state()
        .sorting
        .iter()
        .map(|s| (s.id.to_string(), s.desc))
        .collect()
}

fn key(id: &str, desc: bool) -> (String, bool) {
    (id.to_string(), desc)
}

fn paged_table(len: usize, page_size: usize) -> Table<Employee> {
    let data: Vec<Arc<Employee>> = (0..len)
        .map(|i| employee(&format!("e{i}"), "Ops", 10.0, 20 + i as u32))
        .collect();
    let options = employee_options(data)
        .with_pagination(true)
        .with_initial_state(TableState::default().with_pagination(0, page_size));
    Table::new(options).unwrap()
}

fn column_ids<T>(columns: &[&Column<T>]) -> Vec<String> {
    columns.iter().map(|c| c.id().to_string()).collect()
}

/// `name`, `department`, and a `pay` group holding `salary` and `age`.
fn pay_table() -> Table<Employee> {
    let columns = vec![
        ColumnDef::accessor("name", |e: &Employee| e.name.clone()).with_enable_hiding(false),
        ColumnDef::accessor("department", |e: &Employee| e.department),
        ColumnDef::group(
            "pay",
            vec![
                ColumnDef::accessor("salary", |e: &Employee| e.salary),
                ColumnDef::accessor("age", |e: &Employee| e.age)
                    .with_size_range(50, 100)
                    .with_enable_pinning(false),
            ],
        ),
    ];
    Table::new(TableOptions::new(staff(), columns)).unwrap()
}

fn selected_ids<T>(table: &Table<T>) -> Vec<String> {
    table.state().row_selection.iter().map(|id| id.to_string()).collect()
}

#[test]
fn sort_toggle_cycles_through_first_direction_other_direction_and_off() {
    let mut table = employee_table(staff());
    assert_eq!(table.first_sort_direction("name").unwrap(), SortDirection::Asc);
    assert_eq!(table.first_sort_direction("salary").unwrap(), SortDirection::Desc);

    table.toggle_sorting("name", None, false).unwrap();
    assert_eq!(sort_keys(&table), [key("name", false)]);
    assert_eq!(table.next_sorting_order("name", false).unwrap(), Some(SortDirection::Desc));

    table.toggle_sorting("name", None, false).unwrap();
    assert_eq!(sort_keys(&table), [key("name", true)]);
    assert_eq!(table.next_sorting_order("name", false).unwrap(), None);

    table.toggle_sorting("name", None, false).unwrap();
    assert!(sort_keys(&table).is_empty());

    table.toggle_sorting("salary", None, false).unwrap();
    assert_eq!(sort_keys(&table), [key("salary", true)]);
    assert_eq!(table.column_sort_direction("salary"), Some(SortDirection::Desc));

    // A forced direction toggles in place.
    table.toggle_sorting("salary", Some(false), false).unwrap();
    assert_eq!(sort_keys(&table), [key("salary", false)]);
}

#[test]
fn multi_sort_adds_keys_up_to_the_limit() {
    let options = employee_options(staff()).with_max_multi_sort_col_count(2);
    let mut table = Table::new(options).unwrap();

    table.toggle_sorting("salary", None, false).unwrap();
    table.toggle_sorting("name", None, true).unwrap();
    assert_eq!(sort_keys(&table), [key("salary", true), key("name", false)]);
    assert_eq!(table.column_sort_index("name"), Some(1));

    // The oldest key falls off.
    table.toggle_sorting("age", None, true).unwrap();
    assert_eq!(sort_keys(&table), [key("name", false), key("age", true)]);

    // A single-sort toggle replaces every key.
    table.toggle_sorting("salary", None, false).unwrap();
    assert_eq!(sort_keys(&table), [key("salary", true)]);

    table.clear_sorting("salary");
    assert!(sort_keys(&table).is_empty());
}

#[test]
fn sort_options_change_the_cycle() {
    let options = employee_options(staff())
        .with_enable_sorting_removal(false)
        .with_sort_desc_first(true);
    let mut table = Table::new(options).unwrap();
    assert_eq!(table.first_sort_direction("name").unwrap(), SortDirection::Desc);

    table.toggle_sorting("name", None, false).unwrap();
    table.toggle_sorting("name", None, false).unwrap();
    table.toggle_sorting("name", None, false).unwrap();
    assert_eq!(sort_keys(&table), [key("name", true)]);

    let mut columns = employee_columns();
    columns[1] = ColumnDef::accessor("department", |e: &Employee| e.department).with_enable_sorting(false);
    columns.push(ColumnDef::display("actions"));
    let mut table = Table::new(TableOptions::new(staff(), columns)).unwrap();
    assert!(!table.column_can_sort("department").unwrap());
    assert!(!table.column_can_sort("actions").unwrap());
    assert!(!table.column_can_multi_sort("actions").unwrap());
    table.toggle_sorting("department", None, false).unwrap();
    assert!(sort_keys(&table).is_empty());
    assert_eq!(
        table.toggle_sorting("missing", None, false).unwrap_err(),
        TableError::column_not_found("missing")
    );
}

#[test]
fn reset_restores_initial_slices() {
    let options = employee_options(staff()).with_initial_state(
        TableState::default()
            .with_sorting(vec![ColumnSort::asc("age")])
            .with_grouping(["department"]),
    );
    let mut table = Table::new(options).unwrap();
    table.toggle_sorting("name", None, false).unwrap();
    table.reset_sorting();
    assert_eq!(sort_keys(&table), [key("age", false)]);

    table.toggle_grouping("department").unwrap();
    assert!(table.state().grouping.is_empty());
    table.set_global_filter(|_| Value::from("x"));
    table.reset_state();
    assert_eq!(*table.state(), table.options().initial_state);
}

#[test]
fn column_filter_values_are_set_replaced_and_cleared() {
    let mut table = employee_table(staff());
    table.set_column_filter_value("department", "Eng").unwrap();
    table.set_column_filter_value("name", "a").unwrap();
    assert!(table.is_column_filtered("department"));
    assert_eq!(table.column_filter_value("department"), Value::from("Eng"));
    assert_eq!(table.column_filter_index("name"), Some(1));
    assert_eq!(names(&table.row_model().unwrap().rows), ["Brian", "Dana"]);

    table.set_column_filter_value("department", "Sales").unwrap();
    assert_eq!(table.column_filter_index("department"), Some(0));
    assert_eq!(names(&table.row_model().unwrap().rows), ["Ada"]);

    // A blank value removes the filter.
    table.set_column_filter_value("department", "").unwrap();
    assert!(!table.is_column_filtered("department"));
    assert_eq!(table.column_filter_value("department"), Value::Undefined);

    assert_eq!(
        table.set_column_filter_value("nope", "x").unwrap_err(),
        TableError::column_not_found("nope")
    );
    table.reset_column_filters();
    assert!(table.state().column_filters.is_empty());
}

#[test]
fn filter_capabilities_follow_column_and_table_flags() {
    let mut columns = employee_columns();
    columns[0] = ColumnDef::accessor("name", |e: &Employee| e.name.clone()).with_enable_column_filter(false);
    columns.push(ColumnDef::display("actions"));
    let mut table = Table::new(TableOptions::new(staff(), columns)).unwrap();
    assert!(!table.column_can_filter("name").unwrap());
    assert!(!table.column_can_filter("actions").unwrap());
    assert!(table.column_can_filter("salary").unwrap());

    table.update_options(|o| o.enable_column_filters = false).unwrap();
    assert!(!table.column_can_filter("salary").unwrap());
}

#[test]
fn global_filter_skips_excluded_columns() {
    let mut columns = employee_columns();
    columns[1] = ColumnDef::accessor("department", |e: &Employee| e.department).with_enable_global_filter(false);
    let mut table = Table::new(TableOptions::new(staff(), columns)).unwrap();
    table.set_global_filter(|_| Value::from("eng"));
    assert!(table.row_model().unwrap().rows.is_empty());

    table.reset_global_filter();
    assert_eq!(*table.state().global_filter, Value::Undefined);
    assert_eq!(table.row_model().unwrap().rows.len(), 4);
}

#[test]
fn grouping_toggle_and_column_placement() {
    let mut table = employee_table(staff());
    assert!(table.column_can_group("department").unwrap());
    table.toggle_grouping("department").unwrap();
    table.toggle_grouping("age").unwrap();
    assert!(table.is_column_grouped("age"));
    assert_eq!(table.column_grouped_index("age"), Some(1));
    assert_eq!(
        column_ids(&table.ordered_leaf_columns()),
        ["department", "age", "name", "salary"]
    );

    table.update_options(|o| o.grouped_column_mode = GroupedColumnMode::Remove).unwrap();
    assert_eq!(column_ids(&table.ordered_leaf_columns()), ["name", "salary"]);

    table.toggle_grouping("department").unwrap();
    assert_eq!(table.state().grouping.len(), 1);
    table.reset_grouping();
    assert!(table.state().grouping.is_empty());

    let mut columns = employee_columns();
    columns.push(ColumnDef::display("actions"));
    let table = Table::new(TableOptions::new(staff(), columns)).unwrap();
    assert!(!table.column_can_group("actions").unwrap());
}

#[test]
fn cells_know_their_role_in_grouped_rows() {
    let mut table = employee_table(staff());
    table.set_grouping(|_| vec!["department".into()]);
    table.set_expanded(|_| ExpandedState::All);
    let model = table.row_model().unwrap();
    assert_eq!(
        ids(&model.rows),
        ["department:Sales", "0", "2", "department:Eng", "1", "3"]
    );

    let sales = &model.rows[0];
    let grouped = table.cell(sales, "department").unwrap();
    assert!(grouped.is_grouped());
    assert_eq!(grouped.value().unwrap(), Value::from("Sales"));

    let total = table.cell(sales, "salary").unwrap();
    assert_eq!(total.id(), "department:Sales_salary");
    assert!(total.is_aggregated());
    assert!(!total.is_placeholder());
    assert_eq!(total.value().unwrap(), Value::from(400.0));

    let ada = &model.rows[1];
    let placeholder = table.cell(ada, "department").unwrap();
    assert!(placeholder.is_placeholder());
    assert!(!placeholder.is_grouped());
    let plain = table.cell(ada, "salary").unwrap();
    assert!(!plain.is_aggregated() && !plain.is_placeholder());
    assert_eq!(plain.value().unwrap(), Value::from(100.0));

    let cells: Vec<String> = table
        .row_cells(sales)
        .iter()
        .map(|cell| cell.column().id().to_string())
        .collect();
    assert_eq!(cells, ["department", "name", "salary", "age"]);
    assert!(table.cell(sales, "bonus").is_err());
}

#[test]
fn page_navigation_stays_in_range() {
    let mut table = paged_table(10, 3);
    assert_eq!(table.page_count().unwrap(), 4);
    assert_eq!(table.page_options().unwrap(), [0, 1, 2, 3]);
    assert!(!table.can_previous_page());
    assert!(table.can_next_page().unwrap());

    table.next_page().unwrap();
    assert_eq!(table.state().pagination.page_index, 1);
    table.last_page().unwrap();
    assert_eq!(table.state().pagination.page_index, 3);
    assert!(!table.can_next_page().unwrap());

    table.set_page_index(99).unwrap();
    assert_eq!(table.state().pagination.page_index, 3);
    table.previous_page().unwrap();
    assert_eq!(table.state().pagination.page_index, 2);

    // The row at the top of the page stays visible.
    table.set_page_size(4);
    assert_eq!(
        *table.state().pagination,
        PaginationState { page_index: 1, page_size: 4 }
    );
    assert_eq!(ids(&table.row_model().unwrap().rows), ["4", "5", "6", "7"]);
    assert_eq!(table.page_count().unwrap(), 3);

    table.first_page().unwrap();
    assert!(!table.can_previous_page());
    table.set_page_index(2).unwrap();
    table.reset_pagination();
    assert_eq!(
        *table.state().pagination,
        PaginationState { page_index: 0, page_size: 3 }
    );
}

#[test]
fn row_and_page_count_overrides() {
    let mut table = paged_table(10, 3);
    table.update_options(|o| o.row_count = Some(25)).unwrap();
    assert_eq!(table.row_count().unwrap(), 25);
    assert_eq!(table.page_count().unwrap(), 9);

    table.update_options(|o| o.page_count = Some(2)).unwrap();
    table.set_page_index(5).unwrap();
    assert_eq!(table.state().pagination.page_index, 1);
    table.reset_page_index();
    assert_eq!(table.state().pagination.page_index, 0);
}

#[test]
fn expansion_helpers_track_the_tree() {
    let mut table = Table::new(tree_options(file_tree())).unwrap();
    let core = table.core_row_model().unwrap();
    assert!(table.row_can_expand(&core.rows[0]));
    assert!(!table.row_can_expand(&core.rows[1]));
    assert!(!table.is_some_rows_expanded());
    assert_eq!(table.expanded_depth().unwrap(), 0);

    table.toggle_row_expanded("0", None).unwrap();
    assert!(table.is_row_expanded("0"));
    assert!(!table.is_all_parents_expanded("0.1.0").unwrap());
    assert_eq!(table.expanded_depth().unwrap(), 1);

    table.toggle_row_expanded("0.1", None).unwrap();
    assert!(table.is_all_parents_expanded("0.1.0").unwrap());
    assert_eq!(table.expanded_depth().unwrap(), 2);
    assert!(!table.is_all_rows_expanded().unwrap());

    // Leaves do not need to be expanded for "all".
    table.toggle_row_expanded("2", Some(true)).unwrap();
    assert!(table.is_all_rows_expanded().unwrap());

    table.toggle_all_rows_expanded(None).unwrap();
    assert!(!table.is_some_rows_expanded());

    table.toggle_all_rows_expanded(Some(true)).unwrap();
    assert_eq!(*table.state().expanded, ExpandedState::All);
    table.toggle_row_expanded("2", Some(false)).unwrap();
    assert!(table.is_row_expanded("0"));
    assert!(!table.is_row_expanded("2"));
    assert!(!table.is_all_rows_expanded().unwrap());
    assert_eq!(
        tree_names(&table.row_model().unwrap().rows),
        ["docs", "notes", "drafts", "plan", "music", "photos"]
    );

    table.reset_expanded();
    assert!(!table.is_some_rows_expanded());
    assert_eq!(
        table.toggle_row_expanded("9", None).unwrap_err(),
        TableError::row_not_found("9")
    );
}

#[test]
fn selecting_a_parent_can_take_its_children() {
    let mut table = Table::new(tree_options(file_tree())).unwrap();
    table.toggle_row_selected("0", None, true).unwrap();
    assert_eq!(selected_ids(&table), ["0", "0.0", "0.1", "0.1.0"]);
    assert!(table.is_some_rows_selected().unwrap());
    assert!(!table.is_all_rows_selected().unwrap());

    let selected = table.selected_row_model().unwrap();
    assert_eq!(ids(&selected.rows), ["0"]);
    assert_eq!(ids(&selected.flat_rows), ["0", "0.0", "0.1", "0.1.0"]);

    // Dropping a middle row hides it from the tree but keeps its selected child listed.
    table.toggle_row_selected("0.1", Some(false), false).unwrap();
    let selected = table.selected_row_model().unwrap();
    assert_eq!(ids(&selected.rows[0].sub_rows), ["0.0"]);
    assert_eq!(ids(&selected.flat_rows), ["0", "0.0", "0.1.0"]);

    table.reset_row_selection();
    assert!(table.selected_row_model().unwrap().flat_rows.is_empty());
}

#[test]
fn select_all_uses_the_filtered_rows() {
    let mut table = Table::new(tree_options(file_tree())).unwrap();
    table.toggle_all_rows_selected(None).unwrap();
    assert_eq!(table.state().row_selection.len(), 7);
    assert!(table.is_all_rows_selected().unwrap());
    table.toggle_all_rows_selected(None).unwrap();
    assert!(table.state().row_selection.is_empty());

    table.set_column_filters(|_| vec![ColumnFilter::new("name", "o")]);
    table.toggle_all_rows_selected(Some(true)).unwrap();
    assert_eq!(selected_ids(&table), ["0", "0.0", "2"]);
    assert!(table.is_all_rows_selected().unwrap());

    let filtered = table.filtered_selected_row_model().unwrap();
    assert_eq!(ids(&filtered.rows), ["0", "2"]);
    assert_eq!(ids(&filtered.flat_rows), ["0", "0.0", "2"]);
}

#[test]
fn selection_rules() {
    let options = employee_options(staff()).with_enable_multi_row_selection(false);
    let mut table = Table::new(options).unwrap();
    table.toggle_row_selected("1", None, false).unwrap();
    table.toggle_row_selected("2", None, false).unwrap();
    assert_eq!(selected_ids(&table), ["2"]);
    table.toggle_row_selected("2", None, false).unwrap();
    assert!(!table.is_row_selected("2"));

    let options = employee_options(staff()).with_enable_row_selection(false);
    let mut table = Table::new(options).unwrap();
    assert!(!table.row_can_select());
    table.toggle_row_selected("1", Some(true), false).unwrap();
    assert!(!table.is_row_selected("1"));
}

#[test]
fn page_selection_touches_only_the_current_page() {
    let options = employee_options(staff())
        .with_pagination(true)
        .with_initial_state(TableState::default().with_pagination(0, 2));
    let mut table = Table::new(options).unwrap();

    table.toggle_all_page_rows_selected(None).unwrap();
    assert_eq!(selected_ids(&table), ["0", "1"]);
    assert!(table.is_all_page_rows_selected().unwrap());
    assert!(!table.is_some_page_rows_selected().unwrap());
    assert!(table.is_some_rows_selected().unwrap());
    assert!(!table.is_all_rows_selected().unwrap());

    table.next_page().unwrap();
    assert!(!table.is_some_page_rows_selected().unwrap());
    table.toggle_row_selected("3", Some(true), false).unwrap();
    assert!(table.is_some_page_rows_selected().unwrap());
    table.toggle_all_page_rows_selected(Some(false)).unwrap();
    assert_eq!(selected_ids(&table), ["0", "1"]);
}

#[test]
fn pinned_rows_stay_visible_across_pages() {
    let options = employee_options(staff())
        .with_pagination(true)
        .with_initial_state(TableState::default().with_pagination(0, 2));
    let mut table = Table::new(options).unwrap();
    assert!(table.row_can_pin());

    table.pin_row("3", Some(RowPinPosition::Top)).unwrap();
    assert_eq!(ids(&table.top_rows().unwrap()), ["3"]);
    assert_eq!(table.row_pinned("3"), Some(RowPinPosition::Top));

    table.pin_row("0", Some(RowPinPosition::Top)).unwrap();
    assert_eq!(table.row_pinned_index("0"), Some(1));

    table.pin_row("3", Some(RowPinPosition::Bottom)).unwrap();
    assert_eq!(ids(&table.top_rows().unwrap()), ["0"]);
    assert_eq!(ids(&table.bottom_rows().unwrap()), ["3"]);
    assert_eq!(ids(&table.center_rows().unwrap()), ["1"]);

    table.pin_row("3", None).unwrap();
    assert_eq!(table.row_pinned("3"), None);
    assert_eq!(
        table.pin_row("9", Some(RowPinPosition::Top)).unwrap_err(),
        TableError::row_not_found("9")
    );

    table.reset_row_pinning();
    assert!(table.top_rows().unwrap().is_empty());
}

#[test]
fn pinning_is_a_no_op_when_disabled() {
    let mut table = Table::new(employee_options(staff()).with_enable_row_pinning(false)).unwrap();
    assert!(!table.row_can_pin());
    let before = Arc::clone(&table.state().row_pinning);
    table.pin_row("1", Some(RowPinPosition::Top)).unwrap();
    assert!(Arc::ptr_eq(&before, &table.state().row_pinning));
    assert_eq!(table.row_pinned("1"), None);
    assert!(table.top_rows().unwrap().is_empty());
    assert_eq!(
        table.pin_row("9", Some(RowPinPosition::Top)).unwrap_err(),
        TableError::row_not_found("9")
    );

    // `age` opts out, which also blocks its group.
    let mut table = pay_table();
    let before = Arc::clone(&table.state().column_pinning);
    table.pin_column("age", Some(ColumnPinPosition::Left)).unwrap();
    table.pin_column("pay", Some(ColumnPinPosition::Right)).unwrap();
    assert!(Arc::ptr_eq(&before, &table.state().column_pinning));
    assert_eq!(
        column_ids(&table.visible_leaf_columns()),
        ["name", "department", "salary", "age"]
    );

    table.update_options(|o| o.enable_column_pinning = false).unwrap();
    assert!(!table.column_can_pin("salary").unwrap());
    table.pin_column("salary", Some(ColumnPinPosition::Left)).unwrap();
    assert!(table.left_columns().is_empty());
}

#[test]
fn unkept_pinned_rows_follow_the_page() {
    let options = employee_options(staff())
        .with_pagination(true)
        .with_keep_pinned_rows(false)
        .with_initial_state(TableState::default().with_pagination(0, 2));
    let mut table = Table::new(options).unwrap();
    table.pin_row("3", Some(RowPinPosition::Bottom)).unwrap();
    assert!(table.bottom_rows().unwrap().is_empty());
    table.set_page_index(1).unwrap();
    assert_eq!(ids(&table.bottom_rows().unwrap()), ["3"]);
}

#[test]
fn pinned_sub_rows_need_expanded_parents() {
    let mut table = Table::new(tree_options(file_tree())).unwrap();
    table.pin_row("0.1", Some(RowPinPosition::Top)).unwrap();
    assert!(table.top_rows().unwrap().is_empty());
    table.toggle_row_expanded("0", Some(true)).unwrap();
    assert_eq!(tree_names(&table.top_rows().unwrap()), ["drafts"]);
}

#[test]
fn column_tree_and_pinning() {
    let mut table = pay_table();
    let all: Vec<String> = table.all_columns().iter().map(|c| c.id().to_string()).collect();
    assert_eq!(all, ["name", "department", "pay", "salary", "age"]);
    let pay = table.column("pay").unwrap();
    assert!(!pay.is_leaf());
    assert_eq!(table.column("salary").unwrap().parent_id().map(|id| &**id), Some("pay"));
    assert_eq!(table.column("age").unwrap().depth(), 1);

    assert!(table.column_can_pin("salary").unwrap());
    assert!(!table.column_can_pin("pay").unwrap());

    table.pin_column("salary", Some(ColumnPinPosition::Left)).unwrap();
    assert_eq!(table.column_pinned("pay").unwrap(), Some(ColumnPinPosition::Left));
    assert_eq!(table.column_pinned_index("salary").unwrap(), Some(0));
    assert_eq!(
        column_ids(&table.visible_leaf_columns()),
        ["salary", "name", "department", "age"]
    );

    table.pin_column("name", Some(ColumnPinPosition::Right)).unwrap();
    assert_eq!(column_ids(&table.left_columns()), ["salary"]);
    assert_eq!(column_ids(&table.center_columns()), ["department", "age"]);
    assert_eq!(column_ids(&table.right_columns()), ["name"]);

    table.pin_column("salary", None).unwrap();
    assert_eq!(table.column_pinned("salary").unwrap(), None);
    assert_eq!(
        column_ids(&table.visible_leaf_columns()),
        ["department", "salary", "age", "name"]
    );

    table.reset_column_pinning();
    assert_eq!(
        column_ids(&table.visible_leaf_columns()),
        ["name", "department", "salary", "age"]
    );
}

#[test]
fn column_visibility_and_order() {
    let mut table = pay_table();
    table.toggle_column_visibility("age", None).unwrap();
    assert!(!table.is_column_visible("age").unwrap());
    assert!(table.is_column_visible("pay").unwrap());
    assert_eq!(column_ids(&table.visible_leaf_columns()), ["name", "department", "salary"]);

    table.toggle_column_visibility("pay", Some(false)).unwrap();
    assert!(!table.is_column_visible("pay").unwrap());
    assert_eq!(column_ids(&table.visible_leaf_columns()), ["name", "department"]);

    // Not hideable.
    assert!(!table.column_can_hide("name").unwrap());
    table.toggle_column_visibility("name", Some(false)).unwrap();
    assert!(table.is_column_visible("name").unwrap());
    assert!(!table.is_all_columns_visible());
    assert!(table.is_some_columns_visible());

    table.toggle_all_columns_visible(None);
    assert!(table.is_all_columns_visible());
    table.toggle_all_columns_visible(Some(false));
    assert_eq!(column_ids(&table.visible_leaf_columns()), ["name"]);
    table.reset_column_visibility();
    assert!(table.is_all_columns_visible());

    table.set_column_order(|_| vec!["age".into(), "name".into()]);
    assert_eq!(
        column_ids(&table.ordered_leaf_columns()),
        ["age", "name", "department", "salary"]
    );
    table.reset_column_order();
    assert_eq!(
        column_ids(&table.ordered_leaf_columns()),
        ["name", "department", "salary", "age"]
    );
}

#[test]
fn column_sizes_are_clamped_and_summed() {
    let mut table = pay_table();
    assert_eq!(table.column_size("name").unwrap(), DEFAULT_COLUMN_SIZE);
    // The definition size is clamped too.
    assert_eq!(table.column_size("age").unwrap(), 100);

    table.resize_column("salary", 10).unwrap();
    assert_eq!(table.column_size("salary").unwrap(), DEFAULT_MIN_COLUMN_SIZE);
    table.resize_column("age", 500).unwrap();
    assert_eq!(table.column_size("age").unwrap(), 100);
    assert_eq!(table.column_size("pay").unwrap(), 120);

    assert_eq!(table.total_size().unwrap(), 420);
    assert_eq!(table.column_start("salary").unwrap(), Some(300));
    assert_eq!(table.column_start("age").unwrap(), Some(320));

    table.toggle_column_visibility("department", Some(false)).unwrap();
    assert_eq!(table.column_start("department").unwrap(), None);
    assert_eq!(table.column_start("salary").unwrap(), Some(150));
    assert_eq!(table.total_size().unwrap(), 270);
    assert!(table.column_start("nope").is_err());

    table.reset_column_size("salary").unwrap();
    assert_eq!(table.column_size("salary").unwrap(), DEFAULT_COLUMN_SIZE);

    table.update_options(|o| o.enable_column_resizing = false).unwrap();
    assert!(!table.column_can_resize("name").unwrap());
    table.resize_column("name", 60).unwrap();
    assert_eq!(table.column_size("name").unwrap(), DEFAULT_COLUMN_SIZE);

    table.reset_column_sizing();
    assert!(table.state().column_sizing.is_empty());
}

#[test]
fn facets_ignore_the_columns_own_filter() {
    let mut table = employee_table(staff());
    table.set_column_filter_value("department", "Eng").unwrap();

    let core = table.core_row_model().unwrap();
    assert!(Rc::ptr_eq(&core, &table.faceted_row_model("department").unwrap()));
    assert_eq!(
        *table.faceted_unique_values("department").unwrap(),
        vec![(Value::from("Sales"), 2), (Value::from("Eng"), 2)]
    );
    assert_eq!(names(&table.faceted_row_model("name").unwrap().rows), ["Brian", "Dana"]);

    table
        .set_column_filter_value("salary", Value::list([Value::from(150), Value::Null]))
        .unwrap();
    assert_eq!(
        *table.faceted_unique_values("department").unwrap(),
        vec![(Value::from("Eng"), 1), (Value::from("Sales"), 1)]
    );
    assert_eq!(table.faceted_min_max("salary").unwrap(), Some((50.0, 200.0)));

    let first = table.faceted_unique_values("department").unwrap();
    assert!(Rc::ptr_eq(&first, &table.faceted_unique_values("department").unwrap()));
    assert_eq!(
        table.faceted_unique_values("nope").unwrap_err(),
        TableError::column_not_found("nope")
    );
}

#[test]
fn global_facets_ignore_only_the_global_filter() {
    let mut table = employee_table(staff());
    table
        .set_column_filter_value("salary", Value::list([Value::from(150), Value::Null]))
        .unwrap();
    table.set_global_filter(|_| Value::from("cleo"));

    assert_eq!(
        *table.faceted_unique_values("department").unwrap(),
        vec![(Value::from("Sales"), 1)]
    );
    assert_eq!(
        *table.global_faceted_unique_values("department").unwrap(),
        vec![(Value::from("Eng"), 1), (Value::from("Sales"), 1)]
    );
    assert_eq!(table.global_faceted_min_max("salary").unwrap(), Some((200.0, 300.0)));
    assert_eq!(names(&table.global_faceted_row_model().unwrap().rows), ["Brian", "Cleo"]);
}

#[test]
fn options_can_be_swapped_without_losing_state() {
    let mut table = employee_table(staff());
    table.set_sorting(|_| vec![ColumnSort::asc("salary")]);
    let before = table.row_model().unwrap();

    table.update_options(|o| o.enable_multi_sort = false).unwrap();
    assert_eq!(sort_keys(&table), [key("salary", false)]);
    let after = table.row_model().unwrap();
    assert!(!Rc::ptr_eq(&before, &after));
    assert_eq!(names(&after.rows), ["Dana", "Ada", "Brian", "Cleo"]);

    let err = table
        .update_options(|o| o.columns.push(ColumnDef::display("name")))
        .unwrap_err();
    assert_eq!(err, TableError::duplicate_column_id("name"));
    // The failed swap left the table as it was.
    assert_eq!(table.leaf_columns().len(), 4);
    assert!(table.row_value(&after.rows[0], "height").is_err());
}
