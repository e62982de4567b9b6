// Example: group, aggregate, sort and page a small employee list.
use std::sync::Arc;

use rowscope_table::{BuiltinAggregation, ColumnDef, Table, TableOptions};

struct Employee {
    name: &'static str,
    department: &'static str,
    salary: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let data: Vec<Arc<Employee>> = [
        ("Ada", "Eng", 180.0),
        ("Brian", "Sales", 90.0),
        ("Cleo", "Eng", 150.0),
        ("Dana", "Ops", 110.0),
        ("Eli", "Sales", 95.0),
        ("Fay", "Eng", 120.0),
    ]
    .into_iter()
    .map(|(name, department, salary)| Arc::new(Employee { name, department, salary }))
    .collect();

    let columns = vec![
        ColumnDef::accessor("name", |e: &Employee| e.name),
        ColumnDef::accessor("department", |e: &Employee| e.department),
        ColumnDef::accessor("salary", |e: &Employee| e.salary)
            .with_aggregation_fn(BuiltinAggregation::Mean),
    ];
    let mut table = Table::new(
        TableOptions::new(data, columns)
            .with_pagination(true)
            .with_on_state_change(|state| println!("state changed: sorting={:?}", state.sorting)),
    )?;

    table.batch_update(|t| -> rowscope_table::Result<()> {
        t.toggle_grouping("department")?;
        t.toggle_sorting("salary", Some(true), false)?;
        Ok(())
    })?;

    println!("groups by mean salary:");
    for group in &table.row_model()?.rows {
        println!(
            "  {} mean={} rows={}",
            table.row_value(group, "department")?,
            table.row_value(group, "salary")?,
            group.sub_rows.len()
        );
    }

    table.reset_grouping();
    table.set_page_size(4);
    table.last_page()?;
    let page = table.row_model()?;
    println!(
        "page {}/{}:",
        table.state().pagination.page_index + 1,
        table.page_count()?
    );
    for row in &page.rows {
        let cells: Vec<String> = table
            .row_cells(row)
            .iter()
            .map(|cell| cell.value().map(|v| v.to_string()).unwrap_or_default())
            .collect();
        println!("  {}", cells.join(" | "));
    }
    Ok(())
}
