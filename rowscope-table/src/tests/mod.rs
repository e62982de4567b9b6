use crate::*;

use std::rc::Rc;
use std::sync::Arc;

mod features;
#[cfg(feature = "json")]
mod json;
mod pipeline;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Employee {
    name: String,
    department: &'static str,
    salary: f64,
    age: u32,
}

fn employee(name: &str, department: &'static str, salary: f64, age: u32) -> Arc<Employee> {
    Arc::new(Employee {
        name: name.to_string(),
        department,
        salary,
        age,
    })
}

const DEPARTMENTS: [&str; 4] = ["Sales", "Eng", "Ops", "Legal"];

fn random_employees(rng: &mut Lcg, len: usize) -> Vec<Arc<Employee>> {
    (0..len)
        .map(|i| {
            employee(
                &format!("emp{}", rng.gen_range_usize(0, 50)),
                DEPARTMENTS[rng.gen_range_usize(0, DEPARTMENTS.len())],
                rng.gen_range_u64(1, 200) as f64 * 10.0,
                20 + (i as u32 % 40),
            )
        })
        .collect()
}

fn employee_columns() -> Vec<ColumnDef<Employee>> {
    vec![
        ColumnDef::accessor("name", |e: &Employee| e.name.clone()),
        ColumnDef::accessor("department", |e: &Employee| e.department),
        ColumnDef::accessor("salary", |e: &Employee| e.salary),
        ColumnDef::accessor("age", |e: &Employee| e.age),
    ]
}

fn employee_options(data: Vec<Arc<Employee>>) -> TableOptions<Employee> {
    TableOptions::new(data, employee_columns())
}

fn employee_table(data: Vec<Arc<Employee>>) -> Table<Employee> {
    Table::new(employee_options(data)).unwrap()
}

fn names(rows: &[Rc<Row<Employee>>]) -> Vec<String> {
    rows.iter().map(|row| row.original.name.clone()).collect()
}

fn ids<T>(rows: &[Rc<Row<T>>]) -> Vec<String> {
    rows.iter().map(|row| row.id.to_string()).collect()
}

#[derive(Debug)]
struct Node {
    name: &'static str,
    size: f64,
    children: Vec<Arc<Node>>,
}

fn node(name: &'static str, size: f64, children: Vec<Arc<Node>>) -> Arc<Node> {
    Arc::new(Node {
        name,
        size,
        children,
    })
}

/// ```text
/// 0 docs          (10)
///   0.0 notes     (3)
///   0.1 drafts    (4)
///     0.1.0 plan  (1)
/// 1 music         (20)
/// 2 photos        (30)
///   2.0 trips     (12)
/// ```
fn file_tree() -> Vec<Arc<Node>> {
    vec![
        node(
            "docs",
            10.0,
            vec![
                node("notes", 3.0, vec![]),
                node("drafts", 4.0, vec![node("plan", 1.0, vec![])]),
            ],
        ),
        node("music", 20.0, vec![]),
        node("photos", 30.0, vec![node("trips", 12.0, vec![])]),
    ]
}

fn tree_options(data: Vec<Arc<Node>>) -> TableOptions<Node> {
    TableOptions::new(
        data,
        vec![
            ColumnDef::accessor("name", |n: &Node| n.name),
            ColumnDef::accessor("size", |n: &Node| n.size),
        ],
    )
    .with_get_sub_rows(|n: &Node| n.children.clone())
}

fn tree_names(rows: &[Rc<Row<Node>>]) -> Vec<&'static str> {
    rows.iter().map(|row| row.original.name).collect()
}
