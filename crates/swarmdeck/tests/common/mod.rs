//! Shared fakes for the integration tests.

#![allow(dead_code)]

use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use parking_lot::Mutex;
use swarmdeck::{CellValue, ColumnSpec, Point, Row, RowCollection};

/// A fake transfer: a name, a mutable priority and a done flag.
pub struct Task {
    pub id: u64,
    pub name: String,
    pub priority: AtomicI64,
    pub done: AtomicBool,
}

impl Task {
    pub fn new(id: u64, name: &str, priority: i64) -> Arc<Self> {
        Arc::new(Self {
            id,
            name: name.to_owned(),
            priority: AtomicI64::new(priority),
            done: AtomicBool::new(false),
        })
    }

    pub fn set_priority(&self, priority: i64) {
        self.priority.store(priority, Ordering::SeqCst);
    }

    pub fn finish(&self) {
        self.done.store(true, Ordering::SeqCst);
    }
}

/// Routes crate logs to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub const NAME: usize = 0;
pub const PRIORITY: usize = 1;

const COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("name", "Name").clippable(),
    ColumnSpec::new("priority", "Priority").dynamic(),
];

pub struct TaskRow {
    task: Arc<Task>,
    priority: i64,
    done: bool,
}

impl Row for TaskRow {
    type Source = Arc<Task>;

    fn create(task: Arc<Task>) -> Self {
        let mut row = TaskRow {
            task: task.clone(),
            priority: 0,
            done: false,
        };
        row.initialize(task);
        row
    }

    fn initialize(&mut self, task: Arc<Task>) {
        self.task = task;
        self.update();
    }

    fn source(&self) -> &Arc<Task> {
        &self.task
    }

    fn is_source(&self, task: &Arc<Task>) -> bool {
        self.task.id == task.id
    }

    fn columns() -> &'static [ColumnSpec] {
        COLUMNS
    }

    fn value_at(&self, column: usize) -> CellValue {
        match column {
            NAME => CellValue::from(self.task.name.as_str()),
            PRIORITY => CellValue::Integer(self.priority),
            _ => CellValue::Empty,
        }
    }

    fn update(&mut self) {
        self.priority = self.task.priority.load(Ordering::SeqCst);
        self.done = self.task.done.load(Ordering::SeqCst);
    }

    fn is_inactive(&self) -> bool {
        self.done
    }

    fn can_recycle(&self, task: &Arc<Task>) -> bool {
        self.done && self.task.name == task.name && self.task.id != task.id
    }
}

/// Names in row order.
pub fn names(model: &RowCollection<TaskRow>) -> Vec<String> {
    (0..model.row_count())
        .map(|i| model.value_at(i, NAME).display_text())
        .collect()
}

/// Every notification a collection fires, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Note {
    Inserted(Range<usize>),
    Removed(Range<usize>),
    Updated(Range<usize>),
    Reordered(Vec<usize>),
    Reset,
}

pub fn record(model: &RowCollection<TaskRow>) -> Arc<Mutex<Vec<Note>>> {
    let notes = Arc::new(Mutex::new(Vec::new()));
    let signals = model.signals();
    {
        let notes = notes.clone();
        signals
            .rows_inserted
            .connect(move |r| notes.lock().push(Note::Inserted(r.clone())));
    }
    {
        let notes = notes.clone();
        signals
            .rows_removed
            .connect(move |r| notes.lock().push(Note::Removed(r.clone())));
    }
    {
        let notes = notes.clone();
        signals
            .rows_updated
            .connect(move |r| notes.lock().push(Note::Updated(r.clone())));
    }
    {
        let notes = notes.clone();
        signals
            .rows_reordered
            .connect(move |p| notes.lock().push(Note::Reordered(p.to_vec())));
    }
    {
        let notes = notes.clone();
        signals.model_reset.connect(move |_| notes.lock().push(Note::Reset));
    }
    notes
}

/// Center of table row `row` in the first column, below the default header.
pub fn row_point(row: usize) -> Point {
    Point::new(10.0, swarmdeck::view::DEFAULT_HEADER_HEIGHT + row as f32 * swarmdeck::view::DEFAULT_ROW_HEIGHT + 10.0)
}
