//! Integration tests for the row collection and the selection layer bound
//! to it.

mod common;

use std::sync::Arc;

use common::{NAME, Note, PRIORITY, Task, TaskRow, names, record};
use swarmdeck::view::SelectionChange;
use swarmdeck::{Row, RowCollection, SelectionFlags, SelectionModel, SelectionMode, SortOrder, TableView};

#[test]
fn test_selection_indices_never_past_end() {
    let model = RowCollection::<TaskRow>::shared();
    let view = TableView::new(model.clone());
    let tasks: Vec<_> = (0..8).map(|i| Task::new(i, &format!("t{i}"), i as i64)).collect();
    for task in &tasks {
        model.add(task.clone());
    }

    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move |bound: usize| {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        (seed % bound.max(1) as u64) as usize
    };

    let mut next_id = 100;
    for _ in 0..400 {
        match next(5) {
            0 => {
                model.add(Task::new(next_id, "extra", 0));
                next_id += 1;
            }
            1 if !model.is_empty() => {
                model.remove(next(model.row_count()));
            }
            2 => view.select_row(next(model.row_count() + 3), SelectionFlags::TOGGLE),
            3 => view.select_all(),
            _ if model.row_count() > 2 => {
                model.remove_inactive();
                model.remove(model.row_count() - 1);
            }
            _ => {}
        }
        let count = model.row_count();
        let indices = view.selected_indices();
        assert!(indices.iter().all(|&i| i < count), "{indices:?} with {count} rows");
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        assert!(view.selected_index().is_none_or(|i| i < count));
    }
}

#[test]
fn test_stale_selection_suffix_dropped_at_query_time() {
    let mut selection = SelectionModel::with_mode(SelectionMode::Multi);
    selection.select_range(2, 6, SelectionFlags::SELECT);

    assert_eq!(selection.selected_indices(4), vec![2, 3]);
    assert_eq!(selection.selected_indices(2), Vec::<usize>::new());
    assert_eq!(selection.selected_index(2), None);
}

#[test]
fn test_bulk_remove_without_clearing_selection() {
    let model = RowCollection::<TaskRow>::shared();
    let view = TableView::new(model.clone());
    let tasks: Vec<_> = (0..5).map(|i| Task::new(i, &format!("t{i}"), 0)).collect();
    for task in &tasks {
        model.add(task.clone());
    }
    view.select_all();
    for task in &tasks[2..] {
        task.finish();
    }
    model.refresh();
    assert_eq!(model.remove_inactive(), 3);
    assert_eq!(view.selected_indices(), vec![0, 1]);
}

#[test]
fn test_sort_ties_keep_insertion_order() {
    let model = RowCollection::<TaskRow>::new();
    let a = Task::new(1, "a", 1);
    let b = Task::new(2, "b", 2);
    let c = Task::new(3, "c", 1);
    let d = Task::new(4, "d", 2);
    for task in [&a, &b, &c, &d] {
        model.add(task.clone());
    }
    model.sort(PRIORITY);
    assert_eq!(names(&model), ["a", "c", "b", "d"]);

    model.remove_source(&c);
    model.add_sorted(c.clone());
    assert_eq!(names(&model), ["a", "c", "b", "d"]);

    model.remove_source(&a);
    model.add_sorted(a.clone());
    assert_eq!(names(&model), ["c", "a", "b", "d"]);
}

#[test]
fn test_sort_toggles_and_fires_one_reorder() {
    let model = RowCollection::<TaskRow>::new();
    for (i, p) in [3, 1, 2].into_iter().enumerate() {
        model.add(Task::new(i as u64, &format!("t{i}"), p));
    }
    let notes = record(&model);

    model.sort(PRIORITY);
    assert_eq!(model.sort_state().map(|s| s.order), Some(SortOrder::Ascending));
    model.sort(PRIORITY);
    assert_eq!(model.sort_state().map(|s| s.order), Some(SortOrder::Descending));
    assert_eq!(names(&model), ["t0", "t2", "t1"]);

    let notes = notes.lock();
    assert_eq!(notes.len(), 2);
    assert!(notes.iter().all(|n| matches!(n, Note::Reordered(_))));
}

#[test]
fn test_dynamic_change_waits_for_resort() {
    let model = RowCollection::<TaskRow>::new();
    let a = Task::new(1, "a", 1);
    let b = Task::new(2, "b", 2);
    model.add(a.clone());
    model.add(b.clone());
    model.sort(PRIORITY);
    let notes = record(&model);

    a.set_priority(10);
    model.refresh();
    assert!(model.needs_resort());
    assert_eq!(names(&model), ["a", "b"]);
    assert_eq!(model.value_at(0, PRIORITY).as_integer(), Some(10));

    assert!(model.resort());
    assert!(!model.needs_resort());
    assert_eq!(names(&model), ["b", "a"]);
    assert!(!model.resort());

    assert_eq!(
        *notes.lock(),
        vec![Note::Updated(0..2), Note::Reordered(vec![1, 0])]
    );
}

#[test]
fn test_recycling_rebinds_in_place() {
    let model = RowCollection::<TaskRow>::shared();
    let first = Task::new(1, "same.iso", 0);
    model.add(first.clone());
    model.add(Task::new(2, "other.iso", 0));

    let retry = Task::new(3, "same.iso", 0);
    assert_eq!(model.update(retry.clone()), None, "active rows are not recycled");

    first.finish();
    model.refresh();
    let notes = record(&model);
    assert_eq!(model.update(retry.clone()), Some(0));
    assert_eq!(model.row_count(), 2);
    assert_eq!(model.get_row(&retry), Some(0));
    assert!(!model.contains(&first));
    assert_eq!(*notes.lock(), vec![Note::Updated(0..1)]);

    assert_eq!(model.update_with(Task::new(4, "x", 0), |row| row.is_inactive()), None);
}

#[test]
fn test_one_notification_per_refresh() {
    let model = RowCollection::<TaskRow>::new();
    let tasks: Vec<_> = (0..50).map(|i| Task::new(i, "t", 0)).collect();
    for task in &tasks {
        model.add(task.clone());
    }
    let notes = record(&model);
    for task in &tasks {
        task.set_priority(7);
    }
    tasks[3].finish();
    assert!(model.refresh());
    assert_eq!(*notes.lock(), vec![Note::Updated(0..50)]);
    assert_eq!(model.inactive_count(), 1);
}

#[test]
fn test_observers_see_fully_updated_table() {
    let model = RowCollection::<TaskRow>::shared();
    let tasks: Vec<_> = (0..10).map(|i| Task::new(i, "t", 0)).collect();
    for task in &tasks {
        model.add(task.clone());
    }
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    {
        let seen = seen.clone();
        let weak = Arc::downgrade(&model);
        model.signals().rows_updated.connect(move |range| {
            if let Some(model) = weak.upgrade() {
                let values: Vec<_> = range.clone().map(|i| model.value_at(i, PRIORITY)).collect();
                seen.lock().push(values);
            }
        });
    }
    for task in &tasks {
        task.set_priority(5);
    }
    model.refresh();
    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].iter().all(|v| v.as_integer() == Some(5)));
}

#[test]
fn test_priority_scenario() {
    let model = RowCollection::<TaskRow>::shared();
    let view = TableView::new(model.clone());
    let a = Task::new(1, "A", 3);
    let b = Task::new(2, "B", 1);
    let c = Task::new(3, "C", 2);
    for task in [&a, &b, &c] {
        model.add(task.clone());
    }

    model.sort(PRIORITY);
    assert_eq!(names(&model), ["B", "C", "A"]);

    let changes = Arc::new(parking_lot::Mutex::new(Vec::<SelectionChange>::new()));
    {
        let changes = changes.clone();
        view.selection_changed().connect(move |c| changes.lock().push(c.clone()));
    }
    view.select_row(0, SelectionFlags::CLEAR_SELECT_CURRENT);
    assert_eq!(view.selected_index(), Some(0));

    assert!(model.remove_source(&b));
    assert_eq!(model.get_row(&b), None);
    assert_eq!(view.selected_index(), None);
    assert_eq!(view.selected_indices(), Vec::<usize>::new());
    assert_eq!(model.value_at(0, NAME).display_text(), "C");
    assert_eq!(changes.lock().last().map(|c| c.deselected.clone()), Some(vec![0]));
}

#[test]
fn test_clear_resets_selection() {
    let model = RowCollection::<TaskRow>::shared();
    let view = TableView::new(model.clone());
    model.add(Task::new(1, "a", 0));
    view.select_all();
    model.clear();
    assert!(model.is_empty());
    assert_eq!(view.selected_index(), None);
}
