// crates/relay-core/tests/grid_toggle.rs
use std::sync::Arc;
use std::thread;

use relay_core::{GridError, RelayError, ToggleGrid, GRID_SIZE};

#[test]
fn new_grid_is_all_zero() {
    let grid = ToggleGrid::new();
    assert_eq!(grid.len(), GRID_SIZE);
    assert!(grid.snapshot().iter().all(|&bit| bit == 0));
    assert_eq!(grid.count_set(), 0);
}

#[test]
fn toggle_returns_new_value() {
    let grid = ToggleGrid::new();
    assert_eq!(grid.toggle(5), Ok(1));
    assert_eq!(grid.get(5), Ok(1));
    assert_eq!(grid.toggle(5), Ok(0));
    assert_eq!(grid.get(5), Ok(0));
}

#[test]
fn double_toggle_restores_every_cell() {
    let grid = ToggleGrid::new();
    grid.toggle(7).unwrap(); // start some cells at 1 too

    for index in 0..GRID_SIZE as i64 {
        let before = grid.get(index).unwrap();
        grid.toggle(index).unwrap();
        grid.toggle(index).unwrap();
        assert_eq!(grid.get(index).unwrap(), before, "cell {}", index);
    }
}

#[test]
fn toggles_do_not_touch_other_cells() {
    let grid = ToggleGrid::new();
    grid.toggle(0).unwrap();
    grid.toggle(274).unwrap();

    let snapshot = grid.snapshot();
    assert_eq!(snapshot[0], 1);
    assert_eq!(snapshot[274], 1);
    assert_eq!(grid.count_set(), 2);
}

#[test]
fn out_of_range_is_rejected_and_grid_unchanged() {
    let grid = ToggleGrid::new();
    let before = grid.snapshot();

    for index in [-1, GRID_SIZE as i64, 300, i64::MAX, i64::MIN] {
        assert_eq!(
            grid.toggle(index),
            Err(GridError::OutOfRange { index, len: GRID_SIZE })
        );
        assert!(grid.get(index).is_err());
    }

    assert_eq!(grid.snapshot(), before);
}

#[test]
fn boundary_indices_are_addressable() {
    let grid = ToggleGrid::new();
    assert_eq!(grid.toggle(0), Ok(1));
    assert_eq!(grid.toggle(GRID_SIZE as i64 - 1), Ok(1));
}

#[test]
fn custom_length_grid() {
    let grid = ToggleGrid::with_len(3);
    assert_eq!(grid.len(), 3);
    assert!(grid.toggle(2).is_ok());
    assert!(grid.toggle(3).is_err());
}

#[test]
fn concurrent_toggles_on_one_cell_lose_no_updates() {
    let grid = Arc::new(ToggleGrid::new());
    let threads = 8;
    let per_thread = 1_001; // odd, so each thread leaves a net flip

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let grid = Arc::clone(&grid);
            thread::spawn(move || {
                for _ in 0..per_thread {
                    grid.toggle(42).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // 8 * 1001 flips is even: the cell must be back at 0.
    assert_eq!(grid.get(42), Ok(0));
    assert_eq!(grid.count_set(), 0);
}

#[test]
fn grid_error_maps_to_out_of_bounds_reply() {
    let err: RelayError = ToggleGrid::new().toggle(300).unwrap_err().into();
    assert_eq!(err.client_message(), "Index out of bounds");
}
