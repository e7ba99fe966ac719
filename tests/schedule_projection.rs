//! End-to-end checks of the schedule projection through the public API:
//! the grid shape guarantees, the dedup rule, windowing, optimistic updates
//! and the stale-refresh gate.

use chrono::NaiveDate;
use sprig::schedule::{
    apply_optimistic_update, build_grid, project, ProjectionError, RefreshGate, ScheduleEntry,
    Window,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn entry(plant_id: i64, name: &str, section: &str, day: &str, completed: bool) -> ScheduleEntry {
    ScheduleEntry {
        plant_id,
        plant_name: name.to_string(),
        section: Some(section.to_string()),
        scheduled_date: date(day),
        completed,
        weather_adjusted: false,
        original_date: None,
    }
}

fn by_section(e: &ScheduleEntry) -> String {
    e.section_label()
}

#[test]
fn determinism_identical_inputs_identical_grids() {
    let entries = vec![
        entry(1, "Fern", "A", "2024-06-03", false),
        entry(2, "Rose", "B", "2024-06-05", true),
        entry(3, "Ivy", "A", "2024-06-08", false),
    ];
    let a = build_grid(&entries, date("2024-06-03"), 7, by_section).unwrap();
    let b = build_grid(&entries, date("2024-06-03"), 7, by_section).unwrap();

    assert_eq!(a.rows(), b.rows());
    assert_eq!(a.columns(), b.columns());
    assert_eq!(a.row_totals(), b.row_totals());
    assert_eq!(a.column_totals(), b.column_totals());
    for row in 0..a.rows().len() {
        for col in 0..a.columns().len() {
            assert_eq!(a.count_at(row, col), b.count_at(row, col));
            let names_a: Vec<_> = a.cell_detail(row, col).iter().map(|e| e.plant_name.clone()).collect();
            let names_b: Vec<_> = b.cell_detail(row, col).iter().map(|e| e.plant_name.clone()).collect();
            assert_eq!(names_a, names_b);
        }
    }
}

#[test]
fn column_completeness_regardless_of_entries() {
    for len in [1u32, 7, 14, 30] {
        let grid = build_grid(&[], date("2024-06-03"), len, by_section).unwrap();
        assert_eq!(grid.columns().len(), len as usize);
        // Contiguous, gap-free
        for pair in grid.columns().windows(2) {
            assert_eq!((pair[1] - pair[0]).num_days(), 1);
        }
    }
}

#[test]
fn conservation_totals_match_dedup_count() {
    let entries = vec![
        entry(1, "Fern", "A", "2024-06-03", false),
        entry(1, "Fern", "A", "2024-06-03", true), // dedup pair
        entry(2, "Rose", "B", "2024-06-04", false),
        entry(3, "Ivy", "C", "2024-06-09", false),
        entry(4, "Oak", "A", "2024-05-01", false), // outside window
    ];
    let grid = build_grid(&entries, date("2024-06-03"), 7, by_section).unwrap();

    let row_sum: usize = grid.row_totals().iter().sum();
    let col_sum: usize = grid.column_totals().iter().sum();
    assert_eq!(row_sum, col_sum);
    assert_eq!(row_sum, grid.total());
    assert_eq!(grid.total(), 3);
}

#[test]
fn dedup_completed_wins() {
    let entries = vec![
        entry(1, "Fern", "A", "2024-06-03", false),
        entry(1, "Fern", "A", "2024-06-03", true),
    ];
    let grid = build_grid(&entries, date("2024-06-03"), 7, by_section).unwrap();

    assert_eq!(grid.count_at(0, 0), 1);
    let detail = grid.cell_detail(0, 0);
    assert_eq!(detail.len(), 1);
    assert!(detail[0].completed);

    // Order flipped: completed still wins
    let entries = vec![
        entry(1, "Fern", "A", "2024-06-03", true),
        entry(1, "Fern", "A", "2024-06-03", false),
    ];
    let grid = build_grid(&entries, date("2024-06-03"), 7, by_section).unwrap();
    assert!(grid.cell_detail(0, 0)[0].completed);
}

#[test]
fn window_filtering_excludes_adjacent_days() {
    let entries = vec![
        entry(1, "Early", "A", "2024-06-02", false), // one day before the window
        entry(2, "Late", "A", "2024-06-10", false),  // one day after the last column
        entry(3, "In", "A", "2024-06-09", false),    // last column
    ];
    let grid = build_grid(&entries, date("2024-06-03"), 7, by_section).unwrap();

    assert_eq!(grid.total(), 1);
    let all_names: Vec<String> = (0..grid.rows().len())
        .flat_map(|r| (0..grid.columns().len()).map(move |c| (r, c)))
        .flat_map(|(r, c)| {
            grid.cell_detail(r, c)
                .iter()
                .map(|e| e.plant_name.clone())
                .collect::<Vec<_>>()
        })
        .collect();
    assert_eq!(all_names, ["In"]);
}

#[test]
fn optimistic_update_idempotent_and_targeted() {
    let entries = vec![
        entry(1, "Fern", "A", "2024-06-03", false),
        entry(1, "Fern", "A", "2024-06-04", false), // same plant, other day
        entry(2, "Rose", "A", "2024-06-03", false),
    ];

    let once = apply_optimistic_update(&entries, 1, date("2024-06-03"), true);
    let twice = apply_optimistic_update(&once, 1, date("2024-06-03"), true);
    assert_eq!(once, twice);

    assert!(once[0].completed);
    assert!(!once[1].completed, "other date untouched");
    assert!(!once[2].completed, "other plant untouched");

    // No match: unchanged
    let noop = apply_optimistic_update(&entries, 99, date("2024-06-03"), true);
    assert_eq!(noop, entries);
}

#[test]
fn example_scenario_single_fern() {
    let entries = vec![entry(1, "Fern", "A", "2024-06-03", false)];
    let grid = build_grid(&entries, date("2024-06-03"), 7, by_section).unwrap();

    assert_eq!(grid.rows(), ["A".to_string()]);
    assert_eq!(grid.columns().len(), 7);
    assert_eq!(*grid.columns().first().unwrap(), date("2024-06-03"));
    assert_eq!(*grid.columns().last().unwrap(), date("2024-06-09"));
    assert_eq!(grid.count_at(0, 0), 1);
    for col in 1..7 {
        assert_eq!(grid.count_at(0, col), 0);
    }
}

#[test]
fn empty_input_zero_rows_full_columns() {
    let grid = build_grid(&[], date("2024-06-03"), 7, by_section).unwrap();
    assert!(grid.rows().is_empty());
    assert_eq!(grid.columns().len(), 7);
    assert_eq!(grid.total(), 0);
    assert!(grid.column_totals().iter().all(|&t| t == 0));
    // No panic on any lookup
    assert!(grid.cell_detail(0, 0).is_empty());
}

#[test]
fn invalid_window_is_the_only_hard_failure() {
    let err = build_grid(&[], date("2024-06-03"), 0, by_section).unwrap_err();
    assert!(matches!(err, ProjectionError::InvalidWindow(_)));
}

#[test]
fn month_window_projects_pruning_style_grids() {
    let types = |e: &ScheduleEntry| e.plant_name.clone(); // stand-in row key
    let entries = vec![
        entry(1, "Tree", "A", "2024-03-01", false),
        entry(1, "Tree", "A", "2024-11-01", false),
        entry(2, "Shrub", "B", "2024-03-01", false),
    ];
    let grid = project(Window::months(date("2024-01-01"), 12), &entries, types, None).unwrap();

    assert_eq!(grid.columns().len(), 12);
    assert_eq!(grid.rows().len(), 2);
    assert_eq!(grid.count_at(0, 2), 1); // Tree in March
    assert_eq!(grid.count_at(0, 10), 1); // Tree in November
    assert_eq!(grid.count_at(1, 2), 1); // Shrub in March
    assert_eq!(grid.total(), 3);
}

#[test]
fn refresh_gate_protects_optimistic_updates() {
    let mut gate = RefreshGate::new();

    // A periodic refresh goes out...
    let in_flight = gate.begin_fetch();
    // ...the user waters a plant before it returns
    gate.note_mutation();
    // The stale response must be dropped
    assert!(!gate.admit(in_flight));

    // The post-mutation reconcile fetch is admitted
    let reconcile = gate.begin_fetch();
    assert!(gate.admit(reconcile));

    // And an even older response stays rejected
    assert!(!gate.admit(in_flight));
}
