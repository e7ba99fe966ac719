//! Schedule projection: reshapes the flat schedule entries fetched from the
//! backend into a row-category × date grid for rendering, with reverse lookup
//! from any cell back to its entries.
//!
//! Everything here is pure and synchronous. A [`Grid`] is an immutable
//! projection rebuilt in full whenever the entry set or window changes; it
//! owns no resources and never mutates after construction.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// One (plant, scheduled-date) pairing in a derived schedule.
///
/// After deduplication there is at most one entry per
/// `(plant_id, scheduled_date)` pair inside a projection window; a completed
/// entry wins over a pending one for the same pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub plant_id: i64,
    pub plant_name: String,
    /// Owning section identifier, None when the plant is unassigned
    pub section: Option<String>,
    pub scheduled_date: NaiveDate,
    /// Whether the action (watering/pruning) has been recorded for this date
    pub completed: bool,
    /// Set by the server when the date was shifted by the weather model
    pub weather_adjusted: bool,
    pub original_date: Option<NaiveDate>,
}

impl ScheduleEntry {
    /// Row label for section-based grouping
    pub fn section_label(&self) -> String {
        match self.section.as_deref() {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => "Unassigned".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("window length must be positive (got {0})")]
    InvalidWindow(u32),
}

/// Column granularity of a projection window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Month,
}

/// A projection window: contiguous columns starting at `start`.
///
/// Day windows yield consecutive dates (the watering views use 7). Month
/// windows yield consecutive first-of-month dates (the pruning view uses 12);
/// an entry maps to the column covering its calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDate,
    pub len: u32,
    pub granularity: Granularity,
}

impl Window {
    pub fn days(start: NaiveDate, len: u32) -> Self {
        Self {
            start,
            len,
            granularity: Granularity::Day,
        }
    }

    pub fn months(start: NaiveDate, len: u32) -> Self {
        Self {
            start,
            len,
            granularity: Granularity::Month,
        }
    }

    /// The full, gap-free column sequence, one date per column regardless of
    /// whether any entry falls on it
    fn columns(&self) -> Vec<NaiveDate> {
        match self.granularity {
            Granularity::Day => (0..self.len)
                .map(|i| self.start + Duration::days(i as i64))
                .collect(),
            Granularity::Month => {
                let mut month0 = self.start.year() * 12 + self.start.month0() as i32;
                let mut columns = Vec::with_capacity(self.len as usize);
                for _ in 0..self.len {
                    let (year, month) = (month0.div_euclid(12), month0.rem_euclid(12) as u32 + 1);
                    // First of month always exists
                    if let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) {
                        columns.push(date);
                    }
                    month0 += 1;
                }
                columns
            }
        }
    }

    /// Column index covering `date`, or None when it falls outside the window
    fn column_index(&self, date: NaiveDate) -> Option<usize> {
        match self.granularity {
            Granularity::Day => {
                let offset = (date - self.start).num_days();
                (0..self.len as i64).contains(&offset).then_some(offset as usize)
            }
            Granularity::Month => {
                let base = self.start.year() * 12 + self.start.month0() as i32;
                let target = date.year() * 12 + date.month0() as i32;
                let offset = target - base;
                (0..self.len as i32).contains(&offset).then_some(offset as usize)
            }
        }
    }
}

/// One grid cell: the deduplicated entries for a (row, column) pair, held as
/// indices into the grid's entry store
#[derive(Debug, Clone, Default)]
pub struct Cell {
    members: Vec<usize>,
}

impl Cell {
    pub fn count(&self) -> usize {
        self.members.len()
    }
}

/// The projector's output: ordered rows and columns, per-cell aggregates, and
/// derived totals. Totals are recomputed on every build, never carried between
/// projections.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: Vec<String>,
    columns: Vec<NaiveDate>,
    granularity: Granularity,
    cells: Vec<Vec<Cell>>,
    row_totals: Vec<usize>,
    column_totals: Vec<usize>,
    entries: Vec<ScheduleEntry>,
}

impl Grid {
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn columns(&self) -> &[NaiveDate] {
        &self.columns
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// True when no deduplicated entry fell inside the window
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry count at (row, col); zero for out-of-range coordinates
    pub fn count_at(&self, row: usize, col: usize) -> usize {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .map(Cell::count)
            .unwrap_or(0)
    }

    /// The entries behind a cell, sorted by plant name for stable display.
    /// Empty (never a panic) for out-of-range or zero-count cells.
    pub fn cell_detail(&self, row: usize, col: usize) -> Vec<&ScheduleEntry> {
        let mut detail: Vec<&ScheduleEntry> = self
            .cells
            .get(row)
            .and_then(|r| r.get(col))
            .map(|cell| cell.members.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default();
        detail.sort_by(|a, b| a.plant_name.cmp(&b.plant_name));
        detail
    }

    pub fn row_totals(&self) -> &[usize] {
        &self.row_totals
    }

    pub fn column_totals(&self) -> &[usize] {
        &self.column_totals
    }

    /// Total deduplicated entries inside the window
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Largest cell count, used for heat shading; at least 1 so callers can
    /// divide by it
    pub fn max_cell_count(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter().map(Cell::count))
            .max()
            .unwrap_or(0)
            .max(1)
    }
}

/// Build a day-granularity grid over `[window_start, window_start + window_len_days - 1]`.
///
/// `row_key` maps each entry to its row label and selects section-based or
/// type-based grouping. Rows appear in first-seen order; use [`project`] with
/// a row catalog when empty categories should still render.
///
/// Pure and total for well-formed input: an empty entry slice yields a grid
/// with zero rows and `window_len_days` zero-filled columns. The only failure
/// is a zero-length window.
pub fn build_grid<F>(
    entries: &[ScheduleEntry],
    window_start: NaiveDate,
    window_len_days: u32,
    row_key: F,
) -> Result<Grid, ProjectionError>
where
    F: Fn(&ScheduleEntry) -> String,
{
    project(Window::days(window_start, window_len_days), entries, row_key, None)
}

/// Build a grid over an arbitrary window, optionally forcing row order from a
/// category catalog (catalog rows render even when empty; keys missing from
/// the catalog are appended in first-seen order).
pub fn project<F>(
    window: Window,
    entries: &[ScheduleEntry],
    row_key: F,
    row_catalog: Option<&[String]>,
) -> Result<Grid, ProjectionError>
where
    F: Fn(&ScheduleEntry) -> String,
{
    if window.len == 0 {
        return Err(ProjectionError::InvalidWindow(window.len));
    }

    let columns = window.columns();

    // Deduplicate per (plant_id, scheduled_date). A completed entry overrides
    // a pending one for the same pair ("moved to done" beats "still due");
    // otherwise the first encountered wins and keeps its position.
    let mut kept: Vec<ScheduleEntry> = Vec::with_capacity(entries.len());
    let mut seen: HashMap<(i64, NaiveDate), usize> = HashMap::new();
    for entry in entries {
        match seen.get(&(entry.plant_id, entry.scheduled_date)) {
            Some(&idx) => {
                if entry.completed && !kept[idx].completed {
                    kept[idx] = entry.clone();
                }
            }
            None => {
                seen.insert((entry.plant_id, entry.scheduled_date), kept.len());
                kept.push(entry.clone());
            }
        }
    }

    // Drop entries outside the window
    kept.retain(|e| window.column_index(e.scheduled_date).is_some());

    // Row labels: catalog order first (if given), then first-seen order
    let mut rows: Vec<String> = row_catalog.map(|c| c.to_vec()).unwrap_or_default();
    for entry in &kept {
        let key = row_key(entry);
        if !rows.contains(&key) {
            rows.push(key);
        }
    }

    let mut cells = vec![vec![Cell::default(); columns.len()]; rows.len()];
    for (idx, entry) in kept.iter().enumerate() {
        let key = row_key(entry);
        let row = rows
            .iter()
            .position(|r| *r == key)
            .expect("row key registered above");
        let col = window
            .column_index(entry.scheduled_date)
            .expect("entry retained above is in window");
        cells[row][col].members.push(idx);
    }

    let row_totals: Vec<usize> = cells
        .iter()
        .map(|row| row.iter().map(Cell::count).sum())
        .collect();
    let column_totals: Vec<usize> = (0..columns.len())
        .map(|col| cells.iter().map(|row| row[col].count()).sum())
        .collect();

    Ok(Grid {
        rows,
        columns,
        granularity: window.granularity,
        cells,
        row_totals,
        column_totals,
        entries: kept,
    })
}

/// Return a new entry collection with the `(plant_id, date)` entry's
/// `completed` flag set to the given value, so the UI can reflect a watering
/// or pruning action before the authoritative refresh lands.
///
/// Setting an explicit value (rather than toggling) makes the operation
/// idempotent. No matching entry ⇒ the input comes back unchanged; entries are
/// never synthesized locally, creation is the backend's job.
pub fn apply_optimistic_update(
    entries: &[ScheduleEntry],
    plant_id: i64,
    date: NaiveDate,
    completed: bool,
) -> Vec<ScheduleEntry> {
    entries
        .iter()
        .map(|entry| {
            if entry.plant_id == plant_id && entry.scheduled_date == date {
                let mut updated = entry.clone();
                updated.completed = completed;
                updated
            } else {
                entry.clone()
            }
        })
        .collect()
}

/// Sequencing discipline for racing refreshes: a background refresh that
/// started before a local mutation must not overwrite it with stale data.
///
/// One monotonic counter issues sequence numbers to fetches and mutations
/// alike; a fetch response is admitted only when its number is greater than
/// the last recorded mutation's. Superseded responses are simply ignored when
/// they resolve (best-effort, not strict cancellation).
#[derive(Debug, Default)]
pub struct RefreshGate {
    next_seq: u64,
    last_mutation: u64,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag a fetch about to be issued
    pub fn begin_fetch(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Record a local mutation; responses tagged earlier are now stale
    pub fn note_mutation(&mut self) -> u64 {
        self.next_seq += 1;
        self.last_mutation = self.next_seq;
        self.last_mutation
    }

    /// Whether a response with this fetch tag may be applied
    pub fn admit(&self, fetch_seq: u64) -> bool {
        fetch_seq > self.last_mutation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_single_entry_seven_day_window() {
        let entries = vec![entry(1, "Fern", "A", "2024-06-03", false)];
        let grid = build_grid(&entries, date("2024-06-03"), 7, by_section).unwrap();

        assert_eq!(grid.rows(), &["A".to_string()]);
        assert_eq!(grid.columns().len(), 7);
        assert_eq!(grid.columns()[0], date("2024-06-03"));
        assert_eq!(grid.columns()[6], date("2024-06-09"));
        assert_eq!(grid.count_at(0, 0), 1);
        for col in 1..7 {
            assert_eq!(grid.count_at(0, col), 0);
        }
    }

    #[test]
    fn test_empty_input_yields_zero_rows_full_columns() {
        let grid = build_grid(&[], date("2024-06-03"), 7, by_section).unwrap();
        assert!(grid.rows().is_empty());
        assert_eq!(grid.columns().len(), 7);
        assert!(grid.is_empty());
        assert_eq!(grid.total(), 0);
    }

    #[test]
    fn test_invalid_window_rejected() {
        let err = build_grid(&[], date("2024-06-03"), 0, by_section).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidWindow(0)));
    }

    #[test]
    fn test_dedup_prefers_completed() {
        let entries = vec![
            entry(1, "Fern", "A", "2024-06-03", false),
            entry(1, "Fern", "A", "2024-06-03", true),
        ];
        let grid = build_grid(&entries, date("2024-06-03"), 7, by_section).unwrap();
        assert_eq!(grid.count_at(0, 0), 1);
        let detail = grid.cell_detail(0, 0);
        assert_eq!(detail.len(), 1);
        assert!(detail[0].completed);
    }

    #[test]
    fn test_dedup_keeps_first_when_neither_completed() {
        let mut second = entry(1, "Fern", "A", "2024-06-03", false);
        second.weather_adjusted = true;
        let entries = vec![entry(1, "Fern", "A", "2024-06-03", false), second];
        let grid = build_grid(&entries, date("2024-06-03"), 7, by_section).unwrap();
        let detail = grid.cell_detail(0, 0);
        assert_eq!(detail.len(), 1);
        assert!(!detail[0].weather_adjusted, "first encountered entry wins");
    }

    #[test]
    fn test_window_filtering_drops_out_of_range() {
        let entries = vec![
            entry(1, "Fern", "A", "2024-06-02", false),
            entry(2, "Rose", "A", "2024-06-03", false),
            entry(3, "Ivy", "A", "2024-06-10", false),
        ];
        let grid = build_grid(&entries, date("2024-06-03"), 7, by_section).unwrap();
        assert_eq!(grid.total(), 1);
        assert_eq!(grid.count_at(0, 0), 1);
        assert_eq!(grid.column_totals().iter().sum::<usize>(), 1);
    }

    #[test]
    fn test_conservation() {
        let entries = vec![
            entry(1, "Fern", "A", "2024-06-03", false),
            entry(2, "Rose", "B", "2024-06-04", false),
            entry(3, "Ivy", "A", "2024-06-05", true),
            entry(2, "Rose", "B", "2024-06-04", true), // dedup collapses this pair
        ];
        let grid = build_grid(&entries, date("2024-06-03"), 7, by_section).unwrap();
        let row_sum: usize = grid.row_totals().iter().sum();
        let col_sum: usize = grid.column_totals().iter().sum();
        assert_eq!(row_sum, col_sum);
        assert_eq!(row_sum, grid.total());
        assert_eq!(grid.total(), 3);
    }

    #[test]
    fn test_rows_in_first_seen_order() {
        let entries = vec![
            entry(1, "Fern", "C", "2024-06-03", false),
            entry(2, "Rose", "A", "2024-06-04", false),
            entry(3, "Ivy", "C", "2024-06-05", false),
        ];
        let grid = build_grid(&entries, date("2024-06-03"), 7, by_section).unwrap();
        assert_eq!(grid.rows(), &["C".to_string(), "A".to_string()]);
    }

    #[test]
    fn test_row_catalog_renders_empty_categories() {
        let catalog = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let entries = vec![entry(1, "Fern", "B", "2024-06-03", false)];
        let grid = project(
            Window::days(date("2024-06-03"), 7),
            &entries,
            by_section,
            Some(&catalog),
        )
        .unwrap();
        assert_eq!(grid.rows(), catalog.as_slice());
        assert_eq!(grid.row_totals(), &[0, 1, 0]);
    }

    #[test]
    fn test_cell_detail_sorted_by_name() {
        let entries = vec![
            entry(2, "Zinnia", "A", "2024-06-03", false),
            entry(1, "Aster", "A", "2024-06-03", false),
        ];
        let grid = build_grid(&entries, date("2024-06-03"), 7, by_section).unwrap();
        let names: Vec<&str> = grid
            .cell_detail(0, 0)
            .iter()
            .map(|e| e.plant_name.as_str())
            .collect();
        assert_eq!(names, ["Aster", "Zinnia"]);
    }

    #[test]
    fn test_cell_detail_out_of_range_is_empty() {
        let grid = build_grid(&[], date("2024-06-03"), 7, by_section).unwrap();
        assert!(grid.cell_detail(5, 99).is_empty());
    }

    #[test]
    fn test_month_window_buckets_by_calendar_month() {
        let entries = vec![
            entry(1, "Apple", "A", "2024-01-15", false),
            entry(2, "Pear", "A", "2024-03-01", false),
            entry(3, "Plum", "A", "2023-12-31", false), // before the window
        ];
        let grid = project(
            Window::months(date("2024-01-01"), 12),
            &entries,
            by_section,
            None,
        )
        .unwrap();
        assert_eq!(grid.columns().len(), 12);
        assert_eq!(grid.columns()[0], date("2024-01-01"));
        assert_eq!(grid.columns()[11], date("2024-12-01"));
        assert_eq!(grid.count_at(0, 0), 1);
        assert_eq!(grid.count_at(0, 2), 1);
        assert_eq!(grid.total(), 2);
    }

    #[test]
    fn test_determinism() {
        let entries = vec![
            entry(1, "Fern", "A", "2024-06-03", false),
            entry(2, "Rose", "B", "2024-06-04", true),
        ];
        let a = build_grid(&entries, date("2024-06-03"), 7, by_section).unwrap();
        let b = build_grid(&entries, date("2024-06-03"), 7, by_section).unwrap();
        assert_eq!(a.rows(), b.rows());
        assert_eq!(a.columns(), b.columns());
        assert_eq!(a.row_totals(), b.row_totals());
        assert_eq!(a.column_totals(), b.column_totals());
    }

    #[test]
    fn test_optimistic_update_sets_flag() {
        let entries = vec![entry(1, "Fern", "A", "2024-06-03", false)];
        let updated = apply_optimistic_update(&entries, 1, date("2024-06-03"), true);
        assert!(updated[0].completed);
    }

    #[test]
    fn test_optimistic_update_idempotent() {
        let entries = vec![entry(1, "Fern", "A", "2024-06-03", false)];
        let once = apply_optimistic_update(&entries, 1, date("2024-06-03"), true);
        let twice = apply_optimistic_update(&once, 1, date("2024-06-03"), true);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_optimistic_update_no_match_is_noop() {
        let entries = vec![entry(1, "Fern", "A", "2024-06-03", false)];
        let updated = apply_optimistic_update(&entries, 9, date("2024-06-03"), true);
        assert_eq!(updated, entries);
    }

    #[test]
    fn test_refresh_gate_discards_stale_response() {
        let mut gate = RefreshGate::new();
        let fetch = gate.begin_fetch();
        gate.note_mutation();
        assert!(!gate.admit(fetch), "fetch issued before mutation is stale");

        let fresh = gate.begin_fetch();
        assert!(gate.admit(fresh));
    }

    #[test]
    fn test_refresh_gate_admits_when_no_mutation() {
        let mut gate = RefreshGate::new();
        let fetch = gate.begin_fetch();
        assert!(gate.admit(fetch));
    }
}
