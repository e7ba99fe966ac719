use chrono::{Datelike, Duration as ChronoDuration, NaiveDate};
use ratatui::widgets::ListState;
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use crate::api::ApiClient;
use crate::config::Config;
use crate::models::{DayWeather, Plant, PlantSummary, ScheduleKind, Section};
use crate::schedule::{self, apply_optimistic_update, Grid, RefreshGate, ScheduleEntry, Window};
use crate::tui::error::TuiError;
use crate::tui::widgets::input::InputField;
use crate::tui::worker::{WorkerEvent, WorkerHandle, WorkerRequest};
use crate::utils;

/// How long transient status messages stay visible
const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Garden,
    Search,
    Watering,
    Pruning,
}

impl Tab {
    /// Only the Garden tab shows the sidebar; schedule grids want full width
    pub fn has_sidebar(self) -> bool {
        matches!(self, Tab::Garden)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarState {
    Expanded,
    Collapsed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    View,
    SearchInput,
    Help,
    SectionModal,
    MoveToSection,
    ConfirmRemove,
    CellDetail,
}

/// Row grouping for the watering grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Section,
    Type,
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub current_tab: Tab,
    pub sidebar_state: SidebarState,
    pub mode: Mode,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            current_tab: Tab::Garden,
            sidebar_state: SidebarState::Expanded,
            mode: Mode::View,
        }
    }
}

/// One display row in the section-grouped garden list
#[derive(Debug, Clone)]
pub enum GardenRow {
    SectionHeading(String),
    /// Index into `GardenState::plants`
    Plant(usize),
}

#[derive(Debug, Default)]
pub struct GardenState {
    pub plants: Vec<Plant>,
    /// Display index into the grouped row list (headings included)
    pub selected_index: usize,
    pub list_state: ListState,
    pub suggestions: Vec<PlantSummary>,
    /// Section the current suggestions were fetched for
    pub suggestions_for: Option<String>,
    pub loading: bool,
}

#[derive(Debug, Default)]
pub struct SearchState {
    pub input: InputField,
    pub results: Vec<PlantSummary>,
    pub selected_index: usize,
    pub list_state: ListState,
    pub searching: bool,
}

#[derive(Debug)]
pub struct WateringState {
    pub entries: Vec<ScheduleEntry>,
    pub weather: BTreeMap<NaiveDate, DayWeather>,
    pub skipped: usize,
    pub last_updated: Option<String>,
    pub grid: Option<Grid>,
    /// 0 = this week, 1 = next week
    pub week_offset: i64,
    pub grouping: Grouping,
    pub selected_row: usize,
    pub selected_col: usize,
    pub loading: bool,
}

impl Default for WateringState {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            weather: BTreeMap::new(),
            skipped: 0,
            last_updated: None,
            grid: None,
            week_offset: 0,
            grouping: Grouping::Section,
            selected_row: 0,
            selected_col: 0,
            loading: false,
        }
    }
}

#[derive(Debug)]
pub struct PruningState {
    pub entries: Vec<ScheduleEntry>,
    pub skipped: usize,
    pub grid: Option<Grid>,
    pub year: i32,
    /// Restrict the grid to one section (cycled with the filter key)
    pub section_filter: Option<String>,
    pub selected_row: usize,
    pub selected_col: usize,
    pub loading: bool,
}

impl Default for PruningState {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            skipped: 0,
            grid: None,
            year: utils::today().year(),
            section_filter: None,
            selected_row: 0,
            selected_col: 0,
            loading: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionModalMode {
    View,
    Add,
    Rename,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionModalField {
    SectionList,
    ActionsList,
}

#[derive(Debug)]
pub struct SectionModalState {
    pub mode: SectionModalMode,
    pub selected_index: usize,
    /// 0 = Add, 1 = Rename, 2 = Delete
    pub actions_selected_index: usize,
    pub name_input: InputField,
    pub list_state: ListState,
    pub current_field: SectionModalField,
}

impl SectionModalState {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            mode: SectionModalMode::View,
            selected_index: 0,
            actions_selected_index: 0,
            name_input: InputField::new(),
            list_state,
            current_field: SectionModalField::SectionList,
        }
    }
}

#[derive(Debug, Default)]
pub struct SectionsState {
    pub sections: Vec<Section>,
    pub modal_state: Option<SectionModalState>,
}

/// What the confirm modal is about to remove
#[derive(Debug, Clone)]
pub enum PendingRemoval {
    Plant(Plant),
    Section(Section),
}

#[derive(Debug, Default)]
pub struct ModalState {
    pub confirm: Option<PendingRemoval>,
    pub confirm_selection: usize,
    /// Move-to-section target: 0 = [Unassigned], 1.. = section index + 1
    pub move_target_index: usize,
}

#[derive(Debug, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

/// Open cell-detail popover: which grid, which cell, which entry is selected
#[derive(Debug, Clone)]
pub struct CellDetailState {
    pub kind: ScheduleKind,
    pub row: usize,
    pub col: usize,
    pub selected_index: usize,
}

pub struct App {
    // Core infrastructure
    pub config: Config,
    pub worker: WorkerHandle,
    /// Stale-refresh discipline: fetches tagged here, mutations invalidate
    pub gate: RefreshGate,

    // Grouped state
    pub ui: UiState,
    pub garden: GardenState,
    pub search: SearchState,
    pub watering: WateringState,
    pub pruning: PruningState,
    pub sections: SectionsState,
    pub modals: ModalState,
    pub status: StatusState,
    pub cell_detail: Option<CellDetailState>,

    last_refresh: Instant,
}

impl App {
    pub fn new(config: Config, api: ApiClient) -> Result<Self, TuiError> {
        let worker = WorkerHandle::spawn(api);

        let grouping = match config.watering_grouping.as_str() {
            "Type" => Grouping::Type,
            _ => Grouping::Section,
        };

        let mut app = Self {
            config,
            worker,
            gate: RefreshGate::new(),
            ui: UiState::default(),
            garden: GardenState::default(),
            search: SearchState::default(),
            watering: WateringState {
                grouping,
                ..WateringState::default()
            },
            pruning: PruningState::default(),
            sections: SectionsState::default(),
            modals: ModalState::default(),
            status: StatusState::default(),
            cell_detail: None,
            last_refresh: Instant::now(),
        };

        app.refresh_all();
        Ok(app)
    }

    // ─── fetching & refresh ────────────────────────────────────────

    pub fn request_garden(&mut self) {
        let seq = self.gate.begin_fetch();
        self.garden.loading = true;
        self.worker.send(WorkerRequest::FetchGarden { seq });
    }

    pub fn request_sections(&mut self) {
        let seq = self.gate.begin_fetch();
        self.worker.send(WorkerRequest::FetchSections { seq });
    }

    pub fn request_watering(&mut self) {
        let seq = self.gate.begin_fetch();
        self.watering.loading = true;
        self.worker.send(WorkerRequest::FetchWatering { seq });
    }

    pub fn request_pruning(&mut self) {
        let seq = self.gate.begin_fetch();
        self.pruning.loading = true;
        self.worker.send(WorkerRequest::FetchPruning {
            seq,
            year: self.pruning.year,
        });
    }

    pub fn refresh_all(&mut self) {
        self.last_refresh = Instant::now();
        self.request_garden();
        self.request_sections();
        self.request_watering();
        self.request_pruning();
    }

    /// Timer-driven background refresh; called once per event-loop tick
    pub fn maybe_refresh(&mut self) {
        let interval = Duration::from_secs(self.config.refresh_interval_secs.max(30));
        if self.last_refresh.elapsed() >= interval {
            self.refresh_all();
        }
    }

    // ─── worker events ─────────────────────────────────────────────

    pub fn handle_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Garden { seq, result } => {
                self.garden.loading = false;
                if !self.gate.admit(seq) {
                    return;
                }
                match result {
                    Ok(plants) => {
                        self.garden.plants = plants;
                        self.clamp_garden_selection();
                        self.rebuild_grids();
                    }
                    Err(e) => self.set_status(format!("Failed to load garden: {}", e)),
                }
            }
            WorkerEvent::Sections { seq, result } => {
                if !self.gate.admit(seq) {
                    return;
                }
                match result {
                    Ok(sections) => {
                        self.sections.sections = sections;
                        self.rebuild_grids();
                    }
                    Err(e) => self.set_status(format!("Failed to load sections: {}", e)),
                }
            }
            WorkerEvent::Watering { seq, result } => {
                self.watering.loading = false;
                if !self.gate.admit(seq) {
                    return;
                }
                match result {
                    Ok(fetch) => {
                        self.watering.entries = fetch.entries;
                        self.watering.weather = fetch.weather;
                        self.watering.skipped = fetch.skipped;
                        self.watering.last_updated = fetch.last_updated;
                        self.rebuild_watering_grid();
                        if self.watering.skipped > 0 {
                            self.set_status(format!(
                                "Watering schedule loaded ({} malformed records skipped)",
                                self.watering.skipped
                            ));
                        }
                    }
                    Err(e) => self.set_status(format!("Failed to load watering schedule: {}", e)),
                }
            }
            WorkerEvent::Pruning { seq, result } => {
                self.pruning.loading = false;
                if !self.gate.admit(seq) {
                    return;
                }
                match result {
                    Ok(fetch) => {
                        self.pruning.entries = fetch.entries;
                        self.pruning.skipped = fetch.skipped;
                        self.rebuild_pruning_grid();
                        if self.pruning.skipped > 0 {
                            self.set_status(format!(
                                "Pruning schedule loaded ({} malformed records skipped)",
                                self.pruning.skipped
                            ));
                        }
                    }
                    Err(e) => self.set_status(format!("Failed to load pruning schedule: {}", e)),
                }
            }
            WorkerEvent::SearchResults { seq: _, result } => {
                // Single worker thread serves requests in order, so the last
                // response always belongs to the last submitted query
                self.search.searching = false;
                match result {
                    Ok(results) => {
                        self.search.results = results;
                        self.search.selected_index = 0;
                        self.search.list_state.select(if self.search.results.is_empty() {
                            None
                        } else {
                            Some(0)
                        });
                    }
                    Err(e) => self.set_status(format!("Search failed: {}", e)),
                }
            }
            WorkerEvent::Suggestions {
                seq: _,
                section_id,
                result,
            } => {
                if let Ok(suggestions) = result {
                    self.garden.suggestions = suggestions;
                    self.garden.suggestions_for = Some(section_id);
                }
                // Suggestion failures stay silent; the panel is decorative
            }
            WorkerEvent::PlantAdded { result } => match result {
                Ok(plant) => {
                    let name = plant.common_name.clone();
                    self.merge_added_plant(plant);
                    self.set_status(format!("Added '{}' to your garden", name));
                    self.request_watering();
                    self.request_pruning();
                }
                Err(e) => self.set_status(format!("Failed to add plant: {}", e)),
            },
            WorkerEvent::MutationDone {
                description,
                result,
            } => match result {
                Ok(()) => {
                    self.set_status(capitalize(&description));
                    // Authoritative reconcile: the refresh is tagged after the
                    // mutation, so it passes the gate and overwrites the
                    // optimistic state with server truth
                    self.refresh_all();
                }
                Err(e) => {
                    self.set_status(format!("Failed: {} ({})", description, e));
                    // The optimistic update may be wrong now; refetch to reconcile
                    self.refresh_all();
                }
            },
        }
    }

    // ─── grid projection ───────────────────────────────────────────

    pub fn rebuild_grids(&mut self) {
        self.rebuild_watering_grid();
        self.rebuild_pruning_grid();
    }

    pub fn watering_window_start(&self) -> NaiveDate {
        utils::today() + ChronoDuration::days(7 * self.watering.week_offset)
    }

    pub fn rebuild_watering_grid(&mut self) {
        let start = self.watering_window_start();
        let result = match self.watering.grouping {
            Grouping::Section => {
                let catalog: Vec<String> = self
                    .sections
                    .sections
                    .iter()
                    .map(|s| s.section_id.clone())
                    .collect();
                let catalog_ref = if catalog.is_empty() {
                    None
                } else {
                    Some(catalog.as_slice())
                };
                schedule::project(
                    Window::days(start, 7),
                    &self.watering.entries,
                    |e| e.section_label(),
                    catalog_ref,
                )
            }
            Grouping::Type => {
                let types = self.plant_type_index();
                schedule::project(
                    Window::days(start, 7),
                    &self.watering.entries,
                    |e| type_label(&types, e),
                    None,
                )
            }
        };

        match result {
            Ok(grid) => {
                self.watering.selected_row = self
                    .watering
                    .selected_row
                    .min(grid.rows().len().saturating_sub(1));
                self.watering.selected_col = self
                    .watering
                    .selected_col
                    .min(grid.columns().len().saturating_sub(1));
                self.watering.grid = Some(grid);
            }
            Err(e) => self.set_status(format!("Projection failed: {}", e)),
        }
    }

    pub fn rebuild_pruning_grid(&mut self) {
        let Some(start) = NaiveDate::from_ymd_opt(self.pruning.year, 1, 1) else {
            return;
        };
        let entries: Vec<ScheduleEntry> = match &self.pruning.section_filter {
            Some(section_id) => self
                .pruning
                .entries
                .iter()
                .filter(|e| e.section.as_deref() == Some(section_id.as_str()))
                .cloned()
                .collect(),
            None => self.pruning.entries.clone(),
        };
        let types = self.plant_type_index();

        match schedule::project(Window::months(start, 12), &entries, |e| type_label(&types, e), None)
        {
            Ok(grid) => {
                self.pruning.selected_row = self
                    .pruning
                    .selected_row
                    .min(grid.rows().len().saturating_sub(1));
                self.pruning.selected_col = self
                    .pruning
                    .selected_col
                    .min(grid.columns().len().saturating_sub(1));
                self.pruning.grid = Some(grid);
            }
            Err(e) => self.set_status(format!("Projection failed: {}", e)),
        }
    }

    fn plant_type_index(&self) -> HashMap<i64, String> {
        self.garden
            .plants
            .iter()
            .map(|p| (p.id, p.type_label()))
            .collect()
    }

    // ─── schedule actions ──────────────────────────────────────────

    pub fn toggle_week(&mut self) {
        self.watering.week_offset ^= 1;
        self.rebuild_watering_grid();
    }

    pub fn toggle_grouping(&mut self) {
        self.watering.grouping = match self.watering.grouping {
            Grouping::Section => Grouping::Type,
            Grouping::Type => Grouping::Section,
        };
        self.rebuild_watering_grid();
    }

    /// Cycle the pruning section filter: all → each section → all
    pub fn cycle_pruning_filter(&mut self) {
        let ids: Vec<String> = self
            .sections
            .sections
            .iter()
            .map(|s| s.section_id.clone())
            .collect();
        self.pruning.section_filter = match &self.pruning.section_filter {
            None => ids.first().cloned(),
            Some(current) => {
                let pos = ids.iter().position(|id| id == current);
                match pos {
                    Some(i) if i + 1 < ids.len() => Some(ids[i + 1].clone()),
                    _ => None,
                }
            }
        };
        self.rebuild_pruning_grid();
    }

    fn grid_for(&self, kind: ScheduleKind) -> Option<&Grid> {
        match kind {
            ScheduleKind::Watering => self.watering.grid.as_ref(),
            ScheduleKind::Pruning => self.pruning.grid.as_ref(),
        }
    }

    fn selection_for(&mut self, kind: ScheduleKind) -> (&mut usize, &mut usize) {
        match kind {
            ScheduleKind::Watering => (
                &mut self.watering.selected_row,
                &mut self.watering.selected_col,
            ),
            ScheduleKind::Pruning => (
                &mut self.pruning.selected_row,
                &mut self.pruning.selected_col,
            ),
        }
    }

    pub fn move_grid_selection(&mut self, kind: ScheduleKind, d_row: i64, d_col: i64) {
        let (rows, cols) = match self.grid_for(kind) {
            Some(grid) => (grid.rows().len(), grid.columns().len()),
            None => return,
        };
        if rows == 0 || cols == 0 {
            return;
        }
        let (row, col) = self.selection_for(kind);
        *row = ((*row as i64 + d_row).rem_euclid(rows as i64)) as usize;
        *col = ((*col as i64 + d_col).rem_euclid(cols as i64)) as usize;
    }

    /// Open the cell-detail popover for the selected cell (no-op on empty cells)
    pub fn open_cell_detail(&mut self, kind: ScheduleKind) {
        let (row, col) = match kind {
            ScheduleKind::Watering => (self.watering.selected_row, self.watering.selected_col),
            ScheduleKind::Pruning => (self.pruning.selected_row, self.pruning.selected_col),
        };
        let count = self
            .grid_for(kind)
            .map(|g| g.count_at(row, col))
            .unwrap_or(0);
        if count == 0 {
            return;
        }
        self.cell_detail = Some(CellDetailState {
            kind,
            row,
            col,
            selected_index: 0,
        });
        self.ui.mode = Mode::CellDetail;
    }

    /// Mark every still-pending plant in the selected watering cell as watered
    /// (optimistic, reconciled by the post-mutation refresh)
    pub fn mark_cell_watered(&mut self) {
        let (row, col) = (self.watering.selected_row, self.watering.selected_col);
        let pending: Vec<(i64, NaiveDate)> = match &self.watering.grid {
            Some(grid) => grid
                .cell_detail(row, col)
                .into_iter()
                .filter(|e| !e.completed)
                .map(|e| (e.plant_id, e.scheduled_date))
                .collect(),
            None => return,
        };
        if pending.is_empty() {
            self.set_status("Nothing left to water in this cell");
            return;
        }

        let count = pending.len();
        for (plant_id, date) in pending {
            self.watering.entries =
                apply_optimistic_update(&self.watering.entries, plant_id, date, true);
            self.gate.note_mutation();
            self.worker.send(WorkerRequest::MarkWatered {
                plant_id,
                date,
                completed: true,
            });
        }
        self.rebuild_watering_grid();
        self.set_status(format!("Marked {} plant(s) watered", count));
    }

    /// Toggle the watered state of the entry selected in the cell-detail popover
    pub fn toggle_detail_entry_watered(&mut self) {
        let Some(detail) = self.cell_detail.clone() else {
            return;
        };
        if detail.kind != ScheduleKind::Watering {
            return;
        }
        let target = self
            .watering
            .grid
            .as_ref()
            .and_then(|g| {
                g.cell_detail(detail.row, detail.col)
                    .get(detail.selected_index)
                    .map(|e| (e.plant_id, e.scheduled_date, e.completed))
            });
        let Some((plant_id, date, completed)) = target else {
            return;
        };

        self.watering.entries =
            apply_optimistic_update(&self.watering.entries, plant_id, date, !completed);
        self.gate.note_mutation();
        self.worker.send(WorkerRequest::MarkWatered {
            plant_id,
            date,
            completed: !completed,
        });
        self.rebuild_watering_grid();
    }

    // ─── garden list ───────────────────────────────────────────────

    /// The section-grouped display rows: each section (in catalog order) with
    /// its plants, then unassigned plants
    pub fn garden_rows(&self) -> Vec<GardenRow> {
        let mut rows = Vec::new();

        for section in &self.sections.sections {
            rows.push(GardenRow::SectionHeading(section.display_name()));
            for (idx, plant) in self.garden.plants.iter().enumerate() {
                if plant.section.as_deref() == Some(section.section_id.as_str()) {
                    rows.push(GardenRow::Plant(idx));
                }
            }
        }

        let unassigned: Vec<usize> = self
            .garden
            .plants
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                p.section.is_none()
                    || !self
                        .sections
                        .sections
                        .iter()
                        .any(|s| Some(s.section_id.as_str()) == p.section.as_deref())
            })
            .map(|(i, _)| i)
            .collect();
        if !unassigned.is_empty() {
            rows.push(GardenRow::SectionHeading("Unassigned".to_string()));
            for idx in unassigned {
                rows.push(GardenRow::Plant(idx));
            }
        }

        rows
    }

    pub fn selected_plant(&self) -> Option<&Plant> {
        let rows = self.garden_rows();
        match rows.get(self.garden.selected_index) {
            Some(GardenRow::Plant(idx)) => self.garden.plants.get(*idx),
            _ => None,
        }
    }

    /// Move the garden selection, skipping heading rows
    pub fn move_garden_selection(&mut self, delta: i64) {
        let rows = self.garden_rows();
        if rows.is_empty() {
            return;
        }
        let mut index = self.garden.selected_index as i64;
        loop {
            index += delta;
            if index < 0 || index >= rows.len() as i64 {
                return; // stay where we were at the edges
            }
            if matches!(rows[index as usize], GardenRow::Plant(_)) {
                self.garden.selected_index = index as usize;
                self.garden.list_state.select(Some(index as usize));
                self.sync_suggestions();
                return;
            }
        }
    }

    fn clamp_garden_selection(&mut self) {
        let rows = self.garden_rows();
        // Land on the first plant row if the current selection is gone
        let valid = matches!(rows.get(self.garden.selected_index), Some(GardenRow::Plant(_)));
        if !valid {
            self.garden.selected_index = rows
                .iter()
                .position(|r| matches!(r, GardenRow::Plant(_)))
                .unwrap_or(0);
        }
        self.garden
            .list_state
            .select(if rows.is_empty() { None } else { Some(self.garden.selected_index) });
        self.sync_suggestions();
    }

    /// Fetch suggestions for the selected plant's section when they are not
    /// already loaded for it
    fn sync_suggestions(&mut self) {
        let section = self.selected_plant().and_then(|p| p.section.clone());
        let Some(section_id) = section else {
            return;
        };
        if self.garden.suggestions_for.as_deref() == Some(section_id.as_str()) {
            return;
        }
        let seq = self.gate.begin_fetch();
        self.worker.send(WorkerRequest::FetchSuggestions {
            seq,
            section_id,
        });
    }

    /// Merge a freshly added plant, preserving its section when the plant was
    /// already present (re-adding refreshes catalog data but keeps placement)
    fn merge_added_plant(&mut self, plant: Plant) {
        match self.garden.plants.iter_mut().find(|p| p.id == plant.id) {
            Some(existing) => {
                let section = existing.section.clone();
                *existing = plant;
                existing.section = section;
            }
            None => self.garden.plants.push(plant),
        }
        // Reflect membership in current search results too
        let plants = &self.garden.plants;
        for result in &mut self.search.results {
            if plants.iter().any(|p| p.id == result.id) {
                result.in_user_garden = true;
            }
        }
        self.clamp_garden_selection();
    }

    // ─── garden actions ────────────────────────────────────────────

    pub fn begin_remove_selected_plant(&mut self) {
        if let Some(plant) = self.selected_plant().cloned() {
            self.modals.confirm = Some(PendingRemoval::Plant(plant));
            self.modals.confirm_selection = 0;
            self.ui.mode = Mode::ConfirmRemove;
        }
    }

    pub fn confirm_removal(&mut self) {
        match self.modals.confirm.take() {
            Some(PendingRemoval::Plant(plant)) => {
                // Optimistic: drop locally, then tell the backend
                self.garden.plants.retain(|p| p.id != plant.id);
                self.watering.entries.retain(|e| e.plant_id != plant.id);
                self.pruning.entries.retain(|e| e.plant_id != plant.id);
                self.gate.note_mutation();
                self.worker.send(WorkerRequest::RemovePlant { plant_id: plant.id });
                self.clamp_garden_selection();
                self.rebuild_grids();
            }
            Some(PendingRemoval::Section(section)) => {
                let assigned: Vec<i64> = self
                    .garden
                    .plants
                    .iter()
                    .filter(|p| p.section.as_deref() == Some(section.section_id.as_str()))
                    .map(|p| p.id)
                    .collect();
                // Optimistic: unassign locally and drop the section
                for plant in &mut self.garden.plants {
                    if plant.section.as_deref() == Some(section.section_id.as_str()) {
                        plant.section = None;
                    }
                }
                self.sections.sections.retain(|s| s.id != section.id);
                if self.pruning.section_filter.as_deref() == Some(section.section_id.as_str()) {
                    self.pruning.section_filter = None;
                }
                self.gate.note_mutation();
                self.worker.send(WorkerRequest::DeleteSection {
                    id: section.id,
                    assigned,
                });
                self.rebuild_grids();
            }
            None => {}
        }
        self.ui.mode = Mode::View;
    }

    pub fn begin_move_to_section(&mut self) {
        if self.selected_plant().is_some() {
            self.modals.move_target_index = 0;
            self.ui.mode = Mode::MoveToSection;
        }
    }

    /// Apply the move-to-section choice: 0 = unassign, 1.. = section
    pub fn confirm_move_to_section(&mut self) {
        let target = if self.modals.move_target_index == 0 {
            None
        } else {
            self.sections
                .sections
                .get(self.modals.move_target_index - 1)
                .map(|s| s.section_id.clone())
        };
        let Some(plant_id) = self.selected_plant().map(|p| p.id) else {
            self.ui.mode = Mode::View;
            return;
        };

        // Optimistic local move, then the request
        if let Some(plant) = self.garden.plants.iter_mut().find(|p| p.id == plant_id) {
            plant.section = target.clone();
        }
        self.gate.note_mutation();
        self.worker.send(WorkerRequest::AssignSection {
            plant_id,
            section: target,
        });
        self.rebuild_grids();
        self.clamp_garden_selection();
        self.ui.mode = Mode::View;
    }

    // ─── search ────────────────────────────────────────────────────

    pub fn submit_search(&mut self) {
        let query = self.search.input.as_str().trim().to_string();
        if query.is_empty() {
            return;
        }
        let seq = self.gate.begin_fetch();
        self.search.searching = true;
        self.worker.send(WorkerRequest::Search { seq, query });
    }

    pub fn move_search_selection(&mut self, delta: i64) {
        if self.search.results.is_empty() {
            return;
        }
        let len = self.search.results.len() as i64;
        let index = (self.search.selected_index as i64 + delta).clamp(0, len - 1);
        self.search.selected_index = index as usize;
        self.search.list_state.select(Some(index as usize));
    }

    pub fn add_selected_search_result(&mut self) {
        let Some(result) = self.search.results.get(self.search.selected_index) else {
            return;
        };
        if result.in_user_garden {
            self.set_status(format!("'{}' is already in your garden", result.common_name));
            return;
        }
        self.gate.note_mutation();
        self.worker.send(WorkerRequest::AddPlant { plant_id: result.id });
        self.set_status(format!("Adding '{}'...", result.common_name));
    }

    // ─── section modal ─────────────────────────────────────────────

    pub fn open_section_modal(&mut self) {
        self.sections.modal_state = Some(SectionModalState::new());
        self.ui.mode = Mode::SectionModal;
    }

    pub fn close_section_modal(&mut self) {
        self.sections.modal_state = None;
        self.ui.mode = Mode::View;
    }

    /// Next free single-letter section identifier ("A", "B", ...)
    pub fn next_section_id(&self) -> String {
        let max = self
            .sections
            .sections
            .iter()
            .filter_map(|s| s.section_id.chars().next())
            .filter(char::is_ascii_uppercase)
            .max();
        match max {
            Some(c) if c < 'Z' => ((c as u8 + 1) as char).to_string(),
            None => "A".to_string(),
            _ => "Z".to_string(),
        }
    }

    pub fn submit_section_modal(&mut self) {
        let (mode, selected, name) = match self.sections.modal_state.as_ref() {
            Some(state) => (
                state.mode,
                state.selected_index,
                state.name_input.as_str().trim().to_string(),
            ),
            None => return,
        };
        if name.is_empty() {
            return;
        }

        match mode {
            SectionModalMode::Add => {
                let section_id = self.next_section_id();
                self.gate.note_mutation();
                self.worker.send(WorkerRequest::CreateSection {
                    section_id,
                    name,
                    glyph: None,
                });
            }
            SectionModalMode::Rename => {
                if let Some(section) = self.sections.sections.get(selected) {
                    let id = section.id;
                    let glyph = section.glyph.clone();
                    self.gate.note_mutation();
                    self.worker.send(WorkerRequest::RenameSection { id, name, glyph });
                }
            }
            SectionModalMode::View => {}
        }

        if let Some(state) = self.sections.modal_state.as_mut() {
            state.mode = SectionModalMode::View;
            state.name_input.clear();
        }
    }

    pub fn begin_delete_section_from_modal(&mut self) {
        let selected = self
            .sections
            .modal_state
            .as_ref()
            .map(|s| s.selected_index)
            .unwrap_or(0);
        if let Some(section) = self.sections.sections.get(selected).cloned() {
            self.sections.modal_state = None;
            self.modals.confirm = Some(PendingRemoval::Section(section));
            self.modals.confirm_selection = 0;
            self.ui.mode = Mode::ConfirmRemove;
        }
    }

    // ─── status bar ────────────────────────────────────────────────

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status.message = Some(message.into());
        self.status.message_time = Some(Instant::now());
    }

    pub fn check_status_message_timeout(&mut self) {
        if let Some(time) = self.status.message_time {
            if time.elapsed() >= STATUS_MESSAGE_TIMEOUT {
                self.status.message = None;
                self.status.message_time = None;
            }
        }
    }

    // ─── tabs ──────────────────────────────────────────────────────

    pub fn switch_tab(&mut self, tab: Tab) {
        self.ui.current_tab = tab;
        self.ui.mode = Mode::View;
    }

    pub fn next_tab(&mut self) {
        let next = match self.ui.current_tab {
            Tab::Garden => Tab::Search,
            Tab::Search => Tab::Watering,
            Tab::Watering => Tab::Pruning,
            Tab::Pruning => Tab::Garden,
        };
        self.switch_tab(next);
    }

    pub fn prev_tab(&mut self) {
        let prev = match self.ui.current_tab {
            Tab::Garden => Tab::Pruning,
            Tab::Search => Tab::Garden,
            Tab::Watering => Tab::Search,
            Tab::Pruning => Tab::Watering,
        };
        self.switch_tab(prev);
    }
}

fn type_label(types: &HashMap<i64, String>, entry: &ScheduleEntry) -> String {
    types
        .get(&entry.plant_id)
        .cloned()
        .unwrap_or_else(|| "Other".to_string())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
