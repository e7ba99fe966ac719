use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, size as terminal_size, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::time::Duration;

use crate::models::ScheduleKind;
use crate::tui::app::{App, Mode, SectionModalField, SectionModalMode, SidebarState, Tab};
use crate::tui::error::TuiError;
use crate::utils::{has_primary_modifier, parse_key_binding};

/// Guard that ensures terminal state is restored even on panic
/// This is critical for TUI applications - if the terminal is left in raw mode
/// or alternate screen, the user's terminal will be unusable.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Manually restore terminal state (called on normal exit)
    /// After calling this, the guard will do nothing on drop
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Ignore errors in drop - we're already in a cleanup path
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check terminal size before entering alternate screen so the error shows
    // in the normal terminal
    let (width, height) = terminal_size().map_err(TuiError::IoError)?;

    use crate::tui::layout::Layout;
    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;

    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        // Auto-clear stale status messages and run the periodic refresh timer
        app.check_status_message_timeout();
        app.maybe_refresh();

        // Drain background fetch/mutation results before drawing
        while let Some(event) = app.worker.try_recv() {
            app.handle_worker_event(event);
        }

        let terminal_size = terminal.size()?;
        let terminal_rect = ratatui::layout::Rect::new(0, 0, terminal_size.width, terminal_size.height);
        terminal.draw(|f| {
            let sidebar_collapsed = !app.ui.current_tab.has_sidebar()
                || app.ui.sidebar_state == SidebarState::Collapsed;
            let layout = Layout::calculate(
                terminal_rect,
                app.config.sidebar_width_percent,
                sidebar_collapsed,
            );
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Only process Press events to avoid duplicate processing on Windows
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key_event) => {
                    if key_event.kind == KeyEventKind::Press {
                        if handle_key_event(&mut app, key_event)? {
                            break; // Quit requested
                        }
                    }
                }
                Event::Resize(_width, _height) => {
                    // Layout recalculates from terminal.size() on the next draw
                }
                _ => {}
            }
        }
    }

    guard.restore()?;

    Ok(())
}

/// Does this key event match a configured binding string?
fn binding_matches(binding: &str, key: KeyEvent) -> bool {
    match parse_key_binding(binding) {
        Ok(parsed) => {
            parsed.key_code == key.code && parsed.requires_ctrl == has_primary_modifier(key.modifiers)
        }
        Err(_) => false,
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) -> Result<bool, TuiError> {
    match app.ui.mode {
        Mode::Help => {
            handle_help_mode(app, key);
            Ok(false)
        }
        Mode::SearchInput => {
            handle_search_input_mode(app, key);
            Ok(false)
        }
        Mode::ConfirmRemove => {
            handle_confirm_remove_mode(app, key);
            Ok(false)
        }
        Mode::SectionModal => {
            handle_section_modal_mode(app, key);
            Ok(false)
        }
        Mode::MoveToSection => {
            handle_move_to_section_mode(app, key);
            Ok(false)
        }
        Mode::CellDetail => {
            handle_cell_detail_mode(app, key);
            Ok(false)
        }
        Mode::View => handle_view_mode(app, key),
    }
}

fn handle_help_mode(app: &mut App, key: KeyEvent) {
    let bindings = app.config.key_bindings.clone();
    if key.code == KeyCode::Esc || binding_matches(&bindings.help, key) {
        app.ui.mode = Mode::View;
    }
}

fn handle_search_input_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.ui.mode = Mode::View;
        }
        KeyCode::Enter => {
            app.submit_search();
            app.ui.mode = Mode::View;
        }
        _ => {
            app.search.input.handle_key(key);
        }
    }
}

fn handle_confirm_remove_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Down => {
            // Two options: confirm (0) and cancel (1)
            app.modals.confirm_selection = 1 - app.modals.confirm_selection;
        }
        KeyCode::Enter => {
            if app.modals.confirm_selection == 0 {
                app.confirm_removal();
            } else {
                app.modals.confirm = None;
                app.ui.mode = Mode::View;
            }
        }
        KeyCode::Esc => {
            app.modals.confirm = None;
            app.ui.mode = Mode::View;
        }
        _ => {}
    }
}

fn handle_move_to_section_mode(app: &mut App, key: KeyEvent) {
    let bindings = app.config.key_bindings.clone();
    let option_count = app.sections.sections.len() + 1; // [Unassigned] + sections
    match key.code {
        KeyCode::Esc => {
            app.ui.mode = Mode::View;
        }
        KeyCode::Enter => {
            app.confirm_move_to_section();
        }
        KeyCode::Up => {
            app.modals.move_target_index =
                (app.modals.move_target_index + option_count - 1) % option_count;
        }
        KeyCode::Down => {
            app.modals.move_target_index = (app.modals.move_target_index + 1) % option_count;
        }
        _ => {
            if binding_matches(&bindings.list_up, key) {
                app.modals.move_target_index =
                    (app.modals.move_target_index + option_count - 1) % option_count;
            } else if binding_matches(&bindings.list_down, key) {
                app.modals.move_target_index = (app.modals.move_target_index + 1) % option_count;
            }
        }
    }
}

fn handle_cell_detail_mode(app: &mut App, key: KeyEvent) {
    let bindings = app.config.key_bindings.clone();

    let entry_count = app
        .cell_detail
        .as_ref()
        .and_then(|d| match d.kind {
            ScheduleKind::Watering => app.watering.grid.as_ref().map(|g| (d, g)),
            ScheduleKind::Pruning => app.pruning.grid.as_ref().map(|g| (d, g)),
        })
        .map(|(d, g)| g.cell_detail(d.row, d.col).len())
        .unwrap_or(0);

    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            app.cell_detail = None;
            app.ui.mode = Mode::View;
            return;
        }
        KeyCode::Up => move_detail_selection(app, -1, entry_count),
        KeyCode::Down => move_detail_selection(app, 1, entry_count),
        _ => {
            if binding_matches(&bindings.list_up, key) {
                move_detail_selection(app, -1, entry_count);
            } else if binding_matches(&bindings.list_down, key) {
                move_detail_selection(app, 1, entry_count);
            } else if binding_matches(&bindings.mark_complete, key) {
                app.toggle_detail_entry_watered();
            }
        }
    }
}

fn move_detail_selection(app: &mut App, delta: i64, entry_count: usize) {
    if entry_count == 0 {
        return;
    }
    if let Some(detail) = app.cell_detail.as_mut() {
        let index = (detail.selected_index as i64 + delta)
            .rem_euclid(entry_count as i64) as usize;
        detail.selected_index = index;
    }
}

fn handle_section_modal_mode(app: &mut App, key: KeyEvent) {
    let bindings = app.config.key_bindings.clone();

    // Name entry for Add/Rename takes priority over navigation
    let editing = app
        .sections
        .modal_state
        .as_ref()
        .map(|s| matches!(s.mode, SectionModalMode::Add | SectionModalMode::Rename))
        .unwrap_or(false);

    if editing {
        match key.code {
            KeyCode::Esc => {
                if let Some(state) = app.sections.modal_state.as_mut() {
                    state.mode = SectionModalMode::View;
                    state.name_input.clear();
                }
            }
            KeyCode::Enter => app.submit_section_modal(),
            _ => {
                if let Some(state) = app.sections.modal_state.as_mut() {
                    state.name_input.handle_key(key);
                }
            }
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.close_section_modal(),
        KeyCode::Tab | KeyCode::Left | KeyCode::Right => {
            if let Some(state) = app.sections.modal_state.as_mut() {
                state.current_field = match state.current_field {
                    SectionModalField::SectionList => SectionModalField::ActionsList,
                    SectionModalField::ActionsList => SectionModalField::SectionList,
                };
            }
        }
        KeyCode::Up => move_section_modal_selection(app, -1),
        KeyCode::Down => move_section_modal_selection(app, 1),
        KeyCode::Enter => run_section_modal_action(app),
        _ => {
            if binding_matches(&bindings.list_up, key) {
                move_section_modal_selection(app, -1);
            } else if binding_matches(&bindings.list_down, key) {
                move_section_modal_selection(app, 1);
            }
        }
    }
}

fn move_section_modal_selection(app: &mut App, delta: i64) {
    let section_count = app.sections.sections.len();
    if let Some(state) = app.sections.modal_state.as_mut() {
        match state.current_field {
            SectionModalField::SectionList => {
                if section_count == 0 {
                    return;
                }
                let index = (state.selected_index as i64 + delta)
                    .rem_euclid(section_count as i64) as usize;
                state.selected_index = index;
                state.list_state.select(Some(index));
            }
            SectionModalField::ActionsList => {
                // Three actions: Add, Rename, Delete
                let index =
                    (state.actions_selected_index as i64 + delta).rem_euclid(3) as usize;
                state.actions_selected_index = index;
            }
        }
    }
}

fn run_section_modal_action(app: &mut App) {
    let (field, action, selected) = match app.sections.modal_state.as_ref() {
        Some(state) => (
            state.current_field,
            state.actions_selected_index,
            state.selected_index,
        ),
        None => return,
    };

    if field != SectionModalField::ActionsList {
        return;
    }

    match action {
        // Add
        0 => {
            if let Some(state) = app.sections.modal_state.as_mut() {
                state.mode = SectionModalMode::Add;
                state.name_input.clear();
            }
        }
        // Rename (prefill with the current name)
        1 => {
            let current_name = app
                .sections
                .sections
                .get(selected)
                .map(|s| s.name.clone())
                .unwrap_or_default();
            if let Some(state) = app.sections.modal_state.as_mut() {
                state.mode = SectionModalMode::Rename;
                state.name_input = crate::tui::widgets::input::InputField::with_value(&current_name);
            }
        }
        // Delete
        2 => app.begin_delete_section_from_modal(),
        _ => {}
    }
}

fn handle_view_mode(app: &mut App, key: KeyEvent) -> Result<bool, TuiError> {
    let bindings = app.config.key_bindings.clone();

    // Global keys first
    if binding_matches(&bindings.quit, key) {
        return Ok(true);
    }
    if binding_matches(&bindings.help, key) {
        app.ui.mode = Mode::Help;
        return Ok(false);
    }
    if binding_matches(&bindings.tab_left, key) {
        app.prev_tab();
        return Ok(false);
    }
    if binding_matches(&bindings.tab_right, key) {
        app.next_tab();
        return Ok(false);
    }
    if binding_matches(&bindings.tab_1, key) {
        app.switch_tab(Tab::Garden);
        return Ok(false);
    }
    if binding_matches(&bindings.tab_2, key) {
        app.switch_tab(Tab::Search);
        return Ok(false);
    }
    if binding_matches(&bindings.tab_3, key) {
        app.switch_tab(Tab::Watering);
        return Ok(false);
    }
    if binding_matches(&bindings.tab_4, key) {
        app.switch_tab(Tab::Pruning);
        return Ok(false);
    }
    if binding_matches(&bindings.refresh, key) {
        app.refresh_all();
        app.set_status("Refreshing from backend...");
        return Ok(false);
    }
    if binding_matches(&bindings.search, key) {
        app.switch_tab(Tab::Search);
        app.ui.mode = Mode::SearchInput;
        return Ok(false);
    }
    if binding_matches(&bindings.section_modal, key) {
        app.open_section_modal();
        return Ok(false);
    }

    // Tab-specific keys
    match app.ui.current_tab {
        Tab::Garden => handle_garden_keys(app, key, &bindings),
        Tab::Search => handle_search_keys(app, key, &bindings),
        Tab::Watering => handle_watering_keys(app, key, &bindings),
        Tab::Pruning => handle_pruning_keys(app, key, &bindings),
    }

    Ok(false)
}

fn handle_garden_keys(app: &mut App, key: KeyEvent, bindings: &crate::config::KeyBindings) {
    if binding_matches(&bindings.toggle_sidebar, key) {
        app.ui.sidebar_state = match app.ui.sidebar_state {
            SidebarState::Expanded => SidebarState::Collapsed,
            SidebarState::Collapsed => SidebarState::Expanded,
        };
    } else if binding_matches(&bindings.list_up, key) || key.code == KeyCode::Up {
        app.move_garden_selection(-1);
    } else if binding_matches(&bindings.list_down, key) || key.code == KeyCode::Down {
        app.move_garden_selection(1);
    } else if binding_matches(&bindings.delete, key) {
        app.begin_remove_selected_plant();
    } else if binding_matches(&bindings.move_to_section, key) {
        app.begin_move_to_section();
    }
}

fn handle_search_keys(app: &mut App, key: KeyEvent, bindings: &crate::config::KeyBindings) {
    if binding_matches(&bindings.select, key) {
        app.ui.mode = Mode::SearchInput;
    } else if binding_matches(&bindings.list_up, key) || key.code == KeyCode::Up {
        app.move_search_selection(-1);
    } else if binding_matches(&bindings.list_down, key) || key.code == KeyCode::Down {
        app.move_search_selection(1);
    } else if binding_matches(&bindings.add, key) {
        app.add_selected_search_result();
    }
}

fn handle_watering_keys(app: &mut App, key: KeyEvent, bindings: &crate::config::KeyBindings) {
    if binding_matches(&bindings.list_up, key) || key.code == KeyCode::Up {
        app.move_grid_selection(ScheduleKind::Watering, -1, 0);
    } else if binding_matches(&bindings.list_down, key) || key.code == KeyCode::Down {
        app.move_grid_selection(ScheduleKind::Watering, 1, 0);
    } else if key.code == KeyCode::Char('h') {
        app.move_grid_selection(ScheduleKind::Watering, 0, -1);
    } else if key.code == KeyCode::Char('l') {
        app.move_grid_selection(ScheduleKind::Watering, 0, 1);
    } else if binding_matches(&bindings.select, key) {
        app.open_cell_detail(ScheduleKind::Watering);
    } else if binding_matches(&bindings.mark_complete, key) {
        app.mark_cell_watered();
    } else if binding_matches(&bindings.next_week, key) {
        app.toggle_week();
    } else if binding_matches(&bindings.toggle_grouping, key) {
        app.toggle_grouping();
    }
}

fn handle_pruning_keys(app: &mut App, key: KeyEvent, bindings: &crate::config::KeyBindings) {
    if binding_matches(&bindings.list_up, key) || key.code == KeyCode::Up {
        app.move_grid_selection(ScheduleKind::Pruning, -1, 0);
    } else if binding_matches(&bindings.list_down, key) || key.code == KeyCode::Down {
        app.move_grid_selection(ScheduleKind::Pruning, 1, 0);
    } else if key.code == KeyCode::Char('h') {
        app.move_grid_selection(ScheduleKind::Pruning, 0, -1);
    } else if key.code == KeyCode::Char('l') {
        app.move_grid_selection(ScheduleKind::Pruning, 0, 1);
    } else if binding_matches(&bindings.select, key) {
        app.open_cell_detail(ScheduleKind::Pruning);
    } else if binding_matches(&bindings.filter, key) {
        app.cycle_pruning_filter();
    }
}
