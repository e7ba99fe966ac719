use ratatui::layout::{Constraint, Direction, Layout as RatLayout};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::tui::app::{Grouping, Mode, SidebarState, Tab};
use crate::tui::widgets::{
    cell_detail::render_cell_detail,
    color::parse_color,
    confirm_remove::render_confirm_remove,
    help::render_help,
    move_section::render_move_section,
    plant_list::render_plant_list,
    plant_view::render_plant_view,
    schedule_grid::render_schedule_grid,
    search::render_search,
    section_modal::render_section_modal,
    status_bar::render_status_bar,
    suggestions::render_suggestions,
    tabs::render_tabs,
};
use crate::tui::{App, Layout};
use crate::utils::format_key_binding_for_display as fmt_key;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    // Outer border with the app title centered in the top border
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("SPRIG")
        .title_alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    render_tabs(f, layout.tabs_area, app.ui.current_tab, &app.config);

    // Sidebar: garden plant list, Garden tab only
    if app.ui.current_tab == Tab::Garden
        && app.ui.sidebar_state == SidebarState::Expanded
        && layout.sidebar_area.width > 0
    {
        let rows = app.garden_rows();
        app.garden.list_state.select(Some(app.garden.selected_index));
        render_plant_list(
            f,
            layout.sidebar_area,
            &rows,
            &app.garden.plants,
            &mut app.garden.list_state,
            app.garden.loading,
            &app.config,
        );
    }

    // Main pane per tab
    match app.ui.current_tab {
        Tab::Garden => {
            let chunks = RatLayout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(4), Constraint::Length(6)])
                .split(layout.main_area);

            let plant = app.selected_plant();
            let section = plant.and_then(|p| p.section.clone());
            render_plant_view(f, chunks[0], plant, &app.config);
            render_suggestions(
                f,
                chunks[1],
                &app.garden.suggestions,
                section.as_deref(),
                &app.config,
            );
        }
        Tab::Search => {
            let input_active = app.ui.mode == Mode::SearchInput;
            render_search(
                f,
                layout.main_area,
                &app.search.input,
                input_active,
                &app.search.results,
                &mut app.search.list_state,
                app.search.searching,
                &app.config,
            );
        }
        Tab::Watering => {
            let grouping = match app.watering.grouping {
                Grouping::Section => "section",
                Grouping::Type => "type",
            };
            let week = if app.watering.week_offset == 0 {
                "this week"
            } else {
                "next week"
            };
            let title = format!("Watering — {} (by {})", week, grouping);

            let mut footer = format!("Week of {}", app.watering_window_start().format("%b %d"));
            if let Some(updated) = &app.watering.last_updated {
                footer.push_str(&format!(" · updated {}", updated));
            }
            if app.watering.skipped > 0 {
                footer.push_str(&format!(" · {} records skipped", app.watering.skipped));
            }

            render_schedule_grid(
                f,
                layout.main_area,
                app.watering.grid.as_ref(),
                (app.watering.selected_row, app.watering.selected_col),
                Some(&app.watering.weather),
                &title,
                Some(footer),
                app.watering.loading,
                &app.config,
            );
        }
        Tab::Pruning => {
            let title = format!("Pruning — {}", app.pruning.year);
            let footer = match &app.pruning.section_filter {
                Some(section) => format!("Filtered to section {}", section),
                None => {
                    if app.pruning.skipped > 0 {
                        format!("All sections · {} records skipped", app.pruning.skipped)
                    } else {
                        "All sections".to_string()
                    }
                }
            };

            render_schedule_grid(
                f,
                layout.main_area,
                app.pruning.grid.as_ref(),
                (app.pruning.selected_row, app.pruning.selected_col),
                None,
                &title,
                Some(footer),
                app.pruning.loading,
                &app.config,
            );
        }
    }

    // Overlays (after normal content)
    if app.ui.mode == Mode::Help {
        render_help(f, f.area(), &app.config);
    }
    if app.ui.mode == Mode::SectionModal {
        render_section_modal(f, f.area(), app);
    }
    if app.ui.mode == Mode::MoveToSection {
        render_move_section(f, f.area(), app);
    }
    if app.ui.mode == Mode::CellDetail {
        render_cell_detail(f, f.area(), app);
    }
    if let Some(ref pending) = app.modals.confirm {
        render_confirm_remove(f, f.area(), pending, app.modals.confirm_selection, &app.config);
    }

    // Status bar
    let key_hints = get_key_hints(app);
    render_status_bar(
        f,
        layout.status_area,
        app.status.message.as_ref(),
        &key_hints,
        &app.config,
    );
}

fn get_key_hints(app: &App) -> Vec<String> {
    let keys = &app.config.key_bindings;
    match app.ui.mode {
        Mode::Help => {
            vec![format!("Esc or {}: Exit help", fmt_key(&keys.help))]
        }
        Mode::SearchInput => {
            vec!["Enter: Search".to_string(), "Esc: Done".to_string()]
        }
        Mode::SectionModal => {
            vec![
                "Tab: Switch panel".to_string(),
                "↑/↓: Navigate".to_string(),
                "Enter: Apply".to_string(),
                "Esc: Close".to_string(),
            ]
        }
        Mode::MoveToSection => {
            vec!["↑/↓: Choose section".to_string(), "Enter: Move".to_string(), "Esc: Cancel".to_string()]
        }
        Mode::ConfirmRemove => {
            vec!["↑/↓: Navigate".to_string(), "Enter: Confirm".to_string(), "Esc: Cancel".to_string()]
        }
        Mode::CellDetail => {
            vec![
                format!("{}/{}: Navigate", fmt_key(&keys.list_up), fmt_key(&keys.list_down)),
                format!("{}: Toggle watered", fmt_key(&keys.mark_complete)),
                "Esc: Close".to_string(),
            ]
        }
        Mode::View => {
            let mut hints = vec![format!("{}: Quit", fmt_key(&keys.quit))];
            match app.ui.current_tab {
                Tab::Garden => {
                    hints.push(format!("{}: Move to section", fmt_key(&keys.move_to_section)));
                    hints.push(format!("{}: Remove", fmt_key(&keys.delete)));
                    hints.push(format!("{}: Sections", fmt_key(&keys.section_modal)));
                    hints.push(format!("{}: Search", fmt_key(&keys.search)));
                }
                Tab::Search => {
                    hints.push(format!("{}: Edit query", fmt_key(&keys.search)));
                    hints.push(format!("{}: Add to garden", fmt_key(&keys.add)));
                }
                Tab::Watering => {
                    hints.push(format!("{}: Detail", fmt_key(&keys.select)));
                    hints.push(format!("{}: Water", fmt_key(&keys.mark_complete)));
                    hints.push(format!("{}: Next week", fmt_key(&keys.next_week)));
                    hints.push(format!("{}: Grouping", fmt_key(&keys.toggle_grouping)));
                }
                Tab::Pruning => {
                    hints.push(format!("{}: Detail", fmt_key(&keys.select)));
                    hints.push(format!("{}: Filter section", fmt_key(&keys.filter)));
                }
            }
            hints.push(format!("{}: Refresh", fmt_key(&keys.refresh)));
            hints.push(format!("{}: Help", fmt_key(&keys.help)));
            hints
        }
    }
}
