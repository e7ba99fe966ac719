use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{
    Block, Borders, List, ListItem, ListState, Scrollbar, ScrollbarOrientation, ScrollbarState,
    StatefulWidget,
};
use ratatui::Frame;

use crate::models::Plant;
use crate::tui::app::GardenRow;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::Config;

/// Render the section-grouped garden list in the sidebar. Heading rows carry
/// the section name; plant rows are indented beneath them.
pub fn render_plant_list(
    f: &mut Frame,
    area: Rect,
    rows: &[GardenRow],
    plants: &[Plant],
    list_state: &mut ListState,
    loading: bool,
    config: &Config,
) {
    // Account for borders and padding when truncating
    let max_width = area.width.saturating_sub(4) as usize;

    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let heading_color = parse_color(&active_theme.tab_bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = if active_theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&active_theme.highlight_fg)
    };

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| match row {
            GardenRow::SectionHeading(name) => {
                let mut text = format!("[{}]", name);
                if text.chars().count() > max_width {
                    text = text.chars().take(max_width.saturating_sub(3)).collect::<String>() + "...";
                }
                ListItem::new(text).style(Style::default().fg(heading_color))
            }
            GardenRow::Plant(idx) => {
                let plant = &plants[*idx];
                let type_str = plant
                    .plant_type
                    .as_deref()
                    .map(|t| format!(" ({})", t))
                    .unwrap_or_default();
                let mut text = format!("  {}{}", plant.common_name, type_str);
                if text.chars().count() > max_width {
                    text = text.chars().take(max_width.saturating_sub(3)).collect::<String>() + "...";
                }
                ListItem::new(text)
            }
        })
        .collect();

    // Split area to reserve space for the scrollbar
    let list_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let list_area = list_areas[0];
    let scrollbar_area = list_areas[1];

    let plant_count = rows
        .iter()
        .filter(|r| matches!(r, GardenRow::Plant(_)))
        .count();
    let title = if loading {
        "Garden (loading...)".to_string()
    } else {
        format!("Garden ({} plants)", plant_count)
    };

    let list = List::new(items.clone())
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(fg_color))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));

    StatefulWidget::render(list, list_area, f.buffer_mut(), list_state);

    // Scrollbar when the list overflows
    let total_items = items.len();
    let visible_items = list_area.height.saturating_sub(2) as usize;

    if total_items > visible_items && scrollbar_area.width > 0 && list_area.height > 2 {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            list_area.y + 1,
            scrollbar_area.width,
            list_area.height.saturating_sub(2),
        );

        if scrollbar_inner_area.width > 0 && scrollbar_inner_area.height > 0 {
            let selected_index = list_state.selected().unwrap_or(0);
            let scroll_position = if selected_index < visible_items {
                0
            } else {
                selected_index.saturating_sub(visible_items - 1)
            };

            let mut scrollbar_state = ScrollbarState::new(total_items)
                .viewport_content_length(visible_items)
                .position(scroll_position);

            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
        }
    }
}
