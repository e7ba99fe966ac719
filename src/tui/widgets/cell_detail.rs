use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::models::ScheduleKind;
use crate::schedule::Granularity;
use crate::tui::App;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

/// Calculate popup area (centered, with specified width and height percentages)
fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// Render the cell-detail popover: the entries behind the selected grid cell,
/// sorted by plant name (the grid guarantees the order)
pub fn render_cell_detail(f: &mut Frame, area: Rect, app: &App) {
    let Some(detail) = &app.cell_detail else {
        return;
    };
    let grid = match detail.kind {
        ScheduleKind::Watering => app.watering.grid.as_ref(),
        ScheduleKind::Pruning => app.pruning.grid.as_ref(),
    };
    let Some(grid) = grid else {
        return;
    };

    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let dim_color = parse_color(&active_theme.tab_bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let popup_area = popup_area(area, 50, 50);
    f.render_widget(Clear, popup_area);

    let entries = grid.cell_detail(detail.row, detail.col);
    let row_label = grid.rows().get(detail.row).cloned().unwrap_or_default();
    let column_label = grid
        .columns()
        .get(detail.col)
        .map(|date| match grid.granularity() {
            Granularity::Day => date.format("%a %b %d").to_string(),
            Granularity::Month => date.format("%B %Y").to_string(),
        })
        .unwrap_or_default();

    let title = format!("{} — {} ({})", row_label, column_label, entries.len());

    let mut lines: Vec<Line> = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        let status = if entry.completed { "✓" } else { "○" };
        let mut text = format!("{} {}", status, entry.plant_name);
        if entry.weather_adjusted {
            match entry.original_date {
                Some(original) => {
                    text.push_str(&format!("  (moved from {})", original.format("%b %d")));
                }
                None => text.push_str("  (weather adjusted)"),
            }
        }

        let style = if idx == detail.selected_index {
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(fg_color).bg(bg_color)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    lines.push(Line::from(""));
    let hint = match detail.kind {
        ScheduleKind::Watering => format!(
            "{}/{}: navigate • {}: toggle watered • Esc: close",
            app.config.key_bindings.list_up,
            app.config.key_bindings.list_down,
            app.config.key_bindings.mark_complete
        ),
        ScheduleKind::Pruning => format!(
            "{}/{}: navigate • Esc: close",
            app.config.key_bindings.list_up, app.config.key_bindings.list_down
        ),
    };
    lines.push(Line::from(Span::styled(hint, Style::default().fg(dim_color))));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color));

    f.render_widget(paragraph, popup_area);
}
