use ratatui::layout::{Alignment, Constraint, Direction, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::tui::app::{SectionModalField, SectionModalMode};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::App;

/// Calculate popup area (centered, with specified width and height percentages)
fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// Render the section management modal as a popup overlay
pub fn render_section_modal(f: &mut Frame, area: Rect, app: &App) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let popup_area = popup_area(area, 70, 60);

    // Clear the background first
    f.render_widget(Clear, popup_area);

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("Sections")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, popup_area);

    let inner_area = Rect::new(
        popup_area.x + 1,
        popup_area.y + 1,
        popup_area.width.saturating_sub(2),
        popup_area.height.saturating_sub(2),
    );

    let Some(state) = &app.sections.modal_state else {
        return;
    };

    // Section list (left) and actions (right)
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(inner_area);

    let list_area = horizontal[0];
    let actions_area = horizontal[1];

    let section_items: Vec<ListItem> = if app.sections.sections.is_empty() {
        vec![ListItem::new("(no sections yet)")]
    } else {
        app.sections
            .sections
            .iter()
            .map(|section| {
                let plant_count = app
                    .garden
                    .plants
                    .iter()
                    .filter(|p| p.section.as_deref() == Some(section.section_id.as_str()))
                    .count();
                ListItem::new(format!(
                    "{}  {} ({} plants)",
                    section.section_id,
                    section.display_name(),
                    plant_count
                ))
            })
            .collect()
    };

    let list = List::new(section_items)
        .block(Block::default().borders(Borders::ALL).title("Sections"))
        .style(Style::default().fg(fg_color).bg(bg_color))
        .highlight_style(
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        );

    let mut list_state = state.list_state.clone();
    f.render_stateful_widget(list, list_area, &mut list_state);

    // Actions panel
    let is_actions_active = matches!(state.current_field, SectionModalField::ActionsList);
    let mut action_lines: Vec<Line> = Vec::new();

    for (index, label) in ["Add", "Rename", "Delete"].iter().enumerate() {
        let style = if is_actions_active && state.actions_selected_index == index {
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(fg_color).bg(bg_color)
        };
        action_lines.push(Line::from(Span::styled(*label, style)));
    }

    // Name input when adding or renaming
    let name_line_index = if matches!(state.mode, SectionModalMode::Add | SectionModalMode::Rename)
    {
        action_lines.push(Line::from(""));
        let label = match state.mode {
            SectionModalMode::Add => "New name: ",
            _ => "Name: ",
        };
        action_lines.push(Line::from(vec![
            Span::styled(label, Style::default().fg(fg_color)),
            Span::styled(
                state.name_input.as_str().to_string(),
                Style::default().fg(highlight_fg).bg(highlight_bg),
            ),
        ]));
        Some((action_lines.len() - 1, label.chars().count()))
    } else {
        None
    };

    let actions_paragraph = Paragraph::new(action_lines)
        .block(Block::default().borders(Borders::ALL).title("Actions"))
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(actions_paragraph, actions_area);

    // Cursor inside the name input
    if let Some((line_idx, prefix_len)) = name_line_index {
        let cursor_col = prefix_len + state.name_input.cursor();
        let max_col = (actions_area.width.saturating_sub(3)) as usize;
        let visible_cursor_col = cursor_col.min(max_col);

        let x = actions_area.x + 1 + visible_cursor_col as u16;
        let y = actions_area.y + 1 + line_idx as u16;

        if x < actions_area.x + actions_area.width && y < actions_area.y + actions_area.height {
            f.set_cursor_position((x, y));
        }
    }
}
