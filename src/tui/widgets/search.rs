use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::models::PlantSummary;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::input::InputField;
use crate::Config;

/// Render the catalog search pane: query box on top, results below
#[allow(clippy::too_many_arguments)]
pub fn render_search(
    f: &mut Frame,
    area: Rect,
    input: &InputField,
    input_active: bool,
    results: &[PlantSummary],
    list_state: &mut ListState,
    searching: bool,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let dim_color = parse_color(&active_theme.tab_bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = if active_theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&active_theme.highlight_fg)
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let input_area = chunks[0];
    let results_area = chunks[1];

    // Query box
    let input_title = if input_active {
        "Search (Enter: run, Esc: done)"
    } else {
        "Search"
    };
    let input_style = if input_active {
        Style::default().fg(parse_color(&active_theme.highlight_bg))
    } else {
        Style::default().fg(fg_color)
    };
    let input_widget = Paragraph::new(input.as_str())
        .block(Block::default().borders(Borders::ALL).title(input_title))
        .style(input_style);
    f.render_widget(input_widget, input_area);

    if input_active {
        // Place the terminal cursor inside the query box
        let x = input_area.x + 1 + input.cursor().min(input_area.width.saturating_sub(3) as usize) as u16;
        let y = input_area.y + 1;
        f.set_cursor_position((x, y));
    }

    // Results
    let title = if searching {
        "Results (searching...)".to_string()
    } else {
        format!("Results ({})", results.len())
    };

    if results.is_empty() {
        let hint = if searching {
            "Searching the catalog..."
        } else {
            "Type / to search the plant catalog"
        };
        let paragraph = Paragraph::new(hint)
            .block(Block::default().borders(Borders::ALL).title(title))
            .style(Style::default().fg(dim_color));
        f.render_widget(paragraph, results_area);
        return;
    }

    let max_width = results_area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = results
        .iter()
        .map(|plant| {
            let scientific = plant.scientific_name.first().cloned().unwrap_or_default();
            let marker = if plant.in_user_garden { " ✓" } else { "" };
            let type_str = plant.plant_type.as_deref().unwrap_or("-");

            let mut first = format!("{}{}", plant.common_name, marker);
            if first.chars().count() > max_width {
                first = first.chars().take(max_width.saturating_sub(3)).collect::<String>() + "...";
            }
            let mut second = format!("  {} · {}", scientific, type_str);
            if second.chars().count() > max_width {
                second = second.chars().take(max_width.saturating_sub(3)).collect::<String>() + "...";
            }

            ListItem::new(vec![
                Line::from(Span::styled(first, Style::default().fg(fg_color))),
                Line::from(Span::styled(second, Style::default().fg(dim_color))),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(fg_color))
        .highlight_style(
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        );

    f.render_stateful_widget(list, results_area, list_state);
}
