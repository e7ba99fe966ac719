use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::models::PlantSummary;
use crate::tui::widgets::color::parse_color;
use crate::Config;

/// Render the suggestions panel for the selected plant's section
pub fn render_suggestions(
    f: &mut Frame,
    area: Rect,
    suggestions: &[PlantSummary],
    section_id: Option<&str>,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let dim_color = parse_color(&active_theme.tab_bg);

    let title = match section_id {
        Some(id) => format!("Suggestions for section {}", id),
        None => "Suggestions".to_string(),
    };

    let lines: Vec<Line> = if suggestions.is_empty() {
        vec![Line::from(Span::styled(
            "No suggestions for this section yet",
            Style::default().fg(dim_color),
        ))]
    } else {
        suggestions
            .iter()
            .map(|plant| {
                let type_str = plant.plant_type.as_deref().unwrap_or("-");
                Line::from(vec![
                    Span::styled("• ", Style::default().fg(dim_color)),
                    Span::styled(plant.common_name.clone(), Style::default().fg(fg_color)),
                    Span::styled(format!("  ({})", type_str), Style::default().fg(dim_color)),
                ])
            })
            .collect()
    };

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(fg_color));

    f.render_widget(paragraph, area);
}
