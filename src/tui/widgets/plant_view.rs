use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::models::Plant;
use crate::tui::widgets::color::parse_color;
use crate::Config;

/// Render the detail pane for the selected garden plant
pub fn render_plant_view(f: &mut Frame, area: Rect, plant: Option<&Plant>, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let label_color = parse_color(&active_theme.tab_bg);

    let Some(plant) = plant else {
        let paragraph = Paragraph::new("Select a plant to view details")
            .block(Block::default().borders(Borders::ALL).title("Plant"))
            .style(Style::default().fg(fg_color));
        f.render_widget(paragraph, area);
        return;
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        plant.common_name.clone(),
        Style::default().fg(fg_color).add_modifier(Modifier::BOLD),
    )));
    if let Some(scientific) = plant.scientific_name.first() {
        lines.push(Line::from(Span::styled(
            scientific.clone(),
            Style::default().fg(label_color).add_modifier(Modifier::ITALIC),
        )));
    }
    lines.push(Line::from(""));

    let field = |label: &str, value: String| -> Line {
        Line::from(vec![
            Span::styled(format!("{}: ", label), Style::default().fg(label_color)),
            Span::styled(value, Style::default().fg(fg_color)),
        ])
    };

    lines.push(field(
        "Section",
        plant
            .section
            .clone()
            .unwrap_or_else(|| "Unassigned".to_string()),
    ));
    lines.push(field("Type", plant.type_label()));
    if let Some(cycle) = &plant.cycle {
        lines.push(field("Cycle", cycle.clone()));
    }
    if let Some(watering) = &plant.watering {
        lines.push(field("Watering", watering.clone()));
    }
    if !plant.sunlight.is_empty() {
        lines.push(field("Sunlight", plant.sunlight.join(", ")));
    }
    if let Some(maintenance) = &plant.maintenance {
        lines.push(field("Maintenance", maintenance.clone()));
    }
    if let Some(zone) = &plant.hardiness_zone {
        lines.push(field("Hardiness zone", zone.clone()));
    }
    if !plant.attracts.is_empty() {
        lines.push(field("Attracts", plant.attracts.join(", ")));
    }
    if plant.is_evergreen {
        lines.push(field("Evergreen", "yes".to_string()));
    }
    if plant.edible_fruit {
        lines.push(field("Edible fruit", "yes".to_string()));
    }

    if let Some(description) = &plant.description {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            description.clone(),
            Style::default().fg(fg_color),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Plant"))
        .style(Style::default().fg(fg_color))
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}
