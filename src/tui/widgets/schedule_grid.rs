use chrono::NaiveDate;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use std::collections::BTreeMap;

use crate::models::DayWeather;
use crate::schedule::{Granularity, Grid};
use crate::tui::widgets::color::parse_color;
use crate::Config;

/// Cell markers: `*` when the server shifted any entry for weather, `✓` when
/// everything in the cell is already done.
///
/// The whole widget draws from the projected [`Grid`]; it never reaches back
/// into the raw entry list.
#[allow(clippy::too_many_arguments)]
pub fn render_schedule_grid(
    f: &mut Frame,
    area: Rect,
    grid: Option<&Grid>,
    selected: (usize, usize),
    weather: Option<&BTreeMap<NaiveDate, DayWeather>>,
    title: &str,
    footer: Option<String>,
    loading: bool,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let dim_color = parse_color(&active_theme.tab_bg);

    let block_title = if loading {
        format!("{} (refreshing...)", title)
    } else {
        title.to_string()
    };
    let block = Block::default().borders(Borders::ALL).title(block_title);

    let Some(grid) = grid else {
        let paragraph = Paragraph::new("Loading schedule...")
            .block(block)
            .style(Style::default().fg(dim_color));
        f.render_widget(paragraph, area);
        return;
    };

    let cell_width: usize = match grid.granularity() {
        Granularity::Day => 8,
        Granularity::Month => 5,
    };
    let label_width: usize = grid
        .rows()
        .iter()
        .map(|r| r.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(5, 14);

    let mut lines: Vec<Line> = Vec::new();

    // Column header: "Mon 03" for day windows, "Jan" for month windows
    let mut header_spans = vec![Span::styled(
        format!("{:<width$}", "", width = label_width + 1),
        Style::default(),
    )];
    for column in grid.columns() {
        let text = match grid.granularity() {
            Granularity::Day => column.format("%a %d").to_string(),
            Granularity::Month => column.format("%b").to_string(),
        };
        header_spans.push(Span::styled(
            format!("{:>width$}", text, width = cell_width),
            Style::default().fg(dim_color),
        ));
    }
    header_spans.push(Span::styled(
        format!("{:>7}", "Total"),
        Style::default().fg(dim_color),
    ));
    lines.push(Line::from(header_spans));

    // Weather strip: server-computed icons per day (day granularity only)
    if let Some(weather) = weather {
        if grid.granularity() == Granularity::Day && !weather.is_empty() {
            let mut weather_spans = vec![Span::styled(
                format!("{:<width$}", "", width = label_width + 1),
                Style::default(),
            )];
            for column in grid.columns() {
                let icons = weather
                    .get(column)
                    .map(|w| w.icons.join(""))
                    .unwrap_or_default();
                weather_spans.push(Span::styled(
                    format!("{:>width$}", icons, width = cell_width),
                    Style::default().fg(dim_color),
                ));
            }
            lines.push(Line::from(weather_spans));
        }
    }

    if grid.rows().is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  No scheduled entries in this window",
            Style::default().fg(dim_color),
        )));
    }

    let max_count = grid.max_cell_count();

    for (row_idx, label) in grid.rows().iter().enumerate() {
        let mut spans = vec![Span::styled(
            format!("{:<width$} ", truncate(label, label_width), width = label_width),
            Style::default().fg(fg_color),
        )];

        for col_idx in 0..grid.columns().len() {
            let count = grid.count_at(row_idx, col_idx);
            let is_selected = (row_idx, col_idx) == selected;

            let text = if count == 0 {
                format!("{:>width$}", "·", width = cell_width)
            } else {
                let detail = grid.cell_detail(row_idx, col_idx);
                let adjusted = detail.iter().any(|e| e.weather_adjusted);
                let all_done = detail.iter().all(|e| e.completed);
                let marker = match (all_done, adjusted) {
                    (true, true) => "✓*",
                    (true, false) => "✓",
                    (false, true) => "*",
                    (false, false) => "",
                };
                format!("{:>width$}", format!("{}{}", count, marker), width = cell_width)
            };

            let mut style = if count == 0 {
                Style::default().fg(dim_color)
            } else {
                // Heat shading: deeper green for fuller cells
                let ratio = count as f64 / max_count as f64;
                let green = (90.0 + 130.0 * ratio) as u8;
                Style::default().fg(Color::White).bg(Color::Rgb(0, green, 40))
            };
            if is_selected {
                style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
            }
            spans.push(Span::styled(text, style));
        }

        spans.push(Span::styled(
            format!("{:>7}", grid.row_totals()[row_idx]),
            Style::default().fg(fg_color),
        ));
        lines.push(Line::from(spans));
    }

    // Column totals
    if !grid.rows().is_empty() {
        let mut total_spans = vec![Span::styled(
            format!("{:<width$} ", "Total", width = label_width),
            Style::default().fg(dim_color),
        )];
        for total in grid.column_totals() {
            total_spans.push(Span::styled(
                format!("{:>width$}", total, width = cell_width),
                Style::default().fg(dim_color),
            ));
        }
        total_spans.push(Span::styled(
            format!("{:>7}", grid.total()),
            Style::default().fg(dim_color),
        ));
        lines.push(Line::from(total_spans));
    }

    if let Some(footer) = footer {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(footer, Style::default().fg(dim_color))));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().fg(fg_color));

    f.render_widget(paragraph, area);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
    }
}
