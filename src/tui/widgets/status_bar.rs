use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::Config;

pub fn render_status_bar(
    f: &mut Frame,
    area: Rect,
    message: Option<&String>,
    key_hints: &[String],
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);

    let max_width = area.width as usize;

    let (content, style) = if let Some(msg) = message {
        // Status messages get a highlighted background for visibility
        let msg_fg = get_contrast_text_color(highlight_bg);
        let mut text = msg.clone();
        if text.chars().count() > max_width {
            text = text.chars().take(max_width.saturating_sub(3)).collect::<String>() + "...";
        }
        (
            text,
            Style::default()
                .fg(msg_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        // Key hints with bullet separators, fitting as many as space allows
        let separator = " • ";
        let mut text = String::new();
        for (i, hint) in key_hints.iter().enumerate() {
            let added = if i == 0 {
                hint.chars().count()
            } else {
                separator.chars().count() + hint.chars().count()
            };
            if text.chars().count() + added > max_width {
                if !text.is_empty() && text.chars().count() + 1 <= max_width {
                    text.push('…');
                }
                break;
            }
            if i > 0 {
                text.push_str(separator);
            }
            text.push_str(hint);
        }
        (text, Style::default().fg(fg_color).bg(bg_color))
    };

    // Simple one-line display, no block: content areas have the borders
    let paragraph = Paragraph::new(content).style(style);
    f.render_widget(paragraph, area);
}
