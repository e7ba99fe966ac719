use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Tabs;
use ratatui::Frame;

use crate::tui::app::Tab;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::Config;

const TAB_TITLES: [(&str, Tab); 4] = [
    ("Garden", Tab::Garden),
    ("Search", Tab::Search),
    ("Watering", Tab::Watering),
    ("Pruning", Tab::Pruning),
];

pub fn render_tabs(f: &mut Frame, area: Rect, current_tab: Tab, config: &Config) {
    let active_theme = config.get_active_theme();
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let tab_bg = parse_color(&active_theme.tab_bg);

    // Contrast-aware text over the tab background so the labels stay readable
    // whatever the terminal does with "gray"
    let tab_fg = get_contrast_text_color(tab_bg);

    // Each tab is a padded box: two spaces of background either side of the label
    let titles: Vec<Line> = TAB_TITLES
        .iter()
        .map(|(label, _)| {
            Line::from(vec![
                Span::styled("  ", Style::default().bg(tab_bg)),
                Span::styled(*label, Style::default().fg(tab_fg).bg(tab_bg)),
                Span::styled("  ", Style::default().bg(tab_bg)),
            ])
        })
        .collect();

    let tab_index = TAB_TITLES
        .iter()
        .position(|(_, tab)| *tab == current_tab)
        .unwrap_or(0);

    let highlight_fg = get_contrast_text_color(highlight_bg);

    let tabs = Tabs::new(titles)
        .select(tab_index)
        .style(Style::default().fg(fg_color).bg(bg_color))
        .highlight_style(
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .divider("  ")
        .padding("", "");

    f.render_widget(tabs, area);
}
