use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::tui::widgets::color::parse_color;
use crate::utils::format_key_binding_for_display as fmt_key;
use crate::Config;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    // Calculate popup area (60% width, 70% height, centered)
    let popup_area = popup_area(area, 60, 70);

    // Clear the background first - this prevents content from showing through
    f.render_widget(Clear, popup_area);

    let help_text = build_help_text(config);

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(ratatui::widgets::Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

/// Helper function to create a centered rect using up certain percentage of the available rect
/// Based on ratatui popup example: https://ratatui.rs/examples/apps/popup/
fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

fn build_help_text(config: &Config) -> String {
    let keys = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!(
        "  {} / {}: Switch tabs\n",
        fmt_key(&keys.tab_left),
        fmt_key(&keys.tab_right)
    ));
    text.push_str(&format!(
        "  {} / {} / {} / {}: Jump to Garden / Search / Watering / Pruning\n",
        fmt_key(&keys.tab_1),
        fmt_key(&keys.tab_2),
        fmt_key(&keys.tab_3),
        fmt_key(&keys.tab_4)
    ));
    text.push_str(&format!(
        "  {} / {}: Move up/down (h / l move across grid columns)\n",
        fmt_key(&keys.list_up),
        fmt_key(&keys.list_down)
    ));
    text.push('\n');

    text.push_str("Garden:\n");
    text.push_str(&format!(
        "  {}: Move plant to a section\n",
        fmt_key(&keys.move_to_section)
    ));
    text.push_str(&format!("  {}: Remove plant\n", fmt_key(&keys.delete)));
    text.push_str(&format!(
        "  {}: Manage sections\n",
        fmt_key(&keys.section_modal)
    ));
    text.push_str(&format!(
        "  {}: Toggle sidebar\n",
        fmt_key(&keys.toggle_sidebar)
    ));
    text.push('\n');

    text.push_str("Search:\n");
    text.push_str(&format!("  {}: Search the catalog\n", fmt_key(&keys.search)));
    text.push_str(&format!("  {}: Add plant to garden\n", fmt_key(&keys.add)));
    text.push('\n');

    text.push_str("Schedules:\n");
    text.push_str(&format!(
        "  {}: Open cell detail\n",
        fmt_key(&keys.select)
    ));
    text.push_str(&format!(
        "  {}: Mark cell watered (Watering tab)\n",
        fmt_key(&keys.mark_complete)
    ));
    text.push_str(&format!(
        "  {}: This week / next week\n",
        fmt_key(&keys.next_week)
    ));
    text.push_str(&format!(
        "  {}: Group by section / type\n",
        fmt_key(&keys.toggle_grouping)
    ));
    text.push_str(&format!(
        "  {}: Cycle section filter (Pruning tab)\n",
        fmt_key(&keys.filter)
    ));
    text.push_str("  Cells: count, * weather-adjusted, ✓ all done\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Refresh from backend\n", fmt_key(&keys.refresh)));
    text.push_str(&format!("  {}: Quit\n", fmt_key(&keys.quit)));
    text.push_str(&format!("  {}: Show/hide help\n", fmt_key(&keys.help)));

    text
}
