use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use playroom_booking::app::AppState;

use crate::tui::dialogs::centered;

pub fn render(f: &mut Frame, app: &AppState) {
    let help_height = 22;
    let help_area = centered(f.size(), 60, help_height);

    f.render_widget(Clear, help_area);

    let heading = |text: &'static str| {
        Line::from(vec![Span::styled(text, Style::default().fg(app.theme.accent).add_modifier(Modifier::BOLD))])
    };

    let help_text = vec![
        heading("Playroom Booking Help"),
        Line::from(""),
        heading("Calendar:"),
        Line::from("  h/l      - Previous/next day"),
        Line::from("  j/k      - Next/previous week"),
        Line::from("  { / }    - Previous/next month"),
        Line::from("  t        - Jump to today"),
        Line::from("  Enter    - Select the date under the cursor"),
        Line::from("  1-9      - Select a time slot"),
        Line::from("  Esc      - Clear the selection"),
        Line::from("  r        - Reload availability"),
        Line::from(""),
        heading("Booking:"),
        Line::from("  a        - Open the booking form"),
        Line::from("  Tab      - Next field (Shift-Tab back)"),
        Line::from("  Enter    - Submit the reservation"),
        Line::from("  Esc      - Close the form, keeping its input"),
        Line::from(""),
        heading("Manual message:"),
        Line::from("  y        - Copy the message to the clipboard"),
        Line::from("  Esc      - Dismiss"),
        Line::from(""),
        heading("Commands:"),
        Line::from("  :q       - Quit"),
        Line::from("  :reload  - Reload availability"),
        Line::from("  :goto    - Jump to date (:goto 2025-12-20)"),
        Line::from("  :theme   - Change theme (:theme nord)"),
        Line::from("  :help    - Show this help"),
    ];

    let visible_lines = help_height.saturating_sub(3) as usize;
    let total_lines = help_text.len();
    let max_scroll = total_lines.saturating_sub(visible_lines);
    let scroll = app.help_scroll.min(max_scroll);

    let scrolled_text: Vec<Line> = help_text
        .into_iter()
        .skip(scroll)
        .take(visible_lines)
        .collect();

    let help_paragraph = Paragraph::new(scrolled_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!(" Help (j/k to scroll, q to close) [{}/{}] ", scroll + 1, total_lines))
            .style(Style::default().bg(Color::Black)))
        .alignment(Alignment::Left);

    f.render_widget(help_paragraph, help_area);
}
