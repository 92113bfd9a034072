use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use playroom_booking::app::AppState;

use crate::tui::dialogs::centered;

/// Shown when a notification could not be delivered, so the customer can
/// send the message themselves.
pub fn render(f: &mut Frame, app: &AppState) {
    let Some(message) = &app.fallback_message else {
        return;
    };

    let area = centered(f.size(), 76, 28);
    f.render_widget(Clear, area);

    let theme = &app.theme;
    let mut lines = vec![
        Line::from(Span::styled(
            "We could not send your request automatically.",
            Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        )),
        Line::from("Please email the message below to the venue."),
        Line::from(""),
        Line::from(vec![
            Span::styled("To: ", Style::default().fg(theme.muted)),
            Span::styled(message.recipient.as_str(), Style::default().fg(theme.accent)),
        ]),
        Line::from(vec![
            Span::styled("Subject: ", Style::default().fg(theme.muted)),
            Span::raw(message.subject.as_str()),
        ]),
        Line::from(""),
    ];
    lines.extend(message.body.lines().map(|l| Line::from(l.to_string())));

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default()
            .borders(Borders::ALL)
            .title(" Send manually (y = copy, Esc = close) ")
            .style(Style::default().bg(Color::Black)));

    f.render_widget(paragraph, area);
}
