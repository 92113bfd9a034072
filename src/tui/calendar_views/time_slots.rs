use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use playroom_booking::{app::AppState, ui::time_slots::slot_rows};

pub fn render(f: &mut Frame, app: &AppState, area: Rect) {
    let theme = &app.theme;

    let title = match app.view.selected_date {
        Some(date) => format!("Times on {}", date.format("%A, %B %d")),
        None => "Times".to_string(),
    };

    let mut lines = vec![
        Line::from(Span::styled(title, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
        Line::from(""),
    ];

    let rows = slot_rows(app);
    if rows.is_empty() {
        lines.push(Line::from(Span::styled(
            "Press Enter on an open date to see its time slots",
            Style::default().fg(theme.muted),
        )));
    }

    for row in &rows {
        let (status_style, label_style) = if row.is_available {
            (Style::default().fg(theme.open), Style::default().fg(theme.text))
        } else {
            (
                Style::default().fg(theme.booked),
                Style::default().fg(theme.muted).add_modifier(Modifier::CROSSED_OUT),
            )
        };
        let label_style = if row.is_selected {
            label_style.fg(theme.selected).add_modifier(Modifier::BOLD)
        } else {
            label_style
        };

        let mut spans = vec![
            Span::styled(if row.is_selected { ">" } else { " " }, Style::default().fg(theme.selected)),
            Span::styled(format!("[{}] ", row.shortcut), Style::default().fg(theme.accent)),
            Span::styled(format!("{:<20}", row.label), label_style),
            Span::styled(row.status_text(), status_style),
        ];
        if !row.within_business_hours {
            spans.push(Span::styled("  outside opening hours", Style::default().fg(theme.outside_hours)));
        }
        lines.push(Line::from(spans));
    }

    if let Some(slot) = app.selected_slot()
        && let Some(date) = app.view.selected_date
    {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Selected: ", Style::default().fg(theme.text)),
            Span::styled(
                format!("{} {}", date.format("%b %d"), slot.label),
                Style::default().fg(theme.selected).add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled("a", Style::default().fg(theme.open)),
            Span::raw(" = Enter contact details and book"),
        ]));
    }

    let content = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(content, area);
}
