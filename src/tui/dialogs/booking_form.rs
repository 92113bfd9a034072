use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use playroom_booking::app::{AppState, FormField, Mode};

use crate::tui::dialogs::centered;

pub fn render(f: &mut Frame, app: &AppState) {
    let Some(form) = &app.booking_form else {
        return;
    };
    if app.mode != Mode::Insert {
        return;
    }

    let form_area = centered(f.size(), 64, 20);
    f.render_widget(Clear, form_area);

    let theme = &app.theme;
    let selection = match (app.view.selected_date, app.selected_slot()) {
        (Some(date), Some(slot)) => format!("{} | {}", date.format("%A, %B %d, %Y"), slot.label),
        _ => "No date and time selected".to_string(),
    };

    let mut form_text = vec![
        Line::from(vec![Span::styled("Reserve play time", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))]),
        Line::from(vec![Span::styled(selection, Style::default().fg(theme.selected))]),
        Line::from(""),
    ];

    for field in FormField::all() {
        let active = form.active_field == field;
        let label_style = if active {
            Style::default().fg(theme.cursor_fg).bg(theme.cursor_bg)
        } else {
            Style::default().fg(theme.muted)
        };
        form_text.push(Line::from(vec![
            Span::styled(format!("{:>7}: ", field.label()), label_style),
            Span::styled(form.value(&field).to_string(), Style::default().fg(theme.text)),
            Span::styled(if active { "_" } else { "" }, Style::default().fg(theme.accent)),
        ]));
        form_text.push(Line::from(""));
    }

    let submit_hint = if app.submitting {
        Span::styled("Submitting...", Style::default().fg(theme.partial))
    } else if !app.view.is_complete() {
        Span::styled("Select a date and time to submit", Style::default().fg(theme.muted))
    } else if let Some(problem) = app.contact_details().missing_required() {
        Span::styled(problem, Style::default().fg(theme.muted))
    } else {
        Span::styled("Enter = Submit", Style::default().fg(theme.open))
    };

    form_text.push(Line::from(vec![
        Span::styled("Tab", Style::default().fg(theme.accent)),
        Span::raw(" = Next field | "),
        submit_hint,
        Span::raw(" | "),
        Span::styled("Esc", Style::default().fg(theme.error)),
        Span::raw(" = Close"),
    ]));

    let form_paragraph = Paragraph::new(form_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(" Booking ")
            .style(Style::default().bg(Color::Black)))
        .alignment(Alignment::Left);

    f.render_widget(form_paragraph, form_area);
}
