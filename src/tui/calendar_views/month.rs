use chrono::Datelike;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use playroom_booking::{
    app::AppState,
    booking::AvailabilitySummary,
    ui::month_view::{self, DayCell},
};

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

fn cell_style(app: &AppState, cell: &DayCell) -> Style {
    let theme = &app.theme;
    let mut style = Style::default();

    if !cell.is_current_month {
        return style.fg(theme.muted);
    }

    style = match (cell.is_available, cell.summary) {
        (false, _) => style.fg(theme.muted).add_modifier(Modifier::CROSSED_OUT),
        (true, Some(AvailabilitySummary::AllAvailable)) => style.fg(theme.open),
        (true, _) => style.fg(theme.partial),
    };

    if cell.is_today {
        style = style.fg(theme.today).add_modifier(Modifier::BOLD);
    }
    if cell.is_selected {
        style = style.fg(theme.selected).add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    }
    if cell.is_cursor {
        style = style.bg(theme.cursor_bg).fg(theme.cursor_fg);
    }
    style
}

fn marker(cell: &DayCell) -> &'static str {
    match (cell.is_current_month, cell.summary) {
        (false, _) => " ",
        (true, Some(AvailabilitySummary::AllAvailable)) => "●",
        (true, Some(AvailabilitySummary::Partial(_))) => "◐",
        (true, _) => "○",
    }
}

pub fn render(f: &mut Frame, app: &AppState, area: Rect) {
    let layout = month_view::calculate_layout(app);
    let theme = &app.theme;

    let month_name = app
        .view
        .first_of_month()
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|| format!("{}-{:02}", layout.year, layout.month));

    let mut lines = vec![
        Line::from(vec![
            Span::styled("< ", Style::default().fg(theme.muted)),
            Span::styled(month_name, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
            Span::styled(" >", Style::default().fg(theme.muted)),
        ]),
        Line::from(""),
        Line::from(
            WEEKDAYS
                .iter()
                .map(|d| Span::styled(format!(" {} ", d), Style::default().fg(theme.accent)))
                .collect::<Vec<_>>(),
        ),
    ];

    for week in &layout.weeks {
        let spans: Vec<Span> = week
            .days
            .iter()
            .map(|cell| Span::styled(format!(" {:>2}{} ", cell.date.day(), marker(cell)), cell_style(app, cell)))
            .collect();
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("● ", Style::default().fg(theme.open)),
        Span::raw("all open  "),
        Span::styled("◐ ", Style::default().fg(theme.partial)),
        Span::raw("some open  "),
        Span::styled("○ ", Style::default().fg(theme.muted)),
        Span::raw("booked"),
    ]));

    if let Some(summary) = app.availability.map.summary(app.cursor) {
        lines.push(Line::from(vec![
            Span::styled(app.cursor.format("%a %b %d: ").to_string(), Style::default().fg(theme.text)),
            Span::styled(summary.to_string(), Style::default().fg(theme.accent)),
        ]));
    }

    let content = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Pick a date "));
    f.render_widget(content, area);
}
