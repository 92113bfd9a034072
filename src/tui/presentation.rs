use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use playroom_booking::app::{AppState, LoadStatus, Mode, Notice};
use crate::tui::{calendar_views, dialogs};

fn status_line(app: &AppState) -> Line<'_> {
    let theme = &app.theme;

    if app.mode == Mode::Command {
        return Line::from(Span::styled(app.command_buffer.as_str(), Style::default().fg(theme.text)));
    }

    if let Some(notice) = &app.notice {
        return match notice {
            Notice::Info(text) => Line::from(Span::styled(text.as_str(), Style::default().fg(theme.info))),
            Notice::Error(text) => Line::from(Span::styled(text.as_str(), Style::default().fg(theme.error))),
        };
    }

    let source = match &app.status {
        LoadStatus::Loading => Span::styled("Loading availability...", Style::default().fg(theme.partial)),
        LoadStatus::Ready(origin) => Span::styled(format!("Availability: {}", origin), Style::default().fg(theme.info)),
        LoadStatus::Degraded(warning) => Span::styled(warning.as_str(), Style::default().fg(theme.partial)),
    };

    Line::from(vec![
        source,
        Span::raw(format!(
            " | Bookable from {} | 'q' quit, '?' help",
            app.earliest_bookable().format("%b %d")
        )),
    ])
}

pub fn ui(f: &mut Frame, app: &AppState) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(55),
            Constraint::Percentage(45),
        ])
        .split(main_chunks[1]);

    let title = Paragraph::new(format!("Little Playroom Cafe - Reservations - {:?}", app.mode))
        .style(Style::default().fg(app.theme.accent).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, main_chunks[0]);

    calendar_views::month::render(f, app, content_chunks[0]);
    calendar_views::time_slots::render(f, app, content_chunks[1]);

    let alignment = if app.mode == Mode::Command { Alignment::Left } else { Alignment::Center };
    let status = Paragraph::new(status_line(app))
        .alignment(alignment)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, main_chunks[2]);

    dialogs::booking_form::render(f, app);

    if app.fallback_message.is_some() {
        dialogs::fallback_message::render(f, app);
    }

    if app.show_help {
        dialogs::help::render(f, app);
    }
}
