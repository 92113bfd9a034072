use std::io;
use std::time::Duration;

use chrono::Utc;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as TermEvent, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use playroom_booking::{
    app::{AppState, FollowUp, Mode, Notice},
    input::{command_mode, insert_mode, normal_mode},
    services::{build_services, ServiceOptions, Services},
    source::AvailabilitySnapshot,
    storage::config::Config,
    submission::{SubmissionError, SubmissionReceipt},
    ui::theme::Theme,
};
use crate::tui::{clipboard::copy_to_clipboard, presentation::ui};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Results of background work, delivered back to the UI loop.
enum Message {
    Availability(AvailabilitySnapshot),
    Submitted(Result<SubmissionReceipt, SubmissionError>),
}

struct Background {
    tx: UnboundedSender<Message>,
    handles: Vec<JoinHandle<()>>,
}

impl Background {
    fn spawn_reload(&mut self, app: &mut AppState, services: &Services) {
        app.begin_loading();
        let loader = services.loader.clone();
        let ticket = loader.begin();
        let range = loader.window_from(app.today);
        let tx = self.tx.clone();

        tracing::info!("Loading availability {} to {} (ticket {})", range.start, range.end, ticket);
        self.handles.push(tokio::spawn(async move {
            let snapshot = loader.load_with_ticket(ticket, range).await;
            let _ = tx.send(Message::Availability(snapshot));
        }));
    }

    fn spawn_submit(&mut self, app: &AppState, services: &Services) {
        let flow = services.flow.clone();
        let view = app.view.clone();
        let contact = app.contact_details();
        let tx = self.tx.clone();

        self.handles.push(tokio::spawn(async move {
            let result = flow.submit(&view, &contact).await;
            let _ = tx.send(Message::Submitted(result));
        }));
    }

    fn follow(&mut self, follow_up: FollowUp, app: &mut AppState, services: &Services) {
        match follow_up {
            FollowUp::Reload => self.spawn_reload(app, services),
            FollowUp::Submit => self.spawn_submit(app, services),
            FollowUp::None | FollowUp::Quit => {}
        }
    }

    fn shutdown(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

pub async fn run_tui(options: ServiceOptions) -> Result<(), io::Error> {
    let config = Config::load_or_create()
        .map_err(|e| io::Error::other(e.to_string()))?;
    let services = build_services(&config, &options)
        .await
        .map_err(|e| io::Error::other(e.to_string()))?;

    let today = Utc::now().with_timezone(&services.tz).date_naive();
    let theme = Theme::by_name(&config.ui.theme).unwrap_or_default();
    let mut app = AppState::new(today, services.catalog.clone())
        .with_theme(theme)
        .with_business_hours(config.booking.business_hours.clone())
        .with_min_advance_days(config.booking.min_advance_days);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &services).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("Session ended with error: {}", err);
        println!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    services: &Services,
) -> io::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut background = Background { tx, handles: Vec::new() };

    background.spawn_reload(app, services);
    let result = event_loop(terminal, app, services, &mut background, &mut rx).await;

    // Nothing may update the state once the screen is gone.
    background.shutdown();
    result
}

async fn event_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    services: &Services,
    background: &mut Background,
    rx: &mut UnboundedReceiver<Message>,
) -> io::Result<()> {
    loop {
        while let Ok(message) = rx.try_recv() {
            match message {
                Message::Availability(snapshot) => app.apply_snapshot(snapshot),
                Message::Submitted(result) => {
                    let follow_up = app.apply_submission(result);
                    background.follow(follow_up, app, services);
                }
            }
        }
        background.handles.retain(|h| !h.is_finished());

        terminal.draw(|f| ui(f, app))?;

        // Short poll so background results show up without a key press.
        if !event::poll(POLL_INTERVAL)? {
            tokio::task::yield_now().await;
            continue;
        }

        if let TermEvent::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let follow_up = handle_key(key.code, app);
            if follow_up == FollowUp::Quit {
                tracing::info!("Quit requested");
                return Ok(());
            }
            background.follow(follow_up, app, services);
        }
    }
}

fn handle_key(code: KeyCode, app: &mut AppState) -> FollowUp {
    if app.fallback_message.is_some() {
        handle_fallback_keys(code, app);
        return FollowUp::None;
    }

    match app.mode {
        Mode::Normal => normal_mode::handle_key(code, app),
        Mode::Insert => insert_mode::handle_key(code, app),
        Mode::Command => command_mode::handle_key(code, app),
    }
}

fn handle_fallback_keys(code: KeyCode, app: &mut AppState) {
    match code {
        KeyCode::Char('y') => {
            let Some(text) = app.fallback_message.as_ref().map(|m| m.as_manual_text()) else {
                return;
            };
            app.notice = Some(match copy_to_clipboard(&text) {
                Ok(()) => Notice::Info("Message copied to clipboard".to_string()),
                Err(e) => Notice::Error(e),
            });
        }
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
            app.fallback_message = None;
        }
        _ => {}
    }
}
