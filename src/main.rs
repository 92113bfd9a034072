mod cli;
use cli::{parse_cli_mode, run_availability_mode, run_form_mode, CliMode, USAGE};
mod tui;
use tui::{run_auth_setup, run_tui};

use playroom_booking::storage::config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let cli_mode = match parse_cli_mode() {
        Ok(mode) => mode,
        Err(err) => {
            eprintln!("Error: {}", err);
            println!("{}", USAGE);
            return Ok(());
        }
    };

    match cli_mode {
        CliMode::Help => println!("{}", USAGE),
        CliMode::Auth => {
            if let Err(e) = run_auth_setup().await {
                eprintln!("Authentication error: {}", e);
                tracing::error!("Authentication failed: {}", e);
            }
        }
        CliMode::Availability { month, options } => run_availability_mode(month, options).await?,
        CliMode::Form { form_type, fields } => run_form_mode(form_type, fields).await?,
        CliMode::Tui(options) => run_tui(options).await?,
    }

    Ok(())
}

fn setup_logging() {
    let log_dir = Config::config_dir();

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "playroom-booking.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("playroom-booking started");
}
