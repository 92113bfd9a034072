use anyhow::{bail, Context};
use playroom_booking::source::google_auth::GoogleAuthenticator;
use playroom_booking::storage::config::Config;

/// Interactive authorization-code exchange; stores the token for later runs.
pub async fn run_auth_setup() -> anyhow::Result<()> {
    let config = Config::load_or_create().context("loading config")?;

    if !config.google.is_configured() {
        println!("Configuration incomplete. Please edit the config file at:");
        println!("{}", Config::config_path().display());
        println!("\nYou need to set:");
        println!("  - google.client_id: Your Google OAuth2 client ID");
        println!("  - google.client_secret: Your Google OAuth2 client secret");
        println!("\nGet these from: https://console.cloud.google.com/apis/credentials");
        println!("Without them the booking calendar shows sample availability.");
        bail!("Missing Google OAuth credentials in config");
    }

    let auth = GoogleAuthenticator::new(config.google.clone());

    if auth.get_valid_token().await.is_ok() {
        println!("Already authorized for calendar '{}'.", config.google.calendar_id);
        return Ok(());
    }

    auth.print_auth_instructions();

    println!("Enter the authorization code: ");
    let mut code = String::new();
    std::io::stdin().read_line(&mut code)?;
    let code = code.trim();
    if code.is_empty() {
        bail!("No authorization code entered");
    }

    auth.exchange_code_for_token(code)
        .await
        .context("exchanging authorization code")?;
    tracing::info!("Stored new calendar token");
    println!("\nAuthorization successful. Reservations will now be held on the venue calendar.\n");

    Ok(())
}
