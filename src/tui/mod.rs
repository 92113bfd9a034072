mod authentication;
mod calendar_views;
mod clipboard;
mod dialogs;
mod presentation;
mod session;

pub use authentication::run_auth_setup;
pub use session::run_tui;
