pub mod compose;
pub mod fallback;
pub mod form_relay;
pub mod relay;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::booking::FormType;
use crate::storage::config::{NotificationConfig, NotificationStrategy};

pub use compose::{to_html, ComposedMessage, MessageComposer};
pub use fallback::ManualFallbackSink;
pub use form_relay::FormRelaySink;
pub use relay::RelaySink;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Delivery rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Notification sink not configured: {0}")]
    NotConfigured(String),
    #[error("Automatic delivery is disabled")]
    ManualDelivery,
}

/// Hands a finished submission to the business. One attempt per call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, form_type: FormType, fields: &BTreeMap<String, String>) -> Result<(), NotifyError>;
}

pub fn build_sink(config: &NotificationConfig) -> Arc<dyn NotificationSink> {
    let composer = MessageComposer::new(config);

    match config.strategy {
        NotificationStrategy::Relay => {
            tracing::info!("Notifications go to mail relay {}", config.relay_url);
            Arc::new(RelaySink::new(config.relay_url.clone(), composer))
        }
        NotificationStrategy::FormRelay => {
            tracing::info!("Notifications go to form relay {}", config.form_relay_url);
            Arc::new(FormRelaySink::new(
                config.form_relay_url.clone(),
                config.access_key.clone(),
                composer,
            ))
        }
        NotificationStrategy::Manual => {
            tracing::info!("Automatic notifications disabled");
            Arc::new(ManualFallbackSink)
        }
    }
}
