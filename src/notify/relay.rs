use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::booking::FormType;
use crate::notify::{MessageComposer, NotificationSink, NotifyError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest<'a> {
    to: &'a str,
    from: String,
    subject: &'a str,
    text: &'a str,
    html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    form_type: FormType,
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Posts composed mail to the venue's own relay endpoint, which owns the
/// SMTP credentials.
pub struct RelaySink {
    url: String,
    composer: MessageComposer,
    client: reqwest::Client,
}

impl RelaySink {
    pub fn new(url: String, composer: MessageComposer) -> Self {
        Self {
            url,
            composer,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotificationSink for RelaySink {
    async fn notify(&self, form_type: FormType, fields: &BTreeMap<String, String>) -> Result<(), NotifyError> {
        if self.url.trim().is_empty() {
            return Err(NotifyError::NotConfigured("relay_url is empty".to_string()));
        }

        let message = self.composer.compose(form_type, fields);
        let request = RelayRequest {
            to: &message.recipient,
            from: self.composer.sender(),
            subject: &message.subject,
            text: &message.body,
            html: message.html(),
            reply_to: message.reply_to.as_deref(),
            form_type,
        };

        tracing::info!("Sending {} notification via relay", form_type);

        let response = self.client
            .post(&self.url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("Relay failed. Status: {}, Body: {}", status, body);
            return Err(NotifyError::Rejected { status: status.as_u16(), body });
        }

        // Older relays answer with an empty body; treat that as delivered.
        let body = response.text().await?;
        if let Ok(reply) = serde_json::from_str::<RelayResponse>(&body)
            && !reply.success
        {
            let reason = reply.error.unwrap_or_else(|| "relay reported failure".to_string());
            tracing::error!("Relay declined message: {}", reason);
            return Err(NotifyError::Rejected { status: status.as_u16(), body: reason });
        }

        tracing::info!("Notification delivered via relay");
        Ok(())
    }
}
