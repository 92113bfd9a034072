use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;

use crate::booking::FormType;
use crate::notify::{MessageComposer, NotificationSink, NotifyError};

const ANONYMOUS_NAME: &str = "Website Visitor";
const ANONYMOUS_EMAIL: &str = "no-reply@website.com";

/// Third-party form relay for hosts without a mail backend. Every raw field
/// is forwarded alongside the composed message as `formData_<key>`.
pub struct FormRelaySink {
    url: String,
    access_key: String,
    composer: MessageComposer,
    client: reqwest::Client,
}

impl FormRelaySink {
    pub fn new(url: String, access_key: String, composer: MessageComposer) -> Self {
        Self {
            url,
            access_key,
            composer,
            client: reqwest::Client::new(),
        }
    }

    fn form_params(&self, form_type: FormType, fields: &BTreeMap<String, String>) -> Vec<(String, String)> {
        let message = self.composer.compose(form_type, fields);
        let field = |key: &str, default: &str| {
            fields
                .get(key)
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        let mut params = vec![
            ("access_key".to_string(), self.access_key.clone()),
            ("subject".to_string(), message.subject.clone()),
            ("from_name".to_string(), field("name", ANONYMOUS_NAME)),
            ("from_email".to_string(), field("email", ANONYMOUS_EMAIL)),
            ("message".to_string(), message.body),
            ("form_type".to_string(), form_type.to_string()),
            ("timestamp".to_string(), Utc::now().to_rfc3339()),
        ];
        params.extend(
            fields
                .iter()
                .map(|(key, value)| (format!("formData_{}", key), value.clone())),
        );
        params
    }
}

#[async_trait]
impl NotificationSink for FormRelaySink {
    async fn notify(&self, form_type: FormType, fields: &BTreeMap<String, String>) -> Result<(), NotifyError> {
        if self.access_key.trim().is_empty() {
            return Err(NotifyError::NotConfigured("form relay access_key is empty".to_string()));
        }

        tracing::info!("Sending {} notification via form relay", form_type);

        let response = self.client
            .post(&self.url)
            .form(&self.form_params(form_type, fields))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("Form relay failed. Status: {}, Body: {}", status, body);
            return Err(NotifyError::Rejected { status: status.as_u16(), body });
        }

        tracing::info!("Notification delivered via form relay");
        Ok(())
    }
}
