use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::booking::FormType;
use crate::notify::{NotificationSink, NotifyError};

/// Never delivers; every submission ends up as the manual-fallback message.
pub struct ManualFallbackSink;

#[async_trait]
impl NotificationSink for ManualFallbackSink {
    async fn notify(&self, form_type: FormType, _fields: &BTreeMap<String, String>) -> Result<(), NotifyError> {
        tracing::info!("Leaving {} submission for manual delivery", form_type);
        Err(NotifyError::ManualDelivery)
    }
}
