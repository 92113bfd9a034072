use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;
use thiserror::Error;

use crate::app::CalendarViewState;
use crate::booking::{local_instant, BookingRequest, ContactDetails, FormType, SlotCatalog};
use crate::notify::{ComposedMessage, MessageComposer, NotificationSink};
use crate::source::{CalendarWriter, ReservationEvent};
use crate::storage::config::EventConfig;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Please select a date and a time slot")]
    IncompleteSelection,
    #[error("Calendar booking failed: {0}")]
    ExternalBookingFailed(String),
    #[error("Notification failed: {reason}")]
    NotificationFailed {
        reason: String,
        message: Box<ComposedMessage>,
        event_id: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub request: BookingRequest,
}

/// Turns a completed selection into a calendar hold plus a notification.
pub struct BookingFlow {
    writer: Option<Arc<dyn CalendarWriter>>,
    sink: Arc<dyn NotificationSink>,
    composer: MessageComposer,
    catalog: SlotCatalog,
    event: EventConfig,
    tz: Tz,
    timeout: Duration,
}

impl BookingFlow {
    pub fn new(
        writer: Option<Arc<dyn CalendarWriter>>,
        sink: Arc<dyn NotificationSink>,
        composer: MessageComposer,
        catalog: SlotCatalog,
        event: EventConfig,
        tz: Tz,
    ) -> Self {
        Self {
            writer,
            sink,
            composer,
            catalog,
            event,
            tz,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_request(&self, view: &CalendarViewState, contact: &ContactDetails) -> Option<BookingRequest> {
        let date = view.selected_date?;
        let slot = self.catalog.find(view.selected_time.as_ref()?)?;
        Some(BookingRequest::new(date, slot.clone(), contact.clone()))
    }

    pub fn reservation_event(&self, request: &BookingRequest) -> Option<ReservationEvent> {
        let start = local_instant(self.tz, request.date, request.slot.start)?;
        let end = local_instant(self.tz, request.date, request.slot.end)?;
        let contact = &request.contact;

        let mut description = self.event.description.clone();
        description.push_str("\n\n");
        for (label, value) in [
            ("Name", &contact.name),
            ("Email", &contact.email),
            ("Phone", &contact.phone),
            ("Guests", &contact.guests),
            ("Type", &contact.reservation_type),
            ("Notes", &contact.notes),
        ] {
            if !value.trim().is_empty() {
                description.push_str(&format!("{}: {}\n", label, value.trim()));
            }
        }
        description.push_str(&format!("Reference: {}", request.reference));

        Some(ReservationEvent {
            title: self.event.title.clone(),
            description,
            location: self.event.location.clone(),
            color_id: (!self.event.color_id.is_empty()).then(|| self.event.color_id.clone()),
            start,
            end,
        })
    }

    async fn create_event(
        &self,
        writer: &dyn CalendarWriter,
        request: &BookingRequest,
    ) -> Result<String, SubmissionError> {
        let event = self.reservation_event(request).ok_or_else(|| {
            SubmissionError::ExternalBookingFailed("slot time does not exist on that date".to_string())
        })?;

        match tokio::time::timeout(self.timeout, writer.create_event(&event)).await {
            Ok(Ok(id)) => Ok(id),
            Ok(Err(e)) => Err(SubmissionError::ExternalBookingFailed(e.to_string())),
            Err(_) => Err(SubmissionError::ExternalBookingFailed(
                "calendar did not respond in time".to_string(),
            )),
        }
    }

    pub async fn submit(
        &self,
        view: &CalendarViewState,
        contact: &ContactDetails,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let Some(mut request) = self.build_request(view, contact) else {
            return Err(SubmissionError::IncompleteSelection);
        };

        tracing::info!(
            "Submitting reservation {} for {} {}",
            request.reference,
            request.date,
            request.slot.key()
        );

        if let Some(writer) = &self.writer
            && writer.is_authenticated()
        {
            match self.create_event(writer.as_ref(), &request).await {
                Ok(id) => {
                    tracing::info!("Calendar hold created: {}", id);
                    request.external_event_id = Some(id);
                }
                Err(e) => {
                    tracing::error!("Aborting reservation {}: {}", request.reference, e);
                    return Err(e);
                }
            }
        }

        let fields = request.to_fields();
        let delivery = tokio::time::timeout(self.timeout, self.sink.notify(FormType::Reservation, &fields)).await;
        let failure = match delivery {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(_) => Some("notification service did not respond in time".to_string()),
        };

        if let Some(reason) = failure {
            tracing::error!("Notification for {} failed: {}", request.reference, reason);
            return Err(SubmissionError::NotificationFailed {
                reason,
                message: Box::new(self.composer.compose(FormType::Reservation, &fields)),
                event_id: request.external_event_id,
            });
        }

        Ok(SubmissionReceipt { request })
    }
}
