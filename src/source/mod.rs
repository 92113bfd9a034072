pub mod external;
pub mod google_api;
pub mod google_auth;
pub mod loader;
pub mod mock;

use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use thiserror::Error;

use crate::booking::{BusyInterval, DateRange};

pub use external::ExternalCalendarAdapter;
pub use loader::{AvailabilityLoader, AvailabilityOrigin, AvailabilitySnapshot};
pub use mock::{MockGenerator, MockProfile};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SourceError {
    #[error("Availability source unavailable: {0}")]
    Unavailable(String),
}

/// Anything that can report when the venue is already committed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    async fn fetch_busy_intervals(&self, range: DateRange) -> Result<Vec<BusyInterval>, SourceError>;
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CalendarWriteError {
    #[error("Calendar authentication required")]
    AuthRequired,
    #[error("Event creation failed: {0}")]
    EventCreationFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReservationEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub color_id: Option<String>,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl ReservationEvent {
    pub fn timezone(&self) -> &'static str {
        self.start.timezone().name()
    }
}

/// Write side of the external calendar.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarWriter: Send + Sync {
    fn is_authenticated(&self) -> bool;

    async fn create_event(&self, event: &ReservationEvent) -> Result<String, CalendarWriteError>;
}
