use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{NaiveTime, Utc};
use chrono_tz::Tz;

use crate::booking::{local_instant, BusyInterval, DateRange};
use crate::source::google_api::{ApiError, CalendarApi, EventTime, RemoteEvent};
use crate::source::{
    AvailabilitySource, CalendarWriteError, CalendarWriter, ReservationEvent, SourceError,
};

/// The venue's hosted calendar, read for busy times and written for new
/// reservations. Losing authentication mid-session disables both sides.
pub struct ExternalCalendarAdapter {
    api: Arc<dyn CalendarApi>,
    calendar_id: String,
    tz: Tz,
    authenticated: AtomicBool,
}

impl ExternalCalendarAdapter {
    pub fn new(api: Arc<dyn CalendarApi>, calendar_id: impl Into<String>, tz: Tz) -> Self {
        Self {
            api,
            calendar_id: calendar_id.into(),
            tz,
            authenticated: AtomicBool::new(true),
        }
    }

    fn note_api_error(&self, error: &ApiError) {
        if matches!(error, ApiError::AuthenticationFailed) {
            tracing::warn!("Calendar credentials rejected, disabling external calendar");
            self.authenticated.store(false, Ordering::SeqCst);
        }
    }

    fn to_busy_interval(&self, event: RemoteEvent) -> Option<BusyInterval> {
        match (event.start, event.end) {
            (EventTime::DateTime(start), EventTime::DateTime(end)) => {
                Some(BusyInterval::new(start, end))
            }
            (EventTime::Date(date), _) => BusyInterval::all_day(date, self.tz),
            (EventTime::DateTime(start), EventTime::Date(end)) => {
                let end = local_instant(self.tz, end, NaiveTime::MIN)?;
                Some(BusyInterval::new(start, end.with_timezone(&Utc)))
            }
        }
    }
}

#[async_trait]
impl AvailabilitySource for ExternalCalendarAdapter {
    async fn fetch_busy_intervals(&self, range: DateRange) -> Result<Vec<BusyInterval>, SourceError> {
        if !self.is_authenticated() {
            return Err(SourceError::Unavailable("calendar is not authenticated".to_string()));
        }

        let window_end = range.end.succ_opt().unwrap_or(range.end);
        let (Some(time_min), Some(time_max)) = (
            local_instant(self.tz, range.start, NaiveTime::MIN),
            local_instant(self.tz, window_end, NaiveTime::MIN),
        ) else {
            return Err(SourceError::Unavailable("query window has no local midnight".to_string()));
        };

        let events = self.api
            .list_events(
                &self.calendar_id,
                time_min.with_timezone(&Utc),
                time_max.with_timezone(&Utc),
            )
            .await
            .map_err(|e| {
                self.note_api_error(&e);
                SourceError::Unavailable(e.to_string())
            })?;

        Ok(events
            .into_iter()
            .filter_map(|event| self.to_busy_interval(event))
            .collect())
    }
}

#[async_trait]
impl CalendarWriter for ExternalCalendarAdapter {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    async fn create_event(&self, event: &ReservationEvent) -> Result<String, CalendarWriteError> {
        if !self.is_authenticated() {
            return Err(CalendarWriteError::AuthRequired);
        }

        match self.api.insert_event(&self.calendar_id, event).await {
            Ok(created) => Ok(created.id),
            Err(e) => {
                self.note_api_error(&e);
                match e {
                    ApiError::AuthenticationFailed => Err(CalendarWriteError::AuthRequired),
                    other => Err(CalendarWriteError::EventCreationFailed(other.to_string())),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::google_api::CreatedEventInfo;
    use chrono::{DateTime, NaiveDate, TimeZone};
    use chrono_tz::America::Chicago;
    use std::sync::Mutex;

    /// Canned API that records the window it was asked for.
    struct StubApi {
        events: Result<Vec<RemoteEvent>, fn() -> ApiError>,
        insert: Result<&'static str, fn() -> ApiError>,
        window: Mutex<Option<(DateTime<Utc>, DateTime<Utc>)>>,
    }

    impl StubApi {
        fn listing(events: Vec<RemoteEvent>) -> Self {
            Self { events: Ok(events), insert: Ok("evt_new"), window: Mutex::new(None) }
        }

        fn failing(error: fn() -> ApiError) -> Self {
            Self { events: Err(error), insert: Err(error), window: Mutex::new(None) }
        }
    }

    #[async_trait]
    impl CalendarApi for StubApi {
        async fn list_events(
            &self,
            _calendar_id: &str,
            time_min: DateTime<Utc>,
            time_max: DateTime<Utc>,
        ) -> Result<Vec<RemoteEvent>, ApiError> {
            *self.window.lock().unwrap() = Some((time_min, time_max));
            match &self.events {
                Ok(events) => Ok(events.clone()),
                Err(make) => Err(make()),
            }
        }

        async fn insert_event(
            &self,
            _calendar_id: &str,
            _event: &ReservationEvent,
        ) -> Result<CreatedEventInfo, ApiError> {
            match &self.insert {
                Ok(id) => Ok(CreatedEventInfo { id: id.to_string(), html_link: None }),
                Err(make) => Err(make()),
            }
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn reservation() -> ReservationEvent {
        ReservationEvent {
            title: "Reservation".to_string(),
            description: String::new(),
            location: String::new(),
            color_id: None,
            start: Chicago.with_ymd_and_hms(2025, 6, 20, 10, 0, 0).unwrap(),
            end: Chicago.with_ymd_and_hms(2025, 6, 20, 13, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn query_window_spans_local_midnights() {
        let api = Arc::new(StubApi::listing(vec![]));
        let adapter = ExternalCalendarAdapter::new(api.clone(), "primary", Chicago);

        adapter.fetch_busy_intervals(DateRange::new(date(1), date(3))).await.unwrap();

        let (time_min, time_max) = api.window.lock().unwrap().unwrap();
        assert_eq!(time_min, Utc.with_ymd_and_hms(2025, 6, 1, 5, 0, 0).unwrap());
        assert_eq!(time_max, Utc.with_ymd_and_hms(2025, 6, 4, 5, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn all_day_events_become_whole_day_intervals() {
        let api = Arc::new(StubApi::listing(vec![RemoteEvent {
            id: Some("holiday".to_string()),
            start: EventTime::Date(date(2)),
            end: EventTime::Date(date(3)),
        }]));
        let adapter = ExternalCalendarAdapter::new(api, "primary", Chicago);

        let intervals = adapter
            .fetch_busy_intervals(DateRange::new(date(1), date(3)))
            .await
            .unwrap();

        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].local_date(Chicago), date(2));
        assert_eq!(intervals[0].minutes_on_start_date(Chicago), (0, 24 * 60));
    }

    #[tokio::test]
    async fn unauthorized_listing_disables_both_directions() {
        let adapter = ExternalCalendarAdapter::new(
            Arc::new(StubApi::failing(|| ApiError::AuthenticationFailed)),
            "primary",
            Chicago,
        );

        let result = adapter.fetch_busy_intervals(DateRange::single(date(1))).await;

        assert!(matches!(result, Err(SourceError::Unavailable(_))));
        assert!(!adapter.is_authenticated());
        assert_eq!(
            adapter.create_event(&reservation()).await,
            Err(CalendarWriteError::AuthRequired)
        );
    }

    #[tokio::test]
    async fn transient_failure_keeps_adapter_authenticated() {
        let adapter = ExternalCalendarAdapter::new(
            Arc::new(StubApi::failing(|| ApiError::RateLimited)),
            "primary",
            Chicago,
        );

        let result = adapter.create_event(&reservation()).await;

        assert!(matches!(result, Err(CalendarWriteError::EventCreationFailed(_))));
        assert!(adapter.is_authenticated());
    }

    #[tokio::test]
    async fn created_event_id_is_returned() {
        let adapter = ExternalCalendarAdapter::new(Arc::new(StubApi::listing(vec![])), "primary", Chicago);

        assert_eq!(adapter.create_event(&reservation()).await, Ok("evt_new".to_string()));
    }
}
