use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::booking::{build_availability, AvailabilityMap, BusyInterval, DateRange, SlotCatalog};
use crate::source::{AvailabilitySource, SourceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityOrigin {
    External,
    Mock,
}

impl fmt::Display for AvailabilityOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailabilityOrigin::External => f.write_str("calendar"),
            AvailabilityOrigin::Mock => f.write_str("sample data"),
        }
    }
}

/// Result of one load. `ticket` orders loads by when they were started.
#[derive(Debug, Clone)]
pub struct AvailabilitySnapshot {
    pub ticket: u64,
    pub range: DateRange,
    pub map: AvailabilityMap,
    pub origin: AvailabilityOrigin,
    pub warning: Option<String>,
}

/// Queries the primary source, falling back to the mock generator when it
/// is missing, fails, or does not answer in time.
pub struct AvailabilityLoader {
    primary: Option<Arc<dyn AvailabilitySource>>,
    fallback: Arc<dyn AvailabilitySource>,
    catalog: SlotCatalog,
    tz: Tz,
    timeout: Duration,
    window_days: u32,
    next_ticket: AtomicU64,
}

impl AvailabilityLoader {
    pub fn new(
        primary: Option<Arc<dyn AvailabilitySource>>,
        fallback: Arc<dyn AvailabilitySource>,
        catalog: SlotCatalog,
        tz: Tz,
    ) -> Self {
        Self {
            primary,
            fallback,
            catalog,
            tz,
            timeout: Duration::from_secs(5),
            window_days: 90,
            next_ticket: AtomicU64::new(1),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_window_days(mut self, window_days: u32) -> Self {
        self.window_days = window_days.max(1);
        self
    }

    pub fn catalog(&self) -> &SlotCatalog {
        &self.catalog
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn has_external_source(&self) -> bool {
        self.primary.is_some()
    }

    /// Rolling query window starting today.
    pub fn window_from(&self, today: NaiveDate) -> DateRange {
        DateRange::rolling(today, self.window_days)
    }

    /// Reserves the ticket for a load about to start.
    pub fn begin(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst)
    }

    pub async fn load(&self, range: DateRange) -> AvailabilitySnapshot {
        let ticket = self.begin();
        self.load_with_ticket(ticket, range).await
    }

    pub async fn load_with_ticket(&self, ticket: u64, range: DateRange) -> AvailabilitySnapshot {
        let mut warning = None;

        if let Some(primary) = &self.primary {
            match self.fetch_bounded(primary.as_ref(), range).await {
                Ok(intervals) => {
                    tracing::info!(
                        "Loaded {} busy intervals from calendar (ticket {})",
                        intervals.len(),
                        ticket
                    );
                    return self.snapshot(ticket, range, &intervals, AvailabilityOrigin::External, None);
                }
                Err(e) => {
                    tracing::warn!("Calendar availability unavailable, using sample data: {}", e);
                    warning = Some(format!("{}. Showing sample availability.", e));
                }
            }
        }

        // The generator never fails; an error here still yields an open map.
        let intervals = match self.fallback.fetch_busy_intervals(range).await {
            Ok(intervals) => intervals,
            Err(e) => {
                tracing::error!("Mock availability failed: {}", e);
                Vec::new()
            }
        };

        self.snapshot(ticket, range, &intervals, AvailabilityOrigin::Mock, warning)
    }

    async fn fetch_bounded(
        &self,
        source: &dyn AvailabilitySource,
        range: DateRange,
    ) -> Result<Vec<BusyInterval>, SourceError> {
        match tokio::time::timeout(self.timeout, source.fetch_busy_intervals(range)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Unavailable(format!(
                "calendar did not respond within {}s",
                self.timeout.as_secs()
            ))),
        }
    }

    fn snapshot(
        &self,
        ticket: u64,
        range: DateRange,
        intervals: &[BusyInterval],
        origin: AvailabilityOrigin,
        warning: Option<String>,
    ) -> AvailabilitySnapshot {
        AvailabilitySnapshot {
            ticket,
            range,
            map: build_availability(intervals, range, &self.catalog, self.tz),
            origin,
            warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::SlotKey;
    use crate::source::{MockAvailabilitySource, MockGenerator, MockProfile};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use chrono_tz::America::Chicago;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn june_week() -> DateRange {
        DateRange::new(date(1), date(7))
    }

    fn all_open_fallback() -> Arc<dyn AvailabilitySource> {
        let profile = MockProfile { weekday: vec![1.0], weekend: vec![1.0], fully_booked: 0.0 };
        Arc::new(MockGenerator::new(SlotCatalog::standard(), Chicago, profile, Some(1)))
    }

    fn morning_busy(day: u32) -> BusyInterval {
        BusyInterval::new(
            Chicago.with_ymd_and_hms(2025, 6, day, 11, 0, 0).unwrap().with_timezone(&Utc),
            Chicago.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap().with_timezone(&Utc),
        )
    }

    fn loader(primary: Option<Arc<dyn AvailabilitySource>>) -> AvailabilityLoader {
        AvailabilityLoader::new(primary, all_open_fallback(), SlotCatalog::standard(), Chicago)
            .with_timeout(Duration::from_millis(200))
    }

    struct SlowSource;

    #[async_trait]
    impl AvailabilitySource for SlowSource {
        async fn fetch_busy_intervals(&self, _range: DateRange) -> Result<Vec<BusyInterval>, SourceError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![morning_busy(3)])
        }
    }

    #[tokio::test]
    async fn external_intervals_mark_slots_booked() {
        let mut source = MockAvailabilitySource::new();
        source.expect_fetch_busy_intervals()
            .times(1)
            .returning(|_| Ok(vec![morning_busy(3)]));

        let snapshot = loader(Some(Arc::new(source))).load(june_week()).await;

        assert_eq!(snapshot.origin, AvailabilityOrigin::External);
        assert!(snapshot.warning.is_none());
        assert!(!snapshot.map.is_slot_available(date(3), &SlotKey::new("10:00-13:00")));
        assert!(snapshot.map.is_slot_available(date(3), &SlotKey::new("14:00-17:00")));
    }

    #[tokio::test]
    async fn rejected_external_call_falls_back_with_warning() {
        let mut source = MockAvailabilitySource::new();
        source.expect_fetch_busy_intervals()
            .returning(|_| Err(SourceError::Unavailable("offline".to_string())));

        let snapshot = loader(Some(Arc::new(source))).load(june_week()).await;

        assert_eq!(snapshot.origin, AvailabilityOrigin::Mock);
        assert!(snapshot.warning.as_deref().unwrap_or_default().contains("offline"));
        assert_eq!(snapshot.map.len(), 7);
        for (_, day) in snapshot.map.iter() {
            assert_eq!(day.total(), 3);
        }
    }

    #[tokio::test]
    async fn missing_integration_uses_mock_without_warning() {
        let snapshot = loader(None).load(june_week()).await;

        assert_eq!(snapshot.origin, AvailabilityOrigin::Mock);
        assert!(snapshot.warning.is_none());
    }

    #[tokio::test]
    async fn slow_calendar_times_out_into_fallback() {
        let snapshot = loader(Some(Arc::new(SlowSource))).load(june_week()).await;

        assert_eq!(snapshot.origin, AvailabilityOrigin::Mock);
        assert!(snapshot.warning.is_some());
        assert!(snapshot.map.is_date_available(date(3)));
    }

    #[tokio::test]
    async fn tickets_increase_with_each_load() {
        let loader = loader(None);

        let first = loader.load(june_week()).await;
        let second = loader.load(june_week()).await;

        assert!(second.ticket > first.ticket);
    }

    #[test]
    fn window_starts_today_and_spans_configured_days() {
        let loader = loader(None).with_window_days(90);

        let window = loader.window_from(date(1));

        assert_eq!(window.start, date(1));
        assert_eq!(window.days(), 89);
    }
}
