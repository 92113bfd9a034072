use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::booking::slots::{minutes_of_day, TimeSlot};

const END_OF_DAY_MINUTES: u32 = 24 * 60;

/// Venue wall-clock time as an instant. Ambiguous times take the earlier
/// instant; times inside a DST gap have none.
pub fn local_instant(tz: Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_time(time)).earliest()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whole venue day, for all-day events that only carry a date.
    pub fn all_day(date: NaiveDate, tz: Tz) -> Option<Self> {
        let start = local_instant(tz, date, NaiveTime::MIN)?;
        let next = date.succ_opt()?;
        let end = local_instant(tz, next, NaiveTime::MIN)?;
        Some(Self::new(start.with_timezone(&Utc), end.with_timezone(&Utc)))
    }

    /// Calendar date of the interval's start in the venue's zone.
    pub fn local_date(&self, tz: Tz) -> NaiveDate {
        self.start.with_timezone(&tz).date_naive()
    }

    /// Minutes-of-day span on the start date. An interval that runs past
    /// midnight is clipped to the end of its start date; later dates are
    /// never affected.
    pub fn minutes_on_start_date(&self, tz: Tz) -> (u32, u32) {
        let start = self.start.with_timezone(&tz);
        let end = self.end.with_timezone(&tz);

        let start_minutes = minutes_of_day(start.time());
        let end_minutes = if end.date_naive() > start.date_naive() {
            END_OF_DAY_MINUTES
        } else {
            minutes_of_day(end.time())
        };

        (start_minutes, end_minutes)
    }

    pub fn overlaps_slot(&self, slot: &TimeSlot, tz: Tz) -> bool {
        let (start, end) = self.minutes_on_start_date(tz);
        start < slot.end_minutes() && end > slot.start_minutes()
    }
}
