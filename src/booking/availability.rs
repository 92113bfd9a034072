use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::booking::busy::BusyInterval;
use crate::booking::range::DateRange;
use crate::booking::slots::{SlotCatalog, SlotKey};

/// Bookability of every catalog slot on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAvailability {
    slots: BTreeMap<SlotKey, bool>,
}

impl DayAvailability {
    pub fn all_available(catalog: &SlotCatalog) -> Self {
        Self {
            slots: catalog.keys().map(|key| (key, true)).collect(),
        }
    }

    pub fn fully_booked(catalog: &SlotCatalog) -> Self {
        Self {
            slots: catalog.keys().map(|key| (key, false)).collect(),
        }
    }

    pub fn is_available(&self, key: &SlotKey) -> bool {
        self.slots.get(key).copied().unwrap_or(false)
    }

    /// Slots never flip back to available once marked.
    pub fn mark_unavailable(&mut self, key: &SlotKey) {
        if let Some(available) = self.slots.get_mut(key) {
            *available = false;
        }
    }

    pub fn available_count(&self) -> usize {
        self.slots.values().filter(|available| **available).count()
    }

    pub fn total(&self) -> usize {
        self.slots.len()
    }

    pub fn has_any_available(&self) -> bool {
        self.available_count() > 0
    }

    pub fn keys(&self) -> impl Iterator<Item = &SlotKey> {
        self.slots.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, bool)> {
        self.slots.iter().map(|(key, available)| (key, *available))
    }

    pub fn summary(&self) -> AvailabilitySummary {
        match self.available_count() {
            0 => AvailabilitySummary::FullyBooked,
            n if n == self.total() => AvailabilitySummary::AllAvailable,
            n => AvailabilitySummary::Partial(n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilitySummary {
    FullyBooked,
    AllAvailable,
    Partial(usize),
}

impl fmt::Display for AvailabilitySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailabilitySummary::FullyBooked => write!(f, "Fully Booked"),
            AvailabilitySummary::AllAvailable => write!(f, "All Slots Available"),
            AvailabilitySummary::Partial(n) => write!(f, "{} Slots Available", n),
        }
    }
}

/// Per-date availability for a query window. Dates outside the map read
/// as fully unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityMap {
    days: BTreeMap<NaiveDate, DayAvailability>,
}

impl AvailabilityMap {
    pub fn all_available(range: DateRange, catalog: &SlotCatalog) -> Self {
        Self {
            days: range
                .dates()
                .map(|date| (date, DayAvailability::all_available(catalog)))
                .collect(),
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DayAvailability> {
        self.days.get(&date)
    }

    pub fn get_mut(&mut self, date: NaiveDate) -> Option<&mut DayAvailability> {
        self.days.get_mut(&date)
    }

    pub fn is_date_available(&self, date: NaiveDate) -> bool {
        self.get(date).is_some_and(DayAvailability::has_any_available)
    }

    pub fn is_slot_available(&self, date: NaiveDate, key: &SlotKey) -> bool {
        self.get(date).is_some_and(|day| day.is_available(key))
    }

    pub fn summary(&self, date: NaiveDate) -> Option<AvailabilitySummary> {
        self.get(date).map(DayAvailability::summary)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &DayAvailability)> {
        self.days.iter().map(|(date, day)| (*date, day))
    }

    /// Blocks every slot the interval touches on its start date.
    pub fn mark_busy(&mut self, interval: &BusyInterval, catalog: &SlotCatalog, tz: Tz) {
        let Some(day) = self.days.get_mut(&interval.local_date(tz)) else {
            return;
        };

        for slot in catalog.slots() {
            if interval.overlaps_slot(slot, tz) {
                day.mark_unavailable(&slot.key());
            }
        }
    }
}

pub fn build_availability(
    intervals: &[BusyInterval],
    range: DateRange,
    catalog: &SlotCatalog,
    tz: Tz,
) -> AvailabilityMap {
    let mut availability = AvailabilityMap::all_available(range, catalog);
    for interval in intervals {
        availability.mark_busy(interval, catalog, tz);
    }
    availability
}
