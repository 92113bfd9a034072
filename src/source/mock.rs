use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::booking::{local_instant, BusyInterval, DateRange, SlotCatalog, TimeSlot};
use crate::source::{AvailabilitySource, SourceError};

/// Per-slot chance of being open. Index `i` applies to the catalog's `i`th
/// slot; slots past the end reuse the last entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MockProfile {
    pub weekday: Vec<f64>,
    pub weekend: Vec<f64>,
    pub fully_booked: f64,
}

impl Default for MockProfile {
    fn default() -> Self {
        Self {
            weekday: vec![0.8, 0.9, 0.7],
            weekend: vec![0.7, 0.8, 0.6],
            fully_booked: 0.1,
        }
    }
}

impl MockProfile {
    fn open_probability(&self, date: NaiveDate, index: usize) -> f64 {
        let table = match date.weekday() {
            Weekday::Sat | Weekday::Sun => &self.weekend,
            _ => &self.weekday,
        };
        table
            .get(index)
            .or_else(|| table.last())
            .copied()
            .unwrap_or(1.0)
    }
}

fn chance(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

/// Pseudo-random availability for when no calendar is connected. The
/// generator draws per date, then per slot, in ascending order so a seed
/// always yields the same map for the same range.
pub struct MockGenerator {
    catalog: SlotCatalog,
    tz: Tz,
    profile: MockProfile,
    rng: Mutex<StdRng>,
}

impl MockGenerator {
    pub fn new(catalog: SlotCatalog, tz: Tz, profile: MockProfile, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            catalog,
            tz,
            profile,
            rng: Mutex::new(rng),
        }
    }

    fn slot_interval(&self, date: NaiveDate, slot: &TimeSlot) -> Option<BusyInterval> {
        let start = local_instant(self.tz, date, slot.start)?;
        let end = local_instant(self.tz, date, slot.end)?;
        Some(BusyInterval::new(start.with_timezone(&Utc), end.with_timezone(&Utc)))
    }

    fn generate(&self, range: DateRange) -> Vec<BusyInterval> {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut intervals = Vec::new();
        for date in range.dates() {
            let fully_booked = rng.gen_bool(chance(self.profile.fully_booked));

            for (index, slot) in self.catalog.slots().iter().enumerate() {
                let open = rng.gen_bool(chance(self.profile.open_probability(date, index)));
                if (fully_booked || !open)
                    && let Some(interval) = self.slot_interval(date, slot)
                {
                    intervals.push(interval);
                }
            }
        }
        intervals
    }
}

#[async_trait]
impl AvailabilitySource for MockGenerator {
    async fn fetch_busy_intervals(&self, range: DateRange) -> Result<Vec<BusyInterval>, SourceError> {
        let intervals = self.generate(range);
        tracing::debug!("Generated {} mock busy intervals", intervals.len());
        Ok(intervals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::build_availability;
    use chrono_tz::America::Chicago;
    use pretty_assertions::assert_eq;

    fn june() -> DateRange {
        DateRange::rolling(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(), 30)
    }

    fn source(profile: MockProfile, seed: u64) -> MockGenerator {
        MockGenerator::new(SlotCatalog::standard(), Chicago, profile, Some(seed))
    }

    #[tokio::test]
    async fn same_seed_produces_same_availability() {
        let first = source(MockProfile::default(), 7).fetch_busy_intervals(june()).await.unwrap();
        let second = source(MockProfile::default(), 7).fetch_busy_intervals(june()).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn certain_profile_leaves_everything_open() {
        let profile = MockProfile { weekday: vec![1.0], weekend: vec![1.0], fully_booked: 0.0 };

        let intervals = source(profile, 1).fetch_busy_intervals(june()).await.unwrap();

        assert!(intervals.is_empty());
    }

    #[tokio::test]
    async fn fully_booked_draw_closes_every_slot() {
        let profile = MockProfile { fully_booked: 1.0, ..MockProfile::default() };
        let catalog = SlotCatalog::standard();

        let intervals = source(profile, 3).fetch_busy_intervals(june()).await.unwrap();
        let map = build_availability(&intervals, june(), &catalog, Chicago);

        assert_eq!(map.len(), 30);
        assert!(map.dates().all(|date| !map.is_date_available(date)));
    }

    #[tokio::test]
    async fn mock_output_has_the_same_key_structure_as_the_catalog() {
        let catalog = SlotCatalog::standard();
        let intervals = source(MockProfile::default(), 11).fetch_busy_intervals(june()).await.unwrap();
        let map = build_availability(&intervals, june(), &catalog, Chicago);

        let expected: Vec<_> = catalog.keys().collect();
        for (_, day) in map.iter() {
            assert_eq!(day.keys().cloned().collect::<Vec<_>>(), expected);
        }
    }

    #[test]
    fn weekend_dates_use_weekend_probabilities() {
        let profile = MockProfile::default();
        let saturday = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();

        assert_eq!(profile.open_probability(saturday, 0), 0.7);
        assert_eq!(profile.open_probability(monday, 1), 0.9);
        assert_eq!(profile.open_probability(monday, 7), 0.7);
    }

    #[test]
    fn out_of_range_probabilities_are_clamped() {
        assert_eq!(chance(1.5), 1.0);
        assert_eq!(chance(-0.2), 0.0);
        assert_eq!(chance(f64::NAN), 0.0);
    }
}
