use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("Slot catalog is empty")]
    Empty,
    #[error("Slot {0} ends before it starts")]
    Inverted(String),
    #[error("Slots {0} and {1} overlap")]
    Overlapping(String, String),
}

/// Identifies a slot within a day, formatted `HH:MM-HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotKey(String);

impl SlotKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub label: String,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: NaiveTime, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    pub fn key(&self) -> SlotKey {
        SlotKey(format!("{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M")))
    }

    pub fn start_minutes(&self) -> u32 {
        minutes_of_day(self.start)
    }

    pub fn end_minutes(&self) -> u32 {
        minutes_of_day(self.end)
    }
}

pub fn minutes_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Ordered, non-overlapping bookable windows of a single day.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotCatalog {
    slots: Vec<TimeSlot>,
}

impl SlotCatalog {
    pub fn new(mut slots: Vec<TimeSlot>) -> Result<Self, CatalogError> {
        if slots.is_empty() {
            return Err(CatalogError::Empty);
        }

        if let Some(slot) = slots.iter().find(|s| s.end <= s.start) {
            return Err(CatalogError::Inverted(slot.key().to_string()));
        }

        slots.sort_by_key(|s| s.start);
        for pair in slots.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(CatalogError::Overlapping(
                    pair[0].key().to_string(),
                    pair[1].key().to_string(),
                ));
            }
        }

        Ok(Self { slots })
    }

    /// The venue's three fixed 3-hour windows.
    pub fn standard() -> Self {
        Self {
            slots: standard_slots(),
        }
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = SlotKey> + '_ {
        self.slots.iter().map(TimeSlot::key)
    }

    pub fn find(&self, key: &SlotKey) -> Option<&TimeSlot> {
        self.slots.iter().find(|slot| &slot.key() == key)
    }
}

impl Default for SlotCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

pub fn standard_slots() -> Vec<TimeSlot> {
    vec![
        TimeSlot::new(hm(10, 0), hm(13, 0), "10:00 AM - 1:00 PM"),
        TimeSlot::new(hm(14, 0), hm(17, 0), "2:00 PM - 5:00 PM"),
        TimeSlot::new(hm(18, 0), hm(21, 0), "6:00 PM - 9:00 PM"),
    ]
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl OpeningHours {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessHours {
    pub sunday: OpeningHours,
    pub monday: OpeningHours,
    pub tuesday: OpeningHours,
    pub wednesday: OpeningHours,
    pub thursday: OpeningHours,
    pub friday: OpeningHours,
    pub saturday: OpeningHours,
}

impl BusinessHours {
    pub fn hours_for(&self, weekday: Weekday) -> &OpeningHours {
        match weekday {
            Weekday::Sun => &self.sunday,
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
        }
    }

    /// Lookup by weekday index, 0 = Sunday.
    pub fn hours_for_index(&self, index: u32) -> Option<&OpeningHours> {
        let weekday = match index {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            6 => Weekday::Sat,
            _ => return None,
        };
        Some(self.hours_for(weekday))
    }

    pub fn is_within_business_hours(&self, date: NaiveDate, slot: &TimeSlot) -> bool {
        let hours = self.hours_for(date.weekday());
        slot.start >= hours.start && slot.start < hours.end
    }
}

impl Default for BusinessHours {
    fn default() -> Self {
        let weekday = OpeningHours::new(hm(9, 0), hm(20, 0));
        Self {
            sunday: OpeningHours::new(hm(10, 0), hm(18, 0)),
            monday: weekday.clone(),
            tuesday: weekday.clone(),
            wednesday: weekday.clone(),
            thursday: weekday.clone(),
            friday: weekday.clone(),
            saturday: weekday,
        }
    }
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M").map_err(serde::de::Error::custom)
    }
}
