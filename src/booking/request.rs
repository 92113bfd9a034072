use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::booking::slots::TimeSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormType {
    Party,
    Reservation,
    Contact,
    Waiver,
    Partnership,
    /// Any other website form.
    General,
}

impl FormType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::Party => "party",
            FormType::Reservation => "reservation",
            FormType::Contact => "contact",
            FormType::Waiver => "waiver",
            FormType::Partnership => "partnership",
            FormType::General => "general",
        }
    }

    pub fn all() -> [FormType; 6] {
        [
            FormType::Party,
            FormType::Reservation,
            FormType::Contact,
            FormType::Waiver,
            FormType::Partnership,
            FormType::General,
        ]
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormType::all()
            .into_iter()
            .find(|form| form.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown form type '{}'", s))
    }
}

/// Contact fields collected by the reservation form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub guests: String,
    pub reservation_type: String,
    pub notes: String,
}

impl ContactDetails {
    /// First required field that is blank or malformed, as a user-facing message.
    pub fn missing_required(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            return Some("Please enter your name");
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Some("Please enter your email");
        }
        if !email.contains('@') {
            return Some("Please enter a valid email address");
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub reference: Uuid,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub contact: ContactDetails,
    pub external_event_id: Option<String>,
}

impl BookingRequest {
    pub fn new(date: NaiveDate, slot: TimeSlot, contact: ContactDetails) -> Self {
        Self {
            reference: Uuid::new_v4(),
            date,
            slot,
            contact,
            external_event_id: None,
        }
    }

    /// Flattened form fields handed to the notification sink.
    pub fn to_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        fields.insert("reference".to_string(), self.reference.to_string());
        fields.insert("selectedDate".to_string(), self.date.format("%Y-%m-%d").to_string());
        fields.insert("selectedTime".to_string(), self.slot.key().to_string());
        fields.insert("timeLabel".to_string(), self.slot.label.clone());

        let contact = [
            ("name", &self.contact.name),
            ("email", &self.contact.email),
            ("phone", &self.contact.phone),
            ("guests", &self.contact.guests),
            ("type", &self.contact.reservation_type),
            ("notes", &self.contact.notes),
        ];
        for (key, value) in contact {
            if !value.trim().is_empty() {
                fields.insert(key.to_string(), value.trim().to_string());
            }
        }

        if let Some(id) = &self.external_event_id {
            fields.insert("googleEventId".to_string(), id.clone());
        }

        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::slots::SlotCatalog;

    #[test]
    fn contact_requires_name_and_email() {
        let mut contact = ContactDetails::default();
        assert_eq!(contact.missing_required(), Some("Please enter your name"));

        contact.name = "Ada".to_string();
        assert_eq!(contact.missing_required(), Some("Please enter your email"));

        contact.email = "ada.example.com".to_string();
        assert_eq!(contact.missing_required(), Some("Please enter a valid email address"));

        contact.email = " ada@example.com ".to_string();
        assert_eq!(contact.missing_required(), None);
    }

    fn sample_request() -> BookingRequest {
        let slot = SlotCatalog::standard().slots()[1].clone();
        BookingRequest::new(
            NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
            slot,
            ContactDetails {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                guests: "4".to_string(),
                ..ContactDetails::default()
            },
        )
    }

    #[test]
    fn form_type_parses_case_insensitively() {
        assert_eq!("Party".parse::<FormType>(), Ok(FormType::Party));
        assert_eq!("waiver".parse::<FormType>(), Ok(FormType::Waiver));
        assert!("newsletter".parse::<FormType>().is_err());
    }

    #[test]
    fn fields_include_selection_and_contact() {
        let fields = sample_request().to_fields();

        assert_eq!(fields.get("selectedDate").map(String::as_str), Some("2025-07-04"));
        assert_eq!(fields.get("selectedTime").map(String::as_str), Some("14:00-17:00"));
        assert_eq!(fields.get("name").map(String::as_str), Some("Ada"));
        assert_eq!(fields.get("guests").map(String::as_str), Some("4"));
    }

    #[test]
    fn blank_contact_fields_are_omitted() {
        let fields = sample_request().to_fields();
        assert!(!fields.contains_key("phone"));
        assert!(!fields.contains_key("notes"));
    }

    #[test]
    fn external_event_id_is_forwarded_when_present() {
        let mut request = sample_request();
        assert!(!request.to_fields().contains_key("googleEventId"));

        request.external_event_id = Some("evt_123".to_string());
        assert_eq!(
            request.to_fields().get("googleEventId").map(String::as_str),
            Some("evt_123")
        );
    }
}
