use chrono::{Datelike, Days, Months, NaiveDate};

use crate::booking::{
    AvailabilityMap, BusinessHours, ContactDetails, SlotCatalog, SlotKey, TimeSlot,
};
use crate::notify::ComposedMessage;
use crate::source::{AvailabilityOrigin, AvailabilitySnapshot};
use crate::submission::{SubmissionError, SubmissionReceipt};
use crate::ui::theme::Theme;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Normal,
    Insert,
    Command,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Loading,
    Ready(AvailabilityOrigin),
    Degraded(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// What the month view shows and what the user has picked.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarViewState {
    pub displayed_year: i32,
    /// 1..=12
    pub displayed_month: u32,
    pub selected_date: Option<NaiveDate>,
    pub selected_time: Option<SlotKey>,
}

impl CalendarViewState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            displayed_year: today.year(),
            displayed_month: today.month(),
            selected_date: None,
            selected_time: None,
        }
    }

    /// Moves the displayed month by `delta`, wrapping the year. Selection is untouched.
    pub fn navigate(&mut self, delta: i32) {
        let index = self.displayed_year * 12 + self.displayed_month as i32 - 1 + delta;
        self.displayed_year = index.div_euclid(12);
        self.displayed_month = index.rem_euclid(12) as u32 + 1;
    }

    pub fn show_month_of(&mut self, date: NaiveDate) {
        self.displayed_year = date.year();
        self.displayed_month = date.month();
    }

    pub fn first_of_month(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.displayed_year, self.displayed_month, 1)
    }

    pub fn select_date(&mut self, date: NaiveDate, availability: &AvailabilityMap, earliest: NaiveDate) -> bool {
        if date < earliest || !availability.is_date_available(date) {
            return false;
        }
        self.selected_date = Some(date);
        self.selected_time = None;
        true
    }

    pub fn select_time(&mut self, key: &SlotKey, availability: &AvailabilityMap) -> bool {
        let Some(date) = self.selected_date else {
            return false;
        };
        if !availability.is_slot_available(date, key) {
            return false;
        }
        self.selected_time = Some(key.clone());
        true
    }

    pub fn is_complete(&self) -> bool {
        self.selected_date.is_some() && self.selected_time.is_some()
    }

    pub fn reset_selection(&mut self) {
        self.selected_date = None;
        self.selected_time = None;
    }
}

/// Latest applied availability. Older loads that finish late are dropped.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityStore {
    pub map: AvailabilityMap,
    pub origin: Option<AvailabilityOrigin>,
    applied_ticket: u64,
}

impl AvailabilityStore {
    pub fn apply(&mut self, snapshot: AvailabilitySnapshot) -> bool {
        if snapshot.ticket <= self.applied_ticket {
            tracing::warn!(
                "Discarding stale availability (ticket {} <= {})",
                snapshot.ticket,
                self.applied_ticket
            );
            return false;
        }
        self.applied_ticket = snapshot.ticket;
        self.map = snapshot.map;
        self.origin = Some(snapshot.origin);
        true
    }

    pub fn applied_ticket(&self) -> u64 {
        self.applied_ticket
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum FormField {
    #[default]
    Name,
    Email,
    Phone,
    Guests,
    Type,
    Notes,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Email => "Email",
            FormField::Phone => "Phone",
            FormField::Guests => "Guests",
            FormField::Type => "Type",
            FormField::Notes => "Notes",
        }
    }

    pub fn all() -> [FormField; 6] {
        [
            FormField::Name,
            FormField::Email,
            FormField::Phone,
            FormField::Guests,
            FormField::Type,
            FormField::Notes,
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    pub contact: ContactDetails,
    pub active_field: FormField,
}

impl BookingForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_field(&mut self) {
        self.active_field = match self.active_field {
            FormField::Name => FormField::Email,
            FormField::Email => FormField::Phone,
            FormField::Phone => FormField::Guests,
            FormField::Guests => FormField::Type,
            FormField::Type => FormField::Notes,
            FormField::Notes => FormField::Name,
        };
    }

    pub fn prev_field(&mut self) {
        self.active_field = match self.active_field {
            FormField::Name => FormField::Notes,
            FormField::Email => FormField::Name,
            FormField::Phone => FormField::Email,
            FormField::Guests => FormField::Phone,
            FormField::Type => FormField::Guests,
            FormField::Notes => FormField::Type,
        };
    }

    pub fn value(&self, field: &FormField) -> &str {
        match field {
            FormField::Name => &self.contact.name,
            FormField::Email => &self.contact.email,
            FormField::Phone => &self.contact.phone,
            FormField::Guests => &self.contact.guests,
            FormField::Type => &self.contact.reservation_type,
            FormField::Notes => &self.contact.notes,
        }
    }

    pub fn active_value_mut(&mut self) -> &mut String {
        match self.active_field {
            FormField::Name => &mut self.contact.name,
            FormField::Email => &mut self.contact.email,
            FormField::Phone => &mut self.contact.phone,
            FormField::Guests => &mut self.contact.guests,
            FormField::Type => &mut self.contact.reservation_type,
            FormField::Notes => &mut self.contact.notes,
        }
    }
}

/// Follow-up the event loop must run after a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    None,
    Reload,
    Submit,
    Quit,
}

pub struct AppState {
    pub mode: Mode,
    pub today: NaiveDate,
    pub cursor: NaiveDate,
    pub view: CalendarViewState,
    pub availability: AvailabilityStore,
    pub catalog: SlotCatalog,
    pub business_hours: BusinessHours,
    pub min_advance_days: u32,
    pub status: LoadStatus,
    pub notice: Option<Notice>,
    pub command_buffer: String,
    pub show_help: bool,
    pub help_scroll: usize,
    pub theme: Theme,
    pub booking_form: Option<BookingForm>,
    pub fallback_message: Option<ComposedMessage>,
    pub submitting: bool,
}

impl AppState {
    pub fn new(today: NaiveDate, catalog: SlotCatalog) -> Self {
        Self {
            mode: Mode::Normal,
            today,
            cursor: today,
            view: CalendarViewState::new(today),
            availability: AvailabilityStore::default(),
            catalog,
            business_hours: BusinessHours::default(),
            min_advance_days: 0,
            status: LoadStatus::Loading,
            notice: None,
            command_buffer: String::new(),
            show_help: false,
            help_scroll: 0,
            theme: Theme::default(),
            booking_form: None,
            fallback_message: None,
            submitting: false,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_business_hours(mut self, business_hours: BusinessHours) -> Self {
        self.business_hours = business_hours;
        self
    }

    pub fn with_min_advance_days(mut self, days: u32) -> Self {
        self.min_advance_days = days;
        self
    }

    /// First date that may be booked.
    pub fn earliest_bookable(&self) -> NaiveDate {
        self.today
            .checked_add_days(Days::new(u64::from(self.min_advance_days)))
            .unwrap_or(self.today)
    }

    pub fn is_bookable(&self, date: NaiveDate) -> bool {
        date >= self.earliest_bookable() && self.availability.map.is_date_available(date)
    }

    pub fn selected_slot(&self) -> Option<&TimeSlot> {
        self.view.selected_time.as_ref().and_then(|key| self.catalog.find(key))
    }

    pub fn move_cursor_days(&mut self, days: i64) {
        let moved = if days >= 0 {
            self.cursor.checked_add_days(Days::new(days as u64))
        } else {
            self.cursor.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(date) = moved {
            self.cursor = date;
            self.view.show_month_of(date);
        }
    }

    /// Month navigation; the cursor follows to the same day, clamped.
    pub fn navigate_month(&mut self, delta: i32) {
        self.view.navigate(delta);
        let moved = if delta >= 0 {
            self.cursor.checked_add_months(Months::new(delta as u32))
        } else {
            self.cursor.checked_sub_months(Months::new(delta.unsigned_abs()))
        };
        if let Some(date) = moved {
            self.cursor = date;
        }
    }

    pub fn jump_to(&mut self, date: NaiveDate) {
        self.cursor = date;
        self.view.show_month_of(date);
    }

    pub fn select_cursor_date(&mut self) {
        let date = self.cursor;
        let earliest = self.earliest_bookable();
        if self.view.select_date(date, &self.availability.map, earliest) {
            self.notice = None;
        } else if date < earliest {
            self.notice = Some(Notice::Error(format!(
                "Reservations need {} days notice; the first open date is {}",
                self.min_advance_days,
                earliest.format("%b %d")
            )));
        } else {
            self.notice = Some(Notice::Error(format!(
                "{} is fully booked",
                date.format("%A, %b %d")
            )));
        }
    }

    /// Selects the `index`th slot (0-based) of the selected date.
    pub fn select_slot_index(&mut self, index: usize) {
        let Some(slot) = self.catalog.slots().get(index) else {
            return;
        };
        let key = slot.key();
        let label = slot.label.clone();

        if self.view.selected_date.is_none() {
            self.notice = Some(Notice::Error("Pick a date first".to_string()));
        } else if self.view.select_time(&key, &self.availability.map) {
            self.notice = None;
        } else {
            self.notice = Some(Notice::Error(format!("{} is already booked", label)));
        }
    }

    pub fn begin_loading(&mut self) {
        self.status = LoadStatus::Loading;
    }

    pub fn apply_snapshot(&mut self, snapshot: AvailabilitySnapshot) {
        let origin = snapshot.origin;
        let warning = snapshot.warning.clone();
        if !self.availability.apply(snapshot) {
            return;
        }

        self.status = match warning {
            Some(warning) => LoadStatus::Degraded(warning),
            None => LoadStatus::Ready(origin),
        };

        // A reload may have taken the picked slot.
        if let Some(date) = self.view.selected_date {
            if !self.is_bookable(date) {
                self.view.reset_selection();
            } else if let Some(key) = &self.view.selected_time
                && !self.availability.map.is_slot_available(date, key)
            {
                self.view.selected_time = None;
            }
        }
    }

    pub fn open_booking_form(&mut self) {
        if self.booking_form.is_none() {
            self.booking_form = Some(BookingForm::new());
        }
        self.mode = Mode::Insert;
    }

    pub fn close_booking_form(&mut self) {
        self.mode = Mode::Normal;
    }

    pub fn contact_details(&self) -> ContactDetails {
        self.booking_form
            .as_ref()
            .map(|form| form.contact.clone())
            .unwrap_or_default()
    }

    /// Folds a finished submission back into the view.
    pub fn apply_submission(&mut self, result: Result<SubmissionReceipt, SubmissionError>) -> FollowUp {
        self.submitting = false;

        match result {
            Ok(receipt) => {
                self.notice = Some(Notice::Info(format!(
                    "Reservation requested for {} {}",
                    receipt.request.date.format("%b %d"),
                    receipt.request.slot.label
                )));
                self.finish_booking();
                FollowUp::Reload
            }
            Err(SubmissionError::IncompleteSelection) => {
                self.notice = Some(Notice::Error(SubmissionError::IncompleteSelection.to_string()));
                FollowUp::None
            }
            Err(SubmissionError::ExternalBookingFailed(reason)) => {
                self.notice = Some(Notice::Error(format!(
                    "Could not reserve the slot ({}). Please try again.",
                    reason
                )));
                FollowUp::None
            }
            Err(SubmissionError::NotificationFailed { reason, message, event_id }) => {
                tracing::warn!("Showing manual fallback after notification failure: {}", reason);
                self.fallback_message = Some(*message);
                self.mode = Mode::Normal;
                if event_id.is_some() {
                    // The slot is already held on the calendar.
                    self.finish_booking();
                    FollowUp::Reload
                } else {
                    FollowUp::None
                }
            }
        }
    }

    fn finish_booking(&mut self) {
        self.view.reset_selection();
        self.booking_form = None;
        self.mode = Mode::Normal;
    }
}
