pub mod app;
pub mod booking;
pub mod input;
pub mod notify;
pub mod services;
pub mod source;
pub mod storage;
pub mod submission;
pub mod ui;

pub use app::{AppState, CalendarViewState, FollowUp, Mode};
pub use booking::{AvailabilityMap, BusyInterval, DateRange, SlotCatalog, TimeSlot};
pub use submission::{BookingFlow, SubmissionError, SubmissionReceipt};
