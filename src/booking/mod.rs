pub mod availability;
pub mod busy;
pub mod range;
pub mod request;
pub mod slots;

pub use availability::{build_availability, AvailabilityMap, AvailabilitySummary, DayAvailability};
pub use busy::{local_instant, BusyInterval};
pub use range::DateRange;
pub use request::{BookingRequest, ContactDetails, FormType};
pub use slots::{BusinessHours, OpeningHours, SlotCatalog, SlotKey, TimeSlot};
