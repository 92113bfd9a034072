pub mod month;
pub mod time_slots;
