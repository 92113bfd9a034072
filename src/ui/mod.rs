pub mod month_view;
pub mod theme;
pub mod time_slots;

pub use month_view::{calculate_layout, DayCell, MonthLayout};
pub use theme::Theme;
pub use time_slots::{slot_rows, SlotRow};
