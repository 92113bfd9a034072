use crate::app::AppState;
use crate::booking::SlotKey;

#[derive(Debug, Clone, PartialEq)]
pub struct SlotRow {
    /// 1-based, matches the number key that picks it.
    pub shortcut: usize,
    pub key: SlotKey,
    pub label: String,
    pub is_available: bool,
    pub is_selected: bool,
    pub within_business_hours: bool,
}

impl SlotRow {
    pub fn status_text(&self) -> &'static str {
        if self.is_available { "Available" } else { "Booked" }
    }
}

/// Rows for the selected date; empty until a date is picked.
pub fn slot_rows(state: &AppState) -> Vec<SlotRow> {
    let Some(date) = state.view.selected_date else {
        return Vec::new();
    };

    state
        .catalog
        .slots()
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            let key = slot.key();
            SlotRow {
                shortcut: i + 1,
                is_available: state.availability.map.is_slot_available(date, &key),
                is_selected: state.view.selected_time.as_ref() == Some(&key),
                within_business_hours: state.business_hours.is_within_business_hours(date, slot),
                label: slot.label.clone(),
                key,
            }
        })
        .collect()
}
