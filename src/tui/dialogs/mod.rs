pub mod booking_form;
pub mod fallback_message;
pub mod help;

use ratatui::layout::Rect;

/// Fixed-size popup centred in `area`, shrunk to fit small terminals.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
