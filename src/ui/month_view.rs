use chrono::{Datelike, Days, NaiveDate};

use crate::app::AppState;
use crate::booking::AvailabilitySummary;

pub const GRID_CELLS: usize = 42;

#[derive(Debug, Clone, PartialEq)]
pub struct MonthLayout {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Week>,
}

impl MonthLayout {
    pub fn cells(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flat_map(|w| &w.days)
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell> {
        self.cells().find(|c| c.date == date)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Week {
    pub days: Vec<DayCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub is_cursor: bool,
    pub is_available: bool,
    /// Only present for in-month dates the loaded window covers.
    pub summary: Option<AvailabilitySummary>,
}

/// First cell of the grid: the Sunday on or before the 1st.
pub fn grid_start(first_of_month: NaiveDate) -> NaiveDate {
    let back = u64::from(first_of_month.weekday().num_days_from_sunday());
    first_of_month
        .checked_sub_days(Days::new(back))
        .unwrap_or(first_of_month)
}

/// Six Sunday-first weeks around the displayed month.
pub fn calculate_layout(state: &AppState) -> MonthLayout {
    let year = state.view.displayed_year;
    let month = state.view.displayed_month;

    let Some(first) = state.view.first_of_month() else {
        return MonthLayout { year, month, weeks: Vec::new() };
    };

    let cells: Vec<DayCell> = grid_start(first)
        .iter_days()
        .take(GRID_CELLS)
        .map(|date| {
            let in_month = date.month() == month && date.year() == year;
            DayCell {
                date,
                is_current_month: in_month,
                is_today: date == state.today,
                is_selected: state.view.selected_date == Some(date),
                is_cursor: date == state.cursor,
                is_available: state.is_bookable(date),
                summary: if in_month { state.availability.map.summary(date) } else { None },
            }
        })
        .collect();

    let weeks = cells
        .chunks(7)
        .map(|days| Week { days: days.to_vec() })
        .collect();

    MonthLayout { year, month, weeks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::{build_availability, BusyInterval, DateRange, SlotCatalog};
    use crate::source::{AvailabilityOrigin, AvailabilitySnapshot};
    use chrono::{TimeZone, Utc, Weekday};
    use chrono_tz::America::Chicago;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn state_with_busy(today: NaiveDate, busy: &[BusyInterval]) -> AppState {
        let catalog = SlotCatalog::standard();
        let range = DateRange::rolling(today, 60);
        let mut state = AppState::new(today, catalog.clone());
        state.apply_snapshot(AvailabilitySnapshot {
            ticket: 1,
            range,
            map: build_availability(busy, range, &catalog, Chicago),
            origin: AvailabilityOrigin::External,
            warning: None,
        });
        state
    }

    #[test]
    fn grid_always_has_forty_two_cells() {
        for month in 1..=12 {
            let mut state = state_with_busy(date(2025, 1, 1), &[]);
            state.view.displayed_month = month;

            let layout = calculate_layout(&state);

            assert_eq!(layout.cells().count(), GRID_CELLS);
            assert!(layout.weeks.iter().all(|w| w.days.len() == 7));
        }
    }

    #[test]
    fn grid_starts_on_the_sunday_before_the_first() {
        // 2025-07-01 is a Tuesday.
        let state = state_with_busy(date(2025, 7, 1), &[]);

        let layout = calculate_layout(&state);
        let first = &layout.weeks[0].days[0];

        assert_eq!(first.date, date(2025, 6, 29));
        assert_eq!(first.date.weekday(), Weekday::Sun);
        assert!(!first.is_current_month);
    }

    #[test]
    fn month_starting_on_sunday_begins_with_the_first() {
        assert_eq!(grid_start(date(2025, 6, 1)), date(2025, 6, 1));
    }

    #[test]
    fn past_dates_are_unavailable() {
        let state = state_with_busy(date(2025, 7, 10), &[]);

        let layout = calculate_layout(&state);

        assert!(!layout.cell(date(2025, 7, 9)).unwrap().is_available);
        assert!(layout.cell(date(2025, 7, 10)).unwrap().is_available);
    }

    #[test]
    fn fully_booked_day_is_unavailable_with_summary() {
        let booked = BusyInterval::new(
            Chicago.with_ymd_and_hms(2025, 7, 15, 9, 0, 0).unwrap().with_timezone(&Utc),
            Chicago.with_ymd_and_hms(2025, 7, 15, 22, 0, 0).unwrap().with_timezone(&Utc),
        );
        let state = state_with_busy(date(2025, 7, 1), &[booked]);

        let cell = calculate_layout(&state).cell(date(2025, 7, 15)).cloned().unwrap();

        assert!(!cell.is_available);
        assert_eq!(cell.summary, Some(AvailabilitySummary::FullyBooked));
    }

    #[test]
    fn partially_booked_day_reports_open_slot_count() {
        let lunch = BusyInterval::new(
            Chicago.with_ymd_and_hms(2025, 7, 16, 11, 0, 0).unwrap().with_timezone(&Utc),
            Chicago.with_ymd_and_hms(2025, 7, 16, 12, 0, 0).unwrap().with_timezone(&Utc),
        );
        let state = state_with_busy(date(2025, 7, 1), &[lunch]);

        let cell = calculate_layout(&state).cell(date(2025, 7, 16)).cloned().unwrap();

        assert!(cell.is_available);
        assert_eq!(cell.summary.map(|s| s.to_string()).as_deref(), Some("2 Slots Available"));
    }

    #[test]
    fn out_of_month_cells_carry_no_summary() {
        let state = state_with_busy(date(2025, 7, 1), &[]);

        let layout = calculate_layout(&state);

        assert!(layout.cells().filter(|c| !c.is_current_month).all(|c| c.summary.is_none()));
    }

    #[test]
    fn today_selection_and_cursor_are_marked() {
        let mut state = state_with_busy(date(2025, 7, 1), &[]);
        state.jump_to(date(2025, 7, 20));
        state.select_cursor_date();
        state.move_cursor_days(1);

        let layout = calculate_layout(&state);

        assert!(layout.cell(date(2025, 7, 1)).unwrap().is_today);
        assert!(layout.cell(date(2025, 7, 20)).unwrap().is_selected);
        assert!(layout.cell(date(2025, 7, 21)).unwrap().is_cursor);
        assert_eq!(layout.cells().filter(|c| c.is_selected).count(), 1);
    }
}
