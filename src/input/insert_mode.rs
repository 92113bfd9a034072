use crossterm::event::KeyCode;

use crate::app::{AppState, FollowUp, FormField, Notice};

const MAX_GUEST_DIGITS: usize = 3;

/// Booking form editing. Enter asks the loop to submit; it stays disabled
/// until a date, a slot, a name and an email are present, and while a
/// submission runs.
pub fn handle_key(key: KeyCode, state: &mut AppState) -> FollowUp {
    if state.submitting {
        return FollowUp::None;
    }

    match key {
        KeyCode::Esc => {
            state.close_booking_form();
            return FollowUp::None;
        }
        KeyCode::Enter => {
            if !state.view.is_complete() {
                state.notice = Some(Notice::Error("Please select a date and a time slot".to_string()));
                return FollowUp::None;
            }
            if let Some(problem) = state.contact_details().missing_required() {
                state.notice = Some(Notice::Error(problem.to_string()));
                return FollowUp::None;
            }
            state.submitting = true;
            state.notice = Some(Notice::Info("Submitting reservation...".to_string()));
            return FollowUp::Submit;
        }
        _ => {}
    }

    let Some(form) = state.booking_form.as_mut() else {
        return FollowUp::None;
    };

    match key {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Backspace => {
            form.active_value_mut().pop();
        }
        KeyCode::Char(c) => {
            if form.active_field == FormField::Guests {
                let guests = form.active_value_mut();
                if c.is_ascii_digit() && guests.len() < MAX_GUEST_DIGITS {
                    guests.push(c);
                }
            } else {
                form.active_value_mut().push(c);
            }
        }
        _ => {}
    }
    FollowUp::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Mode;
    use crate::booking::{SlotCatalog, SlotKey};
    use chrono::NaiveDate;

    fn setup_state_with_form() -> AppState {
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let mut state = AppState::new(today, SlotCatalog::standard());
        state.view.selected_date = Some(today);
        state.view.selected_time = Some(SlotKey::new("10:00-13:00"));
        state.open_booking_form();
        state
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key(KeyCode::Char(c), state);
        }
    }

    #[test]
    fn typing_fills_the_active_field() {
        let mut state = setup_state_with_form();

        type_text(&mut state, "Ada");
        handle_key(KeyCode::Tab, &mut state);
        type_text(&mut state, "ada@example.com");

        let contact = state.contact_details();
        assert_eq!(contact.name, "Ada");
        assert_eq!(contact.email, "ada@example.com");
    }

    #[test]
    fn backspace_removes_last_char() {
        let mut state = setup_state_with_form();
        type_text(&mut state, "Adam");

        handle_key(KeyCode::Backspace, &mut state);

        assert_eq!(state.contact_details().name, "Ada");
    }

    #[test]
    fn back_tab_wraps_to_notes() {
        let mut state = setup_state_with_form();

        handle_key(KeyCode::BackTab, &mut state);

        assert_eq!(state.booking_form.as_ref().unwrap().active_field, FormField::Notes);
    }

    #[test]
    fn guests_field_accepts_only_short_numbers() {
        let mut state = setup_state_with_form();
        for _ in 0..3 {
            handle_key(KeyCode::Tab, &mut state);
        }

        type_text(&mut state, "1x2345");

        assert_eq!(state.contact_details().guests, "123");
    }

    fn fill_required_contact(state: &mut AppState) {
        type_text(state, "Ada");
        handle_key(KeyCode::Tab, state);
        type_text(state, "ada@example.com");
    }

    #[test]
    fn enter_with_complete_selection_submits_once() {
        let mut state = setup_state_with_form();
        fill_required_contact(&mut state);

        assert_eq!(handle_key(KeyCode::Enter, &mut state), FollowUp::Submit);
        assert_eq!(handle_key(KeyCode::Enter, &mut state), FollowUp::None);
        assert!(state.submitting);
    }

    #[test]
    fn enter_with_blank_contact_is_refused() {
        let mut state = setup_state_with_form();

        assert_eq!(handle_key(KeyCode::Enter, &mut state), FollowUp::None);
        assert!(!state.submitting);
        assert_eq!(state.notice, Some(Notice::Error("Please enter your name".to_string())));

        type_text(&mut state, "Ada");
        assert_eq!(handle_key(KeyCode::Enter, &mut state), FollowUp::None);
        assert_eq!(state.notice, Some(Notice::Error("Please enter your email".to_string())));
    }

    #[test]
    fn enter_without_slot_is_refused() {
        let mut state = setup_state_with_form();
        fill_required_contact(&mut state);
        state.view.selected_time = None;

        assert_eq!(handle_key(KeyCode::Enter, &mut state), FollowUp::None);
        assert!(!state.submitting);
        assert!(matches!(state.notice, Some(Notice::Error(_))));
    }

    #[test]
    fn esc_returns_to_normal_mode_keeping_input() {
        let mut state = setup_state_with_form();
        type_text(&mut state, "Ada");

        handle_key(KeyCode::Esc, &mut state);

        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(state.contact_details().name, "Ada");
    }
}
