use crossterm::event::KeyCode;

use crate::app::{AppState, FollowUp, Mode, Notice};

pub fn handle_key(key: KeyCode, state: &mut AppState) -> FollowUp {
    if state.show_help {
        handle_help_key(key, state);
        return FollowUp::None;
    }

    match key {
        KeyCode::Char('h') | KeyCode::Left => state.move_cursor_days(-1),
        KeyCode::Char('l') | KeyCode::Right => state.move_cursor_days(1),
        KeyCode::Char('j') | KeyCode::Down => state.move_cursor_days(7),
        KeyCode::Char('k') | KeyCode::Up => state.move_cursor_days(-7),
        KeyCode::Char('{') | KeyCode::PageUp => state.navigate_month(-1),
        KeyCode::Char('}') | KeyCode::PageDown => state.navigate_month(1),
        KeyCode::Char('t') => state.jump_to(state.today),
        KeyCode::Enter | KeyCode::Char(' ') => state.select_cursor_date(),
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            state.select_slot_index(index);
        }
        KeyCode::Char('a') => open_form(state),
        KeyCode::Char('r') => return FollowUp::Reload,
        KeyCode::Char(':') => {
            state.mode = Mode::Command;
            state.command_buffer = ":".to_string();
        }
        KeyCode::Char('?') => state.show_help = true,
        KeyCode::Esc => {
            state.view.reset_selection();
            state.notice = None;
        }
        KeyCode::Char('q') => return FollowUp::Quit,
        _ => {}
    }
    FollowUp::None
}

fn open_form(state: &mut AppState) {
    if state.view.is_complete() {
        state.open_booking_form();
    } else {
        state.notice = Some(Notice::Error("Pick a date and a time slot first".to_string()));
    }
}

fn handle_help_key(key: KeyCode, state: &mut AppState) {
    match key {
        KeyCode::Char('j') | KeyCode::Down => {
            state.help_scroll = state.help_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.help_scroll = state.help_scroll.saturating_sub(1);
        }
        KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Esc => {
            state.show_help = false;
            state.help_scroll = 0;
        }
        _ => {}
    }
}
