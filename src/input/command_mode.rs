use chrono::NaiveDate;
use crossterm::event::KeyCode;

use crate::app::{AppState, FollowUp, Mode, Notice};
use crate::ui::theme::Theme;

#[derive(Debug, PartialEq)]
pub enum Command {
    Quit,
    Reload,
    Goto(NaiveDate),
    Theme(String),
    Help,
    Error(String),
}

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();

    let Some(command_text) = trimmed.strip_prefix(':') else {
        return Command::Error("Commands must start with ':'".to_string());
    };

    let parts: Vec<&str> = command_text.split_whitespace().collect();
    let Some(&name) = parts.first() else {
        return Command::Error("Empty command".to_string());
    };

    match name {
        "q" | "quit" => Command::Quit,
        "r" | "reload" => Command::Reload,
        "help" => Command::Help,
        "goto" => match parts.get(1) {
            None => Command::Error("goto requires a date argument".to_string()),
            Some(arg) => NaiveDate::parse_from_str(arg, "%Y-%m-%d")
                .map(Command::Goto)
                .unwrap_or_else(|_| Command::Error(format!("Invalid date format: {}", arg))),
        },
        "theme" => match parts.get(1) {
            None => Command::Error(format!("theme requires one of: {}", Theme::names().join(", "))),
            Some(arg) => Command::Theme(arg.to_string()),
        },
        _ => Command::Error(format!("Unknown command: {}", name)),
    }
}

/// Applies a parsed command and leaves command mode.
pub fn execute(command: Command, state: &mut AppState) -> FollowUp {
    state.command_buffer.clear();
    state.mode = Mode::Normal;

    match command {
        Command::Quit => FollowUp::Quit,
        Command::Reload => FollowUp::Reload,
        Command::Goto(date) => {
            state.jump_to(date);
            FollowUp::None
        }
        Command::Theme(name) => {
            match Theme::by_name(&name) {
                Some(theme) => state.theme = theme,
                None => state.notice = Some(Notice::Error(format!("Unknown theme: {}", name))),
            }
            FollowUp::None
        }
        Command::Help => {
            state.show_help = true;
            FollowUp::None
        }
        Command::Error(message) => {
            state.notice = Some(Notice::Error(message));
            FollowUp::None
        }
    }
}

pub fn handle_key(key: KeyCode, state: &mut AppState) -> FollowUp {
    match key {
        KeyCode::Enter => {
            let command = parse_command(&state.command_buffer);
            execute(command, state)
        }
        KeyCode::Esc => {
            state.command_buffer.clear();
            state.mode = Mode::Normal;
            FollowUp::None
        }
        KeyCode::Backspace => {
            state.command_buffer.pop();
            if state.command_buffer.is_empty() {
                state.mode = Mode::Normal;
            }
            FollowUp::None
        }
        KeyCode::Char(c) => {
            state.command_buffer.push(c);
            FollowUp::None
        }
        _ => FollowUp::None,
    }
}
