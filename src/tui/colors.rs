//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::{Priority, Status, TaskType};

pub const PURPLE: Color = Color::Rgb(107, 33, 168);
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
pub const GOLD: Color = Color::Rgb(255, 215, 0);
pub const AMBER: Color = Color::Rgb(217, 119, 6);
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);

/// Badge color per item type, as on the hierarchy table.
pub fn type_color(t: TaskType) -> Color {
    match t {
        TaskType::Epic => PURPLE,
        TaskType::Story => Color::Blue,
        TaskType::Task => DARK_GREEN,
        TaskType::Subtask => Color::DarkGray,
        TaskType::Bug => DARK_RED,
        TaskType::Feature => Color::Cyan,
    }
}

pub fn priority_color(p: Priority) -> Color {
    match p {
        Priority::Low => Color::Green,
        Priority::Medium => Color::Blue,
        Priority::High => AMBER,
        Priority::Urgent => Color::Red,
    }
}

pub fn status_color(s: Status) -> Color {
    match s {
        Status::Backlog => Color::Gray,
        Status::Todo => Color::Blue,
        Status::InProgress => AMBER,
        Status::Review => PURPLE,
        Status::Done => DARK_GREEN,
    }
}

/// Foreground that stays readable on `bg`.
pub fn text_on(bg: Color) -> Color {
    match bg {
        GOLD | AMBER | Color::Gray | Color::Cyan | Color::Green => Color::Rgb(20, 20, 20),
        _ => Color::White,
    }
}
