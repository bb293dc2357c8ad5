//! Shared UI colors.

use ratatui::style::Color;

use crate::types::{SeverityClass, StatusClass};

pub const HEADER_FG: Color = Color::Cyan;
pub const MUTED: Color = Color::DarkGray;
pub const ERROR_FG: Color = Color::Red;
pub const DOWNLOAD: Color = Color::Green;
pub const UPLOAD: Color = Color::Blue;
pub const PACKETS: Color = Color::Magenta;

pub fn status_color(c: StatusClass) -> Color {
    match c {
        StatusClass::Active => Color::Green,
        StatusClass::Idle => Color::Yellow,
        StatusClass::Risk => Color::Red,
        StatusClass::Blocked => Color::Magenta,
        StatusClass::Unknown => MUTED,
    }
}

pub fn severity_color(c: SeverityClass) -> Color {
    match c {
        SeverityClass::Low => Color::Blue,
        SeverityClass::Medium => Color::Yellow,
        SeverityClass::High => Color::Red,
        SeverityClass::Unknown => MUTED,
    }
}
