//! UI module root: the per-frame dashboard layout and the UI-only state it reads.
//!
//! Drawing is a pure projection of [`Dashboard`] plus [`UiState`]: every frame
//! is rebuilt from scratch, nothing from the previous frame is patched.

pub mod alerts;
pub mod blocked;
pub mod devices;
pub mod header;
pub mod modal;
pub mod theme;
pub mod traffic;
pub mod util;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::Paragraph,
};

use crate::mutation::PendingMutation;
use crate::sync::Dashboard;
use crate::ui::theme::MUTED;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Devices,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Confirm(PendingMutation),
    Notice { title: String, body: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub focus: Focus,
    pub device_sel: usize,
    pub blocked_sel: usize,
    pub modal: Option<Modal>,
    /// One-line message in the footer; key help when empty.
    pub status: Option<String>,
    /// Backend URL or "demo", shown in the header.
    pub source: String,
}

const KEY_HELP: &str =
    "Tab focus | Up/Down select | b block device | u unblock host | r refresh | q quit";

/// Panel rectangles for a terminal area.
pub struct Areas {
    pub header: Rect,
    pub devices: Rect,
    pub traffic: Rect,
    pub alerts: Rect,
    pub blocked: Rect,
    pub footer: Rect,
}

pub fn layout(area: Rect) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),       // header
            Constraint::Percentage(55), // devices + traffic
            Constraint::Min(6),          // alerts + blocked
            Constraint::Length(1),       // footer
        ])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[2]);
    Areas {
        header: rows[0],
        devices: top[0],
        traffic: top[1],
        alerts: bottom[0],
        blocked: bottom[1],
        footer: rows[3],
    }
}

pub fn draw_dashboard(f: &mut ratatui::Frame<'_>, dash: &Dashboard, ui: &UiState) {
    let a = layout(f.area());

    header::draw_header(f, a.header, dash, &ui.source);
    devices::draw_devices(
        f,
        a.devices,
        &dash.devices,
        (ui.focus == Focus::Devices).then_some(ui.device_sel),
    );
    traffic::draw_traffic(f, a.traffic, &dash.traffic, &dash.history);
    alerts::draw_alerts(f, a.alerts, &dash.alerts);
    blocked::draw_blocked(
        f,
        a.blocked,
        &dash.blocked,
        (ui.focus == Focus::Blocked).then_some(ui.blocked_sel),
    );

    let footer = ui.status.as_deref().unwrap_or(KEY_HELP);
    f.render_widget(
        Paragraph::new(Line::from(footer.to_string())).style(Style::default().fg(MUTED)),
        a.footer,
    );

    if let Some(m) = ui.modal.as_ref() {
        modal::draw_modal(f, f.area(), m);
    }
}
