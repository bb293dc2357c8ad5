//! Device inventory table: name, IP, MAC, status pill.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
};

use crate::sync::{DeviceSnapshot, Display, Panel};
use crate::types::{or_placeholder, StatusClass, PLACEHOLDER};
use crate::ui::theme::{status_color, HEADER_FG};
use crate::ui::util::{draw_state, state_line, truncate_middle};

const COLS: [Constraint; 4] = [
    Constraint::Percentage(34), // Name
    Constraint::Length(16),     // IP
    Constraint::Length(18),     // MAC
    Constraint::Length(9),      // Status
];

/// Display projection of one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRow {
    pub name: String,
    pub ip: String,
    pub mac: String,
    pub status: String,
    pub class: StatusClass,
}

pub fn device_rows(snap: &DeviceSnapshot) -> Vec<DeviceRow> {
    snap.items
        .iter()
        .map(|d| DeviceRow {
            name: or_placeholder(d.name.as_deref()).to_string(),
            ip: or_placeholder(d.ip.as_deref()).to_string(),
            mac: d
                .mac
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| PLACEHOLDER.into()),
            status: or_placeholder(d.status.as_deref()).to_string(),
            class: d.status_class(),
        })
        .collect()
}

pub fn draw_devices(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    panel: &Panel<DeviceSnapshot>,
    selected: Option<usize>,
) {
    let display = panel.display();
    let count = match &display {
        Display::Populated(s) => format!(" ({})", s.items.len()),
        _ => String::new(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Devices{count} [{}]", panel.origin.label()));

    let snap = match &display {
        Display::Populated(s) => *s,
        other => {
            if let Some(line) = state_line(other, "devices") {
                draw_state(f, area, block, line);
            }
            return;
        }
    };

    let name_w = (area.width.saturating_sub(2) as usize * 34 / 100).max(4);
    let rows = device_rows(snap).into_iter().map(|r| {
        Row::new(vec![
            Cell::from(truncate_middle(&r.name, name_w)),
            Cell::from(r.ip),
            Cell::from(r.mac).style(Style::default().fg(ratatui::style::Color::DarkGray)),
            Cell::from(r.status).style(
                Style::default()
                    .fg(status_color(r.class))
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    });
    let header = Row::new(vec!["Name", "IP", "MAC", "Status"]).style(
        Style::default()
            .fg(HEADER_FG)
            .add_modifier(Modifier::BOLD),
    );
    let table = Table::new(rows, COLS.to_vec())
        .header(header)
        .block(block)
        .column_spacing(1)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default().with_selected(
        selected
            .filter(|_| !snap.items.is_empty())
            .map(|i| i.min(snap.items.len() - 1)),
    );
    f.render_stateful_widget(table, area, &mut state);
}
