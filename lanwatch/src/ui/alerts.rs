//! Threat alert list, newest last, colored by severity.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
};

use crate::sync::{Display, Panel};
use crate::types::{or_placeholder, Alert, SeverityClass};
use crate::ui::theme::{severity_color, HEADER_FG, MUTED};
use crate::ui::util::{draw_state, state_line};

const COLS: [Constraint; 5] = [
    Constraint::Length(8),      // Severity
    Constraint::Percentage(30), // Attack
    Constraint::Length(15),     // Source
    Constraint::Length(10),     // Time
    Constraint::Min(10),        // Message
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRow {
    pub attack: String,
    pub source_ip: String,
    pub time: String,
    pub severity: String,
    pub message: String,
    pub class: SeverityClass,
}

pub fn alert_rows(alerts: &[Alert]) -> Vec<AlertRow> {
    alerts
        .iter()
        .map(|a| AlertRow {
            attack: or_placeholder(a.attack_type.as_deref()).to_string(),
            source_ip: or_placeholder(a.source_ip.as_deref()).to_string(),
            time: or_placeholder(a.time.as_deref()).to_string(),
            severity: or_placeholder(a.severity.as_deref()).to_string(),
            message: or_placeholder(a.message.as_deref()).to_string(),
            class: a.severity_class(),
        })
        .collect()
}

pub fn draw_alerts(f: &mut ratatui::Frame<'_>, area: Rect, panel: &Panel<Vec<Alert>>) {
    let display = panel.display();
    let title = match &display {
        Display::Populated(v) => {
            let high = v
                .iter()
                .filter(|a| a.severity_class() == SeverityClass::High)
                .count();
            format!("Threat Alerts ({}, {high} high)", v.len())
        }
        _ => "Threat Alerts".into(),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let alerts = match &display {
        Display::Populated(v) => *v,
        other => {
            if let Some(line) = state_line(other, "alerts") {
                draw_state(f, area, block, line);
            }
            return;
        }
    };

    // Keep the newest alerts visible when the list overflows
    let visible = area.height.saturating_sub(3) as usize;
    let rows = alert_rows(alerts);
    let skip = rows.len().saturating_sub(visible);
    let rows = rows.into_iter().skip(skip).map(|r| {
        let sev = Style::default().fg(severity_color(r.class));
        Row::new(vec![
            Cell::from(r.severity).style(sev.add_modifier(Modifier::BOLD)),
            Cell::from(r.attack).style(sev),
            Cell::from(r.source_ip),
            Cell::from(r.time).style(Style::default().fg(MUTED)),
            Cell::from(r.message).style(Style::default().fg(MUTED)),
        ])
    });
    let header = Row::new(vec!["Severity", "Attack", "Source IP", "Time", "Detail"]).style(
        Style::default()
            .fg(HEADER_FG)
            .add_modifier(Modifier::BOLD),
    );
    let table = Table::new(rows, COLS.to_vec())
        .header(header)
        .block(block)
        .column_spacing(1);
    f.render_widget(table, area);
}
