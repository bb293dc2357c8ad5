//! Blocked hosts with reason and time; the selected row is the unblock target.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
};

use crate::sync::{Display, Panel};
use crate::types::{or_placeholder, BlockedHost, PLACEHOLDER};
use crate::ui::theme::{HEADER_FG, MUTED};
use crate::ui::util::{draw_state, state_line};

const COLS: [Constraint; 4] = [
    Constraint::Length(15), // IP
    Constraint::Length(18), // MAC
    Constraint::Min(10),    // Reason
    Constraint::Length(19), // Since
];

pub fn draw_blocked(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    panel: &Panel<Vec<BlockedHost>>,
    selected: Option<usize>,
) {
    let display = panel.display();
    let title = match &display {
        Display::Populated(v) => format!("Blocked Hosts ({})", v.len()),
        _ => "Blocked Hosts".into(),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let hosts = match &display {
        Display::Populated(v) => *v,
        other => {
            if let Some(line) = state_line(other, "blocked hosts") {
                draw_state(f, area, block, line);
            }
            return;
        }
    };

    let rows = hosts.iter().map(|b| {
        let mac = b
            .mac
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| PLACEHOLDER.into());
        // RFC 3339 timestamps: show the date and time part only
        let since: String = or_placeholder(b.blocked_at.as_deref())
            .chars()
            .take(19)
            .collect::<String>()
            .replace('T', " ");
        Row::new(vec![
            Cell::from(or_placeholder(b.ip.as_deref()).to_string()),
            Cell::from(mac).style(Style::default().fg(Color::Magenta)),
            Cell::from(or_placeholder(b.reason.as_deref()).to_string()),
            Cell::from(since).style(Style::default().fg(MUTED)),
        ])
    });
    let header = Row::new(vec!["IP", "MAC", "Reason", "Since"]).style(
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
            .filter(|_| !hosts.is_empty())
            .map(|i| i.min(hosts.len() - 1)),
    );
    f.render_stateful_widget(table, area, &mut state);
}
