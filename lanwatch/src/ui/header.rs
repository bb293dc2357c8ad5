//! Top header: source, data origin, last update, aggregate counters and the live status.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::sync::{Dashboard, ViewState};
use crate::types::Aggregate;
use crate::ui::theme::MUTED;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveStatus {
    Connecting,
    Secure,
    ThreatDetected,
    SyncError,
}

impl LiveStatus {
    pub fn of(dash: &Dashboard) -> Self {
        if dash.devices.fault.is_some() {
            return LiveStatus::SyncError;
        }
        match dash.aggregate() {
            None => LiveStatus::Connecting,
            Some(a) if a.at_risk > 0 => LiveStatus::ThreatDetected,
            Some(_) => LiveStatus::Secure,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            LiveStatus::Connecting => "Connecting...",
            LiveStatus::Secure => "Network Secure",
            LiveStatus::ThreatDetected => "Threat Detected",
            LiveStatus::SyncError => "Data Sync Error",
        }
    }

    fn color(self) -> Color {
        match self {
            LiveStatus::Connecting => MUTED,
            LiveStatus::Secure => Color::Green,
            LiveStatus::ThreatDetected => Color::Red,
            LiveStatus::SyncError => Color::Yellow,
        }
    }
}

/// Counters for the header. A server-sent aggregate wins; otherwise the
/// blocked count comes from the blocked-host list when that has loaded.
pub fn header_counts(dash: &Dashboard) -> Option<Aggregate> {
    let snap = dash.devices.view.ready()?;
    let mut agg = snap.aggregate;
    if !snap.server_aggregate {
        if let ViewState::Ready(b) = &dash.blocked.view {
            agg.blocked = b.len() as u64;
        }
    }
    Some(agg)
}

fn counter(label: &str, v: Option<u64>, color: Color) -> Vec<Span<'static>> {
    let value = v.map(|n| n.to_string()).unwrap_or_else(|| "-".into());
    vec![
        Span::styled(format!("{label}: "), Style::default().fg(MUTED)),
        Span::styled(
            format!("{value:<5}"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ]
}

pub fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, dash: &Dashboard, source: &str) {
    let updated = dash
        .devices
        .updated_at
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".into());
    let title = Line::from(format!(
        "lanwatch | {source} | data: {} | updated {updated}  (press 'q' to quit)",
        dash.devices.origin.label()
    ));

    let counts = header_counts(dash);
    let status = LiveStatus::of(dash);
    let mut spans = Vec::new();
    spans.extend(counter("Total", counts.map(|a| a.total), Color::White));
    spans.extend(counter("Active", counts.map(|a| a.active), Color::Green));
    spans.extend(counter("Threats", counts.map(|a| a.at_risk), Color::Red));
    spans.extend(counter("Blocked", counts.map(|a| a.blocked), Color::Magenta));
    spans.push(Span::styled(
        status.text(),
        Style::default()
            .fg(status.color())
            .add_modifier(Modifier::BOLD),
    ));

    let p = Paragraph::new(vec![title, Line::from(spans)])
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(p, area);
}
