//! Traffic sparklines (download/upload/packets) and the protocol mix bar.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Sparkline},
};
use std::collections::VecDeque;

use crate::history::TrafficHistory;
use crate::sync::{Display, Panel};
use crate::types::{ProtocolMix, TrafficSample};
use crate::ui::theme::{DOWNLOAD, PACKETS, UPLOAD};
use crate::ui::util::{draw_state, human_kbps, state_line};

pub fn draw_spark(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    hist: &VecDeque<u64>,
    color: Color,
) {
    let max_points = area.width.saturating_sub(2) as usize;
    let start = hist.len().saturating_sub(max_points);
    let data: Vec<u64> = hist.iter().skip(start).copied().collect();

    let spark = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string()),
        )
        .data(&data)
        .style(Style::default().fg(color));
    f.render_widget(spark, area);
}

/// Splits `width` cells across TCP/UDP/ICMP by share; cells add up to `width`.
pub fn protocol_cells(mix: &ProtocolMix, width: u16) -> [u16; 3] {
    let total = mix.tcp as u32 + mix.udp as u32 + mix.icmp as u32;
    if total == 0 {
        return [0, 0, 0];
    }
    let w = width as u32;
    let tcp = w * mix.tcp as u32 / total;
    let udp = w * mix.udp as u32 / total;
    [tcp as u16, udp as u16, (w - tcp - udp) as u16]
}

fn draw_protocols(f: &mut ratatui::Frame<'_>, area: Rect, mix: &ProtocolMix) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        "Protocols  TCP {}%  UDP {}%  ICMP {}%",
        mix.tcp, mix.udp, mix.icmp
    ));
    let [tcp, udp, icmp] = protocol_cells(mix, area.width.saturating_sub(2));
    let bar = Line::from(vec![
        Span::styled("█".repeat(tcp as usize), Style::default().fg(Color::Cyan)),
        Span::styled("█".repeat(udp as usize), Style::default().fg(Color::Blue)),
        Span::styled("█".repeat(icmp as usize), Style::default().fg(Color::Red)),
    ]);
    f.render_widget(Paragraph::new(bar).block(block), area);
}

pub fn draw_traffic(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    panel: &Panel<TrafficSample>,
    hist: &TrafficHistory,
) {
    let display = panel.display();
    let sample = match &display {
        Display::Populated(s) => *s,
        other => {
            let block = Block::default().borders(Borders::ALL).title("Traffic");
            if let Some(line) = state_line(other, "traffic metrics") {
                draw_state(f, area, block, line);
            }
            return;
        }
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Length(3),
        ])
        .split(area);

    draw_spark(
        f,
        rows[0],
        &format!(
            "Download {} | peak {} [{}]",
            human_kbps(hist.rx.back().copied().unwrap_or(0)),
            human_kbps(hist.rx_peak),
            panel.origin.label()
        ),
        &hist.rx,
        DOWNLOAD,
    );
    draw_spark(
        f,
        rows[1],
        &format!(
            "Upload {} | peak {}",
            human_kbps(hist.tx.back().copied().unwrap_or(0)),
            human_kbps(hist.tx_peak)
        ),
        &hist.tx,
        UPLOAD,
    );
    draw_spark(
        f,
        rows[2],
        &format!(
            "Packets/s {} | peak {}",
            sample.packets.per_second, hist.pps_peak
        ),
        &hist.pps,
        PACKETS,
    );
    draw_protocols(f, rows[3], &sample.protocols);
}
