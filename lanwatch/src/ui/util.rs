//! Small UI helpers: rate formatting, truncation, placeholder bodies, popup geometry.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Paragraph, Wrap},
};

use crate::sync::Display;
use crate::ui::theme::{ERROR_FG, MUTED};

pub fn human_kbps(kbps: u64) -> String {
    const K: f64 = 1024.0;
    let k = kbps as f64;
    if k < K {
        return format!("{k:.0}KB/s");
    }
    let mb = k / K;
    if mb < K {
        return format!("{mb:.1}MB/s");
    }
    format!("{:.2}GB/s", mb / K)
}

pub fn truncate_middle(s: &str, max: usize) -> String {
    let n = s.chars().count();
    if n <= max {
        return s.to_string();
    }
    if max <= 3 {
        return "...".into();
    }
    let keep = max - 3;
    let left = keep / 2;
    let right = keep - left;
    let head: String = s.chars().take(left).collect();
    let tail: String = s.chars().skip(n - right).collect();
    format!("{head}...{tail}")
}

/// Body text for every display state except Populated.
pub fn state_line<T>(d: &Display<'_, T>, noun: &str) -> Option<Line<'static>> {
    match d {
        Display::Populated(_) => None,
        Display::Loading => Some(Line::from(format!("loading {noun}...")).style(Style::default().fg(MUTED))),
        Display::Empty => Some(Line::from(format!("no {noun}")).style(Style::default().fg(MUTED))),
        Display::Error { error, retained } => {
            let mut text = format!("fetch failed: {error}");
            if *retained > 0 {
                text.push_str(&format!(" ({retained} cached rows retained)"));
            }
            Some(Line::from(text).style(Style::default().fg(ERROR_FG).add_modifier(Modifier::BOLD)))
        }
    }
}

pub fn draw_state(f: &mut ratatui::Frame<'_>, area: Rect, block: Block<'_>, line: Line<'static>) {
    let p = Paragraph::new(line)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

/// Rect of `width_pct` percent of `area` and `height` rows, centered.
pub fn centered(area: Rect, width_pct: u16, height: u16) -> Rect {
    let w = (area.width as u32 * width_pct.min(100) as u32 / 100) as u16;
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_is_char_safe() {
        assert_eq!(truncate_middle("Faculty-PC-01", 20), "Faculty-PC-01");
        assert_eq!(truncate_middle("Unauthorized-Device-Warning", 11), "Unau...ning");
        assert_eq!(truncate_middle("ÄÖÜäöüß", 5), "Ä...ß");
    }

    #[test]
    fn rates() {
        assert_eq!(human_kbps(420), "420KB/s");
        assert_eq!(human_kbps(2048), "2.0MB/s");
    }

    #[test]
    fn centered_fits_inside() {
        let r = centered(Rect::new(0, 0, 100, 40), 60, 7);
        assert_eq!((r.x, r.y, r.width, r.height), (20, 16, 60, 7));
    }
}
