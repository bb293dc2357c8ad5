//! Popups drawn over the dashboard: the yes/no gate and error notices.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::ui::util::centered;
use crate::ui::Modal;

pub fn draw_modal(f: &mut ratatui::Frame<'_>, area: Rect, modal: &Modal) {
    let (title, body, hint, color) = match modal {
        Modal::Confirm(p) => (
            format!("Confirm {}", p.action.verb().to_lowercase()),
            p.prompt(),
            "[y] yes   [n] no",
            Color::Yellow,
        ),
        Modal::Notice { title, body } => (title.clone(), body.clone(), "press any key", Color::Red),
    };

    let rect = centered(area, 60, 7);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(color));
    let text = vec![
        Line::from(""),
        Line::from(body).style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from(hint).style(Style::default().fg(Color::DarkGray)),
    ];
    let p = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(p, rect);
}
