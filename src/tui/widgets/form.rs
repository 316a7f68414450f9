use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::COLUMNS;
use crate::tui::{FormMode, FormState};

const HINTS: [&str; 3] = ["YYYY-MM-DD", "HH:MM", "HH:MM"];

pub fn draw(f: &mut Frame, state: &FormState, area: Rect) {
    let title = match state.mode {
        FormMode::Add => " Add Data ".to_string(),
        FormMode::Edit(serial_no) => format!(" Edit Serial No {} ", serial_no),
    };

    let mut lines = Vec::with_capacity(COLUMNS.len() + 2);
    lines.push(Line::from(Span::styled(
        "All fields are required.",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    for (i, (column, value)) in COLUMNS.iter().zip(state.form.values.iter()).enumerate() {
        let focused = i == state.focused;
        let locked = state.is_locked(i);

        let label_style = if focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let value_style = if locked {
            Style::default().fg(Color::DarkGray)
        } else if focused {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };

        let mut spans = vec![
            Span::styled(if focused { "> " } else { "  " }, label_style),
            Span::styled(format!("{:<24}", format!("{}:", column)), label_style),
            Span::styled(value.as_str(), value_style),
        ];
        if focused && !locked {
            spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
        }
        if value.is_empty() {
            if let Some(hint) = i.checked_sub(1).and_then(|h| HINTS.get(h)) {
                spans.push(Span::styled(
                    format!(" {}", hint),
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }
        if locked {
            spans.push(Span::styled(" (locked)", Style::default().fg(Color::DarkGray)));
        }
        lines.push(Line::from(spans));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        );

    let paragraph = Paragraph::new(lines).block(block);
    f.render_widget(paragraph, area);
}
