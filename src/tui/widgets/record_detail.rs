use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::{LearningRecord, COLUMNS};

pub fn draw(f: &mut Frame, record: &LearningRecord, area: Rect) {
    let lines: Vec<Line> = COLUMNS
        .iter()
        .zip(record.cells())
        .map(|(column, value)| {
            Line::from(vec![
                Span::styled(format!("{:<24}", format!("{}:", column)), Style::default().fg(Color::Gray)),
                Span::styled(value, Style::default().fg(Color::White)),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Serial No {} ", record.serial_no))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
