use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::models::FIELD_COUNT;
use crate::tui::RecordsState;

const HEADERS: [&str; FIELD_COUNT] = [
    "No", "Date", "From", "To", "Topic", "Type", "Min", "Focus", "Diff", "Energy", "Distr",
    "Compl%", "Mode", "Rate",
];

const WIDTHS: [u16; FIELD_COUNT] = [5, 10, 8, 8, 16, 12, 5, 5, 4, 6, 5, 6, 9, 5];

pub fn draw(f: &mut Frame, state: &RecordsState, area: Rect) {
    let title = format!(" Records ({}) ", state.list.items.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Cyan));

    if state.list.items.is_empty() {
        let paragraph = Paragraph::new("No records found.").block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(HEADERS.iter().map(|h| Cell::from(*h))).style(
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = state
        .list
        .items
        .iter()
        .map(|record| {
            let marked = state.pending_delete == Some(record.serial_no);
            let style = if marked {
                Style::default().fg(Color::Red).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(Color::White)
            };
            Row::new(record.cells().into_iter().map(Cell::from)).style(style)
        })
        .collect();

    let widths = WIDTHS.map(Constraint::Length);

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut table_state = TableState::default().with_selected(state.list.selected);
    f.render_stateful_widget(table, area, &mut table_state);
}
