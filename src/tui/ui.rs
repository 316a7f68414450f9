use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::widgets::{dashboard, form, record_detail, records};
use super::{App, Screen, StatusKind, MENU};

const SIDEBAR_WIDTH: u16 = 22;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Sidebar + content
            Constraint::Length(1), // Help / status bar
        ])
        .split(f.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(chunks[0]);

    draw_sidebar(f, app, body[0]);
    draw_content(f, &app.screen, body[1]);
    draw_help_bar(f, app, chunks[1]);
}

fn draw_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let items: Vec<ListItem> = MENU
        .iter()
        .enumerate()
        .map(|(i, label)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", menu_key(i)), Style::default().fg(Color::DarkGray)),
                Span::styled(*label, Style::default().fg(Color::White)),
            ]))
        })
        .collect();

    let menu = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Learning Data ")
                .title_style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.screen.menu_index());
    f.render_stateful_widget(menu, chunks[0], &mut state);

    let search_style = if app.search_mode {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut spans = vec![Span::raw(app.search_input.as_str())];
    if app.search_mode {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }
    let search = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search Serial No ")
            .border_style(search_style),
    );
    f.render_widget(search, chunks[1]);
}

fn menu_key(index: usize) -> &'static str {
    match index {
        0 => "1",
        1 => "2",
        _ => "a",
    }
}

fn draw_content(f: &mut Frame, screen: &Screen, area: Rect) {
    match screen {
        Screen::Dashboard(views) => dashboard::draw(f, views, area),
        Screen::Records(state) => records::draw(f, state, area),
        Screen::Record(record) => record_detail::draw(f, record, area),
        Screen::Form(state) => form::draw(f, state, area),
    }
}

fn draw_help_bar(f: &mut Frame, app: &App, area: Rect) {
    if let Some(status) = &app.status {
        let color = match status.kind {
            StatusKind::Info => Color::Green,
            StatusKind::Error => Color::Red,
        };
        let bar = Paragraph::new(Line::from(Span::styled(
            status.text.as_str(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .style(Style::default().bg(Color::DarkGray));
        f.render_widget(bar, area);
        return;
    }

    let help_text = if app.search_mode {
        vec![
            Span::styled("/", Style::default().fg(Color::Yellow)),
            Span::raw(app.search_input.as_str()),
            Span::raw(" | "),
            Span::styled("<CR>", Style::default().fg(Color::Cyan)),
            Span::raw(" Search  "),
            Span::styled("<Esc>", Style::default().fg(Color::Cyan)),
            Span::raw(" Cancel"),
        ]
    } else {
        let mut spans = Vec::new();

        match &app.screen {
            Screen::Records(state) if state.pending_delete.is_some() => {
                let serial_no = state.pending_delete.unwrap_or_default();
                let confirm = Paragraph::new(Line::from(vec![
                    Span::styled(
                        format!("Delete Serial No {}? ", serial_no),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled("y", Style::default().fg(Color::Cyan)),
                    Span::raw(" Yes  "),
                    Span::styled("any key", Style::default().fg(Color::Cyan)),
                    Span::raw(" No"),
                ]))
                .style(Style::default().bg(Color::DarkGray));
                f.render_widget(confirm, area);
                return;
            }
            Screen::Form(_) => {
                spans.extend(vec![
                    Span::styled("Tab/S-Tab", Style::default().fg(Color::Cyan)),
                    Span::raw(" Field  "),
                    Span::styled("<CR>", Style::default().fg(Color::Cyan)),
                    Span::raw(" Save  "),
                    Span::styled("<Esc>", Style::default().fg(Color::Cyan)),
                    Span::raw(" Cancel"),
                ]);
                let help = Paragraph::new(Line::from(spans))
                    .style(Style::default().bg(Color::DarkGray));
                f.render_widget(help, area);
                return;
            }
            Screen::Records(_) => {
                spans.extend(vec![
                    Span::styled("j/k", Style::default().fg(Color::Cyan)),
                    Span::raw(" Nav  "),
                    Span::styled("g/G", Style::default().fg(Color::Cyan)),
                    Span::raw(" Top/Bot  "),
                    Span::styled("<CR>", Style::default().fg(Color::Cyan)),
                    Span::raw(" Open  "),
                    Span::styled("e", Style::default().fg(Color::Cyan)),
                    Span::raw(" Edit  "),
                    Span::styled("d", Style::default().fg(Color::Cyan)),
                    Span::raw(" Delete  "),
                ]);
            }
            Screen::Record(_) => {
                spans.extend(vec![
                    Span::styled("h/<Esc>", Style::default().fg(Color::Cyan)),
                    Span::raw(" Back  "),
                    Span::styled("e", Style::default().fg(Color::Cyan)),
                    Span::raw(" Edit  "),
                ]);
            }
            Screen::Dashboard(_) => {}
        }

        spans.extend(vec![
            Span::styled("1/2/a", Style::default().fg(Color::Cyan)),
            Span::raw(" Menu  "),
            Span::styled("/", Style::default().fg(Color::Cyan)),
            Span::raw(" Search  "),
            Span::styled("^r", Style::default().fg(Color::Cyan)),
            Span::raw(" Refresh  "),
            Span::styled("q", Style::default().fg(Color::Cyan)),
            Span::raw(" Quit"),
        ]);

        spans
    };

    let help = Paragraph::new(Line::from(help_text)).style(Style::default().bg(Color::DarkGray));

    f.render_widget(help, area);
}
