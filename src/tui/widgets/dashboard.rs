use std::collections::BTreeMap;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, List, ListItem,
        Paragraph,
    },
    Frame,
};

use super::truncate;
use crate::views::{BoxSummary, DashboardViews};

const MODE_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Red,
    Color::Blue,
];

pub fn draw(f: &mut Frame, views: &DashboardViews, area: Rect) {
    if views.is_empty() {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Dashboard ")
            .title_style(Style::default().fg(Color::Cyan));
        let paragraph = Paragraph::new("No records yet. Press 'a' to add one.").block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    draw_duration_by_topic(f, &views.duration_by_topic, top[0]);
    draw_mode_distribution(f, &views.learning_mode_distribution, top[1]);
    draw_focus_vs_completion(f, &views.completion_summaries(), bottom[0]);
    draw_focus_vs_duration(f, &views.focus_vs_duration, bottom[1]);
}

fn chart_block(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
}

fn draw_duration_by_topic(f: &mut Frame, totals: &[(String, i64)], area: Rect) {
    let inner_width = area.width.saturating_sub(2);
    let bar_width = bar_width(inner_width, totals.len());

    let bars: Vec<Bar> = totals
        .iter()
        .map(|(topic, total)| {
            Bar::default()
                .value((*total).max(0) as u64)
                .text_value(total.to_string())
                .label(Line::from(truncate(topic, bar_width as usize)))
        })
        .collect();

    let chart = BarChart::default()
        .block(chart_block("Total Duration by Topic (min)", Color::LightBlue))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::LightBlue))
        .value_style(Style::default().fg(Color::Black).bg(Color::LightBlue));

    f.render_widget(chart, area);
}

// Widest bar that still fits every topic, within readable limits
fn bar_width(inner_width: u16, bars: usize) -> u16 {
    if bars == 0 {
        return 3;
    }
    let per_bar = inner_width / u16::try_from(bars).unwrap_or(u16::MAX);
    per_bar.saturating_sub(1).clamp(3, 12)
}

fn draw_mode_distribution(f: &mut Frame, counts: &BTreeMap<String, usize>, area: Rect) {
    let total: usize = counts.values().sum();
    let bar_room = area.width.saturating_sub(30) as usize;

    let items: Vec<ListItem> = counts
        .iter()
        .enumerate()
        .map(|(i, (mode, count))| {
            let color = MODE_COLORS[i % MODE_COLORS.len()];
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<12}", truncate(mode, 12)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(format!("{:>4} ", count), Style::default().fg(Color::Gray)),
                Span::styled(
                    format!("{:>5.1}% ", percent(*count, total)),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(share_bar(*count, total, bar_room), Style::default().fg(color)),
            ]))
        })
        .collect();

    let list = List::new(items).block(chart_block("Learning Mode Distribution", Color::Magenta));
    f.render_widget(list, area);
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

pub fn share_bar(count: usize, total: usize, width: usize) -> String {
    let filled = (percent(count, total) / 100.0 * width as f64).round() as usize;
    "█".repeat(filled.min(width))
}

fn draw_focus_vs_completion(f: &mut Frame, summaries: &[(i64, BoxSummary)], area: Rect) {
    let lo = summaries
        .iter()
        .map(|(_, s)| s.min)
        .fold(0.0_f64, f64::min);
    let hi = summaries
        .iter()
        .map(|(_, s)| s.max)
        .fold(100.0_f64, f64::max);
    let glyph_width = area.width.saturating_sub(24).max(5) as usize;

    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("{:<8}", "Focus"),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{:<width$}", format!("{:.0} .. {:.0}", lo, hi), width = glyph_width),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            "  median",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ),
    ])];

    lines.extend(summaries.iter().map(|(focus, summary)| {
        Line::from(vec![
            Span::styled(format!("{:<8}", focus), Style::default().fg(Color::Yellow)),
            Span::styled(
                box_glyph(summary, lo, hi, glyph_width),
                Style::default().fg(Color::Green),
            ),
            Span::styled(
                format!("  {:.1}", summary.median),
                Style::default().fg(Color::White),
            ),
        ])
    }));

    let paragraph =
        Paragraph::new(lines).block(chart_block("Focus Level vs Completion Rate (%)", Color::Green));
    f.render_widget(paragraph, area);
}

/// Draws a horizontal box plot of `summary` scaled so `lo..=hi` spans `width` cells.
pub fn box_glyph(summary: &BoxSummary, lo: f64, hi: f64, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let span = hi - lo;
    let scale = |x: f64| -> usize {
        if span <= 0.0 {
            width / 2
        } else {
            (((x - lo) / span) * (width - 1) as f64).round().clamp(0.0, (width - 1) as f64)
                as usize
        }
    };

    let mut cells = vec![' '; width];
    let (min, q1, median, q3, max) = (
        scale(summary.min),
        scale(summary.q1),
        scale(summary.median),
        scale(summary.q3),
        scale(summary.max),
    );

    for cell in &mut cells[min..=max] {
        *cell = '─';
    }
    cells[min] = '|';
    cells[max] = '|';
    for cell in &mut cells[q1..=q3] {
        *cell = '█';
    }
    cells[median] = '┃';

    cells.into_iter().collect()
}

fn draw_focus_vs_duration(f: &mut Frame, points: &[(i64, i64)], area: Rect) {
    let data: Vec<(f64, f64)> = points
        .iter()
        .map(|(focus, duration)| (*focus as f64, *duration as f64))
        .collect();

    let (x_lo, x_hi) = padded_bounds(data.iter().map(|(x, _)| *x));
    let y_hi = data.iter().map(|(_, y)| *y).fold(0.0_f64, f64::max).max(1.0);

    let dataset = Dataset::default()
        .name("duration")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(chart_block("Focus Level vs Duration", Color::Yellow))
        .x_axis(
            Axis::default()
                .title("Focus Level")
                .style(Style::default().fg(Color::Gray))
                .bounds([x_lo, x_hi])
                .labels(vec![
                    Span::raw(format!("{:.0}", x_lo)),
                    Span::raw(format!("{:.0}", (x_lo + x_hi) / 2.0)),
                    Span::raw(format!("{:.0}", x_hi)),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("Duration (min.)")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_hi])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{:.0}", y_hi / 2.0)),
                    Span::raw(format!("{:.0}", y_hi)),
                ]),
        );

    f.render_widget(chart, area);
}

// A single distinct x value still needs a non-empty axis
fn padded_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
        (lo.min(x), hi.max(x))
    });
    if !lo.is_finite() || !hi.is_finite() {
        (0.0, 1.0)
    } else if lo == hi {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo, hi)
    }
}
