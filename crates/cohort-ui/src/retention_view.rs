//! Monthly retention table for a single year + country query.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use cohort_core::formatting;
use cohort_core::single_cohort::MonthlyRetention;

use crate::themes::Theme;

const BAR_WIDTH: usize = 30;

/// Render one row per month with its active customer count, ratio and a bar.
pub fn render_monthly_retention(
    frame: &mut Frame,
    area: Rect,
    retention: &MonthlyRetention,
    theme: &Theme,
) {
    let [table_area, summary_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);

    let header = Row::new(
        ["Month", "Active", "Retention", ""]
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    );

    let rows: Vec<Row> = retention
        .months
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(formatting::month_name(m.month)),
                Cell::from(format!("{:>6}", m.active_customers)),
                Cell::from(format!("{:>9}", formatting::format_percent(m.ratio, 1))),
                Cell::from(Span::styled(bar(m.ratio), theme.heat_style(m.ratio, 1.0))),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(11),
        Constraint::Min(BAR_WIDTH as u16),
    ];

    let title = format!(
        " Retention: {} {} ",
        retention.country, retention.year
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title, theme.title)),
        )
        .style(theme.text);
    frame.render_widget(table, table_area);

    let summary = Line::from(vec![
        Span::styled("Cohort customers: ", theme.dim),
        Span::styled(
            formatting::format_number(retention.cohort_customers as f64, 0),
            theme.label,
        ),
    ]);
    frame.render_widget(Paragraph::new(summary), summary_area);
}

/// Shown when the query was well-formed but matched no rows.
pub fn render_no_match(frame: &mut Frame, area: Rect, year: i32, country: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("No customers found for {country} in {year}"),
            theme.warning,
        )),
        Line::from(""),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" Retention ")),
        area,
    );
}

/// Shown when the form input was rejected.
pub fn render_invalid_input(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.error)),
        Line::from(""),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" Retention ")),
        area,
    );
}

fn bar(ratio: f64) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(filled)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
