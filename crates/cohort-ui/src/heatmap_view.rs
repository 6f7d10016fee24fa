//! Cohort retention heatmap.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per cohort
//! month and one column per cohort index, each cell shaded by its retention
//! rate.

use std::ops::Range;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use cohort_core::formatting;
use cohort_core::retention::RetentionMatrix;

use crate::themes::Theme;

const LABEL_WIDTH: u16 = 14;
const CELL_WIDTH: u16 = 5;

/// Offsets that fit in a grid `width` columns wide (borders included),
/// starting as close to `first` as possible.
///
/// The window never runs past the last offset, so scrolling right stops
/// with the final column flush against the edge. At least one offset is
/// always shown when the matrix has any.
pub fn offset_window(width: u16, offsets: usize, first: usize) -> Range<usize> {
    let inner = width.saturating_sub(2).saturating_sub(LABEL_WIDTH);
    let visible = usize::from(inner / CELL_WIDTH).max(1).min(offsets);
    let start = first.min(offsets - visible);
    start..start + visible
}

/// Render `matrix` into `area` with `footer` shown beneath the grid.
///
/// Columns start at `first_offset` and are clipped to the width of `area`;
/// the caption tells which offsets are on screen when some are hidden.
/// Cells without an observation are left blank.
pub fn render_heatmap(
    frame: &mut Frame,
    area: Rect,
    matrix: &RetentionMatrix,
    first_offset: usize,
    footer: &str,
    theme: &Theme,
) {
    let [grid_area, footer_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(2)]).areas(area);

    let scale_max = matrix.max_value().unwrap_or(1.0);
    let window = offset_window(grid_area.width, matrix.offsets(), first_offset);

    let header_cells = std::iter::once(Cell::from("Cohort Month"))
        .chain(window.clone().map(|offset| Cell::from(format!("{offset:>4}"))))
        .map(|c| c.style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = matrix
        .rows()
        .iter()
        .map(|row| {
            let cells = std::iter::once(Cell::from(row.label.clone()).style(theme.label)).chain(
                row.rates.get(window.clone()).unwrap_or(&[]).iter().map(|rate| {
                    let style = match rate {
                        Some(r) => theme.heat_style(*r, scale_max),
                        None => theme.heat_empty,
                    };
                    Cell::from(format!("{:>4}", formatting::format_rate_cell(*rate))).style(style)
                }),
            );
            Row::new(cells)
        })
        .collect();

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(LABEL_WIDTH))
        .chain(window.clone().map(|_| Constraint::Length(CELL_WIDTH)))
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(0)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Retention Rate: Monthly Cohorts ", theme.title)),
        )
        .style(theme.text);

    frame.render_widget(table, grid_area);

    let caption = if window.len() < matrix.offsets() {
        format!(
            "Cohort Index {}-{} of {} (←/→ to scroll)",
            window.start,
            window.end - 1,
            matrix.offsets()
        )
    } else {
        String::from("Cohort Index →   rows: Cohort Month")
    };
    let footer_lines = vec![
        Line::from(Span::styled(caption, theme.dim)),
        Line::from(Span::styled(footer.to_string(), theme.label)),
    ];
    frame.render_widget(Paragraph::new(footer_lines), footer_area);
}

/// Placeholder shown when the table produced no cohorts.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No customer transactions found", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Rows without a customer id are excluded from cohorts.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Cohort Heatmap "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
