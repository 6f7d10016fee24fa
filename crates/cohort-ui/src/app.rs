//! Application state and TUI event loop for the cohort heatmap.
//!
//! [`App`] owns the theme and the screen to display. Results are computed
//! before the loop starts; the loop draws, scrolls the heatmap and waits for
//! an exit key.

use std::io;
use std::time::Duration;

use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

use cohort_core::formatting;
use cohort_core::retention::RetentionMatrix;
use cohort_runtime::data::analysis::{AnalysisMetadata, CohortAnalysis};
use cohort_runtime::service::FormOutcome;

use crate::heatmap_view;
use crate::retention_view;
use crate::themes::Theme;

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which view the TUI is rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Cohort-by-index retention heatmap.
    Heatmap,
    /// Monthly retention for one year + country query.
    Retention,
}

// ── Screen ────────────────────────────────────────────────────────────────────

/// Content ready to draw.
#[derive(Debug, Clone)]
pub enum Screen {
    Heatmap {
        matrix: RetentionMatrix,
        footer: String,
    },
    Retention(FormOutcome),
}

/// One-line summary shown under the heatmap.
pub fn heatmap_footer(metadata: &AnalysisMetadata) -> String {
    format!(
        "{} customers · {} cohorts · {} rows without customer skipped · sales {}",
        formatting::format_number(metadata.customers as f64, 0),
        metadata.cohorts,
        formatting::format_number(metadata.rows_without_customer as f64, 0),
        formatting::format_currency(metadata.total_sales),
    )
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    pub theme: Theme,
    pub view_mode: ViewMode,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// First cohort index shown by the heatmap.
    pub scroll: usize,
    screen: Option<Screen>,
}

impl App {
    pub fn new(theme_name: &str, view_mode: ViewMode) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            view_mode,
            should_quit: false,
            scroll: 0,
            screen: None,
        }
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.screen.as_ref()
    }

    /// Show the heatmap of `analysis`.
    pub fn show_heatmap(&mut self, analysis: &CohortAnalysis) {
        self.view_mode = ViewMode::Heatmap;
        self.scroll = 0;
        self.screen = Some(Screen::Heatmap {
            matrix: analysis.matrix.clone(),
            footer: heatmap_footer(&analysis.metadata),
        });
    }

    /// Show the outcome of a form submission.
    pub fn show_retention(&mut self, outcome: FormOutcome) {
        self.view_mode = ViewMode::Retention;
        self.screen = Some(Screen::Retention(outcome));
    }

    /// Update state for a key press. `q`, `Q` and `Ctrl+C` quit; `←`/`→`
    /// scroll the heatmap one cohort index at a time.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Left | KeyCode::Char('h') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Right | KeyCode::Char('l') => {
                let last = match &self.screen {
                    Some(Screen::Heatmap { matrix, .. }) => matrix.offsets().saturating_sub(1),
                    _ => 0,
                };
                self.scroll = (self.scroll + 1).min(last);
            }
            KeyCode::Home => self.scroll = 0,
            _ => {}
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Draw the current screen until the user quits.
    pub async fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(50);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            if let Err(e) = wait_until_ready(|| event::poll(Duration::ZERO), tick_rate).await {
                break Err(e);
            }
            match event::read() {
                Ok(Event::Key(key)) => self.handle_key(key),
                Ok(_) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Render the current screen into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        match &self.screen {
            Some(Screen::Heatmap { matrix, footer }) if !matrix.is_empty() => {
                heatmap_view::render_heatmap(frame, area, matrix, self.scroll, footer, &self.theme);
            }
            Some(Screen::Heatmap { .. }) | None => {
                heatmap_view::render_no_data(frame, area, &self.theme);
            }
            Some(Screen::Retention(FormOutcome::Invalid(message))) => {
                retention_view::render_invalid_input(frame, area, message, &self.theme);
            }
            Some(Screen::Retention(FormOutcome::Results(r))) if r.is_empty() => {
                retention_view::render_no_match(frame, area, r.year, &r.country, &self.theme);
            }
            Some(Screen::Retention(FormOutcome::Results(r))) => {
                retention_view::render_monthly_retention(frame, area, r, &self.theme);
            }
        }
    }
}

/// Resolve once `ready` reports true, sleeping `tick` between checks.
///
/// The sleep yields to the runtime, so a `tokio::select!` around the event
/// loop can still observe other branches such as a shutdown signal.
pub async fn wait_until_ready<F>(mut ready: F, tick: Duration) -> io::Result<()>
where
    F: FnMut() -> io::Result<bool>,
{
    while !ready()? {
        tokio::time::sleep(tick).await;
    }
    Ok(())
}

/// Leave raw mode and the alternate screen when [`App::run`] was interrupted
/// before it could clean up.
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)?;
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
