mod bootstrap;
mod export;

use std::process::ExitCode;

use anyhow::Result;
use cohort_core::error::CohortError;
use cohort_core::settings::Settings;
use cohort_runtime::dataset::{DatasetHandle, LoadPolicy};
use cohort_runtime::service::{FormOutcome, RetentionForm, RetentionService};
use cohort_ui::app::{restore_terminal, App, ViewMode};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let settings = Settings::load()?;

    let logs_dir = bootstrap::ensure_directories()?;
    // The terminal views own stdout/stderr, so they log to a file by default.
    let log_file = match settings.view.as_str() {
        "export" => settings.log_file.clone(),
        _ => Some(
            settings
                .log_file
                .clone()
                .unwrap_or_else(|| logs_dir.join(bootstrap::LOG_FILE_NAME)),
        ),
    };
    bootstrap::setup_logging(settings.effective_log_level(), log_file.as_deref())?;

    tracing::info!("Cohort Heatmap v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Data: {}, View: {}, Theme: {}",
        settings.data.display(),
        settings.view,
        settings.theme
    );

    let policy = if settings.reload_per_request {
        LoadPolicy::PerRequest
    } else {
        LoadPolicy::Once
    };
    let mut service = RetentionService::new(DatasetHandle::new(&settings.data, policy));

    match settings.view.as_str() {
        "query" => {
            let form = RetentionForm::new(
                settings.cohort_year.clone().unwrap_or_default(),
                settings.country.clone(),
            );
            let outcome = match service.submit(&form) {
                Ok(outcome) => outcome,
                Err(e) => return fail(e),
            };
            if let FormOutcome::Invalid(message) = &outcome {
                eprintln!("{message}");
                return Ok(ExitCode::FAILURE);
            }

            let mut app = App::new(&settings.theme, ViewMode::Retention);
            app.show_retention(outcome);
            run_tui(app).await?;
        }

        "export" => {
            let analysis = match service.heatmap() {
                Ok(analysis) => analysis,
                Err(e) => return fail(e),
            };
            let document = export::export_document(&analysis);
            println!("{}", serde_json::to_string_pretty(&document)?);
        }

        _ => {
            tracing::info!("Computing cohort heatmap...");
            let analysis = match service.heatmap() {
                Ok(analysis) => analysis,
                Err(e) => return fail(e),
            };

            let mut app = App::new(&settings.theme, ViewMode::Heatmap);
            app.show_heatmap(&analysis);
            run_tui(app).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Print problems with the input data plainly and exit non-zero; anything
/// else propagates.
fn fail(err: CohortError) -> Result<ExitCode> {
    if err.is_user_facing() {
        tracing::error!("{err}");
        eprintln!("Error: {err}");
        Ok(ExitCode::FAILURE)
    } else {
        Err(err.into())
    }
}

/// Run the TUI until the user quits. Ctrl+C delivered as a signal (outside
/// raw mode) also ends the loop.
async fn run_tui(app: App) -> Result<()> {
    tokio::select! {
        result = app.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down");
            restore_terminal()?;
        }
    }
    Ok(())
}
