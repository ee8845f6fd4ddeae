use super::load_context;
use super::sync_ui::SyncUI;
use crate::output::Output;
use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use trakt_sync_core::{
    JsonLibrary, SyncOrchestrator, SyncOutcome, SyncRunner, SyncSelection, SyncStart,
};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub async fn run_sync(movies: bool, series: bool, library: Option<PathBuf>, output: &Output) -> Result<()> {
    tracing::debug!("Sync command started");

    let context = load_context()?;
    context
        .config
        .validate()
        .map_err(|e| eyre!("Invalid configuration in {}: {}", context.paths.config_file().display(), e))?;

    // Explicit flags select passes; otherwise config decides.
    let selection = if movies || series {
        SyncSelection { movies, series }
    } else {
        SyncSelection {
            movies: context.config.sync.sync_movies,
            series: context.config.sync.sync_series,
        }
    };
    let library_path = library
        .or_else(|| context.config.sync.library_file.clone())
        .ok_or_else(|| eyre!("No library snapshot given. Use --library PATH or set sync.library_file in {}", context.paths.config_file().display()))?;
    let library = JsonLibrary::open(&library_path)
        .wrap_err_with(|| format!("Failed to open library {}", library_path.display()))?;

    let orchestrator = Arc::new(SyncOrchestrator::new(context.cache.clone(), Arc::new(library)));
    let runner = SyncRunner::new(orchestrator, context.authorization);

    let started = Instant::now();
    let handle = match runner.start(selection) {
        SyncStart::Started(handle) => handle,
        SyncStart::AlreadyRunning => {
            output.warn("A sync is already running");
            return Ok(());
        }
        SyncStart::NotAuthorized => {
            return Err(eyre!(
                "Not authorized with Trakt. Pair the device first so that {} holds a valid token",
                context.paths.authorization_file().display()
            ));
        }
    };

    let mut ui = SyncUI::new(output.is_human());
    while !handle.is_finished() {
        ui.set_message(&runner.statistics().status);
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    ui.finish();

    let outcome = handle.await.wrap_err("Sync task aborted")?;
    report(&outcome, started.elapsed(), output);

    if outcome.succeeded() {
        Ok(())
    } else {
        Err(eyre!("Sync finished with failures: {}", outcome.statistics.status))
    }
}

fn pass_label(result: Option<bool>) -> &'static str {
    match result {
        Some(true) => "ok",
        Some(false) => "failed",
        None => "skipped",
    }
}

fn report(outcome: &SyncOutcome, elapsed: Duration, output: &Output) {
    let stats = &outcome.statistics;

    if !output.is_human() {
        output.json(&json!({
            "success": outcome.succeeded(),
            "movies": pass_label(outcome.movies),
            "series": pass_label(outcome.series),
            "statistics": stats,
            "duration_seconds": elapsed.as_secs_f64(),
        }));
        return;
    }

    if outcome.movies.is_some() {
        output.info(format!(
            "Movies ({}): {} marked watched, {} marked unwatched, {} added to history, {} added to collection",
            pass_label(outcome.movies),
            stats.movies_marked_watched_in_library,
            stats.movies_marked_unwatched_in_library,
            stats.movies_added_to_history,
            stats.movies_added_to_collection
        ));
    }
    if outcome.series.is_some() {
        output.info(format!(
            "Episodes ({}): {} marked watched, {} marked unwatched, {} added to history, {} added to collection",
            pass_label(outcome.series),
            stats.episodes_marked_watched_in_library,
            stats.episodes_marked_unwatched_in_library,
            stats.episodes_added_to_history,
            stats.episodes_added_to_collection
        ));
    }

    if outcome.succeeded() {
        output.success(format!("Sync completed in {:.1}s", elapsed.as_secs_f64()));
    } else {
        output.error(format!("Sync failed: {}", stats.status));
    }
}
