use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner shown while a pass runs. Falls back to structured logging when
/// not attached to a terminal.
pub struct SyncUI {
    spinner: Option<ProgressBar>,
    last_message: String,
}

impl SyncUI {
    pub fn new(enabled: bool) -> Self {
        let spinner = (enabled && is_interactive()).then(|| {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
            {
                spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
            }
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        });

        if spinner.is_none() {
            tracing::debug!(
                operation = "ui_init",
                mode = "non_interactive",
                "Progress spinner disabled"
            );
        }

        Self {
            spinner,
            last_message: String::new(),
        }
    }

    pub fn set_message(&mut self, msg: &str) {
        if msg == self.last_message {
            return;
        }
        self.last_message = msg.to_string();
        match &self.spinner {
            Some(spinner) => spinner.set_message(msg.to_string()),
            None => tracing::info!(operation = "progress", message = %msg, "Progress update"),
        }
    }

    pub fn finish(&self) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
