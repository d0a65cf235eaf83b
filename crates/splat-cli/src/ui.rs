use std::{sync::Mutex, time::Duration};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use splat_process::StatusReporter;

#[derive(Default)]
struct TerminalState {
    status: String,
    spinner: Option<ProgressBar>,
}

/// Shows workflow progress as a spinner, and errors and results as plain lines.
pub struct TerminalStatus {
    multi: MultiProgress,
    state: Mutex<TerminalState>,
}

impl TerminalStatus {
    pub fn new(multi: MultiProgress) -> Self {
        Self {
            multi,
            state: Mutex::new(TerminalState::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, TerminalState> {
        self.state.lock().expect("Mutex poisoned")
    }

    fn print_line(&self, line: &str) {
        if let Err(err) = self.multi.println(line) {
            log::debug!("Failed to print status line: {err}");
        }
    }

    /// The message currently on the status line.
    pub fn status(&self) -> String {
        self.state().status.clone()
    }

    pub fn is_spinning(&self) -> bool {
        self.state().spinner.is_some()
    }
}

impl StatusReporter for TerminalStatus {
    fn show_text(&self, status: &str, error: &str) {
        let mut state = self.state();
        status.clone_into(&mut state.status);
        if let Some(spinner) = &state.spinner {
            spinner.set_message(status.to_owned());
        }
        drop(state);

        if !error.is_empty() {
            self.print_line(&format!("✗ {error}"));
        }
    }

    fn set_loading_visible(&self, visible: bool) {
        let mut state = self.state();
        match (visible, state.spinner.take()) {
            (true, Some(spinner)) => state.spinner = Some(spinner),
            (true, None) => {
                let style = ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner());
                let spinner = self
                    .multi
                    .add(ProgressBar::new_spinner().with_style(style));
                spinner.set_message(state.status.clone());
                spinner.enable_steady_tick(Duration::from_millis(120));
                state.spinner = Some(spinner);
            }
            (false, Some(spinner)) => {
                spinner.finish_and_clear();
                self.multi.remove(&spinner);
            }
            (false, None) => {}
        }
    }

    fn set_success_visible(&self, visible: bool) {
        if visible {
            let status = self.status();
            self.print_line(&format!("✓ {status}"));
        }
    }
}
