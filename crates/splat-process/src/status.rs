use std::sync::RwLock;

/// Presentation of a workflow's progress: a status line, an error line, a
/// loading spinner, a success indicator and the button that started it all.
///
/// Implementations use interior mutability, so a reporter can be shared
/// between the workflow and whoever displays it.
pub trait StatusReporter {
    /// Replace both text lines.
    fn show_text(&self, status: &str, error: &str);
    fn set_loading_visible(&self, visible: bool);
    fn set_success_visible(&self, visible: bool);

    /// Enable or disable the control that triggers the workflow.
    fn set_trigger_enabled(&self, enabled: bool) {
        let _ = enabled;
    }

    /// Show a status message, clearing any error.
    fn set_status(&self, msg: &str) {
        self.show_text(msg, "");
    }

    /// Show an error message. Clears the status and hides both indicators.
    fn set_error(&self, msg: &str) {
        self.set_loading_visible(false);
        self.set_success_visible(false);
        self.show_text("", msg);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    pub status: String,
    pub error: String,
    pub loading_visible: bool,
    pub success_visible: bool,
    pub trigger_enabled: bool,
    /// Every non-empty status that was shown, oldest first.
    pub status_history: Vec<String>,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            status: String::new(),
            error: String::new(),
            loading_visible: false,
            success_visible: false,
            trigger_enabled: true,
            status_history: Vec::new(),
        }
    }
}

/// In-memory status panel. Mirrors every change to the log.
#[derive(Default)]
pub struct StatusPanel(RwLock<PanelState>);

impl StatusPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PanelState {
        self.0.read().expect("RwLock poisoned").clone()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, PanelState> {
        self.0.write().expect("RwLock poisoned")
    }
}

impl StatusReporter for StatusPanel {
    fn show_text(&self, status: &str, error: &str) {
        let mut state = self.write();
        if !status.is_empty() {
            log::info!("{status}");
            state.status_history.push(status.to_owned());
        }
        if !error.is_empty() {
            log::warn!("{error}");
        }
        status.clone_into(&mut state.status);
        error.clone_into(&mut state.error);
    }

    fn set_loading_visible(&self, visible: bool) {
        self.write().loading_visible = visible;
    }

    fn set_success_visible(&self, visible: bool) {
        self.write().success_visible = visible;
    }

    fn set_trigger_enabled(&self, enabled: bool) {
        self.write().trigger_enabled = enabled;
    }
}

impl<R: StatusReporter + ?Sized> StatusReporter for std::sync::Arc<R> {
    fn show_text(&self, status: &str, error: &str) {
        (**self).show_text(status, error);
    }

    fn set_loading_visible(&self, visible: bool) {
        (**self).set_loading_visible(visible);
    }

    fn set_success_visible(&self, visible: bool) {
        (**self).set_success_visible(visible);
    }

    fn set_trigger_enabled(&self, enabled: bool) {
        (**self).set_trigger_enabled(enabled);
    }

    fn set_status(&self, msg: &str) {
        (**self).set_status(msg);
    }

    fn set_error(&self, msg: &str) {
        (**self).set_error(msg);
    }
}
