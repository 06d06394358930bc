use parking_lot::Mutex;
use std::sync::Arc;

pub const LOADING_TITLE: &str = "Loading...";

/// User-visible side effects the client triggers.
///
/// The embedding application decides how to render them; every method has a
/// no-op default.
pub trait UiHooks: Send + Sync {
    fn show_loading(&self, _title: &str) {}

    fn hide_loading(&self) {}

    /// Transient error notice
    fn show_error(&self, _message: &str) {}

    /// Transient confirmation notice
    fn show_success(&self, _message: &str) {}

    /// Navigate to the sign-in screen after the session was lost
    fn redirect_to_login(&self) {}
}

/// Headless hooks that only log
#[derive(Debug, Default)]
pub struct TracingUi;

impl UiHooks for TracingUi {
    fn show_loading(&self, title: &str) {
        tracing::debug!(title, "Loading indicator shown");
    }

    fn hide_loading(&self) {
        tracing::debug!("Loading indicator hidden");
    }

    fn show_error(&self, message: &str) {
        tracing::warn!(message, "Error notice");
    }

    fn show_success(&self, message: &str) {
        tracing::info!(message, "Success notice");
    }

    fn redirect_to_login(&self) {
        tracing::info!("Redirecting to sign-in");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ShowLoading(String),
    HideLoading,
    Error(String),
    Success(String),
    RedirectToLogin,
}

/// Hooks that record every event, for headless embedding and tests
#[derive(Debug, Default)]
pub struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, event: &UiEvent) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                UiEvent::Error(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: UiEvent) {
        self.events.lock().push(event);
    }
}

impl UiHooks for RecordingUi {
    fn show_loading(&self, title: &str) {
        self.push(UiEvent::ShowLoading(title.to_string()));
    }

    fn hide_loading(&self) {
        self.push(UiEvent::HideLoading);
    }

    fn show_error(&self, message: &str) {
        self.push(UiEvent::Error(message.to_string()));
    }

    fn show_success(&self, message: &str) {
        self.push(UiEvent::Success(message.to_string()));
    }

    fn redirect_to_login(&self) {
        self.push(UiEvent::RedirectToLogin);
    }
}

/// Shows the loading indicator on creation and hides it on drop, so every
/// exit path of a call hides it exactly once
pub struct LoadingGuard {
    ui: Arc<dyn UiHooks>,
}

impl LoadingGuard {
    pub fn show(ui: Arc<dyn UiHooks>) -> Self {
        ui.show_loading(LOADING_TITLE);
        Self { ui }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.ui.hide_loading();
    }
}
