use std::sync::Mutex;

/// Read access to the two filter controls: the type-names selector and the
/// semantic-description text box
pub trait FilterInputs: Send + Sync {
    /// Current value of the type-names selector, empty for "any"
    fn type_names(&self) -> String;

    /// Current text of the semantic-description box
    fn semantic_description(&self) -> String;
}

/// In-memory filter form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterForm {
    pub type_names: String,
    pub semantic_description: String,
}

impl FilterForm {
    pub fn new(type_names: impl Into<String>, semantic_description: impl Into<String>) -> Self {
        Self {
            type_names: type_names.into(),
            semantic_description: semantic_description.into(),
        }
    }

    pub fn select_type(&mut self, type_names: impl Into<String>) {
        self.type_names = type_names.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.semantic_description = description.into();
    }
}

impl FilterInputs for FilterForm {
    fn type_names(&self) -> String {
        self.type_names.clone()
    }

    fn semantic_description(&self) -> String {
        self.semantic_description.clone()
    }
}

/// Form shared between the UI that edits it and the controller that reads it
impl FilterInputs for Mutex<FilterForm> {
    fn type_names(&self) -> String {
        self.lock()
            .map(|form| form.type_names.clone())
            .unwrap_or_default()
    }

    fn semantic_description(&self) -> String {
        self.lock()
            .map(|form| form.semantic_description.clone())
            .unwrap_or_default()
    }
}

/// Blocking notices shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The request succeeded but matched no lanes
    NoResults,
    /// The request failed or the answer could not be used
    RequestFailed,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::NoResults => "No lanes found for the given filters.",
            Notice::RequestFailed => "An error occurred while fetching lane data.",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Surface for user-facing notices (an alert dialog in a browser)
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that writes notices to the log; the headless default
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        log::warn!("{}", notice);
    }
}

/// Notifier that keeps every notice it receives
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, notice: Notice) -> usize {
        self.notices().iter().filter(|n| **n == notice).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_messages() {
        assert_eq!(
            Notice::NoResults.to_string(),
            "No lanes found for the given filters."
        );
        assert_eq!(
            Notice::RequestFailed.message(),
            "An error occurred while fetching lane data."
        );
    }

    #[test]
    fn test_shared_form_reads_latest_values() {
        let form = Mutex::new(FilterForm::default());
        assert_eq!(form.type_names(), "");

        if let Ok(mut f) = form.lock() {
            f.select_type("Lane Nominal");
            f.set_description("curved");
        }

        assert_eq!(form.type_names(), "Lane Nominal");
        assert_eq!(form.semantic_description(), "curved");
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notice::NoResults);
        notifier.notify(Notice::RequestFailed);
        notifier.notify(Notice::NoResults);

        assert_eq!(notifier.count(Notice::NoResults), 2);
        assert_eq!(notifier.notices().len(), 3);
    }
}
