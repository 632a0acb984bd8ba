//! The rendering boundary.
//!
//! The controller never draws anything itself. After every state change it
//! hands a [`ViewModel`] snapshot to its [`WizardView`].

use crate::{ChoiceOption, Question, QuestionId, QuestionKind, SelectionState, WizardState};

/// Snapshot of everything a renderer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub state: WizardState,
    /// Zero-based position in the active question list.
    pub position: usize,
    /// Length of the active question list.
    pub total: usize,
    pub question: Option<QuestionView>,
    /// Free-text draft of the current question.
    pub text: String,
    /// Inline validation error of the current question.
    pub error: Option<String>,
    /// Completion percentage, 0 to 100.
    pub progress: f64,
    pub can_go_back: bool,
    pub is_last: bool,
    pub banner: Option<ErrorBanner>,
}

/// The current question, with the transient selection folded in.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub id: QuestionId,
    pub text: String,
    pub kind: QuestionKind,
    pub required: bool,
    pub options: Vec<OptionView>,
    /// Effective selection limit for multi-choice questions.
    pub max_count: Option<usize>,
    pub strategic_goal: Option<String>,
    pub area: Option<String>,
}

impl QuestionView {
    pub(crate) fn new(
        question: &Question,
        selection: &SelectionState,
        max_count: Option<usize>,
    ) -> Self {
        Self {
            id: question.id,
            text: question.text.clone(),
            kind: question.kind,
            required: question.required,
            options: question
                .options
                .iter()
                .map(|option| OptionView::new(option, selection.is_selected(&option.title)))
                .collect(),
            max_count,
            strategic_goal: question.strategic_goal.clone(),
            area: question.area.clone(),
        }
    }

    /// Titles of the selected options, in display order.
    pub fn selected_titles(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|option| option.selected)
            .map(|option| option.title.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionView {
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub selected: bool,
}

impl OptionView {
    fn new(option: &ChoiceOption, selected: bool) -> Self {
        Self {
            title: option.title.clone(),
            description: option.description.clone(),
            icon: option.icon.clone(),
            selected,
        }
    }
}

/// A dismissible error shown above the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub message: String,
    /// Repeating the action may succeed.
    pub retryable: bool,
    /// Reloading the whole questionnaire is the suggested recovery.
    pub offer_reload: bool,
}

impl ErrorBanner {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
            offer_reload: false,
        }
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_reload(mut self) -> Self {
        self.offer_reload = true;
        self
    }
}

/// Trait for renderers of the wizard.
pub trait WizardView {
    /// Draw the current state.
    fn render(&mut self, model: &ViewModel);

    /// Show a dismissible error.
    fn show_banner(&mut self, banner: &ErrorBanner);

    /// Leave the wizard for another location (login page, generated document).
    fn navigate(&mut self, url: &str);
}

/// A view that records everything it is asked to show.
///
/// Useful for testing the controller without a terminal.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    pub renders: Vec<ViewModel>,
    pub banners: Vec<ErrorBanner>,
    pub navigations: Vec<String>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent render.
    pub fn last(&self) -> Option<&ViewModel> {
        self.renders.last()
    }

    /// The most recent banner.
    pub fn last_banner(&self) -> Option<&ErrorBanner> {
        self.banners.last()
    }
}

impl WizardView for RecordingView {
    fn render(&mut self, model: &ViewModel) {
        self.renders.push(model.clone());
    }

    fn show_banner(&mut self, banner: &ErrorBanner) {
        self.banners.push(banner.clone());
    }

    fn navigate(&mut self, url: &str) {
        self.navigations.push(url.to_string());
    }
}
