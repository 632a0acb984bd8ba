//! Terminal rendering of the wizard's view model.

use dialoguer::theme::{ColorfulTheme, SimpleTheme, Theme};
use questionnaire::{ErrorBanner, QuestionId, ViewModel, WizardState, WizardView};

/// What was last printed, so repeated renders of the same screen stay quiet.
#[derive(Debug, Clone, PartialEq)]
struct Shown {
    state: WizardState,
    question: Option<QuestionId>,
    error: Option<String>,
}

/// Renders the wizard to stdout.
///
/// Prompts themselves are issued by [`run_wizard`](crate::run_wizard); the
/// view only prints headers, inline errors, banners and where to go next.
#[derive(Debug, Default, Clone)]
pub struct DialoguerView {
    /// Use colorful theme for prompts.
    colorful: bool,
    shown: Option<Shown>,
}

impl DialoguerView {
    /// Create a new view with the colorful theme.
    pub fn new() -> Self {
        Self {
            colorful: true,
            shown: None,
        }
    }

    /// Create a view with plain (no color) theme.
    pub fn plain() -> Self {
        Self::default()
    }

    pub(crate) fn theme(&self) -> Box<dyn Theme> {
        if self.colorful {
            Box::new(ColorfulTheme::default())
        } else {
            Box::new(SimpleTheme)
        }
    }

    /// Lines to print for `model`, given what is already on screen.
    fn describe(&mut self, model: &ViewModel) -> Vec<String> {
        let shown = Shown {
            state: model.state,
            question: model.question.as_ref().map(|question| question.id),
            error: model.error.clone(),
        };
        let previous = self.shown.replace(shown.clone());
        if previous.as_ref() == Some(&shown) {
            return Vec::new();
        }

        let mut lines = Vec::new();
        let moved = previous
            .as_ref()
            .is_none_or(|previous| previous.question != shown.question || previous.state != shown.state);

        match model.state {
            WizardState::Loading if moved => lines.push("Loading questionnaire...".to_string()),
            WizardState::Submitting if moved => lines.push("Generating your roadmap...".to_string()),
            WizardState::Ready if moved => {
                if let Some(question) = &model.question {
                    lines.push(String::new());
                    lines.push(format!(
                        "Question {} of {} ({:.0}% complete)",
                        model.position + 1,
                        model.total,
                        model.progress
                    ));
                    let context: Vec<&str> = [&question.strategic_goal, &question.area]
                        .into_iter()
                        .flatten()
                        .map(String::as_str)
                        .collect();
                    if !context.is_empty() {
                        lines.push(context.join(" / "));
                    }
                }
            }
            _ => {}
        }

        if let Some(error) = &model.error
            && model.state == WizardState::Ready
        {
            lines.push(format!("Error: {error}"));
        }

        lines
    }
}

impl WizardView for DialoguerView {
    fn render(&mut self, model: &ViewModel) {
        for line in self.describe(model) {
            println!("{line}");
        }
    }

    fn show_banner(&mut self, banner: &ErrorBanner) {
        println!();
        println!("Error: {}", banner.message);
        if banner.offer_reload {
            println!("Reloading the questionnaire may help.");
        } else if banner.retryable {
            println!("Please try again.");
        }
    }

    fn navigate(&mut self, url: &str) {
        println!();
        println!("Continue at: {url}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questionnaire::{QuestionKind, QuestionView};

    fn model(id: i64, error: Option<&str>) -> ViewModel {
        ViewModel {
            state: WizardState::Ready,
            position: 1,
            total: 4,
            question: Some(QuestionView {
                id: QuestionId::new(id),
                text: "How?".into(),
                kind: QuestionKind::FreeText,
                required: true,
                options: Vec::new(),
                max_count: None,
                strategic_goal: Some("Reduce Risk".into()),
                area: None,
            }),
            text: String::new(),
            error: error.map(str::to_string),
            progress: 25.0,
            can_go_back: true,
            is_last: false,
            banner: None,
        }
    }

    #[test]
    fn header_is_printed_once_per_question() {
        let mut view = DialoguerView::plain();

        let first = view.describe(&model(2, None));
        assert_eq!(
            first,
            vec![
                String::new(),
                "Question 2 of 4 (25% complete)".to_string(),
                "Reduce Risk".to_string(),
            ]
        );
        assert!(view.describe(&model(2, None)).is_empty());
    }

    #[test]
    fn new_error_is_printed_without_header() {
        let mut view = DialoguerView::plain();
        view.describe(&model(2, None));

        let lines = view.describe(&model(2, Some("Too short")));
        assert_eq!(lines, vec!["Error: Too short".to_string()]);
    }
}
