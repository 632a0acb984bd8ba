//! Interactive driver: prompts for each question and feeds the controller.

use dialoguer::theme::Theme;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use questionnaire::{
    OptionView, QuestionKind, QuestionView, QuestionnaireApi, SelectionOutcome, SubmitOutcome,
    WizardController, WizardError,
};
use thiserror::Error;
use tracing::debug;

use crate::DialoguerView;

/// Error type for the Dialoguer front end.
#[derive(Debug, Error)]
pub enum DialoguerError {
    /// User cancelled the questionnaire (e.g., pressed Ctrl+C or chose Quit).
    #[error("Questionnaire cancelled by user")]
    Cancelled,

    /// An I/O error occurred during prompting.
    #[error("Dialoguer error: {0}")]
    Dialoguer(#[from] dialoguer::Error),

    /// The wizard refused to continue.
    #[error(transparent)]
    Wizard(#[from] WizardError),
}

/// Helper to check if a dialoguer error is a cancellation (Ctrl+C / Escape)
fn is_cancelled(err: &dialoguer::Error) -> bool {
    matches!(err, dialoguer::Error::IO(io_err) if io_err.kind() == std::io::ErrorKind::Interrupted)
}

fn prompt_result<T>(result: Result<T, dialoguer::Error>) -> Result<T, DialoguerError> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if is_cancelled(&e) => Err(DialoguerError::Cancelled),
        Err(e) => Err(DialoguerError::Dialoguer(e)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Submit,
    Back,
    Quit,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Self::Next => "Next",
            Self::Submit => "Generate roadmap",
            Self::Back => "Back",
            Self::Quit => "Quit",
        }
    }
}

fn actions(can_go_back: bool, is_last: bool) -> Vec<Action> {
    let mut actions = vec![if is_last { Action::Submit } else { Action::Next }];
    if can_go_back {
        actions.push(Action::Back);
    }
    actions.push(Action::Quit);
    actions
}

fn option_label(option: &OptionView) -> String {
    match &option.description {
        Some(description) => format!("{} - {description}", option.title),
        None => option.title.clone(),
    }
}

/// Indices to deselect and to select to go from `current` to `chosen`.
///
/// Deselections come first so a full selection can be swapped around
/// without hitting the limit.
fn selection_changes(current: &[bool], chosen: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let deselect = current
        .iter()
        .enumerate()
        .filter(|(idx, selected)| **selected && !chosen.contains(idx))
        .map(|(idx, _)| idx)
        .collect();
    let select = chosen
        .iter()
        .copied()
        .filter(|&idx| !current.get(idx).copied().unwrap_or(false))
        .collect();
    (deselect, select)
}

/// Load the questionnaire and walk the user through it.
///
/// Returns the URL of the generated roadmap.
pub async fn run_wizard<A>(
    wizard: &mut WizardController<A, DialoguerView>,
) -> Result<String, DialoguerError>
where
    A: QuestionnaireApi,
{
    let theme = wizard.view().theme();

    while let Err(err) = wizard.initialize().await {
        let retryable = wizard.failure().is_some_and(|failure| failure.is_retryable());
        let reload = retryable
            && prompt_result(
                Confirm::with_theme(&*theme)
                    .with_prompt("Reload the questionnaire?")
                    .default(true)
                    .interact(),
            )?;
        if !reload {
            return Err(err.into());
        }
    }

    loop {
        let model = wizard.view_model();
        let Some(question) = model.question else {
            return Err(WizardError::NotReady(model.state).into());
        };

        ask(wizard, &*theme, &question, &model.text).await?;

        // The answer may have changed what comes next.
        let model = wizard.view_model();
        let actions = actions(model.can_go_back, model.is_last);
        let labels: Vec<&str> = actions.iter().map(|action| action.label()).collect();
        let choice = prompt_result(
            Select::with_theme(&*theme)
                .items(&labels)
                .default(0)
                .interact(),
        )?;
        wizard.dismiss_error();

        match actions[choice] {
            Action::Next => {
                let outcome = wizard.next_question().await?;
                debug!(?outcome, "next");
            }
            Action::Back => {
                wizard.previous_question()?;
            }
            Action::Submit => match wizard.submit().await? {
                SubmitOutcome::Completed { document_url } => return Ok(document_url),
                outcome => debug!(?outcome, "submission did not complete"),
            },
            Action::Quit => return Err(DialoguerError::Cancelled),
        }
    }
}

async fn ask<A>(
    wizard: &mut WizardController<A, DialoguerView>,
    theme: &dyn Theme,
    question: &QuestionView,
    draft: &str,
) -> Result<(), DialoguerError>
where
    A: QuestionnaireApi,
{
    match question.kind {
        QuestionKind::FreeText => {
            let mut input = Input::<String>::with_theme(theme)
                .with_prompt(&question.text)
                .allow_empty(!question.required);
            if !draft.is_empty() {
                input = input.with_initial_text(draft);
            }
            let text = prompt_result(input.interact_text())?;
            wizard.set_text(text).await?;
        }

        QuestionKind::SingleChoice => {
            let items: Vec<String> = question.options.iter().map(option_label).collect();
            let default = question
                .options
                .iter()
                .position(|option| option.selected)
                .unwrap_or(0);
            let idx = prompt_result(
                Select::with_theme(theme)
                    .with_prompt(&question.text)
                    .items(&items)
                    .default(default)
                    .interact(),
            )?;
            wizard.select_option(&question.options[idx].title).await?;
        }

        QuestionKind::MultiChoice => {
            let items: Vec<String> = question.options.iter().map(option_label).collect();
            let current: Vec<bool> = question.options.iter().map(|option| option.selected).collect();
            let prompt = match question.max_count {
                Some(max) => format!("{} (up to {max})", question.text),
                None => question.text.clone(),
            };
            let chosen = prompt_result(
                MultiSelect::with_theme(theme)
                    .with_prompt(prompt)
                    .items(&items)
                    .defaults(&current)
                    .interact(),
            )?;

            let (deselect, select) = selection_changes(&current, &chosen);
            for idx in deselect.into_iter().chain(select) {
                let title = &question.options[idx].title;
                if let SelectionOutcome::Rejected(reason) = wizard.toggle_option(title).await? {
                    println!("Error: {reason}");
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deselections_come_before_selections() {
        let current = [true, false, true, false];
        let (deselect, select) = selection_changes(&current, &[1, 2]);

        assert_eq!(deselect, vec![0]);
        assert_eq!(select, vec![1]);
    }

    #[test]
    fn unchanged_selection_needs_no_toggles() {
        let (deselect, select) = selection_changes(&[true, true], &[0, 1]);
        assert!(deselect.is_empty());
        assert!(select.is_empty());
    }

    #[test]
    fn last_question_offers_submit() {
        assert_eq!(
            actions(true, true),
            vec![Action::Submit, Action::Back, Action::Quit]
        );
        assert_eq!(actions(false, false), vec![Action::Next, Action::Quit]);
    }

    #[test]
    fn labels_include_descriptions() {
        let option = OptionView {
            title: "Reduce Risk".into(),
            description: Some("Fewer incidents".into()),
            icon: None,
            selected: false,
        };
        assert_eq!(option_label(&option), "Reduce Risk - Fewer incidents");
    }
}
