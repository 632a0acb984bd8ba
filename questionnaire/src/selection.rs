use std::collections::BTreeSet;

use crate::{Answer, QuestionKind};

/// Transient, not yet confirmed input for the current question.
///
/// Reset on every navigation and reseeded from the committed answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    choices: BTreeSet<String>,
    text: String,
}

/// Result of a selection change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The option was added to the selection.
    Selected,
    /// The option was removed from the selection.
    Deselected,
    /// The option replaced the previous selection.
    Replaced { previous: Vec<String> },
    /// Nothing changed.
    Rejected(SelectionRejection),
}

impl SelectionOutcome {
    /// Check if the selection changed.
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Why a selection change was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionRejection {
    #[error("You can select at most {max_count} option(s)")]
    LimitReached { max_count: usize },

    #[error("'{0}' is not an option of this question")]
    UnknownOption(String),

    #[error("This question takes a text answer")]
    NotAChoiceQuestion,
}

impl SelectionState {
    /// Seed the transient state from a committed answer.
    pub fn seeded(answer: Option<&Answer>) -> Self {
        match answer {
            Some(Answer::Text(text)) => Self {
                choices: BTreeSet::new(),
                text: text.clone(),
            },
            Some(Answer::Choice(choice)) => Self {
                choices: BTreeSet::from([choice.clone()]),
                text: String::new(),
            },
            Some(Answer::MultiChoice(choices)) => Self {
                choices: choices.clone(),
                text: String::new(),
            },
            None => Self::default(),
        }
    }

    /// The selected option titles.
    pub fn choices(&self) -> &BTreeSet<String> {
        &self.choices
    }

    /// The free-text draft.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Check whether an option is selected.
    pub fn is_selected(&self, title: &str) -> bool {
        self.choices.contains(title)
    }

    /// Replace the free-text draft.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Toggle an option of a multi-choice question.
    ///
    /// Deselecting is always allowed. Selecting beyond `max_count` is rejected
    /// without changing anything. With `exclusive`, a new selection replaces
    /// the previous ones instead.
    pub fn toggle(&mut self, title: &str, max_count: usize, exclusive: bool) -> SelectionOutcome {
        if self.choices.remove(title) {
            return SelectionOutcome::Deselected;
        }

        if exclusive {
            return self.select_only(title);
        }

        if self.choices.len() >= max_count {
            return SelectionOutcome::Rejected(SelectionRejection::LimitReached { max_count });
        }

        self.choices.insert(title.to_string());
        SelectionOutcome::Selected
    }

    /// Make `title` the only selected option.
    pub fn select_only(&mut self, title: &str) -> SelectionOutcome {
        let previous: Vec<String> = std::mem::take(&mut self.choices).into_iter().collect();
        self.choices.insert(title.to_string());
        if previous.is_empty() {
            SelectionOutcome::Selected
        } else {
            SelectionOutcome::Replaced { previous }
        }
    }

    /// The answer this input amounts to for a question of `kind`, if any.
    pub fn answer_for(&self, kind: QuestionKind) -> Option<Answer> {
        match kind {
            QuestionKind::FreeText => {
                let trimmed = self.text.trim();
                (!trimmed.is_empty()).then(|| Answer::Text(trimmed.to_string()))
            }
            QuestionKind::SingleChoice => self.choices.iter().next().cloned().map(Answer::Choice),
            QuestionKind::MultiChoice => {
                (!self.choices.is_empty()).then(|| Answer::MultiChoice(self.choices.clone()))
            }
        }
    }
}
