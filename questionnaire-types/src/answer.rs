use std::collections::BTreeSet;

use serde::{Serialize, Serializer};

use crate::{QuestionKind, RawAnswer};

/// A committed answer to a single question.
///
/// Serialized as a string for `Text` and `Choice`, and as a list of strings
/// for `MultiChoice`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Free text (trimmed).
    Text(String),

    /// The title of the chosen option of a single-choice question.
    Choice(String),

    /// The titles of the chosen options of a multi-choice question.
    MultiChoice(BTreeSet<String>),
}

impl Answer {
    /// Build a multi-choice answer from option titles.
    pub fn choices<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MultiChoice(titles.into_iter().map(Into::into).collect())
    }

    /// Convert a raw saved answer into an answer shaped for `kind`.
    ///
    /// Returns `None` when the raw shape cannot represent an answer of that kind.
    pub fn from_raw(kind: QuestionKind, raw: RawAnswer) -> Option<Self> {
        match (kind, raw) {
            (QuestionKind::FreeText, RawAnswer::One(text)) => Some(Self::Text(text)),
            (QuestionKind::SingleChoice, RawAnswer::One(choice)) => Some(Self::Choice(choice)),
            (QuestionKind::SingleChoice, RawAnswer::Many(mut choices)) if choices.len() == 1 => {
                choices.pop().map(Self::Choice)
            }
            (QuestionKind::MultiChoice, RawAnswer::One(choice)) => {
                Some(Self::MultiChoice(BTreeSet::from([choice])))
            }
            (QuestionKind::MultiChoice, RawAnswer::Many(choices)) => {
                Some(Self::MultiChoice(choices.into_iter().collect()))
            }
            _ => None,
        }
    }

    /// Try to get this answer as free text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Try to get this answer as a single choice.
    pub fn as_choice(&self) -> Option<&str> {
        match self {
            Self::Choice(choice) => Some(choice),
            _ => None,
        }
    }

    /// Try to get this answer as a set of choices.
    pub fn as_choices(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::MultiChoice(choices) => Some(choices),
            _ => None,
        }
    }

    /// All chosen option titles; empty for text answers.
    pub fn chosen(&self) -> Vec<&str> {
        match self {
            Self::Text(_) => Vec::new(),
            Self::Choice(choice) => vec![choice.as_str()],
            Self::MultiChoice(choices) => choices.iter().map(String::as_str).collect(),
        }
    }

    /// Check whether `value` is one of the chosen option titles.
    pub fn contains_choice(&self, value: &str) -> bool {
        match self {
            Self::Text(_) => false,
            Self::Choice(choice) => choice == value,
            Self::MultiChoice(choices) => choices.contains(value),
        }
    }

    /// Check if the answer carries no content.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) | Self::Choice(text) => text.trim().is_empty(),
            Self::MultiChoice(choices) => choices.is_empty(),
        }
    }

    /// Get the type name of this answer for log messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "Text",
            Self::Choice(_) => "Choice",
            Self::MultiChoice(_) => "MultiChoice",
        }
    }
}

impl Serialize for Answer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(value) | Self::Choice(value) => serializer.serialize_str(value),
            Self::MultiChoice(values) => serializer.collect_seq(values),
        }
    }
}

impl From<Answer> for RawAnswer {
    fn from(answer: Answer) -> Self {
        match answer {
            Answer::Text(value) | Answer::Choice(value) => Self::One(value),
            Answer::MultiChoice(values) => Self::Many(values.into_iter().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_by_shape() {
        let text = serde_json::to_string(&Answer::Text("hello".into())).unwrap();
        assert_eq!(text, r#""hello""#);

        let multi = serde_json::to_string(&Answer::choices(["b", "a"])).unwrap();
        assert_eq!(multi, r#"["a","b"]"#);
    }

    #[test]
    fn from_raw_follows_question_kind() {
        let multi = Answer::from_raw(QuestionKind::MultiChoice, RawAnswer::One("Goal A".into()));
        assert_eq!(multi, Some(Answer::choices(["Goal A"])));

        let single = Answer::from_raw(
            QuestionKind::SingleChoice,
            RawAnswer::Many(vec!["High".into()]),
        );
        assert_eq!(single, Some(Answer::Choice("High".into())));

        let text = Answer::from_raw(QuestionKind::FreeText, RawAnswer::Many(vec!["x".into()]));
        assert_eq!(text, None);

        let ambiguous = Answer::from_raw(
            QuestionKind::SingleChoice,
            RawAnswer::Many(vec!["a".into(), "b".into()]),
        );
        assert_eq!(ambiguous, None);
    }

    #[test]
    fn contains_choice() {
        let answer = Answer::choices(["Goal A", "Goal B"]);
        assert!(answer.contains_choice("Goal B"));
        assert!(!answer.contains_choice("Goal C"));
        assert!(!Answer::Text("Goal A".into()).contains_choice("Goal A"));
    }

    #[test]
    fn emptiness() {
        assert!(Answer::Text("   ".into()).is_empty());
        assert!(Answer::MultiChoice(BTreeSet::new()).is_empty());
        assert!(!Answer::Choice("x".into()).is_empty());
    }
}
