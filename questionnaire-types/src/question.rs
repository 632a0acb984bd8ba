use serde::{Deserialize, Deserializer, Serialize};

use crate::QuestionId;

/// A single question of the questionnaire, as served by `GET /api/questions`.
///
/// Questions are immutable once loaded for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Server-assigned identifier.
    pub id: QuestionId,

    /// The prompt text shown to the user.
    pub text: String,

    /// The kind of question (determines the shape of the answer).
    #[serde(rename = "type", alias = "question_type")]
    pub kind: QuestionKind,

    /// Whether an answer is needed before the questionnaire can be submitted.
    #[serde(default = "default_required")]
    pub required: bool,

    /// Options for choice questions, in display order.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub options: Vec<ChoiceOption>,

    /// Server-side validation rules. The client only enforces `max_count`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_rules: Option<ValidationRules>,

    /// For conditional questionnaires: the governing answer value that includes this question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_answer: Option<String>,

    /// Sort key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,

    /// The strategic goal this question belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategic_goal: Option<String>,

    /// The capability area this question assesses.
    #[serde(
        default,
        alias = "major_cnapp_area",
        skip_serializing_if = "Option::is_none"
    )]
    pub area: Option<String>,
}

fn default_required() -> bool {
    true
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ChoiceOption>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ChoiceOption>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Question {
    /// Create a new required question without options or rules.
    pub fn new(id: impl Into<QuestionId>, text: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind,
            required: true,
            options: Vec::new(),
            validation_rules: None,
            parent_answer: None,
            order: None,
            strategic_goal: None,
            area: None,
        }
    }

    /// Set the options.
    pub fn with_options<I, O>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<ChoiceOption>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Set the validation rules.
    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.validation_rules = Some(rules);
        self
    }

    /// Mark this question as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set the governing answer value that includes this question.
    pub fn with_parent_answer(mut self, parent: impl Into<String>) -> Self {
        self.parent_answer = Some(parent.into());
        self
    }

    /// Set the sort key.
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    /// Look up an option by its title.
    pub fn option(&self, title: &str) -> Option<&ChoiceOption> {
        self.options.iter().find(|option| option.title == title)
    }

    /// Check whether `title` is one of this question's options.
    pub fn has_option(&self, title: &str) -> bool {
        self.option(title).is_some()
    }

    /// The maximum selection count configured by the server, if any.
    pub fn max_count(&self) -> Option<usize> {
        self.validation_rules.as_ref().and_then(|rules| rules.max_count)
    }

    /// The minimum selection count configured by the server, if any.
    pub fn min_count(&self) -> Option<usize> {
        self.validation_rules.as_ref().and_then(|rules| rules.min_count)
    }
}

/// The kind of question, determining the shape of its answer.
///
/// `multiple_choice` is the server's legacy name for picking one of several
/// options and is accepted as an alias of `single-choice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    /// Pick exactly one option.
    #[serde(
        rename = "single-choice",
        alias = "single_choice",
        alias = "radio",
        alias = "multiple_choice"
    )]
    SingleChoice,

    /// Pick any number of options, bounded by `max_count`.
    #[serde(rename = "multi-choice", alias = "multi_choice", alias = "checkbox")]
    MultiChoice,

    /// Free text input.
    #[serde(rename = "text", alias = "free-text", alias = "free_text")]
    FreeText,
}

impl QuestionKind {
    /// Check if answers are picked from a list of options.
    pub fn is_choice(self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultiChoice)
    }
}

/// An option of a choice question.
///
/// On the wire an option is either a bare title string or an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireOption")]
pub struct ChoiceOption {
    /// The option's title; this is also the answer value.
    pub title: String,

    /// Optional longer description (shown as a tooltip or subtitle).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Optional icon tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl ChoiceOption {
    /// Create an option with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            icon: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the icon tag.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

impl From<&str> for ChoiceOption {
    fn from(title: &str) -> Self {
        Self::new(title)
    }
}

impl From<String> for ChoiceOption {
    fn from(title: String) -> Self {
        Self::new(title)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireOption {
    Title(String),
    Full {
        title: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        icon: Option<String>,
    },
}

impl From<WireOption> for ChoiceOption {
    fn from(wire: WireOption) -> Self {
        match wire {
            WireOption::Title(title) => Self::new(title),
            WireOption::Full {
                title,
                description,
                icon,
            } => Self {
                title,
                description,
                icon,
            },
        }
    }
}

/// Validation rules attached to a question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Minimum number of selected options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_count: Option<usize>,

    /// Maximum number of selected options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<usize>,

    /// Minimum text length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    /// Maximum text length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Regular expression the text answer must match from its start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl ValidationRules {
    /// Rules bounding the number of selected options.
    pub fn count(min: Option<usize>, max: Option<usize>) -> Self {
        Self {
            min_count: min,
            max_count: max,
            ..Self::default()
        }
    }

    /// Rules bounding the length of a text answer.
    pub fn length(min: Option<usize>, max: Option<usize>) -> Self {
        Self {
            min_length: min,
            max_length: max,
            ..Self::default()
        }
    }

    /// Set the pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}
