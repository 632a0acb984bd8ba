//! Wizard behaviour settings.

use serde::{Deserialize, Serialize};

use crate::QuestionId;

/// Default maximum number of options a multi-choice question accepts when
/// the server does not say otherwise.
pub const DEFAULT_MAX_COUNT: usize = 3;

/// Where the browser-equivalent login flow lives.
pub const DEFAULT_LOGIN_URL: &str = "/google_login";

/// Viewer URL of a generated roadmap; `{doc_id}` is replaced by the document id.
pub const DEFAULT_DOCUMENT_URL_TEMPLATE: &str =
    "https://docs.google.com/presentation/d/{doc_id}/edit";

/// When answers are sent to the server for validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Only when moving forward or submitting.
    #[default]
    OnAdvance,

    /// After every input change as well.
    OnChange,
}

/// Conditional questionnaires: the governing question's answer decides
/// which of the remaining questions are asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalConfig {
    pub governing_question: QuestionId,
}

impl Default for ConditionalConfig {
    fn default() -> Self {
        Self {
            governing_question: QuestionId::new(1),
        }
    }
}

/// Wizard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// When answers are validated.
    pub validation_policy: ValidationPolicy,
    /// Conditional filtering, if enabled.
    pub conditional: Option<ConditionalConfig>,
    /// Selection limit for multi-choice questions without a `max_count` rule.
    pub default_max_count: usize,
    /// Whether to check the session before loading.
    pub auth_check: bool,
    /// Where to send the user when the session is not signed in.
    pub login_url: String,
    /// Viewer URL of the generated document, containing `{doc_id}`.
    pub document_url_template: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            validation_policy: ValidationPolicy::default(),
            conditional: None,
            default_max_count: DEFAULT_MAX_COUNT,
            auth_check: false,
            login_url: DEFAULT_LOGIN_URL.to_string(),
            document_url_template: DEFAULT_DOCUMENT_URL_TEMPLATE.to_string(),
        }
    }
}

impl WizardConfig {
    /// Set the validation policy.
    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.validation_policy = policy;
        self
    }

    /// Enable conditional filtering governed by `question`.
    pub fn conditional_on(mut self, question: impl Into<QuestionId>) -> Self {
        self.conditional = Some(ConditionalConfig {
            governing_question: question.into(),
        });
        self
    }

    /// Set the selection limit used when a question has no `max_count` rule.
    pub fn with_default_max_count(mut self, max_count: usize) -> Self {
        self.default_max_count = max_count;
        self
    }

    /// Check the session before loading.
    pub fn with_auth_check(mut self) -> Self {
        self.auth_check = true;
        self
    }

    /// The governing question, if conditional filtering is enabled.
    pub fn governing_question(&self) -> Option<QuestionId> {
        self.conditional.map(|conditional| conditional.governing_question)
    }

    /// Build the viewer URL of a generated document.
    pub fn document_url(&self, doc_id: &str) -> String {
        self.document_url_template.replace("{doc_id}", doc_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = WizardConfig::default();
        assert_eq!(config.validation_policy, ValidationPolicy::OnAdvance);
        assert_eq!(config.default_max_count, 3);
        assert!(config.governing_question().is_none());
    }

    #[test]
    fn document_url_substitutes_id() {
        let config = WizardConfig::default();
        assert_eq!(
            config.document_url("abc123"),
            "https://docs.google.com/presentation/d/abc123/edit"
        );
    }

    #[test]
    fn partial_toml() {
        let config: WizardConfig = toml::from_str(
            r#"
            validation_policy = "on_change"
            default_max_count = 1

            [conditional]
            governing_question = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.validation_policy, ValidationPolicy::OnChange);
        assert_eq!(config.default_max_count, 1);
        assert_eq!(config.governing_question(), Some(QuestionId::new(1)));
        assert_eq!(config.login_url, DEFAULT_LOGIN_URL);
    }
}
