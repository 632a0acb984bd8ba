//! Request and response bodies of the questionnaire server.

use serde::{Deserialize, Serialize};

use crate::{Answer, ApiError, QuestionId};

/// A saved answer as returned by `GET /api/saved-answers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedAnswer {
    pub question_id: QuestionId,
    pub answer: RawAnswer,
}

impl SavedAnswer {
    pub fn new(question_id: impl Into<QuestionId>, answer: impl Into<RawAnswer>) -> Self {
        Self {
            question_id: question_id.into(),
            answer: answer.into(),
        }
    }
}

/// An answer value before it is matched against its question's kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnswer {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for RawAnswer {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<String> for RawAnswer {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<&str>> for RawAnswer {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for RawAnswer {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

/// Body of the save/validate-one-answer call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveAnswerRequest {
    pub question_id: QuestionId,
    pub answer: Answer,
}

/// The `status` field used by the write endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
    #[serde(other)]
    Other,
}

impl ResponseStatus {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// Response of the save/validate-one-answer call.
///
/// Rejections arrive either as `status: "success", is_valid: false` or as
/// `status: "error"` with a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveAnswerResponse {
    pub status: ResponseStatus,
    #[serde(default)]
    pub is_valid: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
}

impl SaveAnswerResponse {
    /// A successful save with the resulting progress.
    pub fn accepted(progress: Option<f64>) -> Self {
        Self {
            status: ResponseStatus::Success,
            is_valid: true,
            message: None,
            progress,
        }
    }

    /// A rejection with the server's message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            is_valid: false,
            message: Some(message.into()),
            progress: None,
        }
    }

    /// Check if the server accepted and persisted the answer.
    pub fn is_accepted(&self) -> bool {
        self.status.is_success() && self.is_valid
    }
}

/// One entry of the whole-questionnaire validation report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidQuestion {
    pub question_id: QuestionId,
    pub message: String,
}

/// Response of `GET /api/validate-answers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateAllResponse {
    pub is_valid: bool,
    #[serde(default)]
    pub invalid_questions: Vec<InvalidQuestion>,
}

impl ValidateAllResponse {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            invalid_questions: Vec::new(),
        }
    }

    /// All per-question messages, one `Question {id}: {message}` line each.
    pub fn summary(&self) -> String {
        summarize(&self.invalid_questions)
    }
}

pub(crate) fn summarize(invalid: &[InvalidQuestion]) -> String {
    invalid
        .iter()
        .map(|entry| format!("Question {}: {}", entry.question_id, entry.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Response of `GET /api/progress`: either `{progress}` or `{error}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressResponse {
    pub fn into_result(self) -> Result<f64, ApiError> {
        match (self.progress, self.error) {
            (Some(progress), None) => Ok(progress),
            (_, Some(error)) => Err(ApiError::Server(error)),
            (None, None) => Err(ApiError::Server("progress missing from response".into())),
        }
    }
}

/// Response of `POST /api/generate-roadmap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_questions: Vec<InvalidQuestion>,
}

impl GenerateResponse {
    pub fn success(doc_id: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            doc_id: Some(doc_id.into()),
            message: None,
            invalid_questions: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            doc_id: None,
            message: Some(message.into()),
            invalid_questions: Vec::new(),
        }
    }

    /// The generated document's id, if generation succeeded.
    pub fn document_id(&self) -> Option<&str> {
        if self.status.is_success() {
            self.doc_id.as_deref().filter(|id| !id.is_empty())
        } else {
            None
        }
    }

    /// A human-readable explanation of a failed generation.
    pub fn failure_message(&self) -> String {
        let headline = self
            .message
            .clone()
            .unwrap_or_else(|| "Failed to generate the roadmap".to_string());
        if self.invalid_questions.is_empty() {
            headline
        } else {
            format!("{headline}\n{}", summarize(&self.invalid_questions))
        }
    }
}

/// Outcome of the authentication check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Authenticated,
    LoginRequired,
}
