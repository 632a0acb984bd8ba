use async_trait::async_trait;

use crate::{
    ApiError, AuthStatus, GenerateResponse, Question, SaveAnswerRequest, SaveAnswerResponse,
    SavedAnswer, ValidateAllResponse,
};

/// The server contract a questionnaire client talks to.
///
/// Implemented over HTTP by `questionnaire-http` and in memory by
/// `questionnaire::TestApi`.
#[async_trait]
pub trait QuestionnaireApi: Send + Sync {
    /// Check whether the session is signed in.
    async fn check_auth(&self) -> Result<AuthStatus, ApiError>;

    /// Fetch the ordered list of question definitions.
    async fn fetch_questions(&self) -> Result<Vec<Question>, ApiError>;

    /// Fetch answers saved in earlier sessions.
    async fn fetch_saved_answers(&self) -> Result<Vec<SavedAnswer>, ApiError>;

    /// Validate and persist one answer.
    ///
    /// Rejections are returned as data (`is_valid == false` or an error status);
    /// `Err` is reserved for calls that produced no usable verdict.
    async fn save_answer(
        &self,
        request: &SaveAnswerRequest,
    ) -> Result<SaveAnswerResponse, ApiError>;

    /// Validate the whole questionnaire.
    async fn validate_all(&self) -> Result<ValidateAllResponse, ApiError>;

    /// Fetch the completion percentage.
    async fn fetch_progress(&self) -> Result<f64, ApiError>;

    /// Generate the roadmap document from the saved answers.
    async fn generate_roadmap(&self) -> Result<GenerateResponse, ApiError>;
}
