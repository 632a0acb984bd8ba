//! In-memory questionnaire server for testing without a network.
//!
//! `TestApi` validates answers with the same rules the real server applies,
//! persists accepted ones, and records every call so tests can assert on
//! what reached the "network".
//!
//! # Example
//!
//! ```rust,ignore
//! use questionnaire::{Question, QuestionKind, TestApi};
//!
//! let api = TestApi::new()
//!     .with_question(Question::new(1, "Name your goal", QuestionKind::FreeText))
//!     .with_saved_answer(1, "Reduce risk");
//! ```

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use regex::Regex;

use crate::{
    Answer, ApiError, AuthStatus, GenerateResponse, InvalidQuestion, Question, QuestionId,
    QuestionKind, QuestionnaireApi, RawAnswer, SaveAnswerRequest, SaveAnswerResponse,
    SavedAnswer, ValidateAllResponse,
};

const DEFAULT_DOCUMENT_ID: &str = "test-roadmap";

/// A server call, as recorded by `TestApi`.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    CheckAuth,
    FetchQuestions,
    FetchSavedAnswers,
    SaveAnswer(SaveAnswerRequest),
    ValidateAll,
    FetchProgress,
    GenerateRoadmap,
}

/// Server endpoints, used to make `TestApi` fail specific calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    AuthCheck,
    Questions,
    SavedAnswers,
    SaveAnswer,
    ValidateAll,
    Progress,
    GenerateRoadmap,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Self::AuthCheck => "/api/auth-check",
            Self::Questions => "/api/questions",
            Self::SavedAnswers => "/api/saved-answers",
            Self::SaveAnswer => "/api/submit-answer",
            Self::ValidateAll => "/api/validate-answers",
            Self::Progress => "/api/progress",
            Self::GenerateRoadmap => "/api/generate-roadmap",
        }
    }
}

/// A scripted in-memory questionnaire server.
#[derive(Debug, Default)]
pub struct TestApi {
    questions: Vec<Question>,
    login_required: bool,
    failing: HashSet<Endpoint>,
    document_id: Option<String>,
    validate_all_override: Option<ValidateAllResponse>,
    generate_override: Option<GenerateResponse>,
    saved: Mutex<BTreeMap<QuestionId, RawAnswer>>,
    scripted: Mutex<HashMap<QuestionId, VecDeque<SaveAnswerResponse>>>,
    calls: Mutex<Vec<ApiCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TestApi {
    /// Create a server without questions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve these question definitions.
    pub fn with_questions(mut self, questions: impl IntoIterator<Item = Question>) -> Self {
        self.questions.extend(questions);
        self
    }

    /// Serve one more question definition.
    pub fn with_question(mut self, question: Question) -> Self {
        self.questions.push(question);
        self
    }

    /// Pretend an answer was saved in an earlier session.
    pub fn with_saved_answer(
        self,
        question: impl Into<QuestionId>,
        answer: impl Into<RawAnswer>,
    ) -> Self {
        lock(&self.saved).insert(question.into(), answer.into());
        self
    }

    /// Answer the next save of `question` with `response` instead of applying the rules.
    ///
    /// Responses queue up per question and are used in order.
    pub fn with_save_response(
        self,
        question: impl Into<QuestionId>,
        response: SaveAnswerResponse,
    ) -> Self {
        lock(&self.scripted)
            .entry(question.into())
            .or_default()
            .push_back(response);
        self
    }

    /// Make every call to `endpoint` fail as if the network were down.
    pub fn failing(mut self, endpoint: Endpoint) -> Self {
        self.failing.insert(endpoint);
        self
    }

    /// Report the session as signed out.
    pub fn requiring_login(mut self) -> Self {
        self.login_required = true;
        self
    }

    /// Use a fixed whole-questionnaire validation report.
    pub fn with_validate_all(mut self, response: ValidateAllResponse) -> Self {
        self.validate_all_override = Some(response);
        self
    }

    /// Use a fixed roadmap generation response.
    pub fn with_generate_response(mut self, response: GenerateResponse) -> Self {
        self.generate_override = Some(response);
        self
    }

    /// Id of the document produced by a successful generation.
    pub fn with_document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        lock(&self.calls).clone()
    }

    /// The save requests received so far, in order.
    pub fn save_requests(&self) -> Vec<SaveAnswerRequest> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                ApiCall::SaveAnswer(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    /// The answer currently persisted for a question.
    pub fn saved_answer(&self, question: impl Into<QuestionId>) -> Option<RawAnswer> {
        lock(&self.saved).get(&question.into()).cloned()
    }

    fn record(&self, call: ApiCall) {
        lock(&self.calls).push(call);
    }

    fn check_failing(&self, endpoint: Endpoint) -> Result<(), ApiError> {
        if self.failing.contains(&endpoint) {
            Err(ApiError::Transport {
                endpoint: endpoint.path().to_string(),
                message: "connection refused".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    fn progress(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        let saved = lock(&self.saved);
        let answered = self
            .questions
            .iter()
            .filter(|question| saved.contains_key(&question.id))
            .count();
        answered as f64 / self.questions.len() as f64 * 100.0
    }

    fn report(&self) -> ValidateAllResponse {
        let saved = lock(&self.saved);
        let invalid_questions: Vec<InvalidQuestion> = self
            .questions
            .iter()
            .filter_map(|question| {
                let message = match saved.get(&question.id) {
                    None if question.required => "This question requires an answer".to_string(),
                    None => return None,
                    Some(raw) => {
                        let verdict = Answer::from_raw(question.kind, raw.clone())
                            .ok_or_else(|| "Invalid answer type".to_string())
                            .and_then(|answer| check_answer(question, &answer));
                        match verdict {
                            Err(message) if question.required => message,
                            _ => return None,
                        }
                    }
                };
                Some(InvalidQuestion {
                    question_id: question.id,
                    message,
                })
            })
            .collect();

        ValidateAllResponse {
            is_valid: invalid_questions.is_empty(),
            invalid_questions,
        }
    }
}

/// The server's answer rules.
fn check_answer(question: &Question, answer: &Answer) -> Result<(), String> {
    if answer.is_empty() {
        return Err("Answer cannot be empty".to_string());
    }

    let shape_matches = matches!(
        (question.kind, answer),
        (QuestionKind::FreeText, Answer::Text(_))
            | (QuestionKind::SingleChoice, Answer::Choice(_))
            | (QuestionKind::MultiChoice, Answer::MultiChoice(_))
    );
    if !shape_matches {
        return Err("Invalid answer type".to_string());
    }

    if question.kind.is_choice()
        && answer
            .chosen()
            .iter()
            .any(|choice| !question.has_option(choice))
    {
        return Err("Invalid option selected".to_string());
    }

    let Some(rules) = &question.validation_rules else {
        return Ok(());
    };

    let count = answer.chosen().len();
    if let Some(min) = rules.min_count
        && question.kind == QuestionKind::MultiChoice
        && count < min
    {
        return Err(format!("Select at least {min} option(s)"));
    }
    if let Some(max) = rules.max_count
        && question.kind == QuestionKind::MultiChoice
        && count > max
    {
        return Err(format!("Select at most {max} option(s)"));
    }

    if let Some(text) = answer.as_text() {
        let length = text.chars().count();
        if let Some(min) = rules.min_length
            && length < min
        {
            return Err(format!("Answer must be at least {min} characters long"));
        }
        if let Some(max) = rules.max_length
            && length > max
        {
            return Err(format!("Answer must not exceed {max} characters"));
        }
        if let Some(pattern) = &rules.pattern {
            // Anchored at the start only, like a prefix match.
            let matches = Regex::new(&format!("^(?:{pattern})"))
                .map(|regex| regex.is_match(text))
                .unwrap_or(false);
            if !matches {
                return Err("Answer format is invalid".to_string());
            }
        }
    }

    Ok(())
}

#[async_trait]
impl QuestionnaireApi for TestApi {
    async fn check_auth(&self) -> Result<AuthStatus, ApiError> {
        self.record(ApiCall::CheckAuth);
        if self.failing.contains(&Endpoint::AuthCheck) {
            return Err(ApiError::Status {
                endpoint: Endpoint::AuthCheck.path().to_string(),
                status: 500,
            });
        }
        if self.login_required {
            Ok(AuthStatus::LoginRequired)
        } else {
            Ok(AuthStatus::Authenticated)
        }
    }

    async fn fetch_questions(&self) -> Result<Vec<Question>, ApiError> {
        self.record(ApiCall::FetchQuestions);
        self.check_failing(Endpoint::Questions)?;
        Ok(self.questions.clone())
    }

    async fn fetch_saved_answers(&self) -> Result<Vec<SavedAnswer>, ApiError> {
        self.record(ApiCall::FetchSavedAnswers);
        self.check_failing(Endpoint::SavedAnswers)?;
        Ok(lock(&self.saved)
            .iter()
            .map(|(id, answer)| SavedAnswer {
                question_id: *id,
                answer: answer.clone(),
            })
            .collect())
    }

    async fn save_answer(
        &self,
        request: &SaveAnswerRequest,
    ) -> Result<SaveAnswerResponse, ApiError> {
        self.record(ApiCall::SaveAnswer(request.clone()));
        self.check_failing(Endpoint::SaveAnswer)?;

        let scripted = lock(&self.scripted)
            .get_mut(&request.question_id)
            .and_then(VecDeque::pop_front);
        if let Some(response) = scripted {
            if response.is_accepted() {
                lock(&self.saved).insert(request.question_id, request.answer.clone().into());
            }
            return Ok(response);
        }

        let Some(question) = self.question(request.question_id) else {
            return Ok(SaveAnswerResponse::rejected("Question not found"));
        };
        if let Err(message) = check_answer(question, &request.answer) {
            return Ok(SaveAnswerResponse::rejected(message));
        }

        lock(&self.saved).insert(request.question_id, request.answer.clone().into());
        Ok(SaveAnswerResponse::accepted(Some(self.progress())))
    }

    async fn validate_all(&self) -> Result<ValidateAllResponse, ApiError> {
        self.record(ApiCall::ValidateAll);
        self.check_failing(Endpoint::ValidateAll)?;
        Ok(self
            .validate_all_override
            .clone()
            .unwrap_or_else(|| self.report()))
    }

    async fn fetch_progress(&self) -> Result<f64, ApiError> {
        self.record(ApiCall::FetchProgress);
        self.check_failing(Endpoint::Progress)?;
        Ok(self.progress())
    }

    async fn generate_roadmap(&self) -> Result<GenerateResponse, ApiError> {
        self.record(ApiCall::GenerateRoadmap);
        self.check_failing(Endpoint::GenerateRoadmap)?;
        if let Some(response) = &self.generate_override {
            return Ok(response.clone());
        }

        let report = self.report();
        if !report.is_valid {
            let mut response = GenerateResponse::failure(
                "Please answer all required questions correctly before generating the roadmap",
            );
            response.invalid_questions = report.invalid_questions;
            return Ok(response);
        }

        Ok(GenerateResponse::success(
            self.document_id
                .clone()
                .unwrap_or_else(|| DEFAULT_DOCUMENT_ID.to_string()),
        ))
    }
}
