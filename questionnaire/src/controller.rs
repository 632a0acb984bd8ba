//! The wizard state machine.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, info, warn};

use crate::{
    Answer, Answers, ApiError, AuthStatus, ErrorBanner, InvalidQuestion, Question, QuestionId,
    QuestionKind, QuestionView, QuestionnaireApi, SaveAnswerRequest, SavedAnswer,
    SelectionOutcome, SelectionRejection, SelectionState, ValidationErrors, ValidationPolicy,
    ViewModel, WizardConfig, WizardView, active_questions,
};

const REQUIRED_MESSAGE: &str = "This question requires an answer";
const REJECTED_MESSAGE: &str = "Invalid answer";
const INCOMPLETE_MESSAGE: &str = "Please answer all required questions before submitting";

/// Lifecycle of a wizard session.
///
/// `Loading → Ready → Validating → Ready → … → Submitting → Done`.
/// `Failed` is terminal; the cause is available from
/// [`WizardController::failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Loading,
    Ready,
    Validating,
    Submitting,
    Done,
    Failed,
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Validating => "validating",
            Self::Submitting => "submitting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Why initialization failed.
#[derive(Debug, thiserror::Error)]
pub enum InitFailure {
    #[error("Not signed in")]
    Unauthenticated,

    #[error("Failed to load questionnaire data: {0}")]
    Transport(#[source] ApiError),

    #[error("The questionnaire has no questions")]
    EmptyQuestionList,

    #[error("Question {0} appears more than once")]
    DuplicateQuestion(QuestionId),

    #[error("Choice question {0} has no options")]
    NoOptions(QuestionId),

    #[error("Governing question {0} is not part of the questionnaire")]
    MissingGoverningQuestion(QuestionId),
}

impl InitFailure {
    /// Check if reloading might fix the problem.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_retryable(),
            _ => false,
        }
    }
}

/// Misuse of the controller.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("The wizard is not ready (state: {0})")]
    NotReady(WizardState),

    #[error("Submission is only possible from the last question")]
    NotOnLastQuestion,

    #[error("Initialization failed: {0}")]
    Initialization(String),
}

/// Verdict on the current answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The server accepted and persisted the answer.
    Accepted,
    /// Optional question left empty; nothing to persist.
    ///
    /// An answer committed earlier is kept, locally and on the server, and
    /// comes back when the user returns to the question.
    Skipped,
    /// The answer was refused; the message is shown next to the input.
    Rejected { message: String },
    /// The server could not be reached; a banner was shown.
    Unreachable,
}

impl ValidationOutcome {
    /// Check if the wizard may move past this question.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Accepted | Self::Skipped)
    }
}

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    Moved { position: usize },
    AtStart,
    /// The last question was validated; submit next.
    AtEnd,
    Blocked(ValidationOutcome),
}

/// Result of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed { document_url: String },
    Blocked(ValidationOutcome),
    /// The answer added questions; the wizard moved to the first of them.
    MoreQuestions { position: usize },
    Invalid(Vec<InvalidQuestion>),
    Failed { message: String },
}

/// Owns the state of one questionnaire session.
///
/// Talks to the server through `A` and renders through `V`. The controller
/// is created and owned by whatever mounts the UI.
pub struct WizardController<A, V> {
    api: A,
    view: V,
    config: WizardConfig,
    state: WizardState,
    failure: Option<InitFailure>,
    questions: Vec<Question>,
    /// Indices into `questions`.
    active: Vec<usize>,
    position: usize,
    answers: Answers,
    errors: ValidationErrors,
    selection: SelectionState,
    progress: f64,
    banner: Option<ErrorBanner>,
    document_url: Option<String>,
}

impl<A, V> WizardController<A, V>
where
    A: QuestionnaireApi,
    V: WizardView,
{
    pub fn new(api: A, view: V, config: WizardConfig) -> Self {
        Self {
            api,
            view,
            config,
            state: WizardState::Loading,
            failure: None,
            questions: Vec::new(),
            active: Vec::new(),
            position: 0,
            answers: Answers::new(),
            errors: ValidationErrors::new(),
            selection: SelectionState::default(),
            progress: 0.0,
            banner: None,
            document_url: None,
        }
    }

    // === Accessors ===

    pub fn state(&self) -> WizardState {
        self.state
    }

    /// The cause of a failed initialization.
    pub fn failure(&self) -> Option<&InitFailure> {
        self.failure.as_ref()
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Zero-based position in the active question list.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The questions the wizard walks through, in order.
    pub fn active_questions(&self) -> impl Iterator<Item = &Question> {
        self.active.iter().map(|&idx| &self.questions[idx])
    }

    /// Length of the active question list.
    pub fn total(&self) -> usize {
        self.active.len()
    }

    /// All loaded questions, including those filtered out.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.active
            .get(self.position)
            .map(|&idx| &self.questions[idx])
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn validation_errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn banner(&self) -> Option<&ErrorBanner> {
        self.banner.as_ref()
    }

    /// Where the generated roadmap lives, once submission completed.
    pub fn document_url(&self) -> Option<&str> {
        self.document_url.as_deref()
    }

    /// The answer implied by the current input, if anything was entered.
    pub fn current_answer(&self) -> Option<Answer> {
        self.current_question()
            .and_then(|question| self.selection.answer_for(question.kind))
    }

    /// Effective selection limit of a multi-choice question.
    pub fn max_count(&self, question: &Question) -> usize {
        question.max_count().unwrap_or(self.config.default_max_count)
    }

    /// Snapshot for rendering.
    pub fn view_model(&self) -> ViewModel {
        let question = self.current_question();
        ViewModel {
            state: self.state,
            position: self.position,
            total: self.active.len(),
            question: question.map(|q| {
                let max_count = (q.kind == QuestionKind::MultiChoice).then(|| self.max_count(q));
                QuestionView::new(q, &self.selection, max_count)
            }),
            text: self.selection.text().to_string(),
            error: question
                .and_then(|q| self.errors.get(q.id))
                .map(str::to_string),
            progress: self.progress,
            can_go_back: self.state == WizardState::Ready && self.position > 0,
            is_last: !self.active.is_empty() && self.position + 1 == self.active.len(),
            banner: self.banner.clone(),
        }
    }

    // === Lifecycle ===

    /// Load question definitions and saved answers, then show the first question.
    ///
    /// On failure the wizard ends in [`WizardState::Failed`] without partial state.
    pub async fn initialize(&mut self) -> Result<(), WizardError> {
        self.state = WizardState::Loading;
        self.failure = None;
        self.banner = None;
        self.render();

        match self.load().await {
            Ok(()) => {
                info!(
                    questions = self.questions.len(),
                    active = self.active.len(),
                    answered = self.answers.len(),
                    "questionnaire loaded"
                );
                self.update_progress(None).await;
                Ok(())
            }
            Err(failure) => {
                warn!(error = %failure, "questionnaire failed to load");
                let message = failure.to_string();
                if matches!(failure, InitFailure::Unauthenticated) {
                    let login_url = self.config.login_url.clone();
                    self.view.navigate(&login_url);
                } else {
                    let banner = ErrorBanner::new(message.clone())
                        .retryable(failure.is_retryable())
                        .with_reload();
                    self.show_banner(banner);
                }
                self.state = WizardState::Failed;
                self.failure = Some(failure);
                self.render();
                Err(WizardError::Initialization(message))
            }
        }
    }

    async fn load(&mut self) -> Result<(), InitFailure> {
        if self.config.auth_check {
            match self.api.check_auth().await {
                Ok(AuthStatus::Authenticated) => {}
                Ok(AuthStatus::LoginRequired) => return Err(InitFailure::Unauthenticated),
                Err(err) => {
                    warn!(error = %err, "auth check failed");
                    return Err(InitFailure::Unauthenticated);
                }
            }
        }

        let api = &self.api;
        let (questions, saved) =
            futures::try_join!(api.fetch_questions(), api.fetch_saved_answers()).map_err(
                |err| match err {
                    ApiError::Unauthorized => InitFailure::Unauthenticated,
                    other => InitFailure::Transport(other),
                },
            )?;

        check_questions(&questions, &self.config)?;
        let answers = seed_answers(&questions, saved);

        self.questions = questions;
        self.answers = answers;
        self.errors = ValidationErrors::new();
        self.active = active_questions(
            &self.questions,
            &self.answers,
            self.config.conditional.as_ref(),
        );
        self.position = 0;
        self.reseed();
        self.state = WizardState::Ready;
        self.render();
        Ok(())
    }

    // === Input ===

    /// Replace the free-text draft of the current question.
    pub async fn set_text(&mut self, text: impl Into<String>) -> Result<(), WizardError> {
        self.ensure_ready()?;
        self.selection.set_text(text);
        self.input_changed().await
    }

    /// Toggle an option of the current choice question.
    ///
    /// Rejected selections change nothing and never reach the server.
    pub async fn toggle_option(&mut self, title: &str) -> Result<SelectionOutcome, WizardError> {
        self.ensure_ready()?;
        let Some(question) = self.current_question() else {
            return Err(WizardError::NotReady(self.state));
        };
        let kind = question.kind;
        let known = question.has_option(title);
        let max_count = self.max_count(question);
        let exclusive = max_count == 1 && !self.is_governing(question.id);

        let outcome = if !kind.is_choice() {
            SelectionOutcome::Rejected(SelectionRejection::NotAChoiceQuestion)
        } else if !known {
            SelectionOutcome::Rejected(SelectionRejection::UnknownOption(title.to_string()))
        } else if kind == QuestionKind::SingleChoice {
            if self.selection.is_selected(title) {
                self.selection.toggle(title, 1, false)
            } else {
                self.selection.select_only(title)
            }
        } else {
            self.selection.toggle(title, max_count, exclusive)
        };

        if outcome.changed() {
            self.input_changed().await?;
        } else {
            debug!(option = title, ?outcome, "selection refused");
        }
        Ok(outcome)
    }

    /// Select an option, leaving it selected if it already is.
    pub async fn select_option(&mut self, title: &str) -> Result<SelectionOutcome, WizardError> {
        self.ensure_ready()?;
        if self.selection.is_selected(title) {
            return Ok(SelectionOutcome::Selected);
        }
        self.toggle_option(title).await
    }

    async fn input_changed(&mut self) -> Result<(), WizardError> {
        self.render();
        if self.config.validation_policy == ValidationPolicy::OnChange {
            let outcome = self.validate_current_answer().await?;
            debug!(?outcome, "validated on change");
        }
        Ok(())
    }

    // === Validation ===

    /// Round-trip the current answer through the server.
    ///
    /// This is the only path by which answers are committed.
    pub async fn validate_current_answer(&mut self) -> Result<ValidationOutcome, WizardError> {
        self.ensure_ready()?;
        let Some(question) = self.current_question() else {
            return Err(WizardError::NotReady(self.state));
        };
        let id = question.id;
        let required = question.required;

        let Some(answer) = self.current_answer() else {
            if required {
                self.errors.record(id, REQUIRED_MESSAGE);
                self.render();
                return Ok(ValidationOutcome::Rejected {
                    message: REQUIRED_MESSAGE.to_string(),
                });
            }
            self.errors.clear(id);
            self.render();
            return Ok(ValidationOutcome::Skipped);
        };

        self.state = WizardState::Validating;
        self.banner = None;
        self.render();

        debug!(question = %id, kind = answer.type_name(), "validating answer");
        let request = SaveAnswerRequest {
            question_id: id,
            answer,
        };
        let result = self.api.save_answer(&request).await;
        self.state = WizardState::Ready;

        let outcome = match result {
            Ok(response) if response.is_accepted() => {
                info!(question = %id, "answer accepted");
                let changed = self.answers.get(id) != Some(&request.answer);
                self.answers.insert(id, request.answer);
                self.errors.clear(id);
                if let Some(progress) = response.progress {
                    self.apply_progress(progress);
                }
                if changed && self.is_governing(id) {
                    self.refresh_active();
                }
                ValidationOutcome::Accepted
            }
            Ok(response) => {
                let message = response
                    .message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| REJECTED_MESSAGE.to_string());
                debug!(question = %id, %message, "answer rejected");
                self.errors.record(id, message.clone());
                ValidationOutcome::Rejected { message }
            }
            Err(err) => {
                warn!(question = %id, error = %err, "answer could not be saved");
                let banner = ErrorBanner::new(format!("Could not save your answer: {err}"))
                    .retryable(err.is_retryable());
                self.show_banner(banner);
                ValidationOutcome::Unreachable
            }
        };

        self.render();
        Ok(outcome)
    }

    // === Navigation ===

    /// Go back one question. Never validates.
    pub fn previous_question(&mut self) -> Result<NavOutcome, WizardError> {
        self.ensure_ready()?;
        if self.position == 0 {
            return Ok(NavOutcome::AtStart);
        }
        self.position -= 1;
        self.banner = None;
        self.reseed();
        self.render();
        Ok(NavOutcome::Moved {
            position: self.position,
        })
    }

    /// Validate the current answer and, if accepted, go forward one question.
    pub async fn next_question(&mut self) -> Result<NavOutcome, WizardError> {
        let outcome = self.validate_current_answer().await?;
        if !outcome.is_success() {
            return Ok(NavOutcome::Blocked(outcome));
        }
        if self.position + 1 >= self.active.len() {
            return Ok(NavOutcome::AtEnd);
        }
        self.position += 1;
        self.reseed();
        self.render();
        debug!(position = self.position, "moved forward");
        Ok(NavOutcome::Moved {
            position: self.position,
        })
    }

    // === Submission ===

    /// Validate the last answer and the whole questionnaire, then generate the roadmap.
    ///
    /// Any failure leaves the wizard on the current question.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, WizardError> {
        self.ensure_ready()?;
        if self.position + 1 != self.active.len() {
            return Err(WizardError::NotOnLastQuestion);
        }

        let outcome = self.validate_current_answer().await?;
        if !outcome.is_success() {
            return Ok(SubmitOutcome::Blocked(outcome));
        }

        // Accepting the governing answer can add follow-ups after this one.
        if self.position + 1 < self.active.len() {
            self.position += 1;
            self.reseed();
            self.render();
            debug!(position = self.position, "follow-up questions added");
            return Ok(SubmitOutcome::MoreQuestions {
                position: self.position,
            });
        }

        self.state = WizardState::Submitting;
        self.banner = None;
        self.render();

        let report = match self.api.validate_all().await {
            Ok(report) => report,
            Err(err) => {
                let message = format!("Could not validate your answers: {err}");
                return Ok(self.abort_submission(message, err.is_retryable()));
            }
        };

        if !report.is_valid {
            for invalid in &report.invalid_questions {
                self.errors.record(invalid.question_id, invalid.message.clone());
            }
            let message = if report.invalid_questions.is_empty() {
                INCOMPLETE_MESSAGE.to_string()
            } else {
                report.summary()
            };
            self.abort_submission(message, false);
            return Ok(SubmitOutcome::Invalid(report.invalid_questions));
        }

        let response = match self.api.generate_roadmap().await {
            Ok(response) => response,
            Err(err) => {
                let message = format!("Could not generate the roadmap: {err}");
                return Ok(self.abort_submission(message, err.is_retryable()));
            }
        };

        let Some(doc_id) = response.document_id() else {
            return Ok(self.abort_submission(response.failure_message(), true));
        };

        let document_url = self.config.document_url(doc_id);
        info!(%document_url, "roadmap generated");
        self.document_url = Some(document_url.clone());
        self.state = WizardState::Done;
        self.render();
        self.view.navigate(&document_url);
        Ok(SubmitOutcome::Completed { document_url })
    }

    fn abort_submission(&mut self, message: String, retryable: bool) -> SubmitOutcome {
        warn!(%message, "submission aborted");
        self.state = WizardState::Ready;
        self.show_banner(ErrorBanner::new(message.clone()).retryable(retryable));
        self.render();
        SubmitOutcome::Failed { message }
    }

    // === Progress and errors ===

    /// Show a new progress value, or fetch it from the server when `None`.
    ///
    /// Fetch failures are logged and otherwise ignored.
    pub async fn update_progress(&mut self, value: Option<f64>) {
        let progress = match value {
            Some(progress) => progress,
            None => match self.api.fetch_progress().await {
                Ok(progress) => progress,
                Err(err) => {
                    warn!(error = %err, "failed to refresh progress");
                    return;
                }
            },
        };
        self.apply_progress(progress);
        self.render();
    }

    /// Hide the error banner.
    pub fn dismiss_error(&mut self) {
        if self.banner.take().is_some() {
            self.render();
        }
    }

    // === Internals ===

    fn ensure_ready(&self) -> Result<(), WizardError> {
        if self.state == WizardState::Ready {
            Ok(())
        } else {
            Err(WizardError::NotReady(self.state))
        }
    }

    fn is_governing(&self, id: QuestionId) -> bool {
        self.config.governing_question() == Some(id)
    }

    fn apply_progress(&mut self, progress: f64) {
        if progress.is_finite() {
            self.progress = progress.clamp(0.0, 100.0);
        }
    }

    fn reseed(&mut self) {
        let answer = self
            .current_question()
            .and_then(|question| self.answers.get(question.id));
        let selection = SelectionState::seeded(answer);
        self.selection = selection;
    }

    /// Recompute the active list, staying on the current question when it survives.
    fn refresh_active(&mut self) {
        let current = self.active.get(self.position).copied();
        self.active = active_questions(
            &self.questions,
            &self.answers,
            self.config.conditional.as_ref(),
        );
        self.position = current
            .and_then(|idx| self.active.iter().position(|&active| active == idx))
            .unwrap_or(0)
            .min(self.active.len().saturating_sub(1));
        debug!(active = self.active.len(), "active questions recomputed");
    }

    fn show_banner(&mut self, banner: ErrorBanner) {
        self.view.show_banner(&banner);
        self.banner = Some(banner);
    }

    fn render(&mut self) {
        let model = self.view_model();
        self.view.render(&model);
    }
}

fn check_questions(questions: &[Question], config: &WizardConfig) -> Result<(), InitFailure> {
    if questions.is_empty() {
        return Err(InitFailure::EmptyQuestionList);
    }

    let mut seen = HashSet::new();
    for question in questions {
        if !seen.insert(question.id) {
            return Err(InitFailure::DuplicateQuestion(question.id));
        }
        if question.kind.is_choice() && question.options.is_empty() {
            return Err(InitFailure::NoOptions(question.id));
        }
    }

    if let Some(governing) = config.governing_question()
        && !seen.contains(&governing)
    {
        return Err(InitFailure::MissingGoverningQuestion(governing));
    }

    Ok(())
}

fn seed_answers(questions: &[Question], saved: Vec<SavedAnswer>) -> Answers {
    let mut answers = Answers::new();
    for SavedAnswer {
        question_id,
        answer,
    } in saved
    {
        let Some(question) = questions.iter().find(|q| q.id == question_id) else {
            debug!(question = %question_id, "ignoring saved answer for unknown question");
            continue;
        };
        match Answer::from_raw(question.kind, answer) {
            Some(answer) if !answer.is_empty() => {
                answers.insert(question_id, answer);
            }
            _ => warn!(
                question = %question_id,
                "dropping saved answer that does not fit the question"
            ),
        }
    }
    answers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RawAnswer, TestApi};

    #[test]
    fn empty_list_is_malformed() {
        let result = check_questions(&[], &WizardConfig::default());
        assert!(matches!(result, Err(InitFailure::EmptyQuestionList)));
    }

    #[test]
    fn duplicate_ids_are_malformed() {
        let questions = vec![
            Question::new(1, "a", QuestionKind::FreeText),
            Question::new(1, "b", QuestionKind::FreeText),
        ];
        let result = check_questions(&questions, &WizardConfig::default());
        assert!(matches!(result, Err(InitFailure::DuplicateQuestion(id)) if id.get() == 1));
    }

    #[test]
    fn governing_question_must_exist() {
        let questions = vec![Question::new(2, "a", QuestionKind::FreeText)];
        let config = WizardConfig::default().conditional_on(1);
        let result = check_questions(&questions, &config);
        assert!(matches!(result, Err(InitFailure::MissingGoverningQuestion(_))));
    }

    #[test]
    fn choice_questions_need_options() {
        let questions = vec![Question::new(1, "a", QuestionKind::MultiChoice)];
        let result = check_questions(&questions, &WizardConfig::default());
        assert!(matches!(result, Err(InitFailure::NoOptions(_))));
    }

    #[test]
    fn seeding_converts_and_drops() {
        let questions = vec![
            Question::new(1, "Goals", QuestionKind::MultiChoice).with_options(["Goal A"]),
            Question::new(2, "Notes", QuestionKind::FreeText),
        ];
        let saved = vec![
            SavedAnswer::new(1, RawAnswer::One("Goal A".into())),
            SavedAnswer::new(2, vec!["not", "text"]),
            SavedAnswer::new(9, "orphan"),
        ];

        let answers = seed_answers(&questions, saved);
        assert_eq!(answers.len(), 1);
        assert_eq!(
            answers.get(QuestionId::new(1)),
            Some(&Answer::choices(["Goal A"]))
        );
    }

    #[tokio::test]
    async fn operations_before_initialize_are_refused() {
        let mut wizard = WizardController::new(
            TestApi::new(),
            crate::RecordingView::new(),
            WizardConfig::default(),
        );
        assert!(matches!(
            wizard.next_question().await,
            Err(WizardError::NotReady(WizardState::Loading))
        ));
        assert!(wizard.previous_question().is_err());
        assert!(wizard.api().calls().is_empty());
    }
}
