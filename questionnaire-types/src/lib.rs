//! Core types for the questionnaire crate.
//!
//! This crate provides the presentation-agnostic pieces of a questionnaire:
//! - `Question` and `QuestionKind` - Question definitions as served by the backend
//! - `Answer`, `Answers` and `ValidationErrors` - Committed answers and inline errors
//! - Wire types for every call of the server contract
//! - `QuestionnaireApi` - The trait a server client implements

mod question_id;
pub use question_id::QuestionId;

mod question;
pub use question::{ChoiceOption, Question, QuestionKind, ValidationRules};

mod answer;
pub use answer::Answer;

mod answers;
pub use answers::{Answers, ValidationErrors};

mod wire;
pub use wire::{
    AuthStatus, GenerateResponse, InvalidQuestion, ProgressResponse, RawAnswer, ResponseStatus,
    SaveAnswerRequest, SaveAnswerResponse, SavedAnswer, ValidateAllResponse,
};

mod error;
pub use error::ApiError;

mod traits;
pub use traits::QuestionnaireApi;
