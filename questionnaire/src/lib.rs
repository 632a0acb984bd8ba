//! # questionnaire
//!
//! A multi-step questionnaire wizard whose every answer is validated and
//! persisted by a server before the wizard moves on.
//!
//! The crate is split along two seams:
//! - [`QuestionnaireApi`] - the server contract (HTTP in `questionnaire-http`,
//!   in memory in [`TestApi`])
//! - [`WizardView`] - the rendering boundary, fed with [`ViewModel`] snapshots
//!
//! [`WizardController`] owns all state between those two seams.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use questionnaire::{NavOutcome, RecordingView, TestApi, WizardConfig, WizardController};
//!
//! let api = TestApi::new().with_questions(questions);
//! let mut wizard = WizardController::new(api, RecordingView::default(), WizardConfig::default());
//!
//! wizard.initialize().await?;
//! wizard.set_text("hello").await?;
//! if let NavOutcome::AtEnd = wizard.next_question().await? {
//!     wizard.submit().await?;
//! }
//! ```
//!
//! ## Backends
//!
//! - `questionnaire-http` - `HttpApi`, the server client over reqwest
//! - `questionnaire-dialoguer` - CLI wizard via dialoguer

// Re-export all types from questionnaire-types
pub use questionnaire_types::*;

mod config;
pub use config::{ConditionalConfig, ValidationPolicy, WizardConfig};

mod filter;
pub use filter::active_questions;

mod selection;
pub use selection::{SelectionOutcome, SelectionRejection, SelectionState};

mod view;
pub use view::{ErrorBanner, OptionView, QuestionView, RecordingView, ViewModel, WizardView};

mod controller;
pub use controller::{
    InitFailure, NavOutcome, SubmitOutcome, ValidationOutcome, WizardController, WizardError,
    WizardState,
};

// Test API for running the wizard without a server
mod test_api;
pub use test_api::{ApiCall, Endpoint, TestApi};
