//! # questionnaire-dialoguer
//!
//! Dialoguer front end for the questionnaire wizard.
//!
//! [`DialoguerView`] renders the wizard's view model to the terminal and
//! [`run_wizard`] drives a [`WizardController`](questionnaire::WizardController)
//! with step-by-step prompts until the roadmap is generated.
//!
//! ## Example
//!
//! ```rust,ignore
//! use questionnaire::{WizardConfig, WizardController};
//! use questionnaire_dialoguer::{DialoguerView, run_wizard};
//!
//! let mut wizard = WizardController::new(api, DialoguerView::new(), WizardConfig::default());
//! let document_url = run_wizard(&mut wizard).await?;
//! println!("Your roadmap: {document_url}");
//! ```

mod driver;
mod view;

pub use driver::{DialoguerError, run_wizard};
pub use view::DialoguerView;
