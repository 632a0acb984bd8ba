//! HTTP client for the questionnaire server.
//!
//! [`HttpApi`] implements [`QuestionnaireApi`](questionnaire_types::QuestionnaireApi)
//! over JSON/HTTP with `reqwest`. Endpoint paths are configurable through
//! [`Endpoints`]; everything else about the contract is fixed.
//!
//! ```rust,ignore
//! use questionnaire_http::{ApiConfig, HttpApi};
//!
//! let config = ApiConfig::new("http://localhost:5000".parse()?)
//!     .with_save_endpoint("/api/save-answer");
//! let api = HttpApi::new(config)?;
//! ```

mod client;
pub use client::HttpApi;

mod config;
pub use config::{ApiConfig, Endpoints};

pub use reqwest::Url;
