use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Paths of the server endpoints, resolved against the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub auth_check: String,
    pub questions: String,
    pub saved_answers: String,
    /// Deployments differ here; `/api/save-answer` is also common.
    pub save_answer: String,
    pub validate_all: String,
    pub progress: String,
    pub generate_roadmap: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth_check: "/api/auth-check".to_string(),
            questions: "/api/questions".to_string(),
            saved_answers: "/api/saved-answers".to_string(),
            save_answer: "/api/submit-answer".to_string(),
            validate_all: "/api/validate-answers".to_string(),
            progress: "/api/progress".to_string(),
            generate_roadmap: "/api/generate-roadmap".to_string(),
        }
    }
}

/// Connection settings of an [`HttpApi`](crate::HttpApi).
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub endpoints: Endpoints,
    /// Per-request timeout. `None` waits as long as the server takes.
    pub timeout: Option<Duration>,
    /// Raw `Cookie` header value carrying an existing session.
    pub session_cookie: Option<String>,
}

impl ApiConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            endpoints: Endpoints::default(),
            timeout: None,
            session_cookie: None,
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Use a different path for saving answers.
    pub fn with_save_endpoint(mut self, path: impl Into<String>) -> Self {
        self.endpoints.save_answer = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }
}
