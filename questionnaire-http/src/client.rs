use async_trait::async_trait;
use questionnaire_types::{
    ApiError, AuthStatus, GenerateResponse, ProgressResponse, Question, QuestionnaireApi,
    SaveAnswerRequest, SaveAnswerResponse, SavedAnswer, ValidateAllResponse,
};
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::ApiConfig;

/// Body of a failed call: `{ "error": "..." }`, or `{ "status": "error", "message": "..." }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Error { error: String },
    Message { message: String },
}

impl ErrorBody {
    fn into_message(self) -> String {
        match self {
            Self::Error { error } => error,
            Self::Message { message } => message,
        }
    }
}

/// A [`QuestionnaireApi`] talking JSON over HTTP.
///
/// Redirects are not followed: a redirect means the session expired and the
/// server is sending the user to its login page.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    config: ApiConfig,
}

impl HttpApi {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder().redirect(Policy::none());

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(cookie) = &config.session_cookie {
            let mut value = HeaderValue::from_str(cookie).map_err(ApiError::backend)?;
            value.set_sensitive(true);
            let mut headers = HeaderMap::new();
            headers.insert(COOKIE, value);
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(ApiError::backend)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.config.base_url.join(path).map_err(ApiError::backend)
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|err| ApiError::Transport {
            endpoint: path.to_string(),
            message: err.to_string(),
        })?;
        debug!(endpoint = path, status = %response.status(), "response received");
        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(endpoint = path, "GET");
        let response = self.send(path, self.client.get(self.url(path)?)).await?;
        read(path, response, false).await
    }

    /// POST whose rejections come back as `4xx` with a regular body.
    async fn post_verdict<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        debug!(endpoint = path, "POST");
        let response = self.send(path, request).await?;
        read(path, response, true).await
    }
}

fn signed_out(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status.is_redirection()
}

/// Decode a response body.
///
/// With `verdicts`, client-error responses whose body decodes as `T` are
/// returned as data.
async fn read<T: DeserializeOwned>(
    path: &str,
    response: Response,
    verdicts: bool,
) -> Result<T, ApiError> {
    let status = response.status();
    if signed_out(status) {
        return Err(ApiError::Unauthorized);
    }

    let body = response.bytes().await.map_err(|err| ApiError::Transport {
        endpoint: path.to_string(),
        message: err.to_string(),
    })?;

    if status.is_success() {
        return serde_json::from_slice(&body).map_err(|err| ApiError::Decode {
            endpoint: path.to_string(),
            message: err.to_string(),
        });
    }

    if verdicts
        && status.is_client_error()
        && let Ok(verdict) = serde_json::from_slice(&body)
    {
        return Ok(verdict);
    }

    if let Ok(failure) = serde_json::from_slice::<ErrorBody>(&body) {
        let error = failure.into_message();
        warn!(endpoint = path, %status, %error, "server reported an error");
        return Err(ApiError::Server(error));
    }

    Err(ApiError::Status {
        endpoint: path.to_string(),
        status: status.as_u16(),
    })
}

#[async_trait]
impl QuestionnaireApi for HttpApi {
    async fn check_auth(&self) -> Result<AuthStatus, ApiError> {
        let path = &self.config.endpoints.auth_check;
        let response = self.send(path, self.client.get(self.url(path)?)).await?;
        let status = response.status();
        if status.is_success() {
            Ok(AuthStatus::Authenticated)
        } else if signed_out(status) {
            Ok(AuthStatus::LoginRequired)
        } else {
            Err(ApiError::Status {
                endpoint: path.clone(),
                status: status.as_u16(),
            })
        }
    }

    async fn fetch_questions(&self) -> Result<Vec<Question>, ApiError> {
        let questions: Vec<Question> = self.get(&self.config.endpoints.questions).await?;
        debug!(count = questions.len(), "questions fetched");
        Ok(questions)
    }

    async fn fetch_saved_answers(&self) -> Result<Vec<SavedAnswer>, ApiError> {
        self.get(&self.config.endpoints.saved_answers).await
    }

    async fn save_answer(
        &self,
        request: &SaveAnswerRequest,
    ) -> Result<SaveAnswerResponse, ApiError> {
        let path = &self.config.endpoints.save_answer;
        let builder = self.client.post(self.url(path)?).json(request);
        self.post_verdict(path, builder).await
    }

    async fn validate_all(&self) -> Result<ValidateAllResponse, ApiError> {
        self.get(&self.config.endpoints.validate_all).await
    }

    async fn fetch_progress(&self) -> Result<f64, ApiError> {
        let response: ProgressResponse = self.get(&self.config.endpoints.progress).await?;
        response.into_result()
    }

    async fn generate_roadmap(&self) -> Result<GenerateResponse, ApiError> {
        let path = &self.config.endpoints.generate_roadmap;
        let builder = self.client.post(self.url(path)?);
        self.post_verdict(path, builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_resolve_against_base_url() {
        let base = Url::parse("http://localhost:5000").unwrap();
        let api = HttpApi::new(ApiConfig::new(base)).unwrap();

        assert_eq!(
            api.url("/api/questions").unwrap().as_str(),
            "http://localhost:5000/api/questions"
        );
    }

    #[test]
    fn redirects_mean_signed_out() {
        assert!(signed_out(StatusCode::FOUND));
        assert!(signed_out(StatusCode::UNAUTHORIZED));
        assert!(!signed_out(StatusCode::FORBIDDEN));
    }

    #[test]
    fn error_bodies_carry_a_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"error": "Not logged in"}"#).unwrap();
        assert_eq!(body.into_message(), "Not logged in");

        let body: ErrorBody = serde_json::from_str(
            r#"{"status": "error", "message": "Failed to create presentation"}"#,
        )
        .unwrap();
        assert_eq!(body.into_message(), "Failed to create presentation");
    }

    #[test]
    fn invalid_cookie_is_rejected() {
        let base = Url::parse("http://localhost:5000").unwrap();
        let config = ApiConfig::new(base).with_session_cookie("bad\nvalue");

        assert!(matches!(HttpApi::new(config), Err(ApiError::Backend(_))));
    }
}
