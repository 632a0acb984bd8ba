//! Integration tests for the HTTP client.
//!
//! Each test starts an Axum router on a random port and talks to it through
//! a real `HttpApi`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use questionnaire::{
    Answer, ApiError, AuthStatus, QuestionId, QuestionKind, QuestionnaireApi, RawAnswer,
    RecordingView, SaveAnswerRequest, SubmitOutcome, WizardConfig, WizardController,
    WizardState,
};
use questionnaire_http::{ApiConfig, HttpApi, Url};

type Bodies = Arc<Mutex<Vec<Value>>>;

/// Start the router on a random port and return its base URL.
async fn serve(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Url::parse(&format!("http://127.0.0.1:{port}")).unwrap()
}

async fn client(app: Router) -> HttpApi {
    HttpApi::new(ApiConfig::new(serve(app).await)).unwrap()
}

fn text_request(id: i64, text: &str) -> SaveAnswerRequest {
    SaveAnswerRequest {
        question_id: QuestionId::new(id),
        answer: Answer::Text(text.to_string()),
    }
}

#[tokio::test]
async fn test_questions_decode_server_shapes() {
    let app = Router::new().route(
        "/api/questions",
        get(|| async {
            Json(json!([
                {
                    "id": 1,
                    "text": "Which goals?",
                    "question_type": "checkbox",
                    "options": [
                        "Reduce Risk",
                        { "title": "Optimize Cost", "description": "Spend less", "icon": "coin" }
                    ],
                    "validation_rules": { "max_count": 2 },
                    "strategic_goal": null,
                    "major_cnapp_area": "Posture"
                },
                {
                    "id": 2,
                    "text": "Tell us more",
                    "type": "text",
                    "required": false,
                    "options": null,
                    "parent_answer": "Reduce Risk",
                    "order": 4
                }
            ]))
        }),
    );
    let api = client(app).await;

    let questions = api.fetch_questions().await.unwrap();

    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].kind, QuestionKind::MultiChoice);
    assert_eq!(questions[0].max_count(), Some(2));
    assert_eq!(questions[0].options[1].description.as_deref(), Some("Spend less"));
    assert_eq!(questions[0].area.as_deref(), Some("Posture"));
    assert_eq!(questions[1].kind, QuestionKind::FreeText);
    assert!(!questions[1].required);
    assert!(questions[1].options.is_empty());
    assert_eq!(questions[1].order, Some(4));
}

#[tokio::test]
async fn test_saved_answers_keep_their_shape() {
    let app = Router::new().route(
        "/api/saved-answers",
        get(|| async {
            Json(json!([
                { "question_id": 1, "answer": ["Reduce Risk", "Optimize Cost"] },
                { "question_id": 2, "answer": "Planned" }
            ]))
        }),
    );
    let api = client(app).await;

    let saved = api.fetch_saved_answers().await.unwrap();

    assert_eq!(saved[0].answer, RawAnswer::from(vec!["Reduce Risk", "Optimize Cost"]));
    assert_eq!(saved[1].answer, RawAnswer::from("Planned"));
}

#[tokio::test]
async fn test_save_answer_posts_typed_body() {
    let bodies = Bodies::default();
    let app = Router::new()
        .route(
            "/api/submit-answer",
            post(
                |State(bodies): State<Bodies>, Json(body): Json<Value>| async move {
                    bodies.lock().unwrap().push(body);
                    Json(json!({ "status": "success", "is_valid": true, "progress": 50.0 }))
                },
            ),
        )
        .with_state(bodies.clone());
    let api = client(app).await;

    let request = SaveAnswerRequest {
        question_id: QuestionId::new(7),
        answer: Answer::choices(["b", "a"]),
    };
    let response = api.save_answer(&request).await.unwrap();

    assert!(response.is_accepted());
    assert_eq!(response.progress, Some(50.0));
    assert_eq!(
        bodies.lock().unwrap().as_slice(),
        &[json!({ "question_id": 7, "answer": ["a", "b"] })]
    );
}

#[tokio::test]
async fn test_rejection_with_client_error_is_data() {
    let app = Router::new().route(
        "/api/submit-answer",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": "error", "message": "Invalid option selected" })),
            )
        }),
    );
    let api = client(app).await;

    let response = api.save_answer(&text_request(1, "nope")).await.unwrap();

    assert!(!response.is_accepted());
    assert_eq!(response.message.as_deref(), Some("Invalid option selected"));
}

#[tokio::test]
async fn test_server_failure_on_save_is_an_error() {
    let app = Router::new().route(
        "/api/submit-answer",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": "database down" })),
            )
        }),
    );
    let api = client(app).await;

    let err = api.save_answer(&text_request(1, "hi")).await.unwrap_err();

    assert!(matches!(err, ApiError::Server(ref message) if message == "database down"));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_server_failure_without_body_keeps_status() {
    let app = Router::new().route(
        "/api/submit-answer",
        post(|| async { StatusCode::BAD_GATEWAY }),
    );
    let api = client(app).await;

    let err = api.save_answer(&text_request(1, "hi")).await.unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 502, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_generation_failure_keeps_server_message() {
    let app = Router::new().route(
        "/api/generate-roadmap",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": "Failed to create presentation" })),
            )
        }),
    );
    let api = client(app).await;

    let err = api.generate_roadmap().await.unwrap_err();

    assert!(err.to_string().contains("Failed to create presentation"));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_custom_save_endpoint() {
    let app = Router::new().route(
        "/api/save-answer",
        post(|| async { Json(json!({ "status": "success", "is_valid": true })) }),
    );
    let config = ApiConfig::new(serve(app).await).with_save_endpoint("/api/save-answer");
    let api = HttpApi::new(config).unwrap();

    let response = api.save_answer(&text_request(1, "hi")).await.unwrap();

    assert!(response.is_accepted());
    assert_eq!(response.progress, None);
}

#[tokio::test]
async fn test_progress_error_body() {
    let app = Router::new().route(
        "/api/progress",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to calculate progress" })),
            )
        }),
    );
    let api = client(app).await;

    let err = api.fetch_progress().await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Server(ref message) if message == "Failed to calculate progress"
    ));
}

#[tokio::test]
async fn test_progress_value() {
    let app = Router::new().route(
        "/api/progress",
        get(|| async { Json(json!({ "progress": 62.5 })) }),
    );
    let api = client(app).await;

    assert_eq!(api.fetch_progress().await.unwrap(), 62.5);
}

#[tokio::test]
async fn test_unauthorized_and_redirects() {
    let app = Router::new()
        .route(
            "/api/auth-check",
            get(|| async { StatusCode::UNAUTHORIZED }),
        )
        .route(
            "/api/questions",
            get(|| async { Redirect::to("/google_login") }),
        );
    let api = client(app).await;

    assert_eq!(api.check_auth().await.unwrap(), AuthStatus::LoginRequired);
    assert!(matches!(
        api.fetch_questions().await,
        Err(ApiError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_auth_check_success() {
    let app = Router::new().route(
        "/api/auth-check",
        get(|| async { Json(json!({ "authenticated": true })) }),
    );
    let api = client(app).await;

    assert_eq!(api.check_auth().await.unwrap(), AuthStatus::Authenticated);
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let app = Router::new().route("/api/questions", get(|| async { "<html>oops</html>" }));
    let api = client(app).await;

    let err = api.fetch_questions().await.unwrap_err();

    assert!(matches!(err, ApiError::Decode { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let base = Url::parse(&format!("http://127.0.0.1:{port}")).unwrap();
    let api = HttpApi::new(ApiConfig::new(base).with_timeout(Duration::from_secs(2))).unwrap();

    let err = api.fetch_questions().await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Transport { ref endpoint, .. } if endpoint == "/api/questions"
    ));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_session_cookie_is_sent() {
    let app = Router::new().route(
        "/api/auth-check",
        get(|headers: axum::http::HeaderMap| async move {
            match headers.get("cookie").and_then(|value| value.to_str().ok()) {
                Some("session=abc") => StatusCode::OK,
                _ => StatusCode::UNAUTHORIZED,
            }
        }),
    );
    let base = serve(app).await;

    let anonymous = HttpApi::new(ApiConfig::new(base.clone())).unwrap();
    let signed_in = HttpApi::new(ApiConfig::new(base).with_session_cookie("session=abc")).unwrap();

    assert_eq!(anonymous.check_auth().await.unwrap(), AuthStatus::LoginRequired);
    assert_eq!(signed_in.check_auth().await.unwrap(), AuthStatus::Authenticated);
}

fn single_question_server(validate_all: Value) -> Router {
    Router::new()
        .route(
            "/api/questions",
            get(|| async {
                Json(json!([
                    { "id": 1, "text": "Say something", "type": "text", "required": true }
                ]))
            }),
        )
        .route("/api/saved-answers", get(|| async { Json(json!([])) }))
        .route("/api/progress", get(|| async { Json(json!({ "progress": 0 })) }))
        .route(
            "/api/submit-answer",
            post(|| async {
                Json(json!({ "status": "success", "is_valid": true, "progress": 100 }))
            }),
        )
        .route(
            "/api/validate-answers",
            get(move || async move { Json(validate_all) }),
        )
        .route(
            "/api/generate-roadmap",
            post(|| async { Json(json!({ "status": "success", "doc_id": "abc123" })) }),
        )
}

#[tokio::test]
async fn test_wizard_runs_end_to_end_over_http() {
    let app = single_question_server(json!({ "is_valid": true, "invalid_questions": [] }));
    let api = client(app).await;
    let mut wizard = WizardController::new(api, RecordingView::new(), WizardConfig::default());

    wizard.initialize().await.unwrap();
    wizard.set_text("hello").await.unwrap();
    wizard.next_question().await.unwrap();

    assert_eq!(wizard.progress(), 100.0);
    assert_eq!(
        wizard.answers().get(QuestionId::new(1)),
        Some(&Answer::Text("hello".into()))
    );

    let outcome = wizard.submit().await.unwrap();
    let url = "https://docs.google.com/presentation/d/abc123/edit";
    assert_eq!(
        outcome,
        SubmitOutcome::Completed {
            document_url: url.to_string()
        }
    );
    assert_eq!(wizard.state(), WizardState::Done);
    assert_eq!(wizard.view().navigations, vec![url.to_string()]);
}

#[tokio::test]
async fn test_wizard_reports_invalid_questionnaire_over_http() {
    let app = single_question_server(json!({
        "is_valid": false,
        "invalid_questions": [{ "question_id": 2, "message": "Required" }]
    }));
    let api = client(app).await;
    let mut wizard = WizardController::new(api, RecordingView::new(), WizardConfig::default());

    wizard.initialize().await.unwrap();
    wizard.set_text("hello").await.unwrap();
    let outcome = wizard.submit().await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Invalid(_)));
    let banner = wizard.view().last_banner().unwrap();
    assert!(banner.message.contains("Question 2: Required"));
}
