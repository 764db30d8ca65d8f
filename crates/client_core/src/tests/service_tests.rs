use std::sync::{Arc, Mutex};

use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use shared::{
    domain::InterviewId,
    protocol::{LoginRequest, StartInterviewRequest, SubmitResponseRequest},
};
use tokio::net::TcpListener;

use crate::{
    error::ServiceError,
    service::{HttpInterviewService, InterviewService, ResumeUpload},
};

async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn login_request() -> LoginRequest {
    LoginRequest {
        email: "alice@example.com".into(),
        password: "hunter2".into(),
    }
}

#[tokio::test]
async fn login_parses_auth_response() {
    let router = Router::new().route(
        "/api/login",
        post(|Json(body): Json<serde_json::Value>| async move {
            assert_eq!(body["email"], "alice@example.com");
            Json(json!({
                "access_token": "tok-1",
                "token_type": "bearer",
                "user": {"id": "u-1", "email": "alice@example.com", "name": "Alice"}
            }))
        }),
    );
    let base = spawn_server(router).await;

    let service = HttpInterviewService::new(base);
    let auth = service.login(&login_request()).await.unwrap();

    assert_eq!(auth.access_token, "tok-1");
    assert_eq!(auth.user.name, "Alice");
}

#[tokio::test]
async fn base_url_trailing_slash_is_normalized() {
    let router = Router::new().route(
        "/api/health",
        get(|| async { Json(json!({"status": "healthy"})) }),
    );
    let base = spawn_server(router).await;

    let service = HttpInterviewService::new(format!("{base}/"));
    let health = service.health().await.unwrap();

    assert_eq!(health.status, "healthy");
}

#[tokio::test]
async fn non_2xx_with_detail_becomes_api_error() {
    let router = Router::new().route(
        "/api/login",
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Invalid email or password"})),
            )
        }),
    );
    let base = spawn_server(router).await;

    let service = HttpInterviewService::new(base);
    let err = service.login(&login_request()).await.unwrap_err();

    match &err {
        ServiceError::Api { status, detail } => {
            assert_eq!(*status, 401);
            assert_eq!(detail.as_deref(), Some("Invalid email or password"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(err.surface("fallback"), "Invalid email or password");
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn non_json_error_body_falls_back() {
    let router = Router::new().route(
        "/api/login",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = spawn_server(router).await;

    let service = HttpInterviewService::new(base);
    let err = service.login(&login_request()).await.unwrap_err();

    assert_eq!(err.surface("Login failed."), "Login failed.");
    assert!(!err.is_auth_failure());
}

#[tokio::test]
async fn start_interview_sends_bearer_and_parses_wire_shape() {
    let router = Router::new().route(
        "/api/start-interview",
        post(
            |headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                assert_eq!(
                    headers.get("authorization").unwrap().to_str().unwrap(),
                    "Bearer tok-1"
                );
                assert_eq!(body["job_role"], "Backend Engineer");
                assert_eq!(body["experience_level"], "senior");
                assert_eq!(body["interview_type"], "text");
                // The deployed wire shape: interview_id plus extra topic fields.
                Json(json!({
                    "interview_id": "i-1",
                    "questions": [
                        {"id": "q-1", "question": "Why Rust?", "type": "technical", "topic": "general"},
                        {"id": "q-2", "question": "Tell me about a project.", "type": "behavioral", "topic": "projects"}
                    ],
                    "total_questions": 2
                }))
            },
        ),
    );
    let base = spawn_server(router).await;

    let service = HttpInterviewService::new(base);
    let request = StartInterviewRequest {
        job_role: "Backend Engineer".into(),
        experience_level: shared::domain::ExperienceLevel::Senior,
        interview_type: shared::domain::InterviewType::Text,
    };
    let response = service.start_interview("tok-1", &request).await.unwrap();

    assert_eq!(response.id.0, "i-1");
    assert_eq!(response.questions.len(), 2);
    assert_eq!(response.questions[0].kind, "technical");
    assert_eq!(response.total_questions, Some(2));
}

#[tokio::test]
async fn upload_resume_posts_multipart_file_field() {
    #[derive(Default)]
    struct Captured {
        field_name: String,
        file_name: String,
    }
    let captured: Arc<Mutex<Captured>> = Arc::default();

    let router = Router::new()
        .route(
            "/api/upload-resume",
            post(
                |State(captured): State<Arc<Mutex<Captured>>>, mut multipart: Multipart| async move {
                    let field = multipart.next_field().await.unwrap().unwrap();
                    {
                        let mut captured = captured.lock().unwrap();
                        captured.field_name = field.name().unwrap().to_string();
                        captured.file_name = field.file_name().unwrap().to_string();
                    }
                    let bytes = field.bytes().await.unwrap();
                    Json(json!({
                        "message": "Resume uploaded successfully",
                        "resume_id": "r-1",
                        "text_preview": String::from_utf8_lossy(&bytes).to_string()
                    }))
                },
            ),
        )
        .with_state(captured.clone());
    let base = spawn_server(router).await;

    let service = HttpInterviewService::new(base);
    let response = service
        .upload_resume(
            "tok-1",
            ResumeUpload {
                filename: "resume.pdf".into(),
                bytes: b"%PDF-1.4 body".to_vec(),
            },
        )
        .await
        .unwrap();

    assert_eq!(response.resume_id.0, "r-1");
    assert_eq!(response.text_preview.as_deref(), Some("%PDF-1.4 body"));
    let captured = captured.lock().unwrap();
    assert_eq!(captured.field_name, "file");
    assert_eq!(captured.file_name, "resume.pdf");
}

#[tokio::test]
async fn submit_response_round_trips_completion() {
    let router = Router::new().route(
        "/api/submit-response",
        post(|Json(body): Json<serde_json::Value>| async move {
            assert_eq!(body["question_id"], "q-9");
            assert_eq!(body["answer"], "my answer");
            Json(json!({
                "message": "Interview completed!",
                "completed": true,
                "feedback": "Well structured answers."
            }))
        }),
    );
    let base = spawn_server(router).await;

    let service = HttpInterviewService::new(base);
    let request = SubmitResponseRequest {
        question_id: shared::domain::QuestionId("q-9".into()),
        answer: "my answer".into(),
    };
    let response = service.submit_response("tok-1", &request).await.unwrap();

    assert!(response.completed);
    assert_eq!(response.feedback.as_deref(), Some("Well structured answers."));
}

#[tokio::test]
async fn fetch_interview_hits_the_id_path() {
    let router = Router::new().route(
        "/api/interview/:id",
        get(|Path(id): Path<String>| async move {
            Json(json!({
                "id": id,
                "job_role": "Backend Engineer",
                "experience_level": "mid",
                "interview_type": "text",
                "status": "completed",
                "questions": [],
                "responses": [],
                "feedback": "Stored feedback.",
                "created_at": "2026-01-10T12:00:00Z"
            }))
        }),
    );
    let base = spawn_server(router).await;

    let service = HttpInterviewService::new(base);
    let record = service
        .fetch_interview("tok-1", &InterviewId("i-42".into()))
        .await
        .unwrap();

    assert_eq!(record.id.0, "i-42");
    assert_eq!(record.feedback.as_deref(), Some("Stored feedback."));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let service = HttpInterviewService::new(format!("http://{addr}"));
    let err = service.login(&login_request()).await.unwrap_err();

    assert!(matches!(err, ServiceError::Transport(_)));
    assert_eq!(err.surface("Login failed."), "Login failed.");
}
