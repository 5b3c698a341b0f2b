pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

/// Uploads carry two documents or one recorded answer.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview flow
        .route("/api/v1/interviews", post(handlers::handle_start_interview))
        .route(
            "/api/v1/interviews/:id",
            get(handlers::handle_get_session).delete(handlers::handle_reset),
        )
        .route(
            "/api/v1/interviews/:id/question/audio",
            get(handlers::handle_question_audio),
        )
        .route(
            "/api/v1/interviews/:id/answer/voice",
            post(handlers::handle_voice_answer),
        )
        .route(
            "/api/v1/interviews/:id/answers",
            post(handlers::handle_submit_answer),
        )
        .route("/api/v1/interviews/:id/results", get(handlers::handle_results))
        .route("/api/v1/interviews/:id/export", get(handlers::handle_export))
        .route("/api/v1/interviews/:id/save", post(handlers::handle_save))
        // History
        .route("/api/v1/history", get(handlers::handle_history))
        .route(
            "/api/v1/history/:id",
            axum::routing::delete(handlers::handle_delete_history),
        )
        .route(
            "/api/v1/history/:id/questions",
            get(handlers::handle_history_questions),
        )
        .route("/api/v1/setup/schema", get(handlers::handle_schema))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::interview::evaluator::{FALLBACK_FEEDBACK, FALLBACK_SCORE};
    use crate::interview::questions::FALLBACK_QUESTION;
    use crate::interview::results::ExportDocument;
    use crate::store::memory::MemoryRepository;
    use crate::store::InterviewStore;

    const BOUNDARY: &str = "interviewer-test-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File {
            name: &'a str,
            file_name: &'a str,
            content_type: &'a str,
            bytes: &'a [u8],
        },
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File {
                    name,
                    file_name,
                    content_type,
                    bytes,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                             Content-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn start_parts<'a>() -> Vec<Part<'a>> {
        vec![
            Part::Text("candidate_name", "Ada Lovelace"),
            Part::Text("job_title", "Backend Engineer"),
            Part::Text("interview_type", "technical"),
            Part::File {
                name: "resume",
                file_name: "resume.txt",
                content_type: "text/plain",
                bytes: b"Ten years of Rust and Postgres.",
            },
            Part::File {
                name: "job_description",
                file_name: "jd.txt",
                content_type: "text/plain",
                bytes: b"Build reliable backend services.",
            },
        ]
    }

    fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    async fn start(app: &Router) -> String {
        let response = send(app, multipart_request("/api/v1/interviews", &start_parts())).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        body["session"]["session_id"].as_str().unwrap().to_string()
    }

    async fn answer(app: &Router, id: &str, text: &str) -> Response {
        send(
            app,
            json_request(
                "POST",
                &format!("/api/v1/interviews/{id}/answers"),
                json!({ "answer": text }),
            ),
        )
        .await
    }

    async fn run_to_completion(app: &Router, id: &str, total: u32) -> Value {
        let mut last = Value::Null;
        for n in 1..=total {
            let response = answer(app, id, &format!("Answer number {n}")).await;
            assert_eq!(response.status(), StatusCode::OK);
            last = body_json(response).await;
        }
        last
    }

    #[tokio::test]
    async fn test_health_reports_disabled_collaborators() {
        let app = build_router(AppState::for_tests(10));
        let response = send(&app, empty_request("GET", "/health")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model"], "disabled");
        assert_eq!(body["store"], "disabled");
        assert_eq!(body["active_sessions"], 0);
    }

    #[tokio::test]
    async fn test_start_uses_fallback_question_without_model() {
        let app = build_router(AppState::for_tests(10));
        let response = send(&app, multipart_request("/api/v1/interviews", &start_parts())).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["session"]["current_question"], FALLBACK_QUESTION);
        assert_eq!(body["session"]["current_question_num"], 1);
        assert_eq!(body["session"]["total_questions"], 10);
        assert_eq!(body["session"]["phase"], "in_progress");
        assert!(!body["warnings"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_start_requires_every_field() {
        let app = build_router(AppState::for_tests(10));
        let mut parts = start_parts();
        parts.remove(3); // resume

        let response = send(&app, multipart_request("/api/v1/interviews", &parts)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_start_rejects_unsupported_document_type() {
        let app = build_router(AppState::for_tests(10));
        let mut parts = start_parts();
        parts[4] = Part::File {
            name: "job_description",
            file_name: "jd.docx",
            content_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            bytes: b"PK\x03\x04",
        };

        let response = send(&app, multipart_request("/api/v1/interviews", &parts)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_start_rejects_unknown_interview_type() {
        let app = build_router(AppState::for_tests(10));
        let mut parts = start_parts();
        parts[2] = Part::Text("interview_type", "behavioral");

        let response = send(&app, multipart_request("/api/v1/interviews", &parts)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unreadable_document_becomes_warning() {
        let app = build_router(AppState::for_tests(10));
        let mut parts = start_parts();
        parts[3] = Part::File {
            name: "resume",
            file_name: "resume.txt",
            content_type: "text/plain",
            bytes: &[0xff, 0xfe, 0x00, 0xc3],
        };

        let response = send(&app, multipart_request("/api/v1/interviews", &parts)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let warnings = body_json(response).await["warnings"].clone();
        assert!(warnings
            .as_array()
            .unwrap()
            .iter()
            .any(|w| w.as_str().unwrap().contains("resume")));
    }

    #[tokio::test]
    async fn test_full_run_without_model_scores_seventy_percent() {
        let app = build_router(AppState::for_tests(10));
        let id = start(&app).await;

        let last = run_to_completion(&app, &id, 10).await;
        assert_eq!(last["session"]["phase"], "completed");
        assert_eq!(last["session"]["answered"], 10);
        assert_eq!(last["session"]["current_question_num"], 10);
        assert!(last["session"]["current_question"].is_null());
        assert_eq!(last["record"]["number"], 10);
        assert_eq!(last["record"]["feedback"], FALLBACK_FEEDBACK);
        assert_eq!(last["result"]["final_score"], FALLBACK_SCORE);
        assert_eq!(last["result"]["percentage"], 70.0);

        let response = send(&app, empty_request("GET", &format!("/api/v1/interviews/{id}/results"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let results = body_json(response).await;
        assert_eq!(results["final_score"], 7.0);
        assert_eq!(results["percentage"], 70.0);
        let pairs = results["qa_pairs"].as_array().unwrap();
        assert_eq!(pairs.len(), 10);
        for (i, pair) in pairs.iter().enumerate() {
            assert_eq!(pair["number"], i as u64 + 1);
            assert_eq!(pair["answer"], format!("Answer number {}", i + 1));
        }
    }

    #[tokio::test]
    async fn test_blank_answer_is_rejected_without_advancing() {
        let app = build_router(AppState::for_tests(10));
        let id = start(&app).await;

        let response = answer(&app, &id, "   ").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            &app,
            json_request("POST", &format!("/api/v1/interviews/{id}/answers"), json!({})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let session = body_json(send(&app, empty_request("GET", &format!("/api/v1/interviews/{id}"))).await).await;
        assert_eq!(session["current_question_num"], 1);
        assert_eq!(session["answered"], 0);
    }

    #[tokio::test]
    async fn test_answer_after_completion_conflicts() {
        let app = build_router(AppState::for_tests(2));
        let id = start(&app).await;
        run_to_completion(&app, &id, 2).await;

        let response = answer(&app, &id, "one more").await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let results = body_json(send(&app, empty_request("GET", &format!("/api/v1/interviews/{id}/results"))).await).await;
        assert_eq!(results["qa_pairs"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_results_before_completion_conflict() {
        let app = build_router(AppState::for_tests(3));
        let id = start(&app).await;
        answer(&app, &id, "first").await;

        for path in ["results", "export"] {
            let response = send(&app, empty_request("GET", &format!("/api/v1/interviews/{id}/{path}"))).await;
            assert_eq!(response.status(), StatusCode::CONFLICT, "{path}");
        }
        let response = send(&app, empty_request("POST", &format!("/api/v1/interviews/{id}/save"))).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_export_is_downloadable_json() {
        let app = build_router(AppState::for_tests(2));
        let id = start(&app).await;
        run_to_completion(&app, &id, 2).await;

        let response = send(&app, empty_request("GET", &format!("/api/v1/interviews/{id}/export"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"interview_Ada_Lovelace_"));
        assert!(disposition.ends_with(".json\""));

        let document: ExportDocument = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(document.candidate, "Ada Lovelace");
        assert_eq!(document.final_score, 7.0);
        assert_eq!(document.percentage, 70.0);
        assert_eq!(document.qa_pairs.len(), 2);
    }

    #[tokio::test]
    async fn test_save_without_store_is_unavailable() {
        let app = build_router(AppState::for_tests(1));
        let id = start(&app).await;
        run_to_completion(&app, &id, 1).await;

        let response = send(&app, empty_request("POST", &format!("/api/v1/interviews/{id}/save"))).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["error"]["code"], "STORE_UNAVAILABLE");

        // Results stay viewable after a failed save.
        let response = send(&app, empty_request("GET", &format!("/api/v1/interviews/{id}/results"))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_history_without_store_is_empty_with_warning() {
        let app = build_router(AppState::for_tests(10));
        let response = send(&app, empty_request("GET", "/api/v1/history")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert!(body["items"].as_array().unwrap().is_empty());
        assert!(body["warning"].is_string());
    }

    #[tokio::test]
    async fn test_save_then_browse_and_delete_history() {
        let repo = Arc::new(MemoryRepository::default());
        let mut state = AppState::for_tests(2);
        state.store = InterviewStore::new(Some(repo.clone()));
        let app = build_router(state);

        let id = start(&app).await;
        run_to_completion(&app, &id, 2).await;

        let response = send(&app, empty_request("POST", &format!("/api/v1/interviews/{id}/save"))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let interview_id = body_json(response).await["interview_id"].as_i64().unwrap();

        // A second save returns the same row instead of writing again.
        let response = send(&app, empty_request("POST", &format!("/api/v1/interviews/{id}/save"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["interview_id"], interview_id);
        assert_eq!(repo.interviews.lock().unwrap().len(), 1);

        let history = body_json(send(&app, empty_request("GET", "/api/v1/history")).await).await;
        let items = history["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], interview_id);
        assert_eq!(items[0]["candidate_name"], "Ada Lovelace");
        assert_eq!(items[0]["percentage"], 70.0);
        assert!(history.get("warning").is_none());

        let questions = body_json(
            send(&app, empty_request("GET", &format!("/api/v1/history/{interview_id}/questions"))).await,
        )
        .await;
        let numbers: Vec<i64> = questions["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|q| q["question_number"].as_i64().unwrap())
            .collect();
        assert_eq!(numbers, vec![1, 2]);

        let response = send(&app, empty_request("DELETE", &format!("/api/v1/history/{interview_id}"))).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&app, empty_request("DELETE", &format!("/api/v1/history/{interview_id}"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reset_discards_session() {
        let app = build_router(AppState::for_tests(10));
        let id = start(&app).await;

        let response = send(&app, empty_request("DELETE", &format!("/api/v1/interviews/{id}"))).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, empty_request("GET", &format!("/api/v1/interviews/{id}"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_voice_endpoints_without_credential_are_unavailable() {
        let app = build_router(AppState::for_tests(10));
        let id = start(&app).await;

        let response = send(&app, empty_request("GET", &format!("/api/v1/interviews/{id}/question/audio"))).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["error"]["code"], "VOICE_UNAVAILABLE");

        let response = send(
            &app,
            multipart_request(
                &format!("/api/v1/interviews/{id}/answer/voice"),
                &[Part::File {
                    name: "audio",
                    file_name: "answer.wav",
                    content_type: "audio/wav",
                    bytes: b"RIFF",
                }],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let app = build_router(AppState::for_tests(10));
        let uri = format!("/api/v1/interviews/{}", uuid::Uuid::new_v4());
        let response = send(&app, empty_request("GET", &uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_schema_is_served_as_text() {
        let app = build_router(AppState::for_tests(10));
        let response = send(&app, empty_request("GET", "/api/v1/setup/schema")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let text = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(text.contains("CREATE TABLE IF NOT EXISTS questions"));
    }
}
