//! Axum route handlers for the generation endpoint.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::assessment::generator::{generate_answers, AnswerSet, GenerationInput};
use crate::errors::AppError;
use crate::state::AppState;

/// Request body for POST /api/generate. Fields are optional at the serde
/// layer so a missing field surfaces as our 400 body, not a 422 rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub student_name: Option<String>,
    pub transcript: Option<String>,
    pub gender: Option<String>,
}

/// POST /api/generate
///
/// Runs the generation stage and returns the Answer Set object directly:
/// `performance_observed_<i>` / `example_action_<i>` for i = 1..N.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<AnswerSet>, AppError> {
    // The name is required by the wire contract but never reaches the
    // model; the fill stage substitutes it into the placeholder later.
    required_field(request.student_name, "studentName")?;
    let input = GenerationInput {
        transcript: required_field(request.transcript, "transcript")?,
        gender: required_field(request.gender, "gender")?,
    };

    let answers =
        generate_answers(&state.config.rubric_path, state.generator.as_ref(), &input).await?;

    Ok(Json(answers))
}

fn required_field(value: Option<String>, name: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{name} is required."))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::llm_client::{LlmError, TextGenerator};
    use crate::routes::build_router;

    struct StubGenerator {
        reply: Value,
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate_json(
            &self,
            _system: &str,
            _prompt: &str,
            _schema_name: &str,
            _schema: &Value,
        ) -> Result<Value, LlmError> {
            Ok(self.reply.clone())
        }
    }

    fn test_app(rubric_path: &std::path::Path, reply: Value) -> axum::Router {
        build_router(AppState {
            config: Config {
                openai_api_key: "test-key".to_string(),
                rubric_path: rubric_path.to_path_buf(),
                template_path: "templates/blank_form.docx".into(),
                output_dir: "output".into(),
                port: 0,
                rust_log: "info".to_string(),
            },
            generator: Arc::new(StubGenerator { reply }),
        })
    }

    fn generate_request(body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn one_criterion_rubric() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{
                "rolePlayScenerio": {
                    "instruction for roleplay": {"1": "Greets the client."}
                },
                "assessmentGuideContent": "Mark against the transcript."
            }"#,
        )
        .unwrap();
        file
    }

    #[tokio::test]
    async fn test_generate_returns_answer_set_object() {
        let rubric = one_criterion_rubric();
        let app = test_app(
            rubric.path(),
            json!({
                "performance_observed_1": "[Student Name] greeted the client.",
                "example_action_1": "\"Good morning, Margaret.\""
            }),
        );

        let response = app
            .oneshot(generate_request(&json!({
                "studentName": "Jane Doe",
                "transcript": "Student: Good morning, Margaret. How are you feeling today?",
                "gender": "female"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body["performance_observed_1"],
            "[Student Name] greeted the client."
        );
        assert!(body["example_action_1"].is_string());
    }

    #[tokio::test]
    async fn test_generate_missing_transcript_returns_400() {
        let rubric = one_criterion_rubric();
        let app = test_app(rubric.path(), json!({}));

        let response = app
            .oneshot(generate_request(&json!({
                "studentName": "Jane Doe",
                "gender": "female"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert!(body["error"].as_str().unwrap().contains("transcript"));
    }

    #[tokio::test]
    async fn test_generate_missing_student_name_still_returns_400() {
        // The name never reaches the model, but the wire contract still
        // requires it: the fill stage needs it later.
        let rubric = one_criterion_rubric();
        let app = test_app(rubric.path(), json!({}));

        let response = app
            .oneshot(generate_request(&json!({
                "transcript": "Student: Good morning, Margaret.",
                "gender": "female"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("studentName"));
    }

    #[tokio::test]
    async fn test_generate_incomplete_model_reply_returns_502() {
        let rubric = one_criterion_rubric();
        // Model "forgot" example_action_1
        let app = test_app(
            rubric.path(),
            json!({"performance_observed_1": "Greeted."}),
        );

        let response = app
            .oneshot(generate_request(&json!({
                "studentName": "Jane Doe",
                "transcript": "Student: Good morning, Margaret.",
                "gender": "female"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("example_action_1"));
    }

    #[test]
    fn test_required_field_rejects_missing() {
        let result = required_field(None, "studentName");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_required_field_rejects_whitespace_only() {
        let result = required_field(Some("   ".to_string()), "transcript");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_required_field_accepts_value() {
        let value = required_field(Some("Jane".to_string()), "studentName").unwrap();
        assert_eq!(value, "Jane");
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let json = r#"{"studentName": "Jane", "transcript": "t", "gender": "female"}"#;
        let request: GenerateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.student_name.as_deref(), Some("Jane"));
        assert_eq!(request.gender.as_deref(), Some("female"));
    }
}
