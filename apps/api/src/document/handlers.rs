//! Axum route handlers for the fill endpoint.

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::document::filler::{inject_student_name, sanitize_filename};
use crate::document::template::render_template;
use crate::errors::AppError;
use crate::state::AppState;

/// Request body for POST /api/fill. Fields are optional at the serde layer
/// so a missing field surfaces as our 400 body, not a 422 rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillRequest {
    pub student_name: Option<String>,
    pub answers: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillResponse {
    pub ok: bool,
    pub filename: String,
    pub saved_path: String,
    pub base64_docx: String,
}

/// POST /api/fill
///
/// Renders the blank assessment form with the generated answers plus the
/// student's name, writes it to the output directory, and returns the same
/// bytes base64-encoded for immediate download.
pub async fn handle_fill(
    State(state): State<AppState>,
    Json(request): Json<FillRequest>,
) -> Result<Json<FillResponse>, AppError> {
    let student_name = match request.student_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => return Err(AppError::Validation("studentName is required.".to_string())),
    };
    let answers = request
        .answers
        .ok_or_else(|| AppError::Validation("answers is required.".to_string()))?;

    let template_path = &state.config.template_path;
    let template_bytes = tokio::fs::read(template_path).await.map_err(|e| {
        // Only an absent template is the user-facing 404; anything else
        // (permissions, I/O) is a server fault.
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound(format!("{} not found.", template_path.display()))
        } else {
            AppError::Internal(anyhow::anyhow!(
                "Failed to read template {}: {e}",
                template_path.display()
            ))
        }
    })?;

    let fields = inject_student_name(&answers, &student_name);
    let rendered = render_template(&template_bytes, &fields)?;

    let filename = sanitize_filename(&student_name);
    let saved_path = state.config.output_dir.join(&filename);

    // A failed local write is surfaced, not swallowed: the caller gets the
    // bytes either way, but a silent save failure would lose the only copy
    // the assessor expects to find on disk.
    tokio::fs::create_dir_all(&state.config.output_dir)
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Failed to create output directory {}: {e}",
                state.config.output_dir.display()
            ))
        })?;
    tokio::fs::write(&saved_path, &rendered).await.map_err(|e| {
        AppError::Internal(anyhow::anyhow!(
            "Failed to save rendered document to {}: {e}",
            saved_path.display()
        ))
    })?;

    info!(
        "Rendered {} ({} bytes) for {}",
        filename,
        rendered.len(),
        student_name
    );

    Ok(Json(FillResponse {
        ok: true,
        filename,
        saved_path: saved_path.display().to_string(),
        base64_docx: BASE64.encode(&rendered),
    }))
}
