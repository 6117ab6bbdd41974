//! Answer generation — orchestrates the first stage of the pipeline.
//!
//! Flow: load rubric → derive response shape → compose prompt →
//!       single LLM call (temperature 0.2, schema-constrained) →
//!       validate the reply into an Answer Set.
//!
//! No state is retained across calls; the rubric is re-read per request.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::info;

use crate::assessment::prompts::{GENERATION_PROMPT_TEMPLATE, GENERATION_SYSTEM};
use crate::assessment::rubric::{load_rubric, Rubric};
use crate::assessment::schema::{derive_shape, ResponseShape, SHAPE_NAME};
use crate::errors::AppError;
use crate::llm_client::TextGenerator;

/// One pair of evaluation fields per rubric criterion, all strings.
/// Keys are `performance_observed_<i>` / `example_action_<i>`.
pub type AnswerSet = Map<String, Value>;

/// Input to the generation stage. The student's name deliberately stays at
/// the handler layer: the model writes the `[Student Name]` placeholder and
/// the fill stage substitutes the real name.
#[derive(Debug, Clone)]
pub struct GenerationInput {
    pub transcript: String,
    pub gender: String,
}

/// Runs the full generation stage and returns a validated Answer Set.
pub async fn generate_answers(
    rubric_path: &Path,
    generator: &dyn TextGenerator,
    input: &GenerationInput,
) -> Result<AnswerSet, AppError> {
    let rubric = load_rubric(rubric_path)?;
    let shape = derive_shape(&rubric)?;
    info!(
        "Generating answers for {} criteria ({} fields)",
        shape.criteria_count,
        shape.required_fields.len()
    );

    let prompt = build_generation_prompt(&rubric, &shape, input);

    let raw = generator
        .generate_json(GENERATION_SYSTEM, &prompt, SHAPE_NAME, &shape.json_schema)
        .await
        .map_err(|e| AppError::Upstream(format!("Answer generation failed: {e}")))?;

    let answers = validate_answer_set(raw, &shape)?;
    info!("Answer set validated: {} fields", answers.len());
    Ok(answers)
}

/// Fills the prompt template with the rubric, guide, and transcript.
fn build_generation_prompt(rubric: &Rubric, shape: &ResponseShape, input: &GenerationInput) -> String {
    GENERATION_PROMPT_TEMPLATE
        .replace("{criteria_count}", &shape.criteria_count.to_string())
        .replace("{gender}", &input.gender)
        .replace("{rubric_json}", &rubric.raw_text())
        .replace("{guide}", &rubric.assessment_guide_content)
        .replace("{transcript}", &input.transcript)
}

/// Checks the model's reply against the derived shape: the reply must be a
/// JSON object carrying every required field as a string. Anything else is
/// an upstream format error — the caller gets told, nothing is repaired.
fn validate_answer_set(raw: Value, shape: &ResponseShape) -> Result<AnswerSet, AppError> {
    let object = match raw {
        Value::Object(map) => map,
        other => {
            return Err(AppError::UpstreamFormat(format!(
                "Generation service returned {} instead of a JSON object.",
                json_type_name(&other)
            )))
        }
    };

    let mut answers = AnswerSet::new();
    for field in &shape.required_fields {
        match object.get(field) {
            Some(Value::String(text)) => {
                answers.insert(field.clone(), Value::String(text.clone()));
            }
            Some(other) => {
                return Err(AppError::UpstreamFormat(format!(
                    "Generation service returned {} for field '{field}'; expected a string.",
                    json_type_name(other)
                )))
            }
            None => {
                return Err(AppError::UpstreamFormat(format!(
                    "Generation service response is missing required field '{field}'."
                )))
            }
        }
    }

    Ok(answers)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
