//! Response shape derivation — builds the constrained output schema from the
//! rubric's criteria count.
//!
//! For a rubric with N criteria the shape declares exactly 2N required string
//! fields: `performance_observed_<i>` and `example_action_<i>` for i = 1..N.
//! Zero criteria is a hard failure, not an empty-but-valid shape — a rubric
//! that enumerates nothing cannot be assessed against.

use serde_json::{json, Value};

use crate::assessment::rubric::Rubric;
use crate::errors::AppError;

/// Schema name sent with the response-format constraint.
pub const SHAPE_NAME: &str = "assessment_answers";

/// The derived answer shape: a JSON Schema plus the flat field list used to
/// validate the model's reply after the call.
#[derive(Debug, Clone)]
pub struct ResponseShape {
    pub criteria_count: usize,
    pub required_fields: Vec<String>,
    pub json_schema: Value,
}

pub fn performance_field(index: usize) -> String {
    format!("performance_observed_{index}")
}

pub fn example_field(index: usize) -> String {
    format!("example_action_{index}")
}

/// Derives the response shape from the rubric.
pub fn derive_shape(rubric: &Rubric) -> Result<ResponseShape, AppError> {
    let criteria_count = rubric.criteria_count();
    if criteria_count == 0 {
        return Err(AppError::Schema(
            "Rubric defines no numbered benchmark criteria; cannot derive an answer shape."
                .to_string(),
        ));
    }

    let mut properties = serde_json::Map::new();
    let mut required_fields = Vec::with_capacity(criteria_count * 2);

    for i in 1..=criteria_count {
        let performance = performance_field(i);
        properties.insert(
            performance.clone(),
            json!({
                "type": "string",
                "description": format!(
                    "Whether and how the student met benchmark criterion {i}, \
                     in the assessor's words."
                )
            }),
        );
        required_fields.push(performance);

        let example = example_field(i);
        properties.insert(
            example.clone(),
            json!({
                "type": "string",
                "description": format!(
                    "A concrete action or quote from the transcript evidencing \
                     criterion {i}."
                )
            }),
        );
        required_fields.push(example);
    }

    let json_schema = json!({
        "type": "object",
        "properties": properties,
        "required": required_fields,
        "additionalProperties": false
    });

    Ok(ResponseShape {
        criteria_count,
        required_fields,
        json_schema,
    })
}
