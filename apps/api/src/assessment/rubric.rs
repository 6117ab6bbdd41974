//! Rubric — the static assessment document driving generation.
//!
//! The rubric is read fresh on every request (no caching): editing the JSON
//! on disk takes effect on the next submission. Criterion keys inside
//! `"instruction for roleplay"` are numeric strings, contiguous from 1..N;
//! N determines the shape of the expected answer.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;

/// The full rubric document. Field names mirror the JSON file verbatim,
/// including the `rolePlayScenerio` spelling the assessment templates use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rubric {
    #[serde(rename = "rolePlayScenerio")]
    pub role_play_scenario: RolePlayScenario,

    /// Narrative marking guidance, embedded verbatim into the prompt.
    #[serde(rename = "assessmentGuideContent")]
    pub assessment_guide_content: String,

    /// Anything else in the file rides along so the prompt sees the whole
    /// document, not just the parts this server interprets.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePlayScenario {
    /// Benchmark criteria keyed by numeric strings "1".."N".
    #[serde(rename = "instruction for roleplay")]
    pub instructions: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Rubric {
    /// Counts the benchmark criteria: the length of the contiguous run of
    /// numeric keys starting at "1". Keys outside that run are narrative
    /// additions and do not widen the answer shape.
    pub fn criteria_count(&self) -> usize {
        let mut n = 0;
        while self
            .role_play_scenario
            .instructions
            .contains_key(&(n + 1).to_string())
        {
            n += 1;
        }
        n
    }

    /// The raw rubric text embedded into the prompt.
    pub fn raw_text(&self) -> String {
        // Serialization of a value we just deserialized cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Loads and parses the rubric file.
pub fn load_rubric(path: &Path) -> Result<Rubric, AppError> {
    let raw = std::fs::read_to_string(path).map_err(|_| {
        AppError::Configuration(format!("Rubric file {} not found.", path.display()))
    })?;

    serde_json::from_str(&raw).map_err(|e| {
        AppError::Configuration(format!(
            "Rubric file {} is not a valid rubric document: {e}",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const RUBRIC_FIXTURE: &str = r#"{
        "rolePlayScenerio": {
            "scenario": "Support worker assists an elderly client with morning routine.",
            "instruction for roleplay": {
                "1": "Greets the client and explains the plan for the session.",
                "2": "Checks for consent before providing personal care.",
                "3": "Uses safe manual handling throughout."
            }
        },
        "assessmentGuideContent": "Mark each criterion against the observed transcript."
    }"#;

    #[test]
    fn test_rubric_parses_and_counts_criteria() {
        let rubric: Rubric = serde_json::from_str(RUBRIC_FIXTURE).unwrap();
        assert_eq!(rubric.criteria_count(), 3);
        assert_eq!(
            rubric.assessment_guide_content,
            "Mark each criterion against the observed transcript."
        );
    }

    #[test]
    fn test_criteria_count_stops_at_gap() {
        // "1" and "2" are contiguous; "4" is orphaned and must not count
        let json = r#"{
            "rolePlayScenerio": {
                "instruction for roleplay": {"1": "a", "2": "b", "4": "d"}
            },
            "assessmentGuideContent": "guide"
        }"#;
        let rubric: Rubric = serde_json::from_str(json).unwrap();
        assert_eq!(rubric.criteria_count(), 2);
    }

    #[test]
    fn test_criteria_count_ignores_non_numeric_keys() {
        let json = r#"{
            "rolePlayScenerio": {
                "instruction for roleplay": {"note": "not a criterion"}
            },
            "assessmentGuideContent": "guide"
        }"#;
        let rubric: Rubric = serde_json::from_str(json).unwrap();
        assert_eq!(rubric.criteria_count(), 0);
    }

    #[test]
    fn test_raw_text_round_trips_unknown_fields() {
        let json = r#"{
            "rolePlayScenerio": {
                "instruction for roleplay": {"1": "a"},
                "clientProfile": "Margaret, 82"
            },
            "assessmentGuideContent": "guide",
            "unit": "CHCCCS031"
        }"#;
        let rubric: Rubric = serde_json::from_str(json).unwrap();
        let raw = rubric.raw_text();
        assert!(raw.contains("clientProfile"));
        assert!(raw.contains("CHCCCS031"));
    }

    #[test]
    fn test_load_rubric_missing_file_is_configuration_error() {
        let result = load_rubric(Path::new("/nonexistent/rubric.json"));
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_load_rubric_invalid_json_is_configuration_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let result = load_rubric(file.path());
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_load_rubric_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(RUBRIC_FIXTURE.as_bytes()).unwrap();
        let rubric = load_rubric(file.path()).unwrap();
        assert_eq!(rubric.criteria_count(), 3);
    }
}
