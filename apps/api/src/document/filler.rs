//! Answer Set transforms applied before rendering: student-name injection
//! and output filename sanitization.

use serde_json::{Map, Value};

/// The literal phrase the generation prompt tells the model to write in
/// place of the student's name. Matched case-insensitively.
pub const NAME_PLACEHOLDER: &str = "[Student Name]";

/// The field the template uses to reference the name directly.
pub const STUDENT_NAME_FIELD: &str = "student_name";

/// Fallback stem when the submitted name sanitizes to nothing.
const DEFAULT_FILENAME_STEM: &str = "Student";

/// Qualification code suffixed onto every output filename.
pub const QUALIFICATION_CODE: &str = "CHC33021";

/// Replaces every case-insensitive occurrence of [`NAME_PLACEHOLDER`] inside
/// string values with the actual student name, passes non-string values
/// through unchanged, and injects `student_name` for templates that
/// reference it directly.
pub fn inject_student_name(answers: &Map<String, Value>, student_name: &str) -> Map<String, Value> {
    let mut transformed = Map::with_capacity(answers.len() + 1);

    for (key, value) in answers {
        let value = match value {
            Value::String(text) => Value::String(replace_case_insensitive(
                text,
                NAME_PLACEHOLDER,
                student_name,
            )),
            other => other.clone(),
        };
        transformed.insert(key.clone(), value);
    }

    transformed.insert(
        STUDENT_NAME_FIELD.to_string(),
        Value::String(student_name.to_string()),
    );
    transformed
}

/// Case-insensitive substring replacement. The placeholder is ASCII, so
/// ASCII-case comparison is sufficient and keeps byte offsets honest in
/// otherwise non-ASCII text.
fn replace_case_insensitive(haystack: &str, needle: &str, replacement: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }

    let mut result = String::with_capacity(haystack.len());
    let mut rest = haystack;

    while !rest.is_empty() {
        match rest
            .get(..needle.len())
            .filter(|window| window.eq_ignore_ascii_case(needle))
        {
            Some(_) => {
                result.push_str(replacement);
                rest = &rest[needle.len()..];
            }
            None => {
                let ch = rest.chars().next().unwrap();
                result.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    result
}

/// Derives the output filename from the student name: filesystem-illegal
/// characters and whitespace become `_`, an empty result falls back to a
/// default, and the qualification code is always suffixed.
pub fn sanitize_filename(student_name: &str) -> String {
    let stem: String = student_name
        .trim()
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();

    let stem = if stem.is_empty() {
        DEFAULT_FILENAME_STEM.to_string()
    } else {
        stem
    };

    format!("{stem}_{QUALIFICATION_CODE}.docx")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answers(entries: &[(&str, Value)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_inject_replaces_placeholder_case_insensitively() {
        let input = answers(&[
            ("performance_observed_1", json!("[Student Name] greeted warmly.")),
            ("example_action_1", json!("[STUDENT NAME] said hello; [student name] smiled.")),
        ]);
        let out = inject_student_name(&input, "Jane Doe");

        assert_eq!(out["performance_observed_1"], json!("Jane Doe greeted warmly."));
        assert_eq!(
            out["example_action_1"],
            json!("Jane Doe said hello; Jane Doe smiled.")
        );
    }

    #[test]
    fn test_inject_passes_non_strings_through() {
        let input = answers(&[("score", json!(7)), ("flags", json!(["a", "b"]))]);
        let out = inject_student_name(&input, "Jane");

        assert_eq!(out["score"], json!(7));
        assert_eq!(out["flags"], json!(["a", "b"]));
    }

    #[test]
    fn test_inject_always_adds_student_name_field() {
        let out = inject_student_name(&Map::new(), "Jane Doe");
        assert_eq!(out[STUDENT_NAME_FIELD], json!("Jane Doe"));
    }

    #[test]
    fn test_inject_leaves_unrelated_text_alone() {
        let input = answers(&[("note", json!("The student performed well."))]);
        let out = inject_student_name(&input, "Jane");
        assert_eq!(out["note"], json!("The student performed well."));
    }

    #[test]
    fn test_replace_handles_non_ascii_surroundings() {
        let replaced = replace_case_insensitive("café [student name] café", "[Student Name]", "Jo");
        assert_eq!(replaced, "café Jo café");
    }

    #[test]
    fn test_sanitize_replaces_illegal_characters() {
        let name = sanitize_filename(r#"Ja\ne/D:o*e?"<>|"#);
        for illegal in ['\\', '/', ':', '*', '?', '"', '<', '>', '|'] {
            assert!(!name.contains(illegal), "found illegal char {illegal:?} in {name}");
        }
        assert!(name.ends_with("_CHC33021.docx"));
    }

    #[test]
    fn test_sanitize_replaces_whitespace() {
        assert_eq!(sanitize_filename("Jane Doe"), "Jane_Doe_CHC33021.docx");
    }

    #[test]
    fn test_sanitize_empty_name_uses_default() {
        assert_eq!(sanitize_filename("   "), "Student_CHC33021.docx");
        assert_eq!(sanitize_filename(""), "Student_CHC33021.docx");
    }
}
