// All LLM prompt constants for the assessment module.

/// System prompt for answer generation — enforces JSON-only output.
pub const GENERATION_SYSTEM: &str =
    "You are a qualified vocational assessor for the CHC33021 Certificate III \
    in Individual Support, marking a recorded role-play interview against a \
    fixed benchmark rubric. \
    You MUST respond with valid JSON only, matching the requested schema exactly. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Answer generation prompt template.
/// Replace: {criteria_count}, {gender}, {transcript}, {rubric_json}, {guide}
pub const GENERATION_PROMPT_TEMPLATE: &str = r#"Assess the following role-play interview transcript against the benchmark rubric below.

For EACH numbered criterion i from 1 to {criteria_count}, produce exactly two fields:
- "performance_observed_i": 2-4 sentences describing whether and how the student demonstrated the criterion, written in a professional assessor's voice.
- "example_action_i": one concrete action or short quote from the transcript that evidences your judgement.

RULES:
1. Ground every statement in the transcript — do not invent behaviour that is not there.
2. Where the transcript does not demonstrate a criterion, say so plainly; do not pad.
3. Refer to the student as "[Student Name]" wherever a name is needed; never guess their real name.
4. The student's gender is {gender}; use matching pronouns.
5. Return ONLY the JSON object with the {criteria_count} pairs of fields described above.

BENCHMARK RUBRIC (JSON):
{rubric_json}

ASSESSMENT GUIDE:
{guide}

INTERVIEW TRANSCRIPT:
{transcript}"#;
