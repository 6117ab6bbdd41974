//! Answer Generator — turns a transcript plus the static rubric into a
//! validated Answer Set via a single schema-constrained LLM call.

pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod rubric;
pub mod schema;
