//! Document Filler — merges a validated Answer Set into the blank .docx
//! assessment form and returns the rendered bytes.

pub mod filler;
pub mod handlers;
pub mod template;
