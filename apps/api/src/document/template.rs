//! Docx template rendering — substitutes `{{field}}` tags inside the OPC
//! container's XML parts.
//!
//! Policy is fail closed: a tag with no matching field aborts the render
//! with an error naming the tag, never a silently blanked document. Tags
//! must sit inside a single text run; the template author controls this.

use std::io::{Cursor, Read, Write};

use serde_json::{Map, Value};
use zip::{write::FileOptions, CompressionMethod, ZipArchive, ZipWriter};

use crate::errors::AppError;

/// Renders the template bytes by replacing every `{{field}}` tag in the
/// document body, headers, and footers with the matching field value.
/// All other container parts are copied through untouched.
pub fn render_template(
    template_bytes: &[u8],
    fields: &Map<String, Value>,
) -> Result<Vec<u8>, AppError> {
    let mut archive = ZipArchive::new(Cursor::new(template_bytes))
        .map_err(|e| AppError::Render(format!("Template is not a valid .docx archive: {e}")))?;

    let mut output = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| AppError::Render(format!("Failed to read template entry: {e}")))?;
        let name = entry.name().to_string();

        output
            .start_file(name.as_str(), options)
            .map_err(|e| AppError::Render(format!("Failed to write rendered document: {e}")))?;

        if is_substitutable_part(&name) {
            let mut xml = String::new();
            entry.read_to_string(&mut xml).map_err(|e| {
                AppError::Render(format!("Template part {name} is not valid text: {e}"))
            })?;
            let rendered = substitute_tags(&xml, fields)?;
            output
                .write_all(rendered.as_bytes())
                .map_err(|e| AppError::Render(format!("Failed to write rendered document: {e}")))?;
        } else {
            let mut raw = Vec::new();
            entry.read_to_end(&mut raw).map_err(|e| {
                AppError::Render(format!("Failed to read template entry {name}: {e}"))
            })?;
            output
                .write_all(&raw)
                .map_err(|e| AppError::Render(format!("Failed to write rendered document: {e}")))?;
        }
    }

    let cursor = output
        .finish()
        .map_err(|e| AppError::Render(format!("Failed to finalize rendered document: {e}")))?;
    Ok(cursor.into_inner())
}

/// Word keeps user-visible text in the document body plus headers/footers.
fn is_substitutable_part(name: &str) -> bool {
    name == "word/document.xml"
        || (name.starts_with("word/header") && name.ends_with(".xml"))
        || (name.starts_with("word/footer") && name.ends_with(".xml"))
}

/// Replaces every `{{field}}` tag in `xml` with the XML-escaped field value.
/// Unknown tags and an unterminated `{{` are render errors.
fn substitute_tags(xml: &str, fields: &Map<String, Value>) -> Result<String, AppError> {
    let mut result = String::with_capacity(xml.len());
    let mut rest = xml;

    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];

        let close = after_open.find("}}").ok_or_else(|| {
            AppError::Render("Template contains an unterminated {{ tag.".to_string())
        })?;

        let tag = after_open[..close].trim();
        let value = fields.get(tag).ok_or_else(|| {
            AppError::Render(format!(
                "Template tag '{{{{{tag}}}}}' has no matching field in the answer set."
            ))
        })?;

        result.push_str(&xml_escape(&value_as_text(value)));
        rest = &after_open[close + 2..];
    }

    result.push_str(rest);
    Ok(result)
}

/// Field values are normally strings; anything else renders as its compact
/// JSON form rather than failing the whole document.
fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Builds a minimal docx-shaped zip with the given document body.
/// Shared by the template and fill-endpoint tests.
#[cfg(test)]
pub(crate) fn docx_with_body(body_xml: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file("[Content_Types].xml", options).unwrap();
    writer
        .write_all(b"<?xml version=\"1.0\"?><Types/>")
        .unwrap();

    writer.start_file("word/document.xml", options).unwrap();
    writer
        .write_all(format!("<w:document><w:body>{body_xml}</w:body></w:document>").as_bytes())
        .unwrap();

    writer.finish().unwrap().into_inner()
}
