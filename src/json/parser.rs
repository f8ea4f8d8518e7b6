//! JSON parsing with error handling

use serde::de::DeserializeOwned;

use crate::json::diagnostics::{JsonError, JsonSyntaxError};

/// Parse JSON content into a typed value with annotated error messages
pub fn parse_json<T: DeserializeOwned>(content: &str, filename: &str) -> Result<T, JsonError> {
    serde_json::from_str(content).map_err(|e| {
        JsonError::Syntax(JsonSyntaxError::from_serde_error(&e, content, filename))
    })
}

/// Parse JSON from a file path
pub fn parse_json_file<T: DeserializeOwned>(path: &std::path::Path) -> Result<T, JsonError> {
    let content = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();
    parse_json(&content, &filename)
}
