//! JSON error diagnostics with source-annotated error messages

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// JSON syntax error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("JSON syntax error: {message}")]
#[diagnostic(code(mfgdocs::json::syntax))]
pub struct JsonSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    /// The underlying error message
    message: String,
}

impl JsonSyntaxError {
    /// Create a syntax error from a serde_json error
    pub fn from_serde_error(err: &serde_json::Error, source: &str, filename: &str) -> Self {
        // serde_json reports column 0 when the error sits on a line break
        let line = err.line().max(1);
        let column = err.column().max(1);

        let offset = line_col_to_offset(source, line, column);
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            message,
        }
    }

    /// The error message without source context
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Generic JSON error wrapper
#[derive(Debug, Error, Diagnostic)]
pub enum JsonError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] JsonSyntaxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert line/column to byte offset, clamped to the source length
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut line_start = 0;
    let mut current_line = 1;

    for (i, ch) in source.char_indices() {
        if current_line == line {
            break;
        }
        if ch == '\n' {
            current_line += 1;
            line_start = i + 1;
        }
    }

    if current_line < line {
        return source.len().saturating_sub(1);
    }

    let line_text = &source[line_start..];
    let line_len = line_text.find('\n').unwrap_or(line_text.len());
    let col_offset = line_text
        .char_indices()
        .nth(column.saturating_sub(1))
        .map(|(j, _)| j)
        .unwrap_or(line_len)
        .min(line_len);

    line_start + col_offset
}

/// Generate helpful suggestions based on error message
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("trailing comma") {
        return Some("Remove the comma after the last item of the object or array.".to_string());
    }

    if msg_lower.contains("key must be a string") {
        return Some("Object keys must be double-quoted strings: {\"key\": 1}".to_string());
    }

    if msg_lower.contains("expected `:`") {
        return Some("Separate each key from its value with a colon.".to_string());
    }

    if msg_lower.contains("expected `,` or `}`") || msg_lower.contains("expected `,` or `]`") {
        return Some("Add a comma between entries, or close the object/array.".to_string());
    }

    if msg_lower.contains("eof while parsing") {
        return Some(
            "The file ends early - check for a missing closing brace or bracket.".to_string(),
        );
    }

    if msg_lower.contains("control character") {
        return Some("Escape newlines and tabs inside strings as \\n and \\t.".to_string());
    }

    None
}
