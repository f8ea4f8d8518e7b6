//! Composite part keys - `partKey(stepKey)`
//!
//! A part produced by a non-final step is referenced as `PART(STEP)` so that
//! the same part made by different intermediate steps stays distinguishable.

/// Split a part reference into its base part key and the producing step key
///
/// - no `(`: `(trimmed input, None)`
/// - `(` followed anywhere by `)`: base is the trimmed text before the first
///   `(`, step key is the trimmed text between it and the first `)` after it.
///   Anything past that `)` is dropped.
/// - `(` without a later `)`: `(trimmed input, None)`
///
/// Nested parentheses are not balanced: `"key(1(2))"` yields step key
/// `"1(2"`. Callers must not rely on that shape.
pub fn extract_step_key(composite: &str) -> (String, Option<String>) {
    let Some(open) = composite.find('(') else {
        return (composite.trim().to_string(), None);
    };

    let after_open = &composite[open + 1..];
    match after_open.find(')') {
        Some(close) => (
            composite[..open].trim().to_string(),
            Some(after_open[..close].trim().to_string()),
        ),
        None => (composite.trim().to_string(), None),
    }
}

/// The producing step key of a part reference, if it names a non-empty one
pub fn producing_step_key(part_ref: &str) -> Option<String> {
    extract_step_key(part_ref)
        .1
        .filter(|step_key| !step_key.is_empty())
}

/// Build the composite reference `part(step)`
pub fn compose(part_key: &str, step_key: &str) -> String {
    format!("{}({})", part_key, step_key)
}

/// Flow-graph key of a part produced by a step
///
/// Final steps share the bare part key; intermediate outputs are keyed per
/// producing step.
pub fn output_key(part_key: &str, step_key: &str, is_final: bool) -> String {
    if is_final {
        part_key.to_string()
    } else {
        compose(part_key, step_key)
    }
}
