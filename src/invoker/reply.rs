//! Reply parsing: raw model text to a schema-checked typed value.
use crate::schema::{SchemaMismatch, Shape};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

const PREVIEW_CHARS: usize = 200;

/// Parse raw reply text, check it against `schema`, then deserialize.
pub(super) fn parse_reply<T: DeserializeOwned>(
    text: &str,
    schema: &Shape,
) -> Result<T, SchemaMismatch> {
    let value = decode_json(text)?;
    schema.check(&value)?;
    serde_json::from_value(value)
        .map_err(|err| SchemaMismatch::new("$", format!("reply does not deserialize: {err}")))
}

/// Decode the JSON value in a reply.
///
/// The whole reply is tried first. A reply that opens with a code fence has
/// the fence lines removed; otherwise the first complete object embedded in
/// surrounding prose is used.
fn decode_json(text: &str) -> Result<Value, SchemaMismatch> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(SchemaMismatch::new("$", "reply is empty"));
    }
    match serde_json::from_str::<Value>(&body) {
        Ok(value) => Ok(value),
        Err(err) => embedded_object(&body).ok_or_else(|| {
            SchemaMismatch::new(
                "$",
                format!(
                    "reply is not valid JSON ({err}); starts with: {}",
                    preview(&body)
                ),
            )
        }),
    }
}

/// Drop an opening fence line (e.g. "```json") and a matching closing one.
fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let mut lines: Vec<&str> = trimmed.lines().skip(1).collect();
    if lines
        .last()
        .is_some_and(|last| last.trim_start().starts_with("```"))
    {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}

fn embedded_object(text: &str) -> Option<Value> {
    text.char_indices()
        .filter(|(_, ch)| *ch == '{')
        .find_map(|(idx, _)| {
            let mut deserializer = serde_json::Deserializer::from_str(&text[idx..]);
            Value::deserialize(&mut deserializer)
                .ok()
                .filter(Value::is_object)
        })
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if out.len() < text.len() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Notes {
        notes: String,
    }

    fn notes_shape() -> Shape {
        Shape::object(vec![("notes", Shape::text("Notes."))])
    }

    fn notes(text: &str) -> Result<String, SchemaMismatch> {
        parse_reply::<Notes>(text, &notes_shape()).map(|reply| reply.notes)
    }

    #[test]
    fn plain_reply() {
        assert_eq!(notes(r#" {"notes": "x"} "#).unwrap(), "x");
    }

    #[test]
    fn code_block_inside_a_field_is_not_mistaken_for_a_fence() {
        let text = r##"{"notes": "# Python loops\n\n```python\nfor i in range(3):\n    print(i)\n```\n\nLoops repeat."}"##;
        let parsed = notes(text).unwrap();
        assert!(parsed.starts_with("# Python loops"));
        assert!(parsed.contains("```python\nfor i in range(3):"));
        assert!(parsed.ends_with("Loops repeat."));
    }

    #[test]
    fn fenced_reply_is_unwrapped() {
        let text = "```json\n{\"notes\": \"# Kinematics\\n- velocity\"}\n```";
        assert_eq!(notes(text).unwrap(), "# Kinematics\n- velocity");

        let text = "```\n{\"notes\": \"see ```rust\\nfn main() {}\\n```\"}\n```";
        assert_eq!(notes(text).unwrap(), "see ```rust\nfn main() {}\n```");
    }

    #[test]
    fn object_after_prose_is_found() {
        let text = "Here are your notes:\n```json\n{\"notes\": \"x\"}\n```\n";
        assert_eq!(notes(text).unwrap(), "x");
    }

    #[test]
    fn invalid_json_is_reported_at_root() {
        let err = notes("Sure! Here are notes.").unwrap_err();
        assert_eq!(err.path, "$");
        assert!(err.problem.starts_with("reply is not valid JSON"));
    }

    #[test]
    fn empty_reply_is_rejected() {
        assert_eq!(notes("   \n").unwrap_err().problem, "reply is empty");
        assert_eq!(notes("```json\n```").unwrap_err().problem, "reply is empty");
    }
}
