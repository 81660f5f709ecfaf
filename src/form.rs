//! Raw request assembly for the feature subcommands.
//!
//! Fields are layered: form defaults, then the `--input` JSON object, then
//! explicit flags. The result is handed to a flow unvalidated.
use crate::cli::{MockTestArgs, NotesArgs, PlanArgs, RequestArgs, TutorArgs};
use crate::schema::FieldMap;
use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

pub fn notes_fields(args: &NotesArgs) -> Result<FieldMap> {
    let mut fields = defaults(json!({"language": "English"}));
    apply_input(&mut fields, &args.request)?;
    overlay(&mut fields, "topic", args.topic.clone());
    overlay(&mut fields, "language", args.language.clone());
    Ok(fields)
}

pub fn mock_test_fields(args: &MockTestArgs) -> Result<FieldMap> {
    let mut fields = defaults(json!({
        "numMcq": 5,
        "numShortAnswer": 3,
        "numLongAnswer": 1,
        "numNumerical": 0,
        "difficulty": "medium",
        "language": "English",
    }));
    apply_input(&mut fields, &args.request)?;
    overlay(&mut fields, "topic", args.topic.clone());
    overlay(&mut fields, "numMcq", args.mcq);
    overlay(&mut fields, "numShortAnswer", args.short);
    overlay(&mut fields, "numLongAnswer", args.long);
    overlay(&mut fields, "numNumerical", args.numerical);
    overlay(&mut fields, "difficulty", args.difficulty.clone());
    overlay(&mut fields, "language", args.language.clone());
    Ok(fields)
}

pub fn tutor_fields(args: &TutorArgs) -> Result<FieldMap> {
    let mut fields = FieldMap::new();
    apply_input(&mut fields, &args.request)?;
    overlay(&mut fields, "message", args.message.clone());
    Ok(fields)
}

pub fn plan_fields(args: &PlanArgs) -> Result<FieldMap> {
    let mut fields = defaults(json!({
        "subjects": ["Maths", "Physics", "Chemistry"],
        "revisionDaysInterval": 7,
        "mockTestDays": [],
        "missedDays": 0,
        "progress": 50,
    }));
    apply_input(&mut fields, &args.request)?;
    overlay(&mut fields, "startDate", args.start.clone());
    overlay(&mut fields, "endDate", args.end.clone());
    overlay(&mut fields, "subjects", non_empty(&args.subjects));
    overlay(&mut fields, "revisionDaysInterval", args.interval);
    overlay(&mut fields, "mockTestDays", non_empty(&args.mock_test_days));
    overlay(&mut fields, "missedDays", args.missed_days);
    overlay(&mut fields, "progress", args.progress);
    Ok(fields)
}

/// Read an `--input` file, which must hold a single JSON object.
pub fn read_input(path: &Path) -> Result<FieldMap> {
    let bytes = fs::read(path).with_context(|| format!("read input {}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse input JSON {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(anyhow!(
            "input {} must contain a JSON object",
            path.display()
        )),
    }
}

fn defaults(value: Value) -> FieldMap {
    match value {
        Value::Object(map) => map,
        _ => FieldMap::new(),
    }
}

fn apply_input(fields: &mut FieldMap, request: &RequestArgs) -> Result<()> {
    if let Some(path) = &request.input {
        fields.extend(read_input(path)?);
    }
    Ok(())
}

fn overlay<T: Into<Value>>(fields: &mut FieldMap, name: &str, value: Option<T>) {
    if let Some(value) = value {
        fields.insert(name.to_string(), value.into());
    }
}

fn non_empty(items: &[String]) -> Option<Vec<String>> {
    (!items.is_empty()).then(|| items.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn request(input: Option<PathBuf>) -> RequestArgs {
        RequestArgs { input, json: false }
    }

    fn mock_args(input: Option<PathBuf>) -> MockTestArgs {
        MockTestArgs {
            topic: None,
            mcq: None,
            short: None,
            long: None,
            numerical: None,
            difficulty: None,
            language: None,
            request: request(input),
        }
    }

    #[test]
    fn form_defaults_fill_unset_fields() {
        let mut args = mock_args(None);
        args.topic = Some("Optics".to_string());
        let fields = mock_test_fields(&args).unwrap();
        assert_eq!(fields["topic"], json!("Optics"));
        assert_eq!(fields["numMcq"], json!(5));
        assert_eq!(fields["numShortAnswer"], json!(3));
        assert_eq!(fields["numLongAnswer"], json!(1));
        assert_eq!(fields["numNumerical"], json!(0));
        assert_eq!(fields["difficulty"], json!("medium"));
    }

    #[test]
    fn flags_override_input_which_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mock.json");
        fs::write(&path, r#"{"topic": "Kinematics", "numMcq": 10, "numShortAnswer": 0}"#).unwrap();

        let mut args = mock_args(Some(path));
        args.mcq = Some(2);
        let fields = mock_test_fields(&args).unwrap();
        assert_eq!(fields["topic"], json!("Kinematics"));
        assert_eq!(fields["numMcq"], json!(2));
        assert_eq!(fields["numShortAnswer"], json!(0));
        assert_eq!(fields["numLongAnswer"], json!(1));
    }

    #[test]
    fn repeated_plan_flags_replace_default_lists() {
        let args = PlanArgs {
            start: Some("2024-06-01".to_string()),
            end: None,
            subjects: vec!["Biology".to_string()],
            interval: None,
            mock_test_days: Vec::new(),
            missed_days: None,
            progress: None,
            request: request(None),
        };
        let fields = plan_fields(&args).unwrap();
        assert_eq!(fields["subjects"], json!(["Biology"]));
        assert_eq!(fields["mockTestDays"], json!([]));
        assert_eq!(fields["startDate"], json!("2024-06-01"));
        assert!(!fields.contains_key("endDate"));
    }

    #[test]
    fn input_must_be_an_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.json");
        fs::write(&path, "[1, 2]").unwrap();
        let err = read_input(&path).unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }
}
