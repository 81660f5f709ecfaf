use super::{Constraint, FieldMap, FieldReader, ValidationError};
use crate::schema::{Difficulty, Language};
use chrono::NaiveDate;
use serde_json::json;

fn fields(value: serde_json::Value) -> FieldMap {
    value.as_object().cloned().expect("object literal")
}

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("test date")
}

#[test]
fn text_is_trimmed_and_length_checked() {
    let map = fields(json!({"topic": "  Kinematics "}));
    let reader = FieldReader::new(&map);
    assert_eq!(reader.text("topic", 3).unwrap(), "Kinematics");

    let map = fields(json!({"topic": "Ph"}));
    let err = FieldReader::new(&map).text("topic", 3).unwrap_err();
    assert_eq!(err, ValidationError::new("topic", Constraint::TooShort { min: 3 }));
    assert_eq!(err.to_string(), "topic: must be at least 3 characters");
}

#[test]
fn text_length_counts_characters_not_bytes() {
    // Three Bengali characters, nine bytes.
    let map = fields(json!({"topic": "গতি"}));
    assert_eq!(FieldReader::new(&map).text("topic", 3).unwrap(), "গতি");
}

#[test]
fn missing_and_null_fields_are_reported_as_missing() {
    let map = fields(json!({"message": null}));
    let reader = FieldReader::new(&map);
    assert_eq!(
        reader.text("message", 1).unwrap_err().constraint,
        Constraint::Missing
    );
    assert_eq!(
        reader.integer("numMcq", 0, 20).unwrap_err().constraint,
        Constraint::Missing
    );
}

#[test]
fn integers_are_range_checked() {
    let map = fields(json!({"numMcq": 21, "numLongAnswer": -1, "progress": 7.0}));
    let reader = FieldReader::new(&map);
    assert_eq!(
        reader.integer("numMcq", 0, 20).unwrap_err().constraint,
        Constraint::OutOfRange { min: 0, max: 20 }
    );
    assert_eq!(
        reader.integer("numLongAnswer", 0, 5).unwrap_err().constraint,
        Constraint::OutOfRange { min: 0, max: 5 }
    );
    assert_eq!(reader.integer("progress", 0, 100).unwrap(), 7);
}

#[test]
fn fractional_and_string_numbers_are_rejected() {
    let map = fields(json!({"a": 2.5, "b": "3"}));
    let reader = FieldReader::new(&map);
    for name in ["a", "b"] {
        assert_eq!(
            reader.integer(name, 0, 10).unwrap_err().constraint,
            Constraint::WrongType {
                expected: "a whole number"
            }
        );
    }
}

#[test]
fn optional_integer_allows_absence_but_checks_presence() {
    let map = fields(json!({"progress": 101}));
    let reader = FieldReader::new(&map);
    assert_eq!(reader.optional_integer("missedDays", 0, 365).unwrap(), None);
    assert!(reader.optional_integer("progress", 0, 100).is_err());
}

#[test]
fn choices_reject_values_outside_the_set() {
    let map = fields(json!({"difficulty": "extreme", "language": "Bengali"}));
    let reader = FieldReader::new(&map);
    let err = reader.choice::<Difficulty>("difficulty").unwrap_err();
    assert_eq!(err.field, "difficulty");
    assert_eq!(err.to_string(), "difficulty: must be one of: easy, medium, hard");
    assert_eq!(reader.choice::<Language>("language").unwrap(), Language::Bengali);
}

#[test]
fn text_list_keeps_order_and_rejects_blank_items() {
    let map = fields(json!({"subjects": ["Maths", " Physics ", "Chemistry"]}));
    assert_eq!(
        FieldReader::new(&map).text_list("subjects", 1).unwrap(),
        vec!["Maths", "Physics", "Chemistry"]
    );

    let map = fields(json!({"subjects": ["Maths", "  "]}));
    let err = FieldReader::new(&map).text_list("subjects", 1).unwrap_err();
    assert_eq!(err.field, "subjects[1]");

    let map = fields(json!({"subjects": []}));
    assert_eq!(
        FieldReader::new(&map)
            .text_list("subjects", 1)
            .unwrap_err()
            .constraint,
        Constraint::TooFewItems { min: 1 }
    );
}

#[test]
fn dates_must_be_strict_calendar_dates() {
    let map = fields(json!({
        "ok": "2024-06-10",
        "short": "2024-6-1",
        "impossible": "2024-02-30",
        "number": 20240610
    }));
    let reader = FieldReader::new(&map);
    assert_eq!(reader.date("ok").unwrap(), date("2024-06-10"));
    for name in ["short", "impossible", "number"] {
        assert_eq!(reader.date(name).unwrap_err().constraint, Constraint::BadDate);
    }
}

#[test]
fn date_list_names_the_offending_index() {
    let map = fields(json!({"mockTestDays": ["2024-06-10", "next friday"]}));
    let err = FieldReader::new(&map).date_list("mockTestDays").unwrap_err();
    assert_eq!(err.field, "mockTestDays[1]");

    let empty = FieldMap::new();
    assert!(FieldReader::new(&empty)
        .date_list("mockTestDays")
        .unwrap()
        .is_empty());
}
