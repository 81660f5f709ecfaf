//! Field-level request validation.
//!
//! A [`FieldReader`] wraps the raw request map and hands out typed values, or
//! a [`ValidationError`] naming the field and the constraint it broke.
use super::choices::Choice;
use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::OnceLock;

/// Raw request fields as submitted, keyed by wire name.
pub type FieldMap = Map<String, Value>;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The rule a field value failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Missing,
    WrongType { expected: &'static str },
    TooShort { min: usize },
    OutOfRange { min: i64, max: i64 },
    NotInSet { allowed: &'static [&'static str] },
    BadDate,
    TooFewItems { min: usize },
    Custom(String),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "is required"),
            Self::WrongType { expected } => write!(f, "must be {expected}"),
            Self::TooShort { min } => write!(f, "must be at least {min} characters"),
            Self::OutOfRange { min, max } if *max == i64::MAX => {
                write!(f, "must be at least {min}")
            }
            Self::OutOfRange { min, max } => write!(f, "must be between {min} and {max}"),
            Self::NotInSet { allowed } => write!(f, "must be one of: {}", allowed.join(", ")),
            Self::BadDate => write!(f, "must be a calendar date in YYYY-MM-DD form"),
            Self::TooFewItems { min } => write!(f, "must contain at least {min} item(s)"),
            Self::Custom(message) => f.write_str(message),
        }
    }
}

/// A request field that failed its declared constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {constraint}")]
pub struct ValidationError {
    pub field: String,
    pub constraint: Constraint,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            field: field.into(),
            constraint,
        }
    }
}

/// Typed, constraint-checked access to a [`FieldMap`].
///
/// `null` is treated the same as an absent field. Fields not asked for are
/// ignored.
pub struct FieldReader<'a> {
    fields: &'a FieldMap,
}

impl<'a> FieldReader<'a> {
    pub fn new(fields: &'a FieldMap) -> Self {
        Self { fields }
    }

    fn value(&self, name: &str) -> Option<&'a Value> {
        self.fields.get(name).filter(|value| !value.is_null())
    }

    fn required(&self, name: &str) -> Result<&'a Value, ValidationError> {
        self.value(name)
            .ok_or_else(|| ValidationError::new(name, Constraint::Missing))
    }

    /// Read a string, trimmed, with at least `min_chars` characters.
    pub fn text(&self, name: &str, min_chars: usize) -> Result<String, ValidationError> {
        let raw = self
            .required(name)?
            .as_str()
            .ok_or_else(|| ValidationError::new(name, Constraint::WrongType { expected: "a string" }))?;
        check_text(name, raw, min_chars)
    }

    /// Read an integer within `min..=max`.
    pub fn integer(&self, name: &str, min: i64, max: i64) -> Result<i64, ValidationError> {
        let value = self.required(name)?;
        check_integer(name, value, min, max)
    }

    /// Read an integer within `min..=max` when present.
    pub fn optional_integer(
        &self,
        name: &str,
        min: i64,
        max: i64,
    ) -> Result<Option<i64>, ValidationError> {
        self.value(name)
            .map(|value| check_integer(name, value, min, max))
            .transpose()
    }

    /// Read one of the values of a closed [`Choice`] set.
    pub fn choice<T: Choice>(&self, name: &str) -> Result<T, ValidationError> {
        let not_in_set = || {
            ValidationError::new(
                name,
                Constraint::NotInSet {
                    allowed: T::WIRE_VALUES,
                },
            )
        };
        let raw = self.required(name)?.as_str().ok_or_else(not_in_set)?;
        T::from_wire(raw.trim()).ok_or_else(not_in_set)
    }

    /// Read a list of non-blank strings, trimmed, keeping input order.
    pub fn text_list(&self, name: &str, min_items: usize) -> Result<Vec<String>, ValidationError> {
        let items = self.list(name)?;
        let mut out = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            let field = format!("{name}[{idx}]");
            let raw = item.as_str().ok_or_else(|| {
                ValidationError::new(field.clone(), Constraint::WrongType { expected: "a string" })
            })?;
            out.push(check_text(&field, raw, 1)?);
        }
        if out.len() < min_items {
            return Err(ValidationError::new(
                name,
                Constraint::TooFewItems { min: min_items },
            ));
        }
        Ok(out)
    }

    /// Read a strict `YYYY-MM-DD` calendar date.
    pub fn date(&self, name: &str) -> Result<NaiveDate, ValidationError> {
        let value = self.required(name)?;
        check_date(name, value)
    }

    /// Read a list of `YYYY-MM-DD` dates. An absent field reads as empty.
    pub fn date_list(&self, name: &str) -> Result<Vec<NaiveDate>, ValidationError> {
        if self.value(name).is_none() {
            return Ok(Vec::new());
        }
        self.list(name)?
            .iter()
            .enumerate()
            .map(|(idx, item)| check_date(&format!("{name}[{idx}]"), item))
            .collect()
    }

    fn list(&self, name: &str) -> Result<&'a Vec<Value>, ValidationError> {
        self.required(name)?
            .as_array()
            .ok_or_else(|| ValidationError::new(name, Constraint::WrongType { expected: "a list" }))
    }
}

fn check_text(name: &str, raw: &str, min_chars: usize) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < min_chars {
        return Err(ValidationError::new(
            name,
            Constraint::TooShort { min: min_chars },
        ));
    }
    Ok(trimmed.to_string())
}

fn check_integer(name: &str, value: &Value, min: i64, max: i64) -> Result<i64, ValidationError> {
    let number = match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| {
                // Whole floats such as `7.0` still count as integers.
                number
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                    .map(|f| f as i64)
            }),
        _ => None,
    };
    let number = number.ok_or_else(|| {
        ValidationError::new(name, Constraint::WrongType { expected: "a whole number" })
    })?;
    if !(min..=max).contains(&number) {
        return Err(ValidationError::new(name, Constraint::OutOfRange { min, max }));
    }
    Ok(number)
}

fn check_date(name: &str, value: &Value) -> Result<NaiveDate, ValidationError> {
    let bad_date = || ValidationError::new(name, Constraint::BadDate);
    let raw = value.as_str().map(str::trim).ok_or_else(bad_date)?;
    if !date_pattern().is_match(raw) {
        return Err(bad_date());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| bad_date())
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"))
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;
