//! Rendering flow results for the terminal.
//!
//! Text output is plain markdown; `--json` prints the typed response with its
//! wire field names.
use crate::flows::mock_test::MockTestResponse;
use crate::flows::notes::NotesResponse;
use crate::flows::planner::StudyPlan;
use crate::flows::tutor::TutorReply;
use anyhow::{Context, Result};
use serde::Serialize;

/// Human-readable form of a flow result.
pub trait TextReport {
    fn to_text(&self) -> String;
}

impl TextReport for NotesResponse {
    fn to_text(&self) -> String {
        self.notes.trim_end().to_string()
    }
}

impl TextReport for MockTestResponse {
    fn to_text(&self) -> String {
        [
            ("Question Paper", &self.question_paper),
            ("Answer Key", &self.answer_key),
            ("Detailed Solutions", &self.detailed_solutions),
        ]
        .iter()
        .map(|(title, body)| format!("# {title}\n\n{}", body.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
    }
}

impl TextReport for TutorReply {
    fn to_text(&self) -> String {
        self.response.trim_end().to_string()
    }
}

impl TextReport for StudyPlan {
    fn to_text(&self) -> String {
        let mut out = String::new();
        for (idx, day) in self.timetable.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            out.push_str(&day.date);
            out.push('\n');
            if day.activities.is_empty() {
                out.push_str("  (rest)\n");
            }
            for activity in &day.activities {
                out.push_str("  - ");
                out.push_str(activity);
                out.push('\n');
            }
        }
        out.trim_end().to_string()
    }
}

/// Format a result as pretty JSON or text.
pub fn format<T: Serialize + TextReport>(value: &T, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(value).context("serialize result")
    } else {
        Ok(value.to_text())
    }
}

pub fn emit<T: Serialize + TextReport>(value: &T, json: bool) -> Result<()> {
    println!("{}", format(value, json)?);
    Ok(())
}
