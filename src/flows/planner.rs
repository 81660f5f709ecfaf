//! Study-plan generation: a day-wise timetable.
use super::Flow;
use crate::prompt;
use crate::schema::{Constraint, FieldMap, FieldReader, Shape, ValidationError};
use crate::templates;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const MIN_REVISION_INTERVAL: i64 = 1;
const MAX_REVISION_INTERVAL: i64 = 14;
const MAX_PROGRESS: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyPlanRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub subjects: Vec<String>,
    pub revision_days_interval: u32,
    pub mock_test_days: Vec<NaiveDate>,
    pub missed_days: Option<u32>,
    /// Percent complete, `0..=100`.
    pub progress: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableDay {
    pub date: String,
    pub activities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPlan {
    pub timetable: Vec<TimetableDay>,
}

pub struct PlannerFlow;

impl Flow for PlannerFlow {
    const NAME: &'static str = "generate_study_plan";
    const FAILURE_NOTICE: &'static str = "Failed to generate study plan. Please try again.";

    type Request = StudyPlanRequest;
    type Response = StudyPlan;

    fn validate(fields: &FieldMap) -> Result<StudyPlanRequest, ValidationError> {
        let reader = FieldReader::new(fields);
        let start_date = reader.date("startDate")?;
        let end_date = reader.date("endDate")?;
        if end_date < start_date {
            return Err(ValidationError::new(
                "endDate",
                Constraint::Custom("must not be before startDate".to_string()),
            ));
        }
        let subjects = reader.text_list("subjects", 1)?;
        let revision_days_interval =
            reader.integer("revisionDaysInterval", MIN_REVISION_INTERVAL, MAX_REVISION_INTERVAL)?;
        let mock_test_days = reader.date_list("mockTestDays")?;
        let missed_days = reader.optional_integer("missedDays", 0, i64::from(u32::MAX))?;
        let progress = reader.optional_integer("progress", 0, MAX_PROGRESS)?;

        // Every narrowing below is bounded by the range just checked.
        Ok(StudyPlanRequest {
            start_date,
            end_date,
            subjects,
            revision_days_interval: revision_days_interval as u32,
            mock_test_days,
            missed_days: missed_days.map(|n| n as u32),
            progress: progress.map(|n| n as u8),
        })
    }

    fn sections(request: &StudyPlanRequest) -> Vec<String> {
        let mut details = vec![
            format!("Start Date: {}", request.start_date),
            format!("End Date: {}", request.end_date),
            format!("Subjects: {}", prompt::join_list(&request.subjects)),
            format!(
                "Revision Days Interval: {} days",
                request.revision_days_interval
            ),
        ];
        if !request.mock_test_days.is_empty() {
            details.push(format!(
                "Mock Test Days: {}",
                prompt::join_list(&request.mock_test_days)
            ));
        }
        if let Some(missed) = request.missed_days {
            details.push(format!("Missed Days: {missed}"));
        }
        if let Some(progress) = request.progress {
            details.push(format!("Progress: {progress}%"));
        }

        vec![
            templates::STUDY_PLANNER_MD.to_string(),
            details.join("\n"),
            "Generate a day-wise study timetable from the start date to the end date."
                .to_string(),
        ]
    }

    fn output_schema() -> Shape {
        let day = Shape::object(vec![
            ("date", Shape::text("The date, in YYYY-MM-DD form.")),
            (
                "activities",
                Shape::list(
                    Shape::text("One study, revision, or mock test activity."),
                    0,
                    "The activities planned for the day.",
                ),
            ),
        ]);
        Shape::object(vec![(
            "timetable",
            Shape::list(day, 1, "The day-wise study timetable."),
        )])
    }
}
