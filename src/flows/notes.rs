//! Structured-notes generation.
use super::Flow;
use crate::prompt;
use crate::schema::{Choice, FieldMap, FieldReader, Language, Shape, ValidationError};
use crate::templates;
use serde::{Deserialize, Serialize};

const TOPIC_MIN_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesRequest {
    pub topic: String,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesResponse {
    /// Markdown notes, possibly with LaTeX.
    pub notes: String,
}

pub struct NotesFlow;

impl Flow for NotesFlow {
    const NAME: &'static str = "generate_notes";
    const FAILURE_NOTICE: &'static str = "Failed to generate notes. Please try again.";

    type Request = NotesRequest;
    type Response = NotesResponse;

    fn validate(fields: &FieldMap) -> Result<NotesRequest, ValidationError> {
        let reader = FieldReader::new(fields);
        Ok(NotesRequest {
            topic: reader.text("topic", TOPIC_MIN_CHARS)?,
            language: reader.choice("language")?,
        })
    }

    fn sections(request: &NotesRequest) -> Vec<String> {
        let language = request.language.as_wire();
        let mut sections = vec![
            prompt::fill(
                templates::NOTES_MD,
                &[("topic", request.topic.as_str()), ("language", language)],
            ),
            templates::NOTES_CONTENTS_MD.to_string(),
        ];
        if request.language.uses_bengali_script() {
            sections.push(prompt::fill(
                templates::BENGALI_SCRIPT_MD,
                &[("language", language)],
            ));
        }
        sections
    }

    fn output_schema() -> Shape {
        Shape::object(vec![(
            "notes",
            Shape::text("The generated structured notes."),
        )])
    }
}
