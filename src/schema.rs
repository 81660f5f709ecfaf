//! Declared shapes for flow requests and model replies.
//!
//! Requests arrive as flat field maps and are read through [`FieldReader`],
//! which stops at the first violated constraint. Replies are checked against
//! a [`Shape`] before they are deserialized into a typed response.
mod choices;
mod input;
mod output;

pub use choices::{Choice, Difficulty, Language};
pub use input::{Constraint, FieldMap, FieldReader, ValidationError};
pub use output::{SchemaMismatch, Shape};
