//! Prompt assembly.
//!
//! Every flow renders its prompt as an ordered list of sections; a section is
//! either a static template with `{name}` placeholders filled in, or a line
//! built from request fields. Conditional sections are simply left out of the
//! list. Rendering cannot fail once a request has been validated.
use regex::{Captures, Regex};
use std::fmt::Display;
use std::sync::OnceLock;

/// Delimiter between items of a list-valued field.
pub const LIST_DELIMITER: &str = ", ";

/// Substitute `{name}` placeholders in a static template.
///
/// Only the template is scanned, so substituted values are never expanded
/// again. Unknown placeholders are left as written.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    placeholder_pattern()
        .replace_all(template, |caps: &Captures<'_>| {
            vars.iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| (*value).to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("valid placeholder pattern"))
}

/// Join list items in input order.
pub fn join_list<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(LIST_DELIMITER)
}

/// Concatenate sections, dropping blank ones, separated by an empty line.
pub fn assemble<I>(sections: I) -> String
where
    I: IntoIterator<Item = String>,
{
    sections
        .into_iter()
        .map(|section| section.trim().to_string())
        .filter(|section| !section.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
