//! Human readable validation messages
//!
//! Validation errors render as verbose diagnostics. The short fragment a
//! form shows next to a field is picked out of that text by a list of
//! patterns; anything that does not match is replaced by a fixed message.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use shapeform_schema::ValidationError;

pub const FALLBACK_MESSAGE: &str = "Invalid value (the validation message is too technical to show)";

/// Longest fragment shown as is
const MAX_MESSAGE_LEN: usize = 120;

static HEURISTICS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"^Missing required key '[^']*'", "This field is required"),
        (
            r"^Predicate refinement failure: expected (?P<m>.+?), actual ",
            "Expected $m",
        ),
        (
            r"^Union member mismatch: expected (?P<m>.+?), actual ",
            "Expected one of $m",
        ),
        (
            r"^Tuple length mismatch: expected (?P<m>\d+) element",
            "Expected $m item(s)",
        ),
        (r"^Expected (?P<m>.+?), actual ", "Expected $m"),
    ]
    .into_iter()
    .filter_map(|(pattern, template)| Regex::new(pattern).ok().map(|re| (re, template)))
    .collect()
});

/// Short message for one diagnostic text, or [`FALLBACK_MESSAGE`].
pub fn humanize_message(text: &str) -> String {
    for (re, template) in HEURISTICS.iter() {
        if let Some(captures) = re.captures(text) {
            let mut message = String::new();
            captures.expand(template, &mut message);
            if message.chars().count() <= MAX_MESSAGE_LEN {
                return message;
            }
            break;
        }
    }
    FALLBACK_MESSAGE.to_string()
}

/// Map each failing path (dot form, `""` for the root) to a message.
/// The first error reported for a path wins.
pub fn validation_error_map(errors: &[ValidationError]) -> IndexMap<String, String> {
    let mut map = IndexMap::new();
    for error in errors {
        map.entry(error.field_path().to_dot_path())
            .or_insert_with(|| humanize_message(&error.to_string()));
    }
    map
}
