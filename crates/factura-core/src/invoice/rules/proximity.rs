//! Label-proximity matching: a label, then the nearest numeric run after it.
//!
//! The search is case-insensitive and lets `.` cross newlines, because OCR and
//! layout extraction often split a label and its value across lines. The span
//! between label and value is lazy but unbounded: when the real value is
//! missing, the match can land on an unrelated number further down the page.
//! That false positive is a known limit of the heuristic.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

use super::labels::LABELS;
use crate::invoice::Field;

lazy_static! {
    static ref FIELD_MATCHERS: HashMap<Field, LabelMatcher> = LABELS
        .iter()
        .filter_map(|label| {
            LabelMatcher::new(label.pattern)
                .ok()
                .map(|matcher| (label.field, matcher))
        })
        .collect();
}

/// Finds the first digit/separator run following a label.
#[derive(Debug, Clone)]
pub struct LabelMatcher {
    regex: Regex,
}

impl LabelMatcher {
    /// Compile a matcher for a label alternation.
    pub fn new(label_pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!(r"(?is)(?:{}).*?([0-9.,]+)", label_pattern))?;
        Ok(Self { regex })
    }

    /// Shared matcher for a field in the label table.
    pub fn for_field(field: Field) -> Option<&'static LabelMatcher> {
        FIELD_MATCHERS.get(&field)
    }

    /// The first value run after the first occurrence of the label.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// One-off label search for patterns outside the label table.
///
/// An invalid label pattern is logged and treated as "not found".
pub fn find_after_label<'t>(label_pattern: &str, text: &'t str) -> Option<&'t str> {
    match LabelMatcher::new(label_pattern) {
        Ok(matcher) => matcher.find(text),
        Err(e) => {
            warn!("Invalid label pattern {:?}: {}", label_pattern, e);
            None
        }
    }
}
