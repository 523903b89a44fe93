//! Rule-based field extractors for Argentine invoices.

pub mod amounts;
pub mod class;
pub mod cuit;
pub mod dates;
pub mod labels;
pub mod parties;
pub mod patterns;
pub mod proximity;

pub use amounts::{extract_total, extract_vat, normalize_amount, parse_amount};
pub use class::extract_invoice_class;
pub use cuit::{CuitExtractor, assign_tax_ids, extract_tax_ids};
pub use dates::extract_issue_date;
pub use labels::{FieldLabel, LABELS, label_for};
pub use parties::{extract_issuer_name, extract_recipient};
pub use proximity::{LabelMatcher, find_after_label};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value found in the text, with where it came from.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            source: source.into(),
        }
    }
}
