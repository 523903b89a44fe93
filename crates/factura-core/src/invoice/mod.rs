//! Invoice field extraction module.

mod context;
mod parser;
pub mod rules;

pub use context::{ExtractedFields, ExtractionContext, Field, FieldValue};
pub use parser::{HeuristicInvoiceParser, InvoiceParser, TextAssessment};
