//! Heuristic invoice parser: a fixed, ordered pipeline of field extractors.

use std::time::Instant;

use tracing::{debug, info};

use crate::models::config::ExtractionConfig;

use super::context::{ExtractedFields, ExtractionContext, Field, FieldValue};
use super::rules::{
    amounts::{extract_labeled_amount, extract_total, extract_vat},
    assign_tax_ids, extract_invoice_class, extract_issue_date, extract_issuer_name,
    extract_recipient, extract_tax_ids,
};

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse invoice fields from resolved text.
    fn parse(&self, text: &str) -> ExtractedFields;
}

/// How usable a piece of resolved text is for extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAssessment {
    /// Nothing was resolved.
    Absent,
    /// Some text, but not more than the minimum length.
    Short,
    /// Long enough to run extraction.
    Acceptable,
}

type StepFn = fn(&HeuristicInvoiceParser, &str) -> Vec<(Field, FieldValue)>;

/// One pipeline step: the fields it fills and how it finds them.
struct Step {
    name: &'static str,
    targets: &'static [Field],
    run: StepFn,
}

/// Extraction order. Earlier steps win: a step is skipped once all of its
/// target fields hold a value.
const PIPELINE: &[Step] = &[
    Step {
        name: "total",
        targets: &[Field::Total],
        run: |_, text| amount(Field::Total, extract_total(text)),
    },
    Step {
        name: "subtotal",
        targets: &[Field::Subtotal],
        run: |_, text| amount(Field::Subtotal, extract_labeled_amount(Field::Subtotal, text)),
    },
    Step {
        name: "net_taxed",
        targets: &[Field::NetTaxed],
        run: |_, text| amount(Field::NetTaxed, extract_labeled_amount(Field::NetTaxed, text)),
    },
    Step {
        name: "other_taxes",
        targets: &[Field::OtherTaxes],
        run: |_, text| {
            amount(
                Field::OtherTaxes,
                extract_labeled_amount(Field::OtherTaxes, text),
            )
        },
    },
    Step {
        name: "vat",
        targets: &[Field::Vat],
        run: |_, text| amount(Field::Vat, extract_vat(text)),
    },
    Step {
        name: "issue_date",
        targets: &[Field::IssueDate],
        run: |_, text| {
            extract_issue_date(text)
                .map(|date| vec![(Field::IssueDate, FieldValue::Text(date))])
                .unwrap_or_default()
        },
    },
    Step {
        name: "recipient",
        targets: &[Field::RecipientName],
        run: |_, text| {
            extract_recipient(text)
                .map(|name| vec![(Field::RecipientName, FieldValue::Text(name))])
                .unwrap_or_default()
        },
    },
    Step {
        name: "tax_ids",
        targets: &[Field::IssuerTaxId, Field::RecipientTaxId],
        run: |parser, text| {
            let ids = extract_tax_ids(text, parser.validate_tax_ids);
            let (issuer, recipient) = assign_tax_ids(&ids);
            let mut found = Vec::new();
            if let Some(id) = issuer {
                found.push((Field::IssuerTaxId, FieldValue::TaxId(id)));
            }
            if let Some(id) = recipient {
                found.push((Field::RecipientTaxId, FieldValue::TaxId(id)));
            }
            found
        },
    },
    Step {
        name: "issuer_name",
        targets: &[Field::IssuerName],
        run: |parser, text| {
            extract_issuer_name(text, parser.issuer_scan_lines)
                .map(|name| vec![(Field::IssuerName, FieldValue::Text(name))])
                .unwrap_or_default()
        },
    },
    Step {
        name: "invoice_class",
        targets: &[Field::InvoiceClass],
        run: |_, text| {
            extract_invoice_class(text)
                .map(|class| vec![(Field::InvoiceClass, FieldValue::Class(class))])
                .unwrap_or_default()
        },
    },
];

fn amount(field: Field, value: Option<rust_decimal::Decimal>) -> Vec<(Field, FieldValue)> {
    value
        .map(|v| vec![(field, FieldValue::Amount(v))])
        .unwrap_or_default()
}

/// Label-proximity invoice parser for Argentine invoices.
#[derive(Debug, Clone)]
pub struct HeuristicInvoiceParser {
    /// Resolved text must be longer than this to be parsed.
    min_text_length: usize,
    /// Non-blank header lines scanned for the issuer name.
    issuer_scan_lines: usize,
    /// Whether to drop CUITs with a bad check digit.
    validate_tax_ids: bool,
}

impl HeuristicInvoiceParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            min_text_length: config.min_text_length,
            issuer_scan_lines: config.issuer_scan_lines,
            validate_tax_ids: config.validate_tax_ids,
        }
    }

    /// Set the minimum text length.
    pub fn with_min_text_length(mut self, length: usize) -> Self {
        self.min_text_length = length;
        self
    }

    /// Set how many header lines the issuer name search looks at.
    pub fn with_issuer_scan_lines(mut self, lines: usize) -> Self {
        self.issuer_scan_lines = lines;
        self
    }

    /// Set CUIT check digit validation.
    pub fn with_tax_id_validation(mut self, validate: bool) -> Self {
        self.validate_tax_ids = validate;
        self
    }

    /// Classify resolved text by usability.
    ///
    /// Length is counted on the raw text, surrounding whitespace included, so
    /// a page that resolved to padding alone can still be accepted and simply
    /// yield no fields.
    pub fn assess(&self, text: &str) -> TextAssessment {
        let length = text.chars().count();
        if length == 0 {
            TextAssessment::Absent
        } else if length <= self.min_text_length {
            TextAssessment::Short
        } else {
            TextAssessment::Acceptable
        }
    }

    /// True when the text is long enough to run extraction.
    pub fn accepts(&self, text: &str) -> bool {
        self.assess(text) == TextAssessment::Acceptable
    }

    /// Run the pipeline and return the populated context.
    ///
    /// Text the parser does not accept yields an empty context.
    pub fn parse_with_context<'a>(&self, text: &'a str) -> ExtractionContext<'a> {
        let mut ctx = ExtractionContext::new(text);

        match self.assess(text) {
            TextAssessment::Acceptable => {}
            assessment => {
                debug!("Skipping extraction: text is {:?}", assessment);
                return ctx;
            }
        }

        for step in PIPELINE {
            if step.targets.iter().all(|field| ctx.is_set(*field)) {
                debug!("Step {} skipped, fields already set", step.name);
                continue;
            }

            let found = (step.run)(self, ctx.text());
            if found.is_empty() {
                debug!("Step {} found nothing", step.name);
            }

            for (field, value) in found {
                debug!("{} = {}", field, value);
                ctx.set(field, value);
            }
        }

        ctx
    }
}

impl Default for HeuristicInvoiceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for HeuristicInvoiceParser {
    fn parse(&self, text: &str) -> ExtractedFields {
        let start = Instant::now();
        info!("Parsing invoice from {} characters of text", text.len());

        let ctx = self.parse_with_context(text);
        let populated = ctx.len();
        let fields = ctx.into_fields();

        debug!(
            "Extracted {} fields in {} ms",
            populated,
            start.elapsed().as_millis()
        );

        fields
    }
}
