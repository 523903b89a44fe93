//! Per-call extraction state.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::record::InvoiceClass;
use crate::models::tax_id::TaxId;

/// Invoice fields the extraction pipeline can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Total,
    Subtotal,
    NetTaxed,
    OtherTaxes,
    Vat,
    IssueDate,
    RecipientName,
    IssuerTaxId,
    RecipientTaxId,
    IssuerName,
    InvoiceClass,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Total => "total",
            Field::Subtotal => "subtotal",
            Field::NetTaxed => "net_taxed",
            Field::OtherTaxes => "other_taxes",
            Field::Vat => "vat",
            Field::IssueDate => "issue_date",
            Field::RecipientName => "recipient_name",
            Field::IssuerTaxId => "issuer_tax_id",
            Field::RecipientTaxId => "recipient_tax_id",
            Field::IssuerName => "issuer_name",
            Field::InvoiceClass => "invoice_class",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed value found for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Amount(Decimal),
    Text(String),
    Class(InvoiceClass),
    TaxId(TaxId),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Amount(v) => write!(f, "{}", v),
            FieldValue::Text(v) => f.write_str(v),
            FieldValue::Class(v) => write!(f, "{}", v),
            FieldValue::TaxId(v) => write!(f, "{}", v),
        }
    }
}

/// Resolved text plus the fields found in it so far.
///
/// A field is written at most once: later steps cannot overwrite a value an
/// earlier step produced.
#[derive(Debug, Clone)]
pub struct ExtractionContext<'a> {
    text: &'a str,
    values: BTreeMap<Field, FieldValue>,
}

impl<'a> ExtractionContext<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            values: BTreeMap::new(),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn is_set(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    /// Store a value unless the field already has one. Returns whether it was stored.
    pub fn set(&mut self, field: Field, value: FieldValue) -> bool {
        if self.is_set(field) {
            return false;
        }
        self.values.insert(field, value);
        true
    }

    /// Number of populated fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Convert into the typed field set.
    pub fn into_fields(self) -> ExtractedFields {
        let mut fields = ExtractedFields::default();

        for (field, value) in self.values {
            match (field, value) {
                (Field::Total, FieldValue::Amount(v)) => fields.total = Some(v),
                (Field::Subtotal, FieldValue::Amount(v)) => fields.subtotal = Some(v),
                (Field::NetTaxed, FieldValue::Amount(v)) => fields.net_taxed = Some(v),
                (Field::OtherTaxes, FieldValue::Amount(v)) => fields.other_taxes = Some(v),
                (Field::Vat, FieldValue::Amount(v)) => fields.vat = Some(v),
                (Field::IssueDate, FieldValue::Text(v)) => fields.issue_date = Some(v),
                (Field::RecipientName, FieldValue::Text(v)) => fields.recipient_name = Some(v),
                (Field::IssuerName, FieldValue::Text(v)) => fields.issuer_name = Some(v),
                (Field::IssuerTaxId, FieldValue::TaxId(v)) => fields.issuer_tax_id = Some(v),
                (Field::RecipientTaxId, FieldValue::TaxId(v)) => fields.recipient_tax_id = Some(v),
                (Field::InvoiceClass, FieldValue::Class(v)) => fields.invoice_class = Some(v),
                (field, value) => {
                    tracing::warn!("Dropping mistyped value {:?} for {}", value, field);
                }
            }
        }

        fields
    }
}

/// Fields extracted from one document's text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedFields {
    pub total: Option<Decimal>,
    pub vat: Option<Decimal>,
    pub subtotal: Option<Decimal>,
    pub net_taxed: Option<Decimal>,
    pub other_taxes: Option<Decimal>,
    pub issue_date: Option<String>,
    pub invoice_class: Option<InvoiceClass>,
    pub issuer_name: Option<String>,
    pub recipient_name: Option<String>,
    pub issuer_tax_id: Option<TaxId>,
    pub recipient_tax_id: Option<TaxId>,
}

impl ExtractedFields {
    /// True when nothing was found.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
