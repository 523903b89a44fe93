//! The per-document invoice record.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::invoice::ExtractedFields;
use crate::models::tax_id::TaxId;

/// Argentine fiscal invoice class printed on the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceClass {
    /// Between registered VAT taxpayers.
    A,
    /// From a registered taxpayer to a final consumer or exempt party.
    B,
    /// Issued by monotributo (simplified regime) taxpayers.
    C,
}

impl InvoiceClass {
    /// Parse a single class letter.
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.trim() {
            "A" => Some(InvoiceClass::A),
            "B" => Some(InvoiceClass::B),
            "C" => Some(InvoiceClass::C),
            _ => None,
        }
    }
}

impl fmt::Display for InvoiceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            InvoiceClass::A => "A",
            InvoiceClass::B => "B",
            InvoiceClass::C => "C",
        };
        f.write_str(letter)
    }
}

/// Structured data extracted from one invoice document.
///
/// Created empty by discovery, then filled in place exactly once by
/// [`crate::process_record`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Absolute path of the source document.
    pub path: PathBuf,

    /// Display name (final path segment).
    pub name: String,

    /// When the record was created.
    pub processed_at: DateTime<Local>,

    /// Text resolved from the document, once resolution ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,

    /// Grand total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,

    /// VAT (IVA) amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat: Option<Decimal>,

    /// Subtotal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,

    /// Net taxed amount (neto gravado).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_taxed: Option<Decimal>,

    /// Other taxes and perceptions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_taxes: Option<Decimal>,

    /// Issue date as `DD/MM/YYYY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,

    /// Invoice class (A, B or C).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_class: Option<InvoiceClass>,

    /// Issuer business name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_name: Option<String>,

    /// Recipient (client) name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,

    /// Issuer CUIT.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_tax_id: Option<TaxId>,

    /// Recipient CUIT.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_tax_id: Option<TaxId>,

    /// True once enough text was resolved to run extraction.
    pub is_valid: bool,
}

impl InvoiceRecord {
    /// Create an empty record for a document.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, RecordError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(RecordError::MissingPath);
        }

        let name = display_name(&path);

        Ok(Self {
            path,
            name,
            processed_at: Local::now(),
            raw_text: None,
            total: None,
            vat: None,
            subtotal: None,
            net_taxed: None,
            other_taxes: None,
            issue_date: None,
            invoice_class: None,
            issuer_name: None,
            recipient_name: None,
            issuer_tax_id: None,
            recipient_tax_id: None,
            is_valid: false,
        })
    }

    /// Copy extracted fields into the record and mark it valid.
    pub fn apply(&mut self, fields: ExtractedFields) {
        self.total = fields.total;
        self.vat = fields.vat;
        self.subtotal = fields.subtotal;
        self.net_taxed = fields.net_taxed;
        self.other_taxes = fields.other_taxes;
        self.issue_date = fields.issue_date;
        self.invoice_class = fields.invoice_class;
        self.issuer_name = fields.issuer_name;
        self.recipient_name = fields.recipient_name;
        self.issuer_tax_id = fields.issuer_tax_id;
        self.recipient_tax_id = fields.recipient_tax_id;
        self.is_valid = true;
    }

    /// Mark the record invalid and clear every derived field.
    pub fn mark_invalid(&mut self) {
        self.apply(ExtractedFields::default());
        self.is_valid = false;
    }

    /// True when no derived field has been set.
    pub fn has_no_fields(&self) -> bool {
        self.total.is_none()
            && self.vat.is_none()
            && self.subtotal.is_none()
            && self.net_taxed.is_none()
            && self.other_taxes.is_none()
            && self.issue_date.is_none()
            && self.invoice_class.is_none()
            && self.issuer_name.is_none()
            && self.recipient_name.is_none()
            && self.issuer_tax_id.is_none()
            && self.recipient_tax_id.is_none()
    }

    /// Human-readable summary used by operators.
    pub fn summary(&self) -> String {
        fn show<T: fmt::Display>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string())
        }

        let mut output = String::new();
        output.push_str(&format!("Document: {}\n", self.name));
        if !self.is_valid {
            output.push_str("Status:   not enough text to extract fields\n");
            return output;
        }

        output.push_str(&format!("Type:     {}\n", show(&self.invoice_class)));
        output.push_str(&format!("Date:     {}\n", show(&self.issue_date)));
        output.push_str(&format!("Total:    {}\n", show(&self.total)));
        if self.subtotal.is_some() {
            output.push_str(&format!("  Subtotal:     {}\n", show(&self.subtotal)));
        }
        if self.net_taxed.is_some() {
            output.push_str(&format!("  Net taxed:    {}\n", show(&self.net_taxed)));
        }
        if self.vat.is_some() {
            output.push_str(&format!("  VAT:          {}\n", show(&self.vat)));
        }
        if self.other_taxes.is_some() {
            output.push_str(&format!("  Other taxes:  {}\n", show(&self.other_taxes)));
        }
        output.push_str(&format!(
            "Issuer:   {} (CUIT {})\n",
            show(&self.issuer_name),
            show(&self.issuer_tax_id)
        ));
        output.push_str(&format!(
            "Client:   {} (CUIT {})\n",
            show(&self.recipient_name),
            show(&self.recipient_tax_id)
        ));

        output
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_new_derives_name_from_final_segment() {
        let record = InvoiceRecord::new("/data/facturas/0001-A.pdf").unwrap();
        assert_eq!(record.name, "0001-A.pdf");
        assert!(!record.is_valid);
        assert!(record.raw_text.is_none());
        assert!(record.has_no_fields());
    }

    #[test]
    fn test_new_rejects_empty_path() {
        assert_eq!(InvoiceRecord::new("").unwrap_err(), RecordError::MissingPath);
    }

    #[test]
    fn test_apply_then_invalidate_clears_fields() {
        let mut record = InvoiceRecord::new("scan.png").unwrap();
        let fields = ExtractedFields {
            total: Some(Decimal::from_str("1210.00").unwrap()),
            invoice_class: Some(InvoiceClass::B),
            ..ExtractedFields::default()
        };

        record.apply(fields);
        assert!(record.is_valid);
        assert_eq!(record.invoice_class, Some(InvoiceClass::B));

        record.mark_invalid();
        assert!(!record.is_valid);
        assert!(record.has_no_fields());
    }

    #[test]
    fn test_summary_of_invalid_record() {
        let record = InvoiceRecord::new("empty.pdf").unwrap();
        assert!(record.summary().contains("not enough text"));
    }

    #[test]
    fn test_class_from_letter() {
        assert_eq!(InvoiceClass::from_letter(" C "), Some(InvoiceClass::C));
        assert_eq!(InvoiceClass::from_letter("M"), None);
        assert_eq!(InvoiceClass::A.to_string(), "A");
    }
}
