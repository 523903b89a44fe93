//! Invoice class (A, B, C) detection.

use super::patterns::{CLASS_A, CLASS_B, CLASS_BOX, CLASS_C};
use crate::models::record::InvoiceClass;

/// Classify the invoice.
///
/// AFIP voucher codes and "FACTURA X" headings are checked for C, then A,
/// then B. Without either, a line holding only the class letter (the printed
/// class box) decides.
pub fn extract_invoice_class(text: &str) -> Option<InvoiceClass> {
    if CLASS_C.is_match(text) {
        return Some(InvoiceClass::C);
    }
    if CLASS_A.is_match(text) {
        return Some(InvoiceClass::A);
    }
    if CLASS_B.is_match(text) {
        return Some(InvoiceClass::B);
    }

    CLASS_BOX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| InvoiceClass::from_letter(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_voucher_codes() {
        assert_eq!(extract_invoice_class("COD. 011"), Some(InvoiceClass::C));
        assert_eq!(extract_invoice_class("COD.001"), Some(InvoiceClass::A));
        assert_eq!(extract_invoice_class("COD. 006"), Some(InvoiceClass::B));
    }

    #[test]
    fn test_heading() {
        assert_eq!(extract_invoice_class("FACTURA A\nAcme"), Some(InvoiceClass::A));
        assert_eq!(extract_invoice_class("Factura B"), Some(InvoiceClass::B));
    }

    #[test]
    fn test_c_takes_precedence() {
        let text = "FACTURA A\nCOD. 011";
        assert_eq!(extract_invoice_class(text), Some(InvoiceClass::C));
    }

    #[test]
    fn test_heading_needs_standalone_letter() {
        assert_eq!(extract_invoice_class("FACTURA ANULADA"), None);
    }

    #[test]
    fn test_class_box_fallback() {
        let text = "ORIGINAL\r\n  B  \r\nAcme SRL";
        assert_eq!(extract_invoice_class(text), Some(InvoiceClass::B));
    }

    #[test]
    fn test_no_class() {
        assert_eq!(extract_invoice_class("Remito interno\nAcme"), None);
    }
}
