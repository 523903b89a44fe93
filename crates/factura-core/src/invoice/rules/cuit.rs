//! CUIT (Argentine tax identifier) extraction and issuer/recipient assignment.

use tracing::trace;

use super::patterns::TAX_ID;
use super::{ExtractionMatch, FieldExtractor};
use crate::models::tax_id::TaxId;

/// CUIT field extractor.
///
/// Yields every distinct tax ID in first-seen order. With validation on,
/// IDs failing the check digit are dropped.
pub struct CuitExtractor {
    validate: bool,
}

impl CuitExtractor {
    pub fn new() -> Self {
        Self { validate: false }
    }

    /// Set whether to validate CUIT check digits.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

impl Default for CuitExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CuitExtractor {
    type Output = ExtractionMatch<TaxId>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for caps in TAX_ID.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            let Some(tax_id) = TaxId::parse(m.as_str()) else {
                continue;
            };

            if results.iter().any(|r| r.value == tax_id) {
                continue;
            }

            if !self.validate || tax_id.has_valid_check_digit() {
                results.push(ExtractionMatch::new(tax_id, m.as_str()));
            }
        }

        results
    }
}

/// All distinct tax IDs in the text, in first-seen order.
pub fn extract_tax_ids(text: &str, validate: bool) -> Vec<TaxId> {
    CuitExtractor::new()
        .with_validation(validate)
        .extract_all(text)
        .into_iter()
        .map(|m| {
            trace!("Tax ID {} read from {:?}", m.value, m.source);
            m.value
        })
        .collect()
}

/// Assign the issuer and recipient IDs by position.
///
/// The first ID is the issuer's and the second the recipient's, following the
/// usual header layout. Documents that print the recipient first get swapped
/// parties; nothing here can detect that.
pub fn assign_tax_ids(ids: &[TaxId]) -> (Option<TaxId>, Option<TaxId>) {
    (ids.first().copied(), ids.get(1).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_issuer_and_recipient() {
        let text = "CUIT 20-12345678-9 ... 27-87654321-0";
        let ids = extract_tax_ids(text, false);
        let (issuer, recipient) = assign_tax_ids(&ids);

        assert_eq!(issuer.map(|id| id.to_string()), Some("20-12345678-9".to_string()));
        assert_eq!(recipient.map(|id| id.to_string()), Some("27-87654321-0".to_string()));
    }

    #[test]
    fn test_single_id_is_issuer_only() {
        let ids = extract_tax_ids("C.U.I.T.: 30-71234567-1", false);
        let (issuer, recipient) = assign_tax_ids(&ids);

        assert_eq!(issuer.map(|id| id.to_string()), Some("30-71234567-1".to_string()));
        assert_eq!(recipient, None);
    }

    #[test]
    fn test_separator_variants_are_normalized_and_deduplicated() {
        let text = "CUIT 20123456786\nCUIT: 20 12345678 6\nCliente 27-87654321-0";
        let ids = extract_tax_ids(text, false);
        let rendered: Vec<String> = ids.iter().map(|id| id.to_string()).collect();

        assert_eq!(rendered, vec!["20-12345678-6", "27-87654321-0"]);
    }

    #[test]
    fn test_longer_digit_runs_are_not_tax_ids() {
        assert!(extract_tax_ids("CAE 74123456789012", false).is_empty());
    }

    #[test]
    fn test_validation_drops_bad_check_digits() {
        let text = "20-12345678-9 20-12345678-6";
        let ids = extract_tax_ids(text, true);
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].to_string(), "20-12345678-6");
    }

    #[test]
    fn test_extractor_keeps_matched_source() {
        let found = CuitExtractor::new().extract("CUIT: 20 12345678 6").unwrap();
        assert_eq!(found.value.to_string(), "20-12345678-6");
        assert_eq!(found.source, "20 12345678 6");
    }
}
