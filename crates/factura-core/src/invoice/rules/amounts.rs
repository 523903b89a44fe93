//! Amount normalization and extraction for Argentine invoices.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::trace;

use super::patterns::{TOTAL_PLAIN, TOTAL_WITH_CURRENCY, VAT_ADJACENT};
use super::proximity::LabelMatcher;
use crate::invoice::Field;

/// Resolve a list of candidate strings into one amount.
///
/// Candidates are tried from last to first, since later matches in a document
/// tend to be the more specific ones (a grand total after subtotals). The first
/// candidate that parses wins; candidates that do not parse are skipped.
pub fn normalize_amount<S: AsRef<str>>(candidates: &[S]) -> Option<Decimal> {
    candidates
        .iter()
        .rev()
        .find_map(|candidate| parse_amount(candidate.as_ref()))
}

/// Parse one amount whose decimal mark may be `,` or `.`.
///
/// - Both present: the later one is the decimal mark.
/// - Only `,`: several mean thousands grouping; a single one followed by
///   exactly three characters is also grouping (`12,345`); otherwise decimal.
/// - Only `.`: several mean thousands grouping, as does a single one followed
///   by exactly three characters (`1.234`); otherwise decimal.
pub fn parse_amount(candidate: &str) -> Option<Decimal> {
    let raw: String = candidate.trim().chars().filter(|c| *c != ' ').collect();
    if !raw.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = match (raw.rfind(','), raw.rfind('.')) {
        (Some(comma), Some(dot)) => {
            if comma > dot {
                raw.replace('.', "").replace(',', ".")
            } else {
                raw.replace(',', "")
            }
        }
        (Some(comma), None) => {
            if raw.matches(',').count() > 1 {
                raw.replace(',', "")
            } else if raw[comma + 1..].chars().count() == 3 {
                raw.replace(',', "")
            } else {
                raw.replace(',', ".")
            }
        }
        (None, Some(dot)) => {
            if raw.matches('.').count() > 1 || (dot > 0 && raw[dot + 1..].chars().count() == 3) {
                raw.replace('.', "")
            } else {
                raw
            }
        }
        (None, None) => raw,
    };

    decimal_from(&normalized)
}

fn decimal_from(s: &str) -> Option<Decimal> {
    let s = s.strip_suffix('.').unwrap_or(s);
    if s.is_empty()
        || s.matches('.').count() > 1
        || !s.chars().all(|c| c.is_ascii_digit() || c == '.')
    {
        return None;
    }

    let parsed = if s.starts_with('.') {
        Decimal::from_str(&format!("0{}", s))
    } else {
        Decimal::from_str(s)
    };

    parsed.ok()
}

/// Runs with no separators and more than 9 digits are barcodes or IDs.
fn is_identifier_noise(run: &str) -> bool {
    !run.contains(['.', ',']) && run.chars().filter(|c| c.is_ascii_digit()).count() > 9
}

/// Extract the invoice grand total.
///
/// A `$`-tagged value after a total label is the strongest signal. Without
/// one, every total label followed by a run of at least four digits or
/// separators is a candidate, and the last viable one wins.
pub fn extract_total(text: &str) -> Option<Decimal> {
    let mut candidates: Vec<&str> = TOTAL_WITH_CURRENCY
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .into_iter()
        .collect();

    if candidates.is_empty() {
        candidates = TOTAL_PLAIN
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|run| !is_identifier_noise(run))
            .collect();
    }

    trace!("Total candidates: {:?}", candidates);
    normalize_amount(&candidates)
}

/// Extract an amount with the label-proximity matcher for a field.
pub fn extract_labeled_amount(field: Field, text: &str) -> Option<Decimal> {
    LabelMatcher::for_field(field)
        .and_then(|matcher| matcher.find(text))
        .and_then(parse_amount)
}

/// Extract the VAT amount.
///
/// The strict label requires a qualifier ("Insc.", "Responsable Inscripto",
/// "21%") so unrelated mentions of IVA are not picked up. When it finds
/// nothing, "IVA" directly followed by an amount (not a percentage) is used.
pub fn extract_vat(text: &str) -> Option<Decimal> {
    extract_labeled_amount(Field::Vat, text).or_else(|| {
        VAT_ADJACENT
            .captures_iter(text)
            .filter(|caps| caps.get(2).is_none_or(|pct| pct.as_str().is_empty()))
            .find_map(|caps| caps.get(1).and_then(|m| parse_amount(m.as_str())))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_normalize_locale_variants() {
        assert_eq!(normalize_amount(&["6.657.200,00"]), Some(dec("6657200.00")));
        assert_eq!(normalize_amount(&["1,234.56"]), Some(dec("1234.56")));
        assert_eq!(normalize_amount(&["1.234"]), Some(dec("1234")));
        assert_eq!(normalize_amount(&["12,345"]), Some(dec("12345")));
        assert_eq!(normalize_amount(&["1.234.567"]), Some(dec("1234567")));
        assert_eq!(normalize_amount(&["1,234,567"]), Some(dec("1234567")));
        assert_eq!(normalize_amount(&["210,5"]), Some(dec("210.5")));
        assert_eq!(normalize_amount(&["4500"]), Some(dec("4500")));
        assert_eq!(normalize_amount(&["12.50"]), Some(dec("12.50")));
    }

    #[test]
    fn test_normalize_skips_non_numeric() {
        assert_eq!(normalize_amount(&["abc"]), None);
        assert_eq!(normalize_amount(&["..."]), None);
        assert_eq!(normalize_amount::<&str>(&[]), None);
    }

    #[test]
    fn test_normalize_prefers_last_candidate() {
        assert_eq!(normalize_amount(&["100", "200,50"]), Some(dec("200.50")));
        // An unparseable last candidate falls back to the previous one.
        assert_eq!(normalize_amount(&["100", "1.2,3.4"]), Some(dec("100")));
    }

    #[test]
    fn test_parse_amount_strips_inner_spaces() {
        assert_eq!(parse_amount(" 1 234,56 "), Some(dec("1234.56")));
        assert_eq!(parse_amount("100."), Some(dec("100")));
    }

    #[test]
    fn test_total_prefers_currency_tag() {
        let text = "Subtotal 1.000,00\nTotal $ 1.210,00\nTotal bultos 3";
        assert_eq!(extract_total(text), Some(dec("1210.00")));
    }

    #[test]
    fn test_total_plain_uses_last_candidate() {
        let text = "Total Neto 1.000,00\nTOTAL 1.210,00";
        assert_eq!(extract_total(text), Some(dec("1210.00")));
    }

    #[test]
    fn test_total_ignores_barcode_runs() {
        let text = "Importe Total 5.400,00\nTotal 30712345671234567";
        assert_eq!(extract_total(text), Some(dec("5400.00")));
    }

    #[test]
    fn test_total_absent() {
        assert_eq!(extract_total("Sin importes en este texto"), None);
    }

    #[test]
    fn test_vat_strict_label() {
        let text = "IVA Resp. 5\nIVA 21% 210,00";
        assert_eq!(extract_vat(text), Some(dec("210.00")));
    }

    #[test]
    fn test_vat_adjacent_fallback() {
        assert_eq!(extract_vat("IVA 210,00"), Some(dec("210.00")));
        assert_eq!(extract_vat("I.V.A.: $ 42,10"), Some(dec("42.10")));
    }

    #[test]
    fn test_vat_ignores_unrelated_mentions() {
        assert_eq!(extract_vat("Condición frente al IVA: Consumidor Final"), None);
        assert_eq!(extract_vat("IVA 10,5%"), None);
    }
}
