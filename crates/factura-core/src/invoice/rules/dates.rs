//! Issue date extraction.

use super::patterns::ISSUE_DATE;

/// Extract the issue date as `DD/MM/YYYY`.
///
/// Only the first labeled date is considered. Hyphenated dates are rewritten
/// with slashes; the value is not checked against the calendar.
pub fn extract_issue_date(text: &str) -> Option<String> {
    ISSUE_DATE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace('-', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_fecha_label() {
        assert_eq!(
            extract_issue_date("Fecha: 01/02/2024"),
            Some("01/02/2024".to_string())
        );
    }

    #[test]
    fn test_emission_label_with_hyphens() {
        let text = "Fecha de Emisión: 15-03-2024\nCAE 1234";
        assert_eq!(extract_issue_date(text), Some("15/03/2024".to_string()));
    }

    #[test]
    fn test_value_on_next_line() {
        let text = "FECHA DE EMISION\n  28/12/2023";
        assert_eq!(extract_issue_date(text), Some("28/12/2023".to_string()));
    }

    #[test]
    fn test_first_match_only() {
        let text = "Fecha 01/01/2024\nFecha de Vto. 31/01/2024";
        assert_eq!(extract_issue_date(text), Some("01/01/2024".to_string()));
    }

    #[test]
    fn test_unlabeled_date_is_ignored() {
        assert_eq!(extract_issue_date("Vencimiento 01/02/2024"), None);
    }
}
