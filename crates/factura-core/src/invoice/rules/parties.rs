//! Issuer and recipient name extraction.

use super::patterns::{LEADING_CODE, RECIPIENT, RECIPIENT_STOP};

/// Header keywords that never start an issuer name line.
const HEADER_KEYWORDS: &[&str] = &[
    "ORIGINAL",
    "DUPLICADO",
    "FACTURA",
    "FECHA",
    "CUIT",
    "IIBB",
    "PAGINA",
    "HOJA",
    "DOCUMENTO",
    "N°",
    "NRO",
    "NUMERO",
    "COD",
    "LUGAR",
    "SUCURSAL",
];

/// Extract the recipient (client) name.
///
/// Takes what follows the first recipient label on its line, cut at the
/// first neighbouring field keyword, without a leading `(NN)` code.
pub fn extract_recipient(text: &str) -> Option<String> {
    let caps = RECIPIENT.captures(text)?;
    let rest = caps.name("name")?.as_str();

    let cut = RECIPIENT_STOP
        .find(rest)
        .map(|m| &rest[..m.start()])
        .unwrap_or(rest);

    let name = LEADING_CODE.replace(cut.trim(), "");
    let name = name.trim().trim_end_matches([',', ';', '-']).trim();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Guess the issuer name from the document header.
///
/// The first of the leading `max_lines` non-blank lines that is at least
/// three characters long, does not start with a digit and carries no header
/// keyword.
pub fn extract_issuer_name(text: &str, max_lines: usize) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(max_lines)
        .find(|line| is_issuer_candidate(line))
        .map(str::to_string)
}

fn is_issuer_candidate(line: &str) -> bool {
    if line.chars().count() < 3 {
        return false;
    }
    if line.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return false;
    }

    let upper = line.to_uppercase();
    !HEADER_KEYWORDS.iter().any(|kw| upper.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_recipient_after_cliente() {
        assert_eq!(
            extract_recipient("Cliente: Juan Pérez"),
            Some("Juan Pérez".to_string())
        );
    }

    #[test]
    fn test_recipient_truncated_at_stop_keyword() {
        let text = "Señor(es): Distribuidora Norte SA Domicilio: Av. Siempreviva 742";
        assert_eq!(
            extract_recipient(text),
            Some("Distribuidora Norte SA".to_string())
        );

        let text = "Razón Social: Lopez Hnos C.U.I.T: 30-11111111-1";
        assert_eq!(extract_recipient(text), Some("Lopez Hnos".to_string()));
    }

    #[test]
    fn test_recipient_strips_leading_code() {
        let text = "Apellido y Nombre (41) GOMEZ MARIA\nCondición IVA: Consumidor Final";
        assert_eq!(extract_recipient(text), Some("GOMEZ MARIA".to_string()));
    }

    #[test]
    fn test_recipient_on_next_line() {
        let text = "Cliente:\nMaria Lopez\nDomicilio: Calle 1";
        assert_eq!(extract_recipient(text), Some("Maria Lopez".to_string()));
    }

    #[test]
    fn test_recipient_empty_after_truncation() {
        assert_eq!(extract_recipient("Cliente: Fecha 01/01/2024"), None);
        assert_eq!(extract_recipient("Sin datos del receptor"), None);
    }

    #[test]
    fn test_issuer_skips_header_lines() {
        let text = "ORIGINAL\nFACTURA A\n0001\nN° 0003-00001234\nAcme SRL\nCalle Falsa 123";
        assert_eq!(extract_issuer_name(text, 25), Some("Acme SRL".to_string()));
    }

    #[test]
    fn test_issuer_skips_short_lines() {
        let text = "A\n\n  \nxy\nLa Serenisima SA";
        assert_eq!(
            extract_issuer_name(text, 25),
            Some("La Serenisima SA".to_string())
        );
    }

    #[test]
    fn test_issuer_line_limit() {
        let text = "FACTURA\nCOD. 01\nAcme SRL";
        assert_eq!(extract_issuer_name(text, 2), None);
        assert_eq!(extract_issuer_name(text, 3), Some("Acme SRL".to_string()));
    }
}
