//! Label synonyms per field.
//!
//! Every label-driven extractor builds its regex from this table, so adding a
//! synonym is a one-line change here.

use crate::invoice::Field;

/// A field's label synonyms as a regex alternation (no capture groups).
#[derive(Debug, Clone, Copy)]
pub struct FieldLabel {
    /// Field the label introduces.
    pub field: Field,
    /// Case-insensitive alternation of synonyms.
    pub pattern: &'static str,
    /// A `$` between label and value marks the strongest candidate.
    pub currency_boost: bool,
}

pub const LABELS: &[FieldLabel] = &[
    FieldLabel {
        field: Field::Total,
        pattern: r"(?:Importe\s+)?Total(?:es)?",
        currency_boost: true,
    },
    FieldLabel {
        field: Field::Subtotal,
        pattern: r"Sub[- ]?Total|Subtotal",
        currency_boost: false,
    },
    FieldLabel {
        field: Field::NetTaxed,
        pattern: r"Neto\s+Gravado|Neto",
        currency_boost: false,
    },
    FieldLabel {
        field: Field::OtherTaxes,
        pattern: r"Ingresos\s+Brutos|Impuestos|Percepciones",
        currency_boost: false,
    },
    FieldLabel {
        field: Field::Vat,
        pattern: r"I\.?V\.?A\.?\s*(?:Insc\.?|Responsable Inscripto|21%)",
        currency_boost: false,
    },
    FieldLabel {
        field: Field::IssueDate,
        pattern: r"Fecha\s+de\s+Emisi[óo]n|Fecha",
        currency_boost: false,
    },
    FieldLabel {
        field: Field::RecipientName,
        pattern: r"Señor\s*\(es\)|Apellido y Nombre|Razón Social|Cliente|Sr\.",
        currency_boost: false,
    },
];

/// Look up the label entry for a field.
pub fn label_for(field: Field) -> Option<&'static FieldLabel> {
    LABELS.iter().find(|label| label.field == field)
}

/// Label pattern for a field that is known to have one.
pub(crate) fn pattern_for(field: Field) -> &'static str {
    label_for(field).map(|label| label.pattern).unwrap_or("$^")
}
