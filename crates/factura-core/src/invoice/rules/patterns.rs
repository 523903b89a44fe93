//! Common regex patterns for Argentine invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

use super::labels::pattern_for;
use crate::invoice::Field;

lazy_static! {
    // Totals: "$"-tagged value after a total label, else long numeric runs
    pub static ref TOTAL_WITH_CURRENCY: Regex = Regex::new(&format!(
        r"(?is)(?:{}).*?\$ ?([0-9][0-9.,]*)",
        pattern_for(Field::Total)
    )).unwrap();

    pub static ref TOTAL_PLAIN: Regex = Regex::new(&format!(
        r"(?is)(?:{}).*?([0-9.,]{{4,}})",
        pattern_for(Field::Total)
    )).unwrap();

    // VAT written right before its amount, e.g. "IVA 210,00"
    pub static ref VAT_ADJACENT: Regex = Regex::new(
        r"(?i)\bI\.?V\.?A\.?[\s:$]*([0-9][0-9.,]*)(%?)"
    ).unwrap();

    // Issue date, allowing the value on the next line
    pub static ref ISSUE_DATE: Regex = Regex::new(&format!(
        r"(?i)(?:{})\s*:?\s*\n?\s*([0-9]{{2}}[/-][0-9]{{2}}[/-][0-9]{{4}})",
        pattern_for(Field::IssueDate)
    )).unwrap();

    // Recipient: label, then the rest of the line
    pub static ref RECIPIENT: Regex = Regex::new(&format!(
        r"(?i)(?:{})[\s.:]*\n?\s*(?P<name>.+)",
        pattern_for(Field::RecipientName)
    )).unwrap();

    pub static ref RECIPIENT_STOP: Regex = Regex::new(
        r"(?i)Fecha|Domicilio|Condici|C\.U\.I\.T"
    ).unwrap();

    pub static ref LEADING_CODE: Regex = Regex::new(
        r"^\([0-9]+\)\s*"
    ).unwrap();

    // CUIT: NN-NNNNNNNN-N with optional hyphens or spaces
    pub static ref TAX_ID: Regex = Regex::new(
        r"\b([0-9]{2}[- ]?[0-9]{8}[- ]?[0-9])\b"
    ).unwrap();

    // Invoice class by AFIP voucher code or heading
    pub static ref CLASS_C: Regex = Regex::new(
        r"COD\.\s*011|(?i:\bFACTURA\s+C\b)"
    ).unwrap();

    pub static ref CLASS_A: Regex = Regex::new(
        r"COD\.\s*001|(?i:\bFACTURA\s+A\b)"
    ).unwrap();

    pub static ref CLASS_B: Regex = Regex::new(
        r"COD\.\s*006|(?i:\bFACTURA\s+B\b)"
    ).unwrap();

    pub static ref CLASS_BOX: Regex = Regex::new(
        r"(?m)^[ \t]*([ABC])[ \t\r]*$"
    ).unwrap();
}
