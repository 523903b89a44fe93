//! CUIT (Argentine taxpayer identifier) value type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An 11-digit CUIT, rendered canonically as `NN-NNNNNNNN-N`.
///
/// Separators are not stored, so two identifiers compare equal whenever their
/// digit sequences match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaxId {
    digits: [u8; 11],
}

impl TaxId {
    /// Build a CUIT from text containing exactly 11 ASCII digits.
    ///
    /// Hyphens and spaces are ignored; any other character rejects the input.
    pub fn parse(s: &str) -> Option<Self> {
        let mut digits = [0u8; 11];
        let mut count = 0;

        for c in s.trim().chars() {
            match c {
                '0'..='9' => {
                    if count == 11 {
                        return None;
                    }
                    digits[count] = c as u8 - b'0';
                    count += 1;
                }
                '-' | ' ' => {}
                _ => return None,
            }
        }

        (count == 11).then_some(Self { digits })
    }

    /// The bare digit sequence.
    pub fn digits(&self) -> String {
        self.digits.iter().map(|d| char::from(b'0' + d)).collect()
    }

    /// Verify the modulo-11 check digit.
    ///
    /// Weights: 5, 4, 3, 2, 7, 6, 5, 4, 3, 2
    pub fn has_valid_check_digit(&self) -> bool {
        let weights = [5u32, 4, 3, 2, 7, 6, 5, 4, 3, 2];
        let sum: u32 = self
            .digits
            .iter()
            .take(10)
            .zip(weights.iter())
            .map(|(d, w)| *d as u32 * w)
            .sum();

        let expected = match 11 - (sum % 11) {
            11 => 0,
            10 => return false,
            v => v,
        };

        expected == self.digits[10] as u32
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.digits();
        write!(f, "{}-{}-{}", &d[0..2], &d[2..10], &d[10..11])
    }
}

impl FromStr for TaxId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaxId::parse(s).ok_or_else(|| format!("not a CUIT: {s}"))
    }
}

impl Serialize for TaxId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TaxId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
