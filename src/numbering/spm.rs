//! The composite SPM number.
//!
//! Field order and separators are a wire contract with downstream print and
//! report consumers: a pipe after the document-type code, slashes between the
//! remaining segments, the calendar year always last.
//!
//! `LS|A1/1.02.01/M/0007/01/2025`

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;

use crate::document::DocumentType;

// Pattern is a compile-time constant
#[allow(clippy::unwrap_used)]
static SPM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Z]{2})\|([A-Za-z0-9.\-]+)/([A-Za-z0-9.\-]+)/([A-Za-z0-9.\-]+)/(\d{4,})/(\d{2})/(\d{4})$")
        .unwrap()
});

/// Error type for SPM number parsing
#[derive(Error, Debug, Clone)]
#[error("'{input}' is not a well-formed SPM number")]
pub struct SpmParseError {
    pub input: String,
}

/// A parsed or freshly composed SPM number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpmNumber {
    pub document_type: DocumentType,
    pub schedule_code: String,
    pub unit_code: String,
    pub region_code: String,
    pub sequence: u32,
    pub month: u32,
    pub year: i32,
}

impl SpmNumber {
    /// Parse a formatted SPM number back into its fields.
    pub fn parse(input: &str) -> Result<Self, SpmParseError> {
        let caps = SPM_RE.captures(input).ok_or_else(|| SpmParseError {
            input: input.to_string(),
        })?;

        let document_type = match caps.get(1).map(|m| m.as_str()) {
            Some("UP") => DocumentType::Up,
            Some("GU") => DocumentType::Gu,
            Some("TU") => DocumentType::Tu,
            Some("LS") => DocumentType::Ls,
            _ => {
                return Err(SpmParseError {
                    input: input.to_string(),
                })
            }
        };

        let field = |idx: usize| caps.get(idx).map_or("", |m| m.as_str());
        let numeric = |idx: usize| {
            field(idx).parse().map_err(|_| SpmParseError {
                input: input.to_string(),
            })
        };

        Ok(SpmNumber {
            document_type,
            schedule_code: field(2).to_string(),
            unit_code: field(3).to_string(),
            region_code: field(4).to_string(),
            sequence: numeric(5)?,
            month: numeric(6)?,
            year: field(7).parse().map_err(|_| SpmParseError {
                input: input.to_string(),
            })?,
        })
    }
}

impl fmt::Display for SpmNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}/{}/{}/{:04}/{:02}/{:04}",
            self.document_type.code(),
            self.schedule_code,
            self.unit_code,
            self.region_code,
            self.sequence,
            self.month,
            self.year
        )
    }
}

/// Calendar year encoded in a formatted SPM number (its final segment).
///
/// Cheap accessor used by the duplicate guard and the store's uniqueness
/// constraint; tolerates malformed input by returning `None`.
#[must_use]
pub fn year_suffix(spm_number: &str) -> Option<i32> {
    spm_number.rsplit('/').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_format() {
        let spm = SpmNumber {
            document_type: DocumentType::Ls,
            schedule_code: "A1".to_string(),
            unit_code: "1.02.01".to_string(),
            region_code: "M".to_string(),
            sequence: 7,
            month: 1,
            year: 2025,
        };
        assert_eq!(spm.to_string(), "LS|A1/1.02.01/M/0007/01/2025");
    }

    #[test]
    fn test_parse_round_trip() {
        let formatted = "TU|B2/3.01.14/K/0120/11/2024";
        let parsed = SpmNumber::parse(formatted).unwrap();
        assert_eq!(parsed.document_type, DocumentType::Tu);
        assert_eq!(parsed.schedule_code, "B2");
        assert_eq!(parsed.unit_code, "3.01.14");
        assert_eq!(parsed.region_code, "K");
        assert_eq!(parsed.sequence, 120);
        assert_eq!(parsed.month, 11);
        assert_eq!(parsed.year, 2024);
        assert_eq!(parsed.to_string(), formatted);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(SpmNumber::parse("LS/A1/1.02.01/M/0007/01/2025").is_err());
        assert!(SpmNumber::parse("XX|A1/1.02.01/M/0007/01/2025").is_err());
        assert!(SpmNumber::parse("LS|A1/1.02.01/M/7/01/2025").is_err());
        assert!(SpmNumber::parse("").is_err());
    }

    #[test]
    fn test_year_suffix() {
        assert_eq!(year_suffix("LS|A1/1.02.01/M/0007/01/2025"), Some(2025));
        assert_eq!(year_suffix("garbage"), None);
    }

    #[test]
    fn test_sequence_wider_than_pad() {
        let spm = SpmNumber {
            document_type: DocumentType::Up,
            schedule_code: "A1".to_string(),
            unit_code: "1.02.01".to_string(),
            region_code: "M".to_string(),
            sequence: 12345,
            month: 6,
            year: 2025,
        };
        let formatted = spm.to_string();
        assert_eq!(formatted, "UP|A1/1.02.01/M/12345/06/2025");
        assert_eq!(SpmNumber::parse(&formatted).unwrap().sequence, 12345);
    }
}
