//! EPD Program Registry
//!
//! Program operators that publish Environmental Product Declarations. The
//! registry labels and sanity-checks EPD numbers; it never feeds the carbon
//! arithmetic.
//!
//! ## Example
//!
//! ```rust
//! use carbon_core::catalog::epd::{EpdProgram, identify_epd_number};
//!
//! let programs = vec![
//!     EpdProgram::new("environdec", "The International EPD System", Some("S-P-")),
//!     EpdProgram::new("ul-environment", "UL Environment", Some("UL-EPD-")),
//! ];
//!
//! let program = identify_epd_number(&programs, "S-P-01234").unwrap();
//! assert_eq!(program.program_id, "environdec");
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CarbonError, CarbonResult};

fn default_true() -> bool {
    true
}

/// An EPD program operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpdProgram {
    pub program_id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<String>,

    /// ISO country code of the operator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,

    /// Prefix every registration number issued by this program starts with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epd_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub standards: Vec<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl EpdProgram {
    pub fn new(program_id: impl Into<String>, name: impl Into<String>, epd_prefix: Option<&str>) -> Self {
        EpdProgram {
            program_id: program_id.into(),
            name: name.into(),
            short_name: None,
            website: None,
            registry_url: None,
            regions: Vec::new(),
            headquarters: None,
            epd_prefix: epd_prefix.map(str::to_string),
            standards: Vec::new(),
            is_active: true,
        }
    }

    /// Display label, preferring the short name
    pub fn label(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.name)
    }

    /// Length of this program's prefix if `epd_number` carries it
    fn prefix_match_len(&self, epd_number: &str) -> Option<usize> {
        let prefix = self.epd_prefix.as_deref()?;
        if prefix.is_empty() || epd_number.len() < prefix.len() {
            return None;
        }
        let head = epd_number.get(..prefix.len())?;
        head.eq_ignore_ascii_case(prefix).then_some(prefix.len())
    }
}

/// Find the program that issued an EPD number.
///
/// The longest matching prefix wins ("UL-EPD-" beats "EPD-"); on equal
/// length the first program in registry order wins. Inactive programs and
/// programs without a prefix never match.
pub fn identify_epd_number<'a>(programs: &'a [EpdProgram], epd_number: &str) -> Option<&'a EpdProgram> {
    let number = epd_number.trim();
    let mut best: Option<(&EpdProgram, usize)> = None;
    for program in programs.iter().filter(|p| p.is_active) {
        if let Some(len) = program.prefix_match_len(number) {
            if best.map_or(true, |(_, best_len)| len > best_len) {
                best = Some((program, len));
            }
        }
    }
    best.map(|(program, _)| program)
}

/// Validate an EPD number against the registry.
///
/// Returns the issuing program, `MissingField` for a blank number, or
/// `NotFound` when no registered prefix matches.
pub fn validate_epd_number<'a>(programs: &'a [EpdProgram], epd_number: &str) -> CarbonResult<&'a EpdProgram> {
    if epd_number.trim().is_empty() {
        return Err(CarbonError::missing_field("epdNumber"));
    }
    identify_epd_number(programs, epd_number)
        .ok_or_else(|| CarbonError::not_found("EPD program", epd_number.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Vec<EpdProgram> {
        vec![
            EpdProgram::new("environdec", "The International EPD System", Some("S-P-")),
            EpdProgram::new("icc-es", "ICC Evaluation Service", Some("EPD-")),
            EpdProgram::new("ul-environment", "UL Environment", Some("UL-EPD-")),
            EpdProgram::new("ibu", "Institut Bauen und Umwelt", Some("EPD-")),
            EpdProgram::new("bre", "BRE Global", None),
        ]
    }

    #[test]
    fn test_identify_by_prefix() {
        let programs = registry();
        assert_eq!(identify_epd_number(&programs, "S-P-01234").unwrap().program_id, "environdec");
        assert_eq!(
            identify_epd_number(&programs, "ul-epd-4455").unwrap().program_id,
            "ul-environment"
        );
    }

    #[test]
    fn test_equal_prefix_takes_registry_order() {
        let programs = registry();
        assert_eq!(identify_epd_number(&programs, "EPD-12345").unwrap().program_id, "icc-es");
    }

    #[test]
    fn test_inactive_programs_skipped() {
        let mut programs = registry();
        programs[0].is_active = false;
        assert!(identify_epd_number(&programs, "S-P-01234").is_none());
    }

    #[test]
    fn test_validate_errors() {
        let programs = registry();
        assert_eq!(
            validate_epd_number(&programs, "  ").unwrap_err().error_code(),
            "MISSING_FIELD"
        );
        assert_eq!(
            validate_epd_number(&programs, "XYZ-1").unwrap_err().error_code(),
            "NOT_FOUND"
        );
        assert!(validate_epd_number(&programs, "EPD-1").is_ok());
    }
}
