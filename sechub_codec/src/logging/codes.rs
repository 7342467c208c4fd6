//! Consolidated codec error codes and classification
//!
//! Single source of truth for every code a codec error can carry, together
//! with its category, severity and a short description for operators.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Stable identifier attached to each classified codec error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// Malformed dynamic input (SHC1xx)
pub mod malformed {
    use super::Code;

    pub const MALFORMED_INPUT: Code = Code::new("SHC100");
    pub const MALFORMED_SCALAR: Code = Code::new("SHC101");
    pub const AMBIGUOUS_UNION: Code = Code::new("SHC102");
    pub const AMBIGUOUS_DATE_FILTER: Code = Code::new("SHC103");
    pub const DUPLICATE_PARAMETER: Code = Code::new("SHC104");
    pub const MISSING_PARAMETER_VALUE: Code = Code::new("SHC105");
    pub const UNEXPECTED_PARAMETER_VALUE: Code = Code::new("SHC106");
    pub const TOO_MANY_FILTERS: Code = Code::new("SHC107");
    pub const UNEXPECTED_TYPE: Code = Code::new("SHC108");
    pub const MISSING_ATTRIBUTE: Code = Code::new("SHC109");
}

/// Configuration policy validation (SHC2xx)
pub mod validation {
    use super::Code;

    pub const SERVICE_DISABLED_WITH_CONTROLS: Code = Code::new("SHC201");
    pub const SERVICE_ENABLED_WITHOUT_CONTROLS: Code = Code::new("SHC202");
    pub const CONFLICTING_CONTROL_SELECTION: Code = Code::new("SHC203");
    pub const DISABLED_WITHOUT_REASON: Code = Code::new("SHC204");
}

/// Typed wire payloads (SHC3xx)
pub mod wire {
    use super::Code;

    pub const WIRE_DECODE_FAILED: Code = Code::new("SHC301");
    pub const UNKNOWN_FIELD: Code = Code::new("SHC302");
    pub const KIND_MISMATCH: Code = Code::new("SHC303");
}

// ============================================================================
// METADATA TABLE
// ============================================================================

static METADATA: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn metadata_table() -> &'static HashMap<&'static str, ErrorMetadata> {
    METADATA.get_or_init(|| {
        let entries = [
            ErrorMetadata::new(
                malformed::MALFORMED_INPUT.as_str(),
                "malformed_input",
                Severity::High,
                "One or more fields of the configuration tree are malformed",
                "Fix every listed field and retry",
            ),
            ErrorMetadata::new(
                malformed::MALFORMED_SCALAR.as_str(),
                "malformed_input",
                Severity::High,
                "A numeric, boolean or timestamp string failed to parse",
                "Use a decimal number or an RFC 3339 timestamp",
            ),
            ErrorMetadata::new(
                malformed::AMBIGUOUS_UNION.as_str(),
                "malformed_input",
                Severity::High,
                "More than one parameter value kind is populated",
                "Keep exactly one value block per parameter",
            ),
            ErrorMetadata::new(
                malformed::AMBIGUOUS_DATE_FILTER.as_str(),
                "malformed_input",
                Severity::Medium,
                "A date filter mixes an absolute and a relative range",
                "Use either start/end or date_range, not both",
            ),
            ErrorMetadata::new(
                malformed::DUPLICATE_PARAMETER.as_str(),
                "malformed_input",
                Severity::Medium,
                "A parameter name appears more than once for one control",
                "Remove the repeated parameter block",
            ),
            ErrorMetadata::new(
                malformed::MISSING_PARAMETER_VALUE.as_str(),
                "malformed_input",
                Severity::High,
                "A CUSTOM parameter carries no value block",
                "Add a value block or switch value_type to DEFAULT",
            ),
            ErrorMetadata::new(
                malformed::UNEXPECTED_PARAMETER_VALUE.as_str(),
                "malformed_input",
                Severity::Medium,
                "A DEFAULT parameter carries a value block",
                "Remove the value block or switch value_type to CUSTOM",
            ),
            ErrorMetadata::new(
                malformed::TOO_MANY_FILTERS.as_str(),
                "malformed_input",
                Severity::Medium,
                "A filter field holds more predicates than allowed",
                "Split the filter or reduce the number of predicates",
            ),
            ErrorMetadata::new(
                malformed::UNEXPECTED_TYPE.as_str(),
                "malformed_input",
                Severity::High,
                "A configuration node has the wrong type",
                "Check the value type expected for this attribute",
            ),
            ErrorMetadata::new(
                malformed::MISSING_ATTRIBUTE.as_str(),
                "malformed_input",
                Severity::High,
                "A required attribute is absent",
                "Add the attribute to the configuration",
            ),
            ErrorMetadata::new(
                validation::SERVICE_DISABLED_WITH_CONTROLS.as_str(),
                "policy_validation",
                Severity::High,
                "security_controls_configuration given while service_enabled is false",
                "Remove security_controls_configuration or enable the service",
            ),
            ErrorMetadata::new(
                validation::SERVICE_ENABLED_WITHOUT_CONTROLS.as_str(),
                "policy_validation",
                Severity::High,
                "security_controls_configuration missing while service_enabled is true",
                "Add a security_controls_configuration block",
            ),
            ErrorMetadata::new(
                validation::CONFLICTING_CONTROL_SELECTION.as_str(),
                "policy_validation",
                Severity::High,
                "Both enabled and disabled control identifiers are populated",
                "Keep only one of the two identifier sets",
            ),
            ErrorMetadata::new(
                validation::DISABLED_WITHOUT_REASON.as_str(),
                "policy_validation",
                Severity::Medium,
                "A control association is DISABLED without an updated reason",
                "Set updated_reason when disabling a control",
            ),
            ErrorMetadata::new(
                wire::WIRE_DECODE_FAILED.as_str(),
                "wire",
                Severity::High,
                "An API payload could not be decoded",
                "Check the payload against the API model",
            ),
            ErrorMetadata::new(
                wire::UNKNOWN_FIELD.as_str(),
                "wire",
                Severity::Low,
                "A filter field is not part of the vocabulary",
                "Use a field listed by the field registry",
            ),
            ErrorMetadata::new(
                wire::KIND_MISMATCH.as_str(),
                "wire",
                Severity::Medium,
                "Filter predicates do not match the field's criteria kind",
                "Use the predicate kind listed by the field registry",
            ),
        ];

        entries
            .into_iter()
            .map(|metadata| (metadata.code, metadata))
            .collect()
    })
}

/// Look up the metadata for a code
pub fn get_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    metadata_table().get(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_code_constant_has_metadata() {
        let codes = [
            malformed::MALFORMED_INPUT,
            malformed::MALFORMED_SCALAR,
            malformed::AMBIGUOUS_UNION,
            malformed::AMBIGUOUS_DATE_FILTER,
            malformed::DUPLICATE_PARAMETER,
            malformed::MISSING_PARAMETER_VALUE,
            malformed::UNEXPECTED_PARAMETER_VALUE,
            malformed::TOO_MANY_FILTERS,
            malformed::UNEXPECTED_TYPE,
            malformed::MISSING_ATTRIBUTE,
            validation::SERVICE_DISABLED_WITH_CONTROLS,
            validation::SERVICE_ENABLED_WITHOUT_CONTROLS,
            validation::CONFLICTING_CONTROL_SELECTION,
            validation::DISABLED_WITHOUT_REASON,
            wire::WIRE_DECODE_FAILED,
            wire::UNKNOWN_FIELD,
            wire::KIND_MISMATCH,
        ];

        for code in codes {
            let metadata = get_metadata(code.as_str());
            assert!(metadata.is_some(), "missing metadata for {}", code);
            assert_eq!(metadata.map(|m| m.code), Some(code.as_str()));
        }
        assert_eq!(metadata_table().len(), codes.len());
    }

    #[test]
    fn test_unknown_code_lookup() {
        assert!(get_metadata("SHC999").is_none());
        let metadata = get_metadata(malformed::AMBIGUOUS_UNION.as_str()).unwrap();
        assert_eq!(metadata.severity, Severity::High);
        assert_eq!(metadata.category, "malformed_input");
    }
}
