//! # Codec Errors
//!
//! Every codec operation returns a complete value or exactly one
//! [`CodecError`]. Malformed input is collected over a whole tree and
//! reported at once through [`MalformedInput`].

use crate::logging::codes::{self, Code, ErrorMetadata};
use crate::registry::Vocabulary;
use crate::tree::TreePath;
use crate::types::CriteriaKind;
use std::fmt;

// ============================================================================
// FIELD ISSUES
// ============================================================================

/// A single problem found while expanding a tree
#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    /// Numeric, boolean or timestamp text that failed to parse
    MalformedScalar { raw: String, expected: &'static str },
    /// More than one parameter value arm populated
    AmbiguousUnion { kinds: Vec<&'static str> },
    /// Date filter carrying both an absolute and a relative range
    AmbiguousDateFilter,
    DuplicateParameter { name: String },
    /// CUSTOM value type with no value arm
    MissingParameterValue,
    /// DEFAULT value type carrying a value arm
    UnexpectedParameterValue { kind: &'static str },
    TooManyFilters { count: usize, max: usize },
    UnexpectedType { expected: &'static str, found: &'static str },
    MissingAttribute { name: &'static str },
}

impl IssueKind {
    pub fn code(&self) -> Code {
        match self {
            Self::MalformedScalar { .. } => codes::malformed::MALFORMED_SCALAR,
            Self::AmbiguousUnion { .. } => codes::malformed::AMBIGUOUS_UNION,
            Self::AmbiguousDateFilter => codes::malformed::AMBIGUOUS_DATE_FILTER,
            Self::DuplicateParameter { .. } => codes::malformed::DUPLICATE_PARAMETER,
            Self::MissingParameterValue => codes::malformed::MISSING_PARAMETER_VALUE,
            Self::UnexpectedParameterValue { .. } => codes::malformed::UNEXPECTED_PARAMETER_VALUE,
            Self::TooManyFilters { .. } => codes::malformed::TOO_MANY_FILTERS,
            Self::UnexpectedType { .. } => codes::malformed::UNEXPECTED_TYPE,
            Self::MissingAttribute { .. } => codes::malformed::MISSING_ATTRIBUTE,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedScalar { raw, expected } => {
                write!(f, "cannot parse '{}' as {}", raw, expected)
            }
            Self::AmbiguousUnion { kinds } => {
                write!(f, "multiple value kinds populated: {}", kinds.join(", "))
            }
            Self::AmbiguousDateFilter => {
                write!(f, "date filter mixes start/end with date_range")
            }
            Self::DuplicateParameter { name } => write!(f, "duplicate parameter '{}'", name),
            Self::MissingParameterValue => write!(f, "CUSTOM value_type requires a value"),
            Self::UnexpectedParameterValue { kind } => {
                write!(f, "DEFAULT value_type must not carry a {} value", kind)
            }
            Self::TooManyFilters { count, max } => {
                write!(f, "{} filters given, at most {} allowed", count, max)
            }
            Self::UnexpectedType { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            Self::MissingAttribute { name } => write!(f, "missing required attribute '{}'", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    pub path: TreePath,
    pub kind: IssueKind,
}

impl FieldIssue {
    pub fn new(path: TreePath, kind: IssueKind) -> Self {
        Self { path, kind }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.code(), self.path, self.kind)
    }
}

/// All issues found in one expand pass
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", render_issues(.issues))]
pub struct MalformedInput {
    pub issues: Vec<FieldIssue>,
}

impl MalformedInput {
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Whether any issue has the given code
    pub fn contains(&self, code: Code) -> bool {
        self.issues.iter().any(|issue| issue.kind.code() == code)
    }
}

fn render_issues(issues: &[FieldIssue]) -> String {
    let mut rendered = format!("{} malformed field(s)", issues.len());
    for issue in issues {
        rendered.push_str(&format!("\n  {}", issue));
    }
    rendered
}

// ============================================================================
// POLICY VIOLATIONS
// ============================================================================

/// Cross-field invariant violations of policy aggregates
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("security_controls_configuration must be omitted when service_enabled is false")]
    ServiceDisabledWithControls,

    #[error("security_controls_configuration is required when service_enabled is true")]
    ServiceEnabledWithoutControls,

    #[error(
        "enabled_control_identifiers ({enabled}) and disabled_control_identifiers ({disabled}) cannot both be set"
    )]
    ConflictingControlSelection { enabled: usize, disabled: usize },

    #[error("updated_reason is required to disable {security_control_id} in {standards_arn}")]
    DisabledWithoutReason {
        security_control_id: String,
        standards_arn: String,
    },
}

impl PolicyViolation {
    pub fn code(&self) -> Code {
        match self {
            Self::ServiceDisabledWithControls => codes::validation::SERVICE_DISABLED_WITH_CONTROLS,
            Self::ServiceEnabledWithoutControls => {
                codes::validation::SERVICE_ENABLED_WITHOUT_CONTROLS
            }
            Self::ConflictingControlSelection { .. } => {
                codes::validation::CONFLICTING_CONTROL_SELECTION
            }
            Self::DisabledWithoutReason { .. } => codes::validation::DISABLED_WITHOUT_REASON,
        }
    }
}

// ============================================================================
// CODEC ERROR
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Validation failed: {0}")]
    Validation(#[from] PolicyViolation),

    #[error("Malformed input: {0}")]
    Malformed(#[from] MalformedInput),

    #[error("Wire decode failed: {0}")]
    Wire(#[from] serde_json::Error),

    #[error("Field '{field}' is not part of the {vocabulary} vocabulary")]
    UnknownField { vocabulary: Vocabulary, field: String },

    #[error("Field '{field}' holds {found} filters, expected {expected}")]
    KindMismatch {
        field: String,
        expected: CriteriaKind,
        found: CriteriaKind,
    },
}

impl CodecError {
    /// Stable code of the error class
    pub fn code(&self) -> Code {
        match self {
            Self::Validation(violation) => violation.code(),
            Self::Malformed(_) => codes::malformed::MALFORMED_INPUT,
            Self::Wire(_) => codes::wire::WIRE_DECODE_FAILED,
            Self::UnknownField { .. } => codes::wire::UNKNOWN_FIELD,
            Self::KindMismatch { .. } => codes::wire::KIND_MISMATCH,
        }
    }

    /// Registered severity and recommended action for [`Self::code`]
    pub fn metadata(&self) -> Option<&'static ErrorMetadata> {
        codes::get_metadata(self.code().as_str())
    }

    /// Issues carried by a malformed-input error, empty otherwise
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            Self::Malformed(input) => &input.issues,
            _ => &[],
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(violation) => format!("Invalid policy: {}", violation),
            Self::Malformed(input) => format!("Invalid configuration: {}", input),
            Self::Wire(e) => format!("Unreadable API payload: {}", e),
            Self::UnknownField { vocabulary, field } => {
                format!("Unknown {} filter field: {}", vocabulary, field)
            }
            Self::KindMismatch {
                field,
                expected,
                found,
            } => format!(
                "Filter field {} expects {} filters but got {}",
                field, expected, found
            ),
        }
    }
}
