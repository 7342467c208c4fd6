//! # Security Hub Codec
//!
//! Bidirectional codecs between a user-authored configuration tree and the
//! typed Security Hub wire model: finding filter predicates for insights and
//! automation rules, and custom control parameters of configuration policies.

pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod registry;
pub mod tree;
pub mod types;

// Convenience re-exports
pub use codec::*;
pub use config::{CodecMode, CodecOptions, ConfigError};
pub use error::{CodecError, FieldIssue, IssueKind, MalformedInput, PolicyViolation};
pub use registry::{FieldRegistry, FieldSpec, NumberEncoding, Vocabulary};

pub mod prelude {
    pub use crate::codec::{
        expand_automation_rule, expand_configuration_policy, expand_control_association,
        expand_criteria, expand_filter_set, expand_insight, expand_parameter_value,
        flatten_automation_rule, flatten_configuration_policy, flatten_control_association,
        flatten_criteria, flatten_filter_set, flatten_insight, flatten_parameter_value,
    };

    pub use crate::config::{CodecMode, CodecOptions};
    pub use crate::error::{CodecError, IssueKind, PolicyViolation};
    pub use crate::registry::Vocabulary;

    pub use crate::types::{
        AutomationRule, ConfigurationPolicy, ControlAssociation, ControlParameterSet,
        CriteriaKind, DateFilter, FilterSet, FilterValues, Insight, NumberFilter,
        ParameterConfiguration, ParameterValue, StringFilter,
    };
}
