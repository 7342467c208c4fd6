//! Expand/flatten codecs
//!
//! Expand reads a dynamic configuration tree into the typed wire model
//! before a mutating call. Flatten writes a typed value read from the API
//! back into the dynamic tree. Flatten is infallible; expand returns the
//! complete value or one [`CodecError`](crate::error::CodecError).

pub mod context;
pub mod criteria;
pub mod filter_set;
pub mod parameter;
pub mod policy;
pub mod resource;

pub use context::ExpandContext;
pub use criteria::{expand_criteria, flatten_criteria};
pub use filter_set::{expand_filter_set, flatten_filter_set};
pub use parameter::{
    expand_custom_parameter, expand_parameter_value, flatten_custom_parameter,
    flatten_parameter_value,
};
pub use policy::{
    expand_configuration_policy, expand_control_association, expand_control_parameter_set,
    flatten_configuration_policy, flatten_control_association, flatten_control_parameter_set,
    validate_configuration_policy, validate_control_association,
};
pub use resource::{expand_automation_rule, expand_insight, flatten_automation_rule, flatten_insight};
