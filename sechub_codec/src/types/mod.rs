//! Typed wire model
//!
//! Everything here serializes with the API's JSON member names.

pub mod criteria;
pub mod enums;
pub mod filter_set;
pub mod parameter;
pub mod policy;
pub mod resource;

pub use criteria::{
    CriteriaKind, DateFilter, DateFilterShape, DateRange, FilterValues, IpFilter, KeywordFilter,
    MapFilter, NumberFilter, StringFilter,
};
pub use enums::{
    AssociationStatus, AutomationRulesActionType, DateRangeUnit, MapFilterComparison,
    ParameterValueType, RuleStatus, SeverityLabel, StringFilterComparison, VerificationState,
    WorkflowStatus,
};
pub use filter_set::FilterSet;
pub use parameter::{CustomParameter, ParameterConfiguration, ParameterKind, ParameterValue};
pub use policy::{
    ConfigurationPolicy, ControlAssociation, ControlParameterSet, SecurityControlsConfiguration,
};
pub use resource::{
    AutomationRule, AutomationRulesAction, FindingFieldsUpdate, Insight, NoteUpdate,
    RelatedFinding, SeverityUpdate, WorkflowUpdate,
};
