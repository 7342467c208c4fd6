//! Request bodies that embed filter sets

use super::enums::{
    AutomationRulesActionType, RuleStatus, SeverityLabel, VerificationState, WorkflowStatus,
};
use super::filter_set::FilterSet;
use crate::error::CodecError;
use crate::registry::Vocabulary;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// INSIGHT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Insight {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight_arn: Option<String>,
    pub name: String,
    pub group_by_attribute: String,
    pub filters: FilterSet,
}

impl Insight {
    /// Read an `Insight` object from an API response
    pub fn from_wire(wire: &Value) -> Result<Self, CodecError> {
        let envelope: InsightEnvelope = serde_json::from_value(wire.clone())?;
        Ok(Self {
            insight_arn: envelope.insight_arn,
            name: envelope.name,
            group_by_attribute: envelope.group_by_attribute,
            filters: FilterSet::from_wire(Vocabulary::Insight, &envelope.filters)?,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InsightEnvelope {
    #[serde(default)]
    insight_arn: Option<String>,
    name: String,
    group_by_attribute: String,
    #[serde(default)]
    filters: Value,
}

// ============================================================================
// AUTOMATION RULE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutomationRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_arn: Option<String>,
    pub rule_name: String,
    pub rule_order: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_status: Option<RuleStatus>,
    pub description: String,
    pub is_terminal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<FilterSet>,
    pub actions: Vec<AutomationRulesAction>,
}

impl AutomationRule {
    /// Read an automation rule from an API response
    pub fn from_wire(wire: &Value) -> Result<Self, CodecError> {
        let envelope: AutomationRuleEnvelope = serde_json::from_value(wire.clone())?;
        let criteria = match &envelope.criteria {
            Value::Null => None,
            value => Some(FilterSet::from_wire(Vocabulary::AutomationRule, value)?),
        };
        Ok(Self {
            rule_arn: envelope.rule_arn,
            rule_name: envelope.rule_name,
            rule_order: envelope.rule_order,
            rule_status: envelope.rule_status,
            description: envelope.description,
            is_terminal: envelope.is_terminal,
            criteria,
            actions: envelope.actions,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AutomationRuleEnvelope {
    #[serde(default)]
    rule_arn: Option<String>,
    rule_name: String,
    rule_order: i32,
    #[serde(default)]
    rule_status: Option<RuleStatus>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    is_terminal: bool,
    #[serde(default)]
    criteria: Value,
    #[serde(default)]
    actions: Vec<AutomationRulesAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutomationRulesAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<AutomationRulesActionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finding_fields_update: Option<FindingFieldsUpdate>,
}

/// Finding attributes an automation rule rewrites
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FindingFieldsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criticality: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<NoteUpdate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_findings: Vec<RelatedFinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<SeverityUpdate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub user_defined_fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_state: Option<VerificationState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<WorkflowUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NoteUpdate {
    pub text: String,
    pub updated_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RelatedFinding {
    pub id: String,
    pub product_arn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SeverityUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<SeverityLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkflowUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkflowStatus>,
}
