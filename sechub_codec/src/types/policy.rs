//! Configuration policy and control association wire types

use super::enums::AssociationStatus;
use super::parameter::ParameterConfiguration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Custom parameters applied to one security control, unique by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ControlParameterSet {
    pub security_control_id: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterConfiguration>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityControlsConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_security_control_identifiers: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_security_control_identifiers: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_control_custom_parameters: Vec<ControlParameterSet>,
}

impl SecurityControlsConfiguration {
    pub fn has_enabled(&self) -> bool {
        self.enabled_security_control_identifiers
            .as_ref()
            .is_some_and(|ids| !ids.is_empty())
    }

    pub fn has_disabled(&self) -> bool {
        self.disabled_security_control_identifiers
            .as_ref()
            .is_some_and(|ids| !ids.is_empty())
    }
}

/// Security Hub member of a configuration policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigurationPolicy {
    pub service_enabled: bool,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub enabled_standard_identifiers: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_controls_configuration: Option<SecurityControlsConfiguration>,
}

/// Enablement of one control within one standard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ControlAssociation {
    pub security_control_id: String,
    pub standards_arn: String,
    pub association_status: AssociationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_policy_wire_names() {
        let policy = ConfigurationPolicy {
            service_enabled: true,
            enabled_standard_identifiers: BTreeSet::from(["arn:std".to_string()]),
            security_controls_configuration: Some(SecurityControlsConfiguration {
                disabled_security_control_identifiers: Some(BTreeSet::new()),
                ..Default::default()
            }),
        };

        assert_eq!(
            serde_json::to_value(&policy).unwrap(),
            json!({
                "ServiceEnabled": true,
                "EnabledStandardIdentifiers": ["arn:std"],
                "SecurityControlsConfiguration": {
                    "DisabledSecurityControlIdentifiers": []
                }
            })
        );
    }

    #[test]
    fn test_populated_means_non_empty() {
        let config = SecurityControlsConfiguration {
            enabled_security_control_identifiers: Some(BTreeSet::new()),
            disabled_security_control_identifiers: Some(BTreeSet::from(["IAM.1".to_string()])),
            ..Default::default()
        };
        assert!(!config.has_enabled());
        assert!(config.has_disabled());
    }
}
