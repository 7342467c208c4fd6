//! Configuration policy codec
//!
//! Expands the Security Hub member of a configuration policy, composing the
//! parameter codec per control, and checks the policy's cross-field rules.
//! Structural problems are reported first; a structurally sound policy is
//! then validated, so a call yields at most one classified error.

use super::context::ExpandContext;
use super::parameter::{expand_parameter, flatten_custom_parameter};
use crate::config::CodecOptions;
use crate::error::{CodecError, IssueKind, PolicyViolation};
use crate::tree::{self, TreePath};
use crate::types::{
    AssociationStatus, ConfigurationPolicy, ControlAssociation, ControlParameterSet,
    SecurityControlsConfiguration,
};
use crate::{codec_error, codec_warn};
use serde_json::{Map, Value};
use std::collections::btree_map::Entry;
use std::collections::BTreeSet;

// ============================================================================
// CONFIGURATION POLICY
// ============================================================================

/// Expand and validate a configuration policy
pub fn expand_configuration_policy(
    tree: &Value,
    options: &CodecOptions,
) -> Result<ConfigurationPolicy, CodecError> {
    let mut ctx = ExpandContext::new(options);
    let root = TreePath::root();
    let policy = match tree::block(tree) {
        Some(map) => expand_policy(&mut ctx, map, &root),
        None => {
            ctx.report(
                root,
                IssueKind::UnexpectedType {
                    expected: "object",
                    found: tree::type_name(tree),
                },
            );
            ConfigurationPolicy::default()
        }
    };
    let policy = ctx.finish(policy)?;
    Ok(validate_configuration_policy(policy)?)
}

/// Flatten a configuration policy read back from the API
pub fn flatten_configuration_policy(policy: &ConfigurationPolicy) -> Value {
    let mut map = Map::new();
    map.insert("service_enabled".into(), Value::Bool(policy.service_enabled));
    map.insert(
        "enabled_standard_arns".into(),
        string_array(&policy.enabled_standard_identifiers),
    );
    if let Some(controls) = &policy.security_controls_configuration {
        map.insert(
            "security_controls_configuration".into(),
            tree::single_block(flatten_controls_configuration(controls)),
        );
    }
    Value::Object(map)
}

/// Check the cross-field rules. An enabled service with no control
/// selection gets an explicit empty disabled set; otherwise only the
/// populated selection is kept.
pub fn validate_configuration_policy(
    mut policy: ConfigurationPolicy,
) -> Result<ConfigurationPolicy, PolicyViolation> {
    let violation = match (&mut policy.security_controls_configuration, policy.service_enabled) {
        (Some(_), false) => Some(PolicyViolation::ServiceDisabledWithControls),
        (None, true) => Some(PolicyViolation::ServiceEnabledWithoutControls),
        (Some(controls), true) => match (controls.has_enabled(), controls.has_disabled()) {
            (true, true) => Some(PolicyViolation::ConflictingControlSelection {
                enabled: controls
                    .enabled_security_control_identifiers
                    .as_ref()
                    .map_or(0, BTreeSet::len),
                disabled: controls
                    .disabled_security_control_identifiers
                    .as_ref()
                    .map_or(0, BTreeSet::len),
            }),
            (false, false) => {
                controls.enabled_security_control_identifiers = None;
                controls.disabled_security_control_identifiers = Some(BTreeSet::new());
                None
            }
            (true, false) => {
                controls.disabled_security_control_identifiers = None;
                None
            }
            (false, true) => {
                controls.enabled_security_control_identifiers = None;
                None
            }
        },
        (None, false) => None,
    };

    match violation {
        Some(violation) => {
            codec_error!(violation.code(), "Configuration policy rejected", "reason" => violation);
            Err(violation)
        }
        None => Ok(policy),
    }
}

fn expand_policy(
    ctx: &mut ExpandContext<'_>,
    map: &Map<String, Value>,
    path: &TreePath,
) -> ConfigurationPolicy {
    let service_enabled = map
        .get("service_enabled")
        .and_then(|value| ctx.boolean(value, &path.field("service_enabled")))
        .unwrap_or(false);
    let enabled_standard_identifiers = ctx
        .string_set(map, "enabled_standard_arns", path)
        .unwrap_or_default()
        .into_iter()
        .collect();
    let controls_path = path.field("security_controls_configuration").index(0);
    let security_controls_configuration = map
        .get("security_controls_configuration")
        .and_then(tree::block)
        .map(|controls| expand_controls_configuration(ctx, controls, &controls_path));

    ConfigurationPolicy {
        service_enabled,
        enabled_standard_identifiers,
        security_controls_configuration,
    }
}

fn expand_controls_configuration(
    ctx: &mut ExpandContext<'_>,
    map: &Map<String, Value>,
    path: &TreePath,
) -> SecurityControlsConfiguration {
    let enabled = ctx
        .string_set(map, "enabled_control_identifiers", path)
        .map(|ids| ids.into_iter().collect());
    let disabled = ctx
        .string_set(map, "disabled_control_identifiers", path)
        .map(|ids| ids.into_iter().collect());

    let parameters_path = path.field("security_control_custom_parameter");
    let custom_parameters: Vec<ControlParameterSet> = map
        .get("security_control_custom_parameter")
        .map(tree::elements)
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(i, element)| {
            let element_path = parameters_path.index(i);
            ctx.object(element, &element_path)
                .map(|set| expand_parameter_set(ctx, set, &element_path))
        })
        .collect();

    SecurityControlsConfiguration {
        enabled_security_control_identifiers: enabled,
        disabled_security_control_identifiers: disabled,
        security_control_custom_parameters: custom_parameters,
    }
}

fn flatten_controls_configuration(controls: &SecurityControlsConfiguration) -> Map<String, Value> {
    let mut map = Map::new();
    if let Some(ids) = &controls.enabled_security_control_identifiers {
        map.insert("enabled_control_identifiers".into(), string_array(ids));
    }
    if let Some(ids) = &controls.disabled_security_control_identifiers {
        map.insert("disabled_control_identifiers".into(), string_array(ids));
    }
    if !controls.security_control_custom_parameters.is_empty() {
        let sets = controls
            .security_control_custom_parameters
            .iter()
            .map(flatten_control_parameter_set)
            .collect();
        map.insert("security_control_custom_parameter".into(), Value::Array(sets));
    }
    map
}

// ============================================================================
// CONTROL PARAMETER SETS
// ============================================================================

/// Expand the custom parameters of one control
pub fn expand_control_parameter_set(
    tree: &Value,
    options: &CodecOptions,
) -> Result<ControlParameterSet, CodecError> {
    let mut ctx = ExpandContext::new(options);
    let root = TreePath::root();
    let set = match tree::block(tree) {
        Some(map) => expand_parameter_set(&mut ctx, map, &root),
        None => {
            ctx.report(
                root.clone(),
                IssueKind::MissingAttribute {
                    name: "security_control_id",
                },
            );
            ControlParameterSet::default()
        }
    };
    ctx.finish(set)
}

pub fn flatten_control_parameter_set(set: &ControlParameterSet) -> Value {
    let parameters = set
        .parameters
        .iter()
        .map(|(name, configuration)| flatten_custom_parameter(name, configuration))
        .collect();

    let mut map = Map::new();
    map.insert(
        "security_control_id".into(),
        Value::String(set.security_control_id.clone()),
    );
    map.insert("parameter".into(), Value::Array(parameters));
    Value::Object(map)
}

fn expand_parameter_set(
    ctx: &mut ExpandContext<'_>,
    map: &Map<String, Value>,
    path: &TreePath,
) -> ControlParameterSet {
    let security_control_id = ctx.required_string(map, "security_control_id", path);
    let mut set = ControlParameterSet {
        security_control_id,
        ..Default::default()
    };

    let parameters_path = path.field("parameter");
    let elements = map.get("parameter").map(tree::elements).unwrap_or_default();
    for (i, element) in elements.into_iter().enumerate() {
        let element_path = parameters_path.index(i);
        let Some(element) = ctx.object(element, &element_path) else {
            continue;
        };
        let parameter = expand_parameter(ctx, element, &element_path);

        match set.parameters.entry(parameter.name) {
            Entry::Vacant(entry) => {
                entry.insert(parameter.configuration);
            }
            Entry::Occupied(mut entry) => {
                let name = entry.key().clone();
                if ctx.is_strict() {
                    ctx.report(element_path, IssueKind::DuplicateParameter { name });
                } else {
                    codec_warn!(
                        "Duplicate parameter, keeping the last one",
                        "control" => set.security_control_id,
                        "parameter" => name
                    );
                    entry.insert(parameter.configuration);
                }
            }
        }
    }

    set
}

// ============================================================================
// CONTROL ASSOCIATIONS
// ============================================================================

/// Expand and validate a standards control association
pub fn expand_control_association(
    tree: &Value,
    options: &CodecOptions,
) -> Result<ControlAssociation, CodecError> {
    let mut ctx = ExpandContext::new(options);
    let root = TreePath::root();
    let empty = Map::new();
    let map = match tree::block(tree) {
        Some(map) => map,
        None => {
            ctx.report(
                root.clone(),
                IssueKind::UnexpectedType {
                    expected: "object",
                    found: tree::type_name(tree),
                },
            );
            &empty
        }
    };

    let association = ControlAssociation {
        security_control_id: ctx.required_string(map, "security_control_id", &root),
        standards_arn: ctx.required_string(map, "standards_arn", &root),
        association_status: AssociationStatus::parse(&ctx.required_string(
            map,
            "association_status",
            &root,
        )),
        updated_reason: ctx.string(map, "updated_reason", &root),
    };

    let association = ctx.finish(association)?;
    Ok(validate_control_association(association)?)
}

pub fn flatten_control_association(association: &ControlAssociation) -> Value {
    let mut map = Map::new();
    map.insert(
        "security_control_id".into(),
        Value::String(association.security_control_id.clone()),
    );
    map.insert(
        "standards_arn".into(),
        Value::String(association.standards_arn.clone()),
    );
    map.insert(
        "association_status".into(),
        Value::String(association.association_status.as_str().to_string()),
    );
    if let Some(reason) = &association.updated_reason {
        map.insert("updated_reason".into(), Value::String(reason.clone()));
    }
    Value::Object(map)
}

/// A DISABLED association must say why
pub fn validate_control_association(
    association: ControlAssociation,
) -> Result<ControlAssociation, PolicyViolation> {
    let missing_reason = association
        .updated_reason
        .as_deref()
        .map_or(true, |reason| reason.trim().is_empty());

    if association.association_status == AssociationStatus::Disabled && missing_reason {
        let violation = PolicyViolation::DisabledWithoutReason {
            security_control_id: association.security_control_id,
            standards_arn: association.standards_arn,
        };
        codec_error!(violation.code(), "Control association rejected", "reason" => violation);
        return Err(violation);
    }
    Ok(association)
}

fn string_array<'a>(items: impl IntoIterator<Item = &'a String>) -> Value {
    Value::Array(items.into_iter().cloned().map(Value::String).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::types::{ParameterConfiguration, ParameterValue};
    use assert_matches::assert_matches;
    use serde_json::json;

    fn strict() -> CodecOptions {
        CodecOptions::strict()
    }

    #[test]
    fn test_disabled_service_with_controls_is_rejected() {
        let tree = json!({
            "service_enabled": false,
            "security_controls_configuration": [{"disabled_control_identifiers": ["IAM.7"]}]
        });
        assert_matches!(
            expand_configuration_policy(&tree, &strict()),
            Err(CodecError::Validation(PolicyViolation::ServiceDisabledWithControls))
        );
    }

    #[test]
    fn test_enabled_service_without_controls_is_rejected() {
        let tree = json!({"service_enabled": true, "enabled_standard_arns": []});
        assert_matches!(
            expand_configuration_policy(&tree, &strict()),
            Err(CodecError::Validation(PolicyViolation::ServiceEnabledWithoutControls))
        );
    }

    #[test]
    fn test_empty_selection_materializes_disabled_set() {
        let tree = json!({
            "service_enabled": true,
            "security_controls_configuration": [{
                "enabled_control_identifiers": null,
                "disabled_control_identifiers": null
            }]
        });
        let policy = expand_configuration_policy(&tree, &strict()).unwrap();
        let controls = policy.security_controls_configuration.unwrap();
        assert_eq!(controls.enabled_security_control_identifiers, None);
        assert_eq!(controls.disabled_security_control_identifiers, Some(BTreeSet::new()));
    }

    #[test]
    fn test_both_selections_are_rejected() {
        let tree = json!({
            "service_enabled": true,
            "security_controls_configuration": {
                "enabled_control_identifiers": ["IAM.1"],
                "disabled_control_identifiers": ["S3.1", "S3.2"]
            }
        });
        let err = expand_configuration_policy(&tree, &strict()).unwrap_err();
        assert_eq!(err.code(), codes::validation::CONFLICTING_CONTROL_SELECTION);
        assert_matches!(
            err,
            CodecError::Validation(PolicyViolation::ConflictingControlSelection {
                enabled: 1,
                disabled: 2
            })
        );
    }

    #[test]
    fn test_empty_selection_is_dropped() {
        for (enabled, disabled) in [(json!([]), json!(["S3.1"])), (json!(["IAM.1"]), json!([]))] {
            let tree = json!({
                "service_enabled": true,
                "security_controls_configuration": [{
                    "enabled_control_identifiers": enabled,
                    "disabled_control_identifiers": disabled
                }]
            });
            let policy = expand_configuration_policy(&tree, &strict()).unwrap();
            let wire = serde_json::to_value(&policy).unwrap();
            let controls = wire["SecurityControlsConfiguration"].as_object().unwrap();

            let present: Vec<&str> = [
                "EnabledSecurityControlIdentifiers",
                "DisabledSecurityControlIdentifiers",
            ]
            .into_iter()
            .filter(|key| controls.contains_key(*key))
            .collect();
            assert_eq!(present.len(), 1, "{}", wire);
            assert_eq!(controls[present[0]].as_array().map(Vec::len), Some(1));
        }
    }

    #[test]
    fn test_disabled_service_passes() {
        let policy = expand_configuration_policy(&json!({"service_enabled": false}), &strict())
            .unwrap();
        assert!(!policy.service_enabled);
        assert!(policy.security_controls_configuration.is_none());
    }

    #[test]
    fn test_policy_round_trip() {
        let tree = json!({
            "service_enabled": true,
            "enabled_standard_arns": [
                "arn:aws:securityhub:us-east-1::standards/aws-foundational-security-best-practices/v/1.0.0"
            ],
            "security_controls_configuration": [{
                "disabled_control_identifiers": ["Tagging.1"],
                "security_control_custom_parameter": [{
                    "security_control_id": "APIGateway.1",
                    "parameter": [{
                        "name": "loggingLevel",
                        "value_type": "CUSTOM",
                        "enum": [{"value": "INFO"}]
                    }]
                }]
            }]
        });

        let policy = expand_configuration_policy(&tree, &strict()).unwrap();
        let controls = policy.security_controls_configuration.as_ref().unwrap();
        assert_eq!(
            controls.security_control_custom_parameters[0].parameters["loggingLevel"],
            ParameterConfiguration::custom(ParameterValue::Enum("INFO".into()))
        );

        assert_eq!(flatten_configuration_policy(&policy), tree);
    }

    #[test]
    fn test_duplicate_parameter_names() {
        let tree = json!({
            "security_control_id": "IAM.7",
            "parameter": [
                {"name": "MaxPasswordAge", "value_type": "CUSTOM", "int": [{"value": 30}]},
                {"name": "MaxPasswordAge", "value_type": "CUSTOM", "int": [{"value": 60}]}
            ]
        });

        let err = expand_control_parameter_set(&tree, &strict()).unwrap_err();
        assert_matches!(
            &err.issues()[0].kind,
            IssueKind::DuplicateParameter { name } if name == "MaxPasswordAge"
        );

        let set = expand_control_parameter_set(&tree, &CodecOptions::legacy()).unwrap();
        assert_eq!(set.parameters.len(), 1);
        assert_eq!(
            set.parameters["MaxPasswordAge"].value,
            Some(ParameterValue::Integer(60))
        );
    }

    #[test]
    fn test_malformed_policy_reports_before_validation() {
        let tree = json!({
            "service_enabled": true,
            "security_controls_configuration": [{
                "security_control_custom_parameter": [{
                    "security_control_id": "IAM.7",
                    "parameter": [
                        {"name": "a", "value_type": "CUSTOM"},
                        {"name": "b", "value_type": "CUSTOM", "bool": [{"value": true}], "int": [{"value": 1}]}
                    ]
                }]
            }]
        });

        let err = expand_configuration_policy(&tree, &strict()).unwrap_err();
        assert!(err.is_malformed());
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn test_control_association() {
        let tree = json!({
            "security_control_id": "IAM.1",
            "standards_arn": "arn:aws:securityhub:::ruleset/cis-aws-foundations-benchmark/v/1.2.0",
            "association_status": "DISABLED",
            "updated_reason": "handled by SCP"
        });
        let association = expand_control_association(&tree, &strict()).unwrap();
        assert_eq!(association.association_status, AssociationStatus::Disabled);
        assert_eq!(flatten_control_association(&association), tree);

        let no_reason = json!({
            "security_control_id": "IAM.1",
            "standards_arn": "arn:std",
            "association_status": "DISABLED",
            "updated_reason": "  "
        });
        assert_matches!(
            expand_control_association(&no_reason, &strict()),
            Err(CodecError::Validation(PolicyViolation::DisabledWithoutReason { .. }))
        );

        let enabled = json!({
            "security_control_id": "IAM.1",
            "standards_arn": "arn:std",
            "association_status": "ENABLED"
        });
        assert!(expand_control_association(&enabled, &strict()).is_ok());
    }

    #[test]
    fn test_control_association_missing_attributes() {
        let err = expand_control_association(&json!({"association_status": "ENABLED"}), &strict())
            .unwrap_err();
        let missing: Vec<String> = err.issues().iter().map(|i| i.path.to_string()).collect();
        assert_eq!(missing, vec!["security_control_id", "standards_arn"]);
    }
}
