//! Control parameter value codec
//!
//! In the dynamic tree a parameter value is a map of optional one-element
//! lists keyed `bool`, `double`, `enum`, `enum_list`, `int`, `int_list`,
//! `string` and `string_list`. The presence of a list selects the arm; the
//! element's `value` carries the payload.

use super::context::ExpandContext;
use crate::config::CodecOptions;
use crate::error::{CodecError, IssueKind};
use crate::tree::{self, TreePath};
use crate::types::{
    CustomParameter, ParameterConfiguration, ParameterKind, ParameterValue, ParameterValueType,
};
use crate::codec_debug;
use serde_json::{Map, Value};

/// Expand the value arms of a parameter node
pub fn expand_parameter_value(
    tree: &Value,
    options: &CodecOptions,
) -> Result<Option<ParameterValue>, CodecError> {
    let mut ctx = ExpandContext::new(options);
    let value = match tree::block(tree) {
        Some(map) => expand_value(&mut ctx, map, &TreePath::root()),
        None => None,
    };
    ctx.finish(value)
}

/// Flatten a value into its single wrapped-list arm
pub fn flatten_parameter_value(value: &ParameterValue) -> Value {
    let mut map = Map::new();
    insert_value_arm(&mut map, value);
    Value::Object(map)
}

/// Expand a named parameter element `{name, value_type, <arm>}`, given as
/// a map or a one-element list
pub fn expand_custom_parameter(
    tree: &Value,
    options: &CodecOptions,
) -> Result<CustomParameter, CodecError> {
    let mut ctx = ExpandContext::new(options);
    let root = TreePath::root();
    let parameter = match tree::block(tree) {
        Some(map) => expand_parameter(&mut ctx, map, &root),
        None => {
            ctx.report(root, IssueKind::MissingAttribute { name: "name" });
            CustomParameter {
                name: String::new(),
                configuration: ParameterConfiguration::default_value(),
            }
        }
    };
    ctx.finish(parameter)
}

/// Flatten a named parameter element
pub fn flatten_custom_parameter(name: &str, configuration: &ParameterConfiguration) -> Value {
    let mut map = Map::new();
    map.insert("name".into(), Value::String(name.to_string()));
    map.insert(
        "value_type".into(),
        Value::String(configuration.value_type.as_str().to_string()),
    );
    if let Some(value) = &configuration.value {
        insert_value_arm(&mut map, value);
    }
    Value::Object(map)
}

// ============================================================================
// EXPAND
// ============================================================================

pub(crate) fn expand_parameter(
    ctx: &mut ExpandContext<'_>,
    map: &Map<String, Value>,
    path: &TreePath,
) -> CustomParameter {
    let name = ctx.required_string(map, "name", path);
    let value_type = ctx
        .string(map, "value_type", path)
        .map(|s| ParameterValueType::parse(&s))
        .unwrap_or(ParameterValueType::Custom);
    let value = expand_value(ctx, map, path);

    match (&value_type, &value) {
        (ParameterValueType::Custom, None) => {
            ctx.report_strict(path.clone(), IssueKind::MissingParameterValue);
        }
        (ParameterValueType::Default, Some(value)) => {
            let kind = IssueKind::UnexpectedParameterValue {
                kind: value.kind().tree_key(),
            };
            ctx.report_strict(path.clone(), kind);
        }
        _ => {}
    }

    CustomParameter {
        name,
        configuration: ParameterConfiguration { value_type, value },
    }
}

/// First populated arm in priority order wins
pub(crate) fn expand_value(
    ctx: &mut ExpandContext<'_>,
    map: &Map<String, Value>,
    path: &TreePath,
) -> Option<ParameterValue> {
    let populated: Vec<ParameterKind> = ParameterKind::PRIORITY
        .into_iter()
        .filter(|kind| tree::is_populated(map.get(kind.tree_key())))
        .collect();

    let (&selected, rest) = populated.split_first()?;
    if !rest.is_empty() {
        let kinds = populated.iter().map(ParameterKind::tree_key).collect();
        ctx.report_strict(path.clone(), IssueKind::AmbiguousUnion { kinds });
        codec_debug!("Dropping lower priority value arms", "path" => path, "selected" => selected);
    }

    let key = selected.tree_key();
    let arm_path = path.field(key).index(0);
    let payload = map
        .get(key)
        .and_then(tree::block)
        .and_then(|arm| arm.get("value"))
        .filter(|value| !value.is_null());

    let value = match payload {
        Some(payload) => expand_payload(ctx, selected, payload, &arm_path.field("value")),
        None => None,
    };
    Some(value.unwrap_or_else(|| selected.zero_value()))
}

fn expand_payload(
    ctx: &mut ExpandContext<'_>,
    kind: ParameterKind,
    payload: &Value,
    path: &TreePath,
) -> Option<ParameterValue> {
    let value = match kind {
        ParameterKind::Boolean => ParameterValue::Boolean(ctx.boolean(payload, path)?),
        ParameterKind::Double => ParameterValue::Double(ctx.double(payload, path)?),
        ParameterKind::Integer => ParameterValue::Integer(ctx.integer(payload, path)?),
        ParameterKind::Enum => ParameterValue::Enum(ctx.text(payload, path)?),
        ParameterKind::String => ParameterValue::String(ctx.text(payload, path)?),
        ParameterKind::EnumList => ParameterValue::EnumList(text_list(ctx, payload, path)),
        ParameterKind::StringList => ParameterValue::StringList(text_list(ctx, payload, path)),
        ParameterKind::IntegerList => ParameterValue::IntegerList(
            tree::elements(payload)
                .into_iter()
                .enumerate()
                .filter_map(|(i, item)| ctx.integer(item, &path.index(i)))
                .collect(),
        ),
    };
    Some(value)
}

fn text_list(ctx: &mut ExpandContext<'_>, payload: &Value, path: &TreePath) -> Vec<String> {
    tree::elements(payload)
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| ctx.text(item, &path.index(i)))
        .collect()
}

// ============================================================================
// FLATTEN
// ============================================================================

fn insert_value_arm(map: &mut Map<String, Value>, value: &ParameterValue) {
    let payload = match value {
        ParameterValue::Boolean(b) => Value::Bool(*b),
        ParameterValue::Double(d) => serde_json::Number::from_f64(*d)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(d.to_string())),
        ParameterValue::Enum(s) | ParameterValue::String(s) => Value::String(s.clone()),
        ParameterValue::EnumList(items) | ParameterValue::StringList(items) => {
            Value::Array(items.iter().cloned().map(Value::String).collect())
        }
        ParameterValue::Integer(n) => Value::from(*n),
        ParameterValue::IntegerList(items) => {
            Value::Array(items.iter().map(|n| Value::from(*n)).collect())
        }
    };

    let mut arm = Map::new();
    arm.insert("value".into(), payload);
    map.insert(value.kind().tree_key().into(), tree::single_block(arm));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn strict() -> CodecOptions {
        CodecOptions::strict()
    }

    #[test]
    fn test_round_trip_every_arm() {
        let values = [
            ParameterValue::Boolean(true),
            ParameterValue::Double(20.25),
            ParameterValue::Enum("INFO".into()),
            ParameterValue::EnumList(vec![
                "s3:IntelligentTiering".into(),
                "s3:LifecycleExpiration:*".into(),
            ]),
            ParameterValue::Integer(20),
            ParameterValue::IntegerList(vec![443, 8080]),
            ParameterValue::String("s".into()),
            ParameterValue::StringList(vec!["a".into(), "b".into()]),
        ];

        for value in values {
            let tree = flatten_parameter_value(&value);
            let expanded = expand_parameter_value(&tree, &strict()).unwrap();
            assert_eq!(expanded, Some(value));
        }
    }

    #[test]
    fn test_flatten_shape() {
        assert_eq!(
            flatten_parameter_value(&ParameterValue::IntegerList(vec![443, 8080])),
            json!({"int_list": [{"value": [443, 8080]}]})
        );
    }

    #[test]
    fn test_priority_law_legacy() {
        let tree = json!({"bool": [{"value": true}], "double": [{"value": 1.5}]});
        let value = expand_parameter_value(&tree, &CodecOptions::legacy()).unwrap();
        assert_eq!(value, Some(ParameterValue::Boolean(true)));
    }

    #[test]
    fn test_priority_law_strict() {
        let tree = json!({"bool": [{"value": true}], "double": [{"value": 1.5}]});
        let err = expand_parameter_value(&tree, &strict()).unwrap_err();
        assert_matches!(&err, CodecError::Malformed(input) if input.contains(codes::malformed::AMBIGUOUS_UNION));
        assert_matches!(
            &err.issues()[0].kind,
            IssueKind::AmbiguousUnion { kinds } if kinds == &vec!["bool", "double"]
        );
    }

    #[test]
    fn test_string_outranks_integer() {
        let tree = json!({"int": [{"value": 3}], "string": [{"value": "3"}]});
        let value = expand_parameter_value(&tree, &CodecOptions::legacy()).unwrap();
        assert_eq!(value, Some(ParameterValue::String("3".into())));
    }

    #[test]
    fn test_arm_without_value_is_zero() {
        let tree = json!({"int_list": [{}]});
        assert_eq!(
            expand_parameter_value(&tree, &strict()).unwrap(),
            Some(ParameterValue::IntegerList(Vec::new()))
        );

        let tree = json!({"bool": [null]});
        assert_eq!(
            expand_parameter_value(&tree, &strict()).unwrap(),
            Some(ParameterValue::Boolean(false))
        );
    }

    #[test]
    fn test_empty_arm_list_is_absent() {
        let tree = json!({"bool": [], "enum": [{"value": "LOW"}]});
        assert_eq!(
            expand_parameter_value(&tree, &strict()).unwrap(),
            Some(ParameterValue::Enum("LOW".into()))
        );
        assert_eq!(expand_parameter_value(&json!({}), &strict()).unwrap(), None);
    }

    #[test]
    fn test_custom_parameter_round_trip() {
        let configuration = ParameterConfiguration::custom(ParameterValue::Integer(90));
        let tree = flatten_custom_parameter("maxCredentialUsageAge", &configuration);
        assert_eq!(
            tree,
            json!({
                "name": "maxCredentialUsageAge",
                "value_type": "CUSTOM",
                "int": [{"value": 90}]
            })
        );

        let parameter = expand_custom_parameter(&tree, &strict()).unwrap();
        assert_eq!(parameter.name, "maxCredentialUsageAge");
        assert_eq!(parameter.configuration, configuration);
    }

    #[test]
    fn test_value_type_mismatches() {
        let missing = json!({"name": "p", "value_type": "CUSTOM"});
        let err = expand_custom_parameter(&missing, &strict()).unwrap_err();
        assert_matches!(&err.issues()[0].kind, IssueKind::MissingParameterValue);
        assert!(expand_custom_parameter(&missing, &CodecOptions::legacy()).is_ok());

        let unexpected = json!({"name": "p", "value_type": "DEFAULT", "bool": [{"value": true}]});
        let err = expand_custom_parameter(&unexpected, &strict()).unwrap_err();
        assert_matches!(
            &err.issues()[0].kind,
            IssueKind::UnexpectedParameterValue { kind: "bool" }
        );

        let default = json!({"name": "p", "value_type": "DEFAULT"});
        let parameter = expand_custom_parameter(&default, &strict()).unwrap();
        assert_eq!(parameter.configuration, ParameterConfiguration::default_value());
    }

    #[test]
    fn test_malformed_integer_list_member() {
        let tree = json!({"int_list": [{"value": [443, "http"]}]});
        let err = expand_parameter_value(&tree, &strict()).unwrap_err();
        assert_eq!(err.issues()[0].path.to_string(), "int_list[0].value[1]");

        let legacy = expand_parameter_value(&tree, &CodecOptions::legacy()).unwrap();
        assert_eq!(legacy, Some(ParameterValue::IntegerList(vec![443])));
    }
}
