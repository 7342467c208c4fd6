//! Control parameter wire types

use super::enums::ParameterValueType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value arms of a control parameter. Serializes as the API's single-member
/// union object, e.g. `{"Integer": 20}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Boolean(bool),
    Double(f64),
    Enum(String),
    EnumList(Vec<String>),
    Integer(i32),
    IntegerList(Vec<i32>),
    String(String),
    StringList(Vec<String>),
}

impl ParameterValue {
    pub fn kind(&self) -> ParameterKind {
        match self {
            Self::Boolean(_) => ParameterKind::Boolean,
            Self::Double(_) => ParameterKind::Double,
            Self::Enum(_) => ParameterKind::Enum,
            Self::EnumList(_) => ParameterKind::EnumList,
            Self::Integer(_) => ParameterKind::Integer,
            Self::IntegerList(_) => ParameterKind::IntegerList,
            Self::String(_) => ParameterKind::String,
            Self::StringList(_) => ParameterKind::StringList,
        }
    }
}

/// Discriminant of [`ParameterValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    Boolean,
    Double,
    Enum,
    EnumList,
    Integer,
    IntegerList,
    String,
    StringList,
}

impl ParameterKind {
    /// Order in which expand tests the value arms
    pub const PRIORITY: [ParameterKind; 8] = [
        ParameterKind::Boolean,
        ParameterKind::Double,
        ParameterKind::Enum,
        ParameterKind::String,
        ParameterKind::Integer,
        ParameterKind::IntegerList,
        ParameterKind::EnumList,
        ParameterKind::StringList,
    ];

    /// Key of the arm in the dynamic tree
    pub fn tree_key(&self) -> &'static str {
        match self {
            Self::Boolean => "bool",
            Self::Double => "double",
            Self::Enum => "enum",
            Self::EnumList => "enum_list",
            Self::Integer => "int",
            Self::IntegerList => "int_list",
            Self::String => "string",
            Self::StringList => "string_list",
        }
    }

    /// Value used when an arm is present without a `value`
    pub fn zero_value(&self) -> ParameterValue {
        match self {
            Self::Boolean => ParameterValue::Boolean(false),
            Self::Double => ParameterValue::Double(0.0),
            Self::Enum => ParameterValue::Enum(String::new()),
            Self::EnumList => ParameterValue::EnumList(Vec::new()),
            Self::Integer => ParameterValue::Integer(0),
            Self::IntegerList => ParameterValue::IntegerList(Vec::new()),
            Self::String => ParameterValue::String(String::new()),
            Self::StringList => ParameterValue::StringList(Vec::new()),
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tree_key())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterConfiguration {
    pub value_type: ParameterValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ParameterValue>,
}

impl ParameterConfiguration {
    pub fn custom(value: ParameterValue) -> Self {
        Self {
            value_type: ParameterValueType::Custom,
            value: Some(value),
        }
    }

    pub fn default_value() -> Self {
        Self {
            value_type: ParameterValueType::Default,
            value: None,
        }
    }
}

/// A named parameter as written in the dynamic tree
#[derive(Debug, Clone, PartialEq)]
pub struct CustomParameter {
    pub name: String,
    pub configuration: ParameterConfiguration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_priority_covers_every_kind_once() {
        let mut keys: Vec<_> = ParameterKind::PRIORITY.iter().map(|k| k.tree_key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 8);
        assert_eq!(ParameterKind::PRIORITY[0], ParameterKind::Boolean);
        assert_eq!(ParameterKind::PRIORITY[7], ParameterKind::StringList);
    }

    #[test]
    fn test_zero_value_matches_kind() {
        for kind in ParameterKind::PRIORITY {
            assert_eq!(kind.zero_value().kind(), kind);
        }
    }

    #[test]
    fn test_wire_union_shape() {
        let config = ParameterConfiguration::custom(ParameterValue::IntegerList(vec![443, 8080]));
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({"ValueType": "CUSTOM", "Value": {"IntegerList": [443, 8080]}})
        );

        let parsed: ParameterConfiguration =
            serde_json::from_value(json!({"ValueType": "DEFAULT"})).unwrap();
        assert_eq!(parsed, ParameterConfiguration::default_value());
    }
}
