//! Named filter collections
//!
//! A [`FilterSet`] belongs to one vocabulary and only holds fields that the
//! vocabulary's registry knows, each with predicates of the registered kind.

use super::criteria::{CriteriaKind, FilterValues};
use crate::error::CodecError;
use crate::registry::{FieldSpec, Vocabulary};
use crate::codec_debug;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSet {
    vocabulary: Vocabulary,
    fields: BTreeMap<&'static str, FilterValues>,
}

impl FilterSet {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary,
            fields: BTreeMap::new(),
        }
    }

    pub fn vocabulary(&self) -> Vocabulary {
        self.vocabulary
    }

    /// Attach predicates to a field, replacing any previous ones.
    /// Empty collections remove the field.
    pub fn insert(&mut self, field: &str, values: FilterValues) -> Result<(), CodecError> {
        let spec = self.spec(field)?;
        if spec.kind != values.kind() {
            return Err(CodecError::KindMismatch {
                field: field.to_string(),
                expected: spec.kind,
                found: values.kind(),
            });
        }
        if values.is_empty() {
            self.fields.remove(spec.name);
        } else {
            self.fields.insert(spec.name, values);
        }
        Ok(())
    }

    /// Insert for a field already resolved through the registry
    pub(crate) fn insert_registered(&mut self, spec: &'static FieldSpec, values: FilterValues) {
        debug_assert_eq!(spec.kind, values.kind());
        if !values.is_empty() {
            self.fields.insert(spec.name, values);
        }
    }

    /// Builder form of [`FilterSet::insert`]
    pub fn with(mut self, field: &str, values: FilterValues) -> Result<Self, CodecError> {
        self.insert(field, values)?;
        Ok(self)
    }

    pub fn get(&self, field: &str) -> Option<&FilterValues> {
        self.fields.get(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<FilterValues> {
        self.fields.remove(field)
    }

    /// Fields with predicates, keyed by dynamic name
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FilterValues)> {
        self.fields.iter().map(|(name, values)| (*name, values))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Equality with every field compared as an unordered multiset
    pub fn same_members(&self, other: &Self) -> bool {
        self.vocabulary == other.vocabulary
            && self.fields.len() == other.fields.len()
            && self.fields.iter().all(|(name, values)| {
                other
                    .fields
                    .get(name)
                    .is_some_and(|theirs| values.same_members(theirs))
            })
    }

    fn spec(&self, field: &str) -> Result<&'static FieldSpec, CodecError> {
        self.vocabulary
            .registry()
            .lookup(field)
            .ok_or_else(|| CodecError::UnknownField {
                vocabulary: self.vocabulary,
                field: field.to_string(),
            })
    }

    /// Read API JSON (`AwsSecurityFindingFilters` or
    /// `AutomationRulesFindingFilters`). Unknown members are skipped.
    pub fn from_wire(vocabulary: Vocabulary, wire: &Value) -> Result<Self, CodecError> {
        let mut set = Self::new(vocabulary);
        let object = match wire {
            Value::Object(object) => object,
            Value::Null => return Ok(set),
            other => {
                return Err(CodecError::Wire(serde::de::Error::invalid_type(
                    serde::de::Unexpected::Other(crate::tree::type_name(other)),
                    &"a filter object",
                )))
            }
        };

        let registry = vocabulary.registry();
        for (wire_key, value) in object {
            let Some(spec) = registry.lookup_wire(wire_key) else {
                codec_debug!("Skipping unknown wire filter member", "member" => wire_key, "vocabulary" => vocabulary);
                continue;
            };
            if value.is_null() {
                continue;
            }
            let values = decode_values(spec.kind, value)?;
            if !values.is_empty() {
                set.fields.insert(spec.name, values);
            }
        }

        Ok(set)
    }

    pub fn to_wire(&self) -> Result<Value, CodecError> {
        Ok(serde_json::to_value(self)?)
    }
}

fn decode_values(kind: CriteriaKind, value: &Value) -> Result<FilterValues, serde_json::Error> {
    let value = value.clone();
    Ok(match kind {
        CriteriaKind::String => FilterValues::String(serde_json::from_value(value)?),
        CriteriaKind::Number => FilterValues::Number(serde_json::from_value(value)?),
        CriteriaKind::Date => FilterValues::Date(serde_json::from_value(value)?),
        CriteriaKind::Map => FilterValues::Map(serde_json::from_value(value)?),
        CriteriaKind::Ip => FilterValues::Ip(serde_json::from_value(value)?),
        CriteriaKind::Keyword => FilterValues::Keyword(serde_json::from_value(value)?),
    })
}

impl Serialize for FilterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let registry = self.vocabulary.registry();
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, values) in &self.fields {
            let wire_key = registry
                .lookup(name)
                .map(|spec| spec.wire_key)
                .ok_or_else(|| serde::ser::Error::custom(format!("unregistered field {}", name)))?;
            map.serialize_entry(wire_key, values)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        DateFilter, DateRangeUnit, KeywordFilter, NumberFilter, StringFilter,
        StringFilterComparison,
    };
    use assert_matches::assert_matches;
    use serde_json::json;

    fn account(id: &str) -> StringFilter {
        StringFilter::new(StringFilterComparison::Equals, id)
    }

    #[test]
    fn test_insert_checks_vocabulary_and_kind() {
        let mut set = FilterSet::new(Vocabulary::AutomationRule);

        assert_matches!(
            set.insert("keyword", FilterValues::Keyword(vec![KeywordFilter::new("x")])),
            Err(CodecError::UnknownField { .. })
        );
        assert_matches!(
            set.insert("confidence", FilterValues::String(vec![account("1")])),
            Err(CodecError::KindMismatch {
                expected: CriteriaKind::Number,
                found: CriteriaKind::String,
                ..
            })
        );

        set.insert("confidence", FilterValues::Number(vec![NumberFilter::equal_to(5.0)]))
            .unwrap();
        assert_eq!(set.len(), 1);

        set.insert("confidence", FilterValues::Number(Vec::new())).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_serialize_uses_wire_keys_and_parses_back() {
        let set = FilterSet::new(Vocabulary::Insight)
            .with("aws_account_id", FilterValues::String(vec![account("1234567890")]))
            .unwrap()
            .with(
                "created_at",
                FilterValues::Date(vec![DateFilter::relative(DateRangeUnit::Days, 5)]),
            )
            .unwrap();

        let wire = set.to_wire().unwrap();
        assert_eq!(
            wire,
            json!({
                "AwsAccountId": [{"Comparison": "EQUALS", "Value": "1234567890"}],
                "CreatedAt": [{"DateRange": {"Unit": "DAYS", "Value": 5}}]
            })
        );

        let parsed = FilterSet::from_wire(Vocabulary::Insight, &wire).unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn test_from_wire_skips_unknown_members() {
        let wire = json!({
            "AwsAccountId": [{"Comparison": "EQUALS", "Value": "1"}],
            "SomeFutureField": [{"Value": "x"}],
            "Title": null
        });
        let set = FilterSet::from_wire(Vocabulary::AutomationRule, &wire).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.get("aws_account_id").is_some());
    }

    #[test]
    fn test_from_wire_rejects_wrong_shape() {
        let wire = json!({"Confidence": "high"});
        assert_matches!(
            FilterSet::from_wire(Vocabulary::Insight, &wire),
            Err(CodecError::Wire(_))
        );
        assert_matches!(
            FilterSet::from_wire(Vocabulary::Insight, &json!([1])),
            Err(CodecError::Wire(_))
        );
    }

    #[test]
    fn test_same_members_across_orderings() {
        let a = FilterSet::new(Vocabulary::Insight)
            .with("aws_account_id", FilterValues::String(vec![account("1"), account("2")]))
            .unwrap();
        let b = FilterSet::new(Vocabulary::Insight)
            .with("aws_account_id", FilterValues::String(vec![account("2"), account("1")]))
            .unwrap();
        assert!(a.same_members(&b));
        assert_ne!(a, b);
    }
}
