//! Filter set codec
//!
//! Runs the criteria codec over every field of a vocabulary. Fields are
//! independent; absent keys contribute nothing and unknown keys are skipped.

use super::context::ExpandContext;
use super::criteria::{expand_values, flatten_criteria};
use crate::config::CodecOptions;
use crate::error::{CodecError, IssueKind};
use crate::logging::codes;
use crate::registry::Vocabulary;
use crate::tree::{self, TreePath};
use crate::types::FilterSet;
use crate::{codec_debug, codec_warn};
use serde_json::{Map, Value};

/// Expand a filter block of the given vocabulary
pub fn expand_filter_set(
    vocabulary: Vocabulary,
    tree: &Value,
    options: &CodecOptions,
) -> Result<FilterSet, CodecError> {
    let mut ctx = ExpandContext::new(options);
    let set = match tree::block(tree) {
        Some(map) => expand_filters(&mut ctx, vocabulary, map, &TreePath::root()),
        None => FilterSet::new(vocabulary),
    };
    ctx.finish(set)
}

/// Flatten a filter set into a filter block map
pub fn flatten_filter_set(set: &FilterSet) -> Value {
    let encoding = set.vocabulary().number_encoding();
    let map: Map<String, Value> = set
        .iter()
        .map(|(name, values)| (name.to_string(), flatten_criteria(values, encoding)))
        .collect();
    Value::Object(map)
}

pub(crate) fn expand_filters(
    ctx: &mut ExpandContext<'_>,
    vocabulary: Vocabulary,
    map: &Map<String, Value>,
    path: &TreePath,
) -> FilterSet {
    let registry = vocabulary.registry();
    let mut set = FilterSet::new(vocabulary);

    for (key, value) in map {
        let Some(spec) = registry.lookup(key) else {
            codec_warn!(
                code = codes::wire::UNKNOWN_FIELD,
                "Skipping unknown filter field",
                "field" => key,
                "vocabulary" => vocabulary
            );
            continue;
        };

        let field_path = path.field(key);
        let values = expand_values(ctx, spec.kind, value, &field_path);
        if let Some(max) = ctx.options().filter_limit() {
            if ctx.is_strict() && values.len() > max {
                let count = values.len();
                ctx.report(field_path, IssueKind::TooManyFilters { count, max });
            }
        }
        set.insert_registered(spec, values);
    }

    codec_debug!("Expanded filter set", "vocabulary" => vocabulary, "fields" => set.len());
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::types::{
        FilterValues, NumberFilter, StringFilter, StringFilterComparison,
    };
    use assert_matches::assert_matches;
    use serde_json::json;

    fn strict() -> CodecOptions {
        CodecOptions::strict()
    }

    #[test]
    fn test_two_accounts_survive_round_trip() {
        let set = FilterSet::new(Vocabulary::Insight)
            .with(
                "aws_account_id",
                FilterValues::String(vec![
                    StringFilter::new(StringFilterComparison::Equals, "1234567890"),
                    StringFilter::new(StringFilterComparison::Equals, "09876543210"),
                ]),
            )
            .unwrap();

        let tree = flatten_filter_set(&set);
        let expanded = expand_filter_set(Vocabulary::Insight, &tree, &strict()).unwrap();
        assert!(expanded.same_members(&set));
        assert_eq!(expanded.get("aws_account_id").map(FilterValues::len), Some(2));
    }

    #[test]
    fn test_block_forms_and_absent_fields() {
        let map_form = json!({"title": [{"comparison": "PREFIX", "value": "S3"}]});
        let list_form = json!([{"title": [{"comparison": "PREFIX", "value": "S3"}], "id": []}]);

        let a = expand_filter_set(Vocabulary::AutomationRule, &map_form, &strict()).unwrap();
        let b = expand_filter_set(Vocabulary::AutomationRule, &list_form, &strict()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 1);

        let empty = expand_filter_set(Vocabulary::AutomationRule, &json!([]), &strict()).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_skipped() {
        let tree = json!({
            "keyword": [{"value": "x"}],
            "not_a_field": [{"value": "y"}]
        });
        let insight = expand_filter_set(Vocabulary::Insight, &tree, &strict()).unwrap();
        assert_eq!(insight.len(), 1);

        let automation = expand_filter_set(Vocabulary::AutomationRule, &tree, &strict()).unwrap();
        assert!(automation.is_empty());
    }

    #[test]
    fn test_number_encoding_follows_vocabulary() {
        let values = FilterValues::Number(vec![NumberFilter::equal_to(80.0)]);
        let insight = FilterSet::new(Vocabulary::Insight)
            .with("confidence", values.clone())
            .unwrap();
        let automation = FilterSet::new(Vocabulary::AutomationRule)
            .with("confidence", values)
            .unwrap();

        assert_eq!(flatten_filter_set(&insight), json!({"confidence": [{"eq": "80"}]}));
        assert_eq!(flatten_filter_set(&automation), json!({"confidence": [{"eq": 80.0}]}));
    }

    #[test]
    fn test_filter_limit() {
        let many: Vec<Value> = (0..21)
            .map(|i| json!({"comparison": "EQUALS", "value": i.to_string()}))
            .collect();
        let tree = json!({"aws_account_id": many});

        let err = expand_filter_set(Vocabulary::Insight, &tree, &strict()).unwrap_err();
        assert_matches!(
            &err.issues()[0].kind,
            IssueKind::TooManyFilters { count: 21, max: 20 }
        );

        let raised = strict().with_max_filters_per_field(Some(50));
        assert!(expand_filter_set(Vocabulary::Insight, &tree, &raised).is_ok());
        assert!(expand_filter_set(Vocabulary::Insight, &tree, &CodecOptions::legacy()).is_ok());
    }

    #[test]
    fn test_strict_aggregates_every_malformed_field() {
        let tree = json!({
            "confidence": [{"eq": "high"}],
            "criticality": [{"gte": "1", "lte": "max"}],
            "created_at": [{"start": "2024-01-01T00:00:00Z", "date_range": [{"unit": "DAYS", "value": 1}]}],
            "updated_at": [{"start": "last tuesday"}]
        });

        let err = expand_filter_set(Vocabulary::Insight, &tree, &strict()).unwrap_err();
        assert_eq!(err.code(), codes::malformed::MALFORMED_INPUT);
        let mut paths: Vec<String> = err.issues().iter().map(|i| i.path.to_string()).collect();
        paths.sort();
        assert_eq!(
            paths,
            vec![
                "confidence[0].eq",
                "created_at[0]",
                "criticality[0].lte",
                "updated_at[0].start",
            ]
        );
    }

    #[test]
    fn test_wire_output_parses_back_with_registry() {
        let tree = json!({
            "resource_tags": [{"comparison": "EQUALS", "key": "env", "value": "prod"}],
            "network_source_ipv4": [{"cidr": "10.0.0.0/8"}],
            "source_url": [{"comparison": "CONTAINS", "value": "example.com"}]
        });
        let set = expand_filter_set(Vocabulary::Insight, &tree, &strict()).unwrap();
        let wire = serde_json::to_value(&set).unwrap();

        assert!(wire.get("SourceUrl").is_some());
        assert!(wire.get("ThreatIntelIndicatorSourceUrl").is_none());

        let parsed = FilterSet::from_wire(Vocabulary::Insight, &wire).unwrap();
        assert!(parsed.same_members(&set));
        assert_eq!(flatten_filter_set(&parsed), tree);
    }
}
