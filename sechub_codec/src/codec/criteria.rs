//! Filter predicate codec
//!
//! Expand turns the elements of one dynamic filter block into predicates of
//! a single kind; flatten is the element-wise inverse and omits unset members.
//! Elements that are not maps are skipped. A missing or empty discriminant
//! leaves the member unset, operator values are not checked here.

use super::context::ExpandContext;
use crate::config::CodecOptions;
use crate::error::{CodecError, IssueKind};
use crate::registry::NumberEncoding;
use crate::tree::{self, TreePath};
use crate::types::{
    CriteriaKind, DateFilter, DateRange, DateRangeUnit, FilterValues, IpFilter, KeywordFilter,
    MapFilter, MapFilterComparison, NumberFilter, StringFilter, StringFilterComparison,
};
use serde_json::{Map, Number, Value};

// ============================================================================
// PUBLIC ENTRY POINTS
// ============================================================================

/// Expand one filter block into predicates of `kind`
pub fn expand_criteria(
    kind: CriteriaKind,
    tree: &Value,
    options: &CodecOptions,
) -> Result<FilterValues, CodecError> {
    let mut ctx = ExpandContext::new(options);
    let values = expand_values(&mut ctx, kind, tree, &TreePath::root());
    ctx.finish(values)
}

/// Flatten predicates into a dynamic filter block
pub fn flatten_criteria(values: &FilterValues, encoding: NumberEncoding) -> Value {
    match values {
        FilterValues::String(filters) => flatten_elements(filters, flatten_string_filter),
        FilterValues::Number(filters) => {
            flatten_elements(filters, |filter| flatten_number_filter(filter, encoding))
        }
        FilterValues::Date(filters) => flatten_elements(filters, flatten_date_filter),
        FilterValues::Map(filters) => flatten_elements(filters, flatten_map_filter),
        FilterValues::Ip(filters) => flatten_elements(filters, flatten_ip_filter),
        FilterValues::Keyword(filters) => flatten_elements(filters, flatten_keyword_filter),
    }
}

pub(crate) fn expand_values(
    ctx: &mut ExpandContext<'_>,
    kind: CriteriaKind,
    tree: &Value,
    path: &TreePath,
) -> FilterValues {
    match kind {
        CriteriaKind::String => {
            FilterValues::String(expand_elements(ctx, tree, path, expand_string_filter))
        }
        CriteriaKind::Number => {
            FilterValues::Number(expand_elements(ctx, tree, path, expand_number_filter))
        }
        CriteriaKind::Date => FilterValues::Date(expand_elements(ctx, tree, path, expand_date_filter)),
        CriteriaKind::Map => FilterValues::Map(expand_elements(ctx, tree, path, expand_map_filter)),
        CriteriaKind::Ip => FilterValues::Ip(expand_elements(ctx, tree, path, expand_ip_filter)),
        CriteriaKind::Keyword => {
            FilterValues::Keyword(expand_elements(ctx, tree, path, expand_keyword_filter))
        }
    }
}

fn expand_elements<T>(
    ctx: &mut ExpandContext<'_>,
    tree: &Value,
    path: &TreePath,
    expand_one: fn(&mut ExpandContext<'_>, &Map<String, Value>, &TreePath) -> T,
) -> Vec<T> {
    let elements = tree::elements(tree);
    let mut filters = Vec::with_capacity(elements.len());
    for (i, element) in elements.into_iter().enumerate() {
        if let Value::Object(map) = element {
            filters.push(expand_one(ctx, map, &path.index(i)));
        }
    }
    filters
}

fn flatten_elements<T>(filters: &[T], flatten_one: impl Fn(&T) -> Map<String, Value>) -> Value {
    Value::Array(
        filters
            .iter()
            .map(|filter| Value::Object(flatten_one(filter)))
            .collect(),
    )
}

// ============================================================================
// STRING
// ============================================================================

fn expand_string_filter(
    ctx: &mut ExpandContext<'_>,
    map: &Map<String, Value>,
    path: &TreePath,
) -> StringFilter {
    StringFilter {
        comparison: ctx
            .string(map, "comparison", path)
            .map(|s| StringFilterComparison::parse(&s)),
        value: ctx.string(map, "value", path),
    }
}

fn flatten_string_filter(filter: &StringFilter) -> Map<String, Value> {
    let mut map = Map::new();
    if let Some(comparison) = &filter.comparison {
        map.insert("comparison".into(), Value::String(comparison.as_str().to_string()));
    }
    insert_string(&mut map, "value", filter.value.as_deref());
    map
}

// ============================================================================
// NUMBER
// ============================================================================

fn expand_number_filter(
    ctx: &mut ExpandContext<'_>,
    map: &Map<String, Value>,
    path: &TreePath,
) -> NumberFilter {
    NumberFilter {
        eq: ctx.decimal(map, "eq", path),
        gte: ctx.decimal(map, "gte", path),
        lte: ctx.decimal(map, "lte", path),
    }
}

fn flatten_number_filter(filter: &NumberFilter, encoding: NumberEncoding) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, bound) in [("eq", filter.eq), ("gte", filter.gte), ("lte", filter.lte)] {
        if let Some(n) = bound {
            map.insert(key.into(), encode_number(n, encoding));
        }
    }
    map
}

/// Shortest decimal that parses back to the same value
fn encode_number(n: f64, encoding: NumberEncoding) -> Value {
    match encoding {
        NumberEncoding::DecimalString => Value::String(n.to_string()),
        NumberEncoding::Native => Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(n.to_string())),
    }
}

// ============================================================================
// DATE
// ============================================================================

fn expand_date_filter(
    ctx: &mut ExpandContext<'_>,
    map: &Map<String, Value>,
    path: &TreePath,
) -> DateFilter {
    let filter = DateFilter {
        start: ctx.timestamp(map, "start", path),
        end: ctx.timestamp(map, "end", path),
        date_range: expand_date_range(ctx, map, path),
    };

    if filter.shape().is_none() {
        ctx.report_strict(path.clone(), IssueKind::AmbiguousDateFilter);
    }
    filter
}

fn expand_date_range(
    ctx: &mut ExpandContext<'_>,
    map: &Map<String, Value>,
    path: &TreePath,
) -> Option<DateRange> {
    let range = tree::block(map.get("date_range")?)?;
    let path = path.field("date_range").index(0);
    Some(DateRange {
        unit: ctx
            .string(range, "unit", &path)
            .map(|s| DateRangeUnit::parse(&s)),
        value: range
            .get("value")
            .and_then(|value| ctx.integer(value, &path.field("value"))),
    })
}

fn flatten_date_filter(filter: &DateFilter) -> Map<String, Value> {
    let mut map = Map::new();
    insert_string(&mut map, "start", filter.start.as_deref());
    insert_string(&mut map, "end", filter.end.as_deref());
    if let Some(range) = &filter.date_range {
        let mut range_map = Map::new();
        if let Some(unit) = &range.unit {
            range_map.insert("unit".into(), Value::String(unit.as_str().to_string()));
        }
        if let Some(value) = range.value {
            range_map.insert("value".into(), Value::from(value));
        }
        map.insert("date_range".into(), tree::single_block(range_map));
    }
    map
}

// ============================================================================
// MAP / IP / KEYWORD
// ============================================================================

fn expand_map_filter(
    ctx: &mut ExpandContext<'_>,
    map: &Map<String, Value>,
    path: &TreePath,
) -> MapFilter {
    MapFilter {
        comparison: ctx
            .string(map, "comparison", path)
            .map(|s| MapFilterComparison::parse(&s)),
        key: ctx.string(map, "key", path),
        value: ctx.string(map, "value", path),
    }
}

fn flatten_map_filter(filter: &MapFilter) -> Map<String, Value> {
    let mut map = Map::new();
    if let Some(comparison) = &filter.comparison {
        map.insert("comparison".into(), Value::String(comparison.as_str().to_string()));
    }
    insert_string(&mut map, "key", filter.key.as_deref());
    insert_string(&mut map, "value", filter.value.as_deref());
    map
}

fn expand_ip_filter(ctx: &mut ExpandContext<'_>, map: &Map<String, Value>, path: &TreePath) -> IpFilter {
    IpFilter {
        cidr: ctx.string(map, "cidr", path),
    }
}

fn flatten_ip_filter(filter: &IpFilter) -> Map<String, Value> {
    let mut map = Map::new();
    insert_string(&mut map, "cidr", filter.cidr.as_deref());
    map
}

fn expand_keyword_filter(
    ctx: &mut ExpandContext<'_>,
    map: &Map<String, Value>,
    path: &TreePath,
) -> KeywordFilter {
    KeywordFilter {
        value: ctx.string(map, "value", path),
    }
}

fn flatten_keyword_filter(filter: &KeywordFilter) -> Map<String, Value> {
    let mut map = Map::new();
    insert_string(&mut map, "value", filter.value.as_deref());
    map
}

fn insert_string(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        map.insert(key.into(), Value::String(value.to_string()));
    }
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
    fn test_string_filter_round_trip() {
        let values = FilterValues::String(vec![StringFilter::new(
            StringFilterComparison::Equals,
            "1234567890",
        )]);
        let tree = flatten_criteria(&values, NumberEncoding::DecimalString);
        assert_eq!(tree, json!([{"comparison": "EQUALS", "value": "1234567890"}]));
        assert_eq!(expand_criteria(CriteriaKind::String, &tree, &strict()).unwrap(), values);
    }

    #[test]
    fn test_map_ip_keyword_round_trip() {
        let cases = [
            FilterValues::Map(vec![MapFilter::new(MapFilterComparison::NotEquals, "env", "prod")]),
            FilterValues::Ip(vec![IpFilter::new("10.0.0.0/16"), IpFilter::new("::1/128")]),
            FilterValues::Keyword(vec![KeywordFilter::new("ransomware")]),
        ];
        for values in cases {
            let tree = flatten_criteria(&values, NumberEncoding::DecimalString);
            assert_eq!(expand_criteria(values.kind(), &tree, &strict()).unwrap(), values);
        }
    }

    #[test]
    fn test_missing_comparison_is_left_unset() {
        let tree = json!([{"value": "x", "comparison": ""}, "not-a-map"]);
        let values = expand_criteria(CriteriaKind::String, &tree, &strict()).unwrap();
        assert_eq!(
            values,
            FilterValues::String(vec![StringFilter {
                comparison: None,
                value: Some("x".into()),
            }])
        );
    }

    #[test]
    fn test_number_filter_boundaries() {
        let values = expand_criteria(CriteriaKind::Number, &json!([{"eq": "5"}, {}]), &strict())
            .unwrap();
        assert_eq!(
            values,
            FilterValues::Number(vec![NumberFilter::equal_to(5.0), NumberFilter::default()])
        );
    }

    #[test]
    fn test_number_encodings() {
        let values = FilterValues::Number(vec![NumberFilter {
            eq: None,
            gte: Some(20.25),
            lte: Some(80.0),
        }]);

        let as_strings = flatten_criteria(&values, NumberEncoding::DecimalString);
        assert_eq!(as_strings, json!([{"gte": "20.25", "lte": "80"}]));

        let native = flatten_criteria(&values, NumberEncoding::Native);
        assert_eq!(native, json!([{"gte": 20.25, "lte": 80.0}]));

        for tree in [as_strings, native] {
            assert_eq!(expand_criteria(CriteriaKind::Number, &tree, &strict()).unwrap(), values);
        }
    }

    #[test]
    fn test_malformed_number_strict_vs_legacy() {
        let tree = json!([{"eq": "five", "gte": "1"}]);

        let err = expand_criteria(CriteriaKind::Number, &tree, &strict()).unwrap_err();
        assert_matches!(&err, CodecError::Malformed(input) if input.contains(codes::malformed::MALFORMED_SCALAR));
        assert_eq!(err.issues()[0].path.to_string(), "[0].eq");

        let legacy = expand_criteria(CriteriaKind::Number, &tree, &CodecOptions::legacy()).unwrap();
        assert_eq!(
            legacy,
            FilterValues::Number(vec![NumberFilter {
                eq: None,
                gte: Some(1.0),
                lte: None,
            }])
        );
    }

    #[test]
    fn test_date_filter_round_trips() {
        let values = FilterValues::Date(vec![
            DateFilter::relative(DateRangeUnit::Days, 10),
            DateFilter::absolute("2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z"),
        ]);
        let tree = flatten_criteria(&values, NumberEncoding::DecimalString);
        assert_eq!(
            tree,
            json!([
                {"date_range": [{"unit": "DAYS", "value": 10}]},
                {"start": "2024-01-01T00:00:00Z", "end": "2024-01-02T00:00:00Z"}
            ])
        );
        assert_eq!(expand_criteria(CriteriaKind::Date, &tree, &strict()).unwrap(), values);
    }

    #[test]
    fn test_date_range_as_bare_object() {
        let tree = json!([{"date_range": {"unit": "DAYS", "value": "3"}}]);
        let values = expand_criteria(CriteriaKind::Date, &tree, &strict()).unwrap();
        assert_eq!(
            values,
            FilterValues::Date(vec![DateFilter::relative(DateRangeUnit::Days, 3)])
        );
    }

    #[test]
    fn test_ambiguous_date_filter() {
        let tree = json!([{
            "start": "2024-01-01T00:00:00Z",
            "date_range": [{"unit": "DAYS", "value": 1}]
        }]);

        let err = expand_criteria(CriteriaKind::Date, &tree, &strict()).unwrap_err();
        assert_matches!(
            err.issues(),
            [issue] if issue.kind == IssueKind::AmbiguousDateFilter
        );

        let legacy = expand_criteria(CriteriaKind::Date, &tree, &CodecOptions::legacy()).unwrap();
        assert_eq!(legacy.len(), 1);
    }
}
