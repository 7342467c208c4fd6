//! Filter predicate wire types
//!
//! One struct per predicate shape, serialized with the API member names.
//! Every member is optional on the wire: the API accepts and returns partial
//! predicates, and the codecs never invent values that were not given.

use super::enums::{DateRangeUnit, MapFilterComparison, StringFilterComparison};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CRITERIA KINDS
// ============================================================================

/// Predicate shape a filter field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CriteriaKind {
    String,
    Number,
    Date,
    Map,
    Ip,
    Keyword,
}

impl CriteriaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Date => "date",
            Self::Map => "map",
            Self::Ip => "ip",
            Self::Keyword => "keyword",
        }
    }
}

impl fmt::Display for CriteriaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// PREDICATES
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StringFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<StringFilterComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl StringFilter {
    pub fn new(comparison: StringFilterComparison, value: impl Into<String>) -> Self {
        Self {
            comparison: Some(comparison),
            value: Some(value.into()),
        }
    }
}

/// Numeric range predicate; each bound is independent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NumberFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<f64>,
}

impl NumberFilter {
    pub fn equal_to(value: f64) -> Self {
        Self {
            eq: Some(value),
            ..Self::default()
        }
    }

    pub fn between(gte: f64, lte: f64) -> Self {
        Self {
            eq: None,
            gte: Some(gte),
            lte: Some(lte),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.eq.is_none() && self.gte.is_none() && self.lte.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<DateRangeUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
}

/// Date predicate as the API models it: absolute bounds and a relative
/// range side by side. Use [`DateFilter::shape`] for the tagged view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DateFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

/// Tagged view of a [`DateFilter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilterShape<'a> {
    Absolute {
        start: Option<&'a str>,
        end: Option<&'a str>,
    },
    Relative(&'a DateRange),
}

impl DateFilter {
    pub fn absolute(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
            date_range: None,
        }
    }

    pub fn relative(unit: DateRangeUnit, value: i32) -> Self {
        Self {
            start: None,
            end: None,
            date_range: Some(DateRange {
                unit: Some(unit),
                value: Some(value),
            }),
        }
    }

    pub fn has_absolute(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Tagged shape, `None` when both shapes are populated.
    /// A filter with nothing set reads as an open absolute range.
    pub fn shape(&self) -> Option<DateFilterShape<'_>> {
        match (&self.date_range, self.has_absolute()) {
            (Some(_), true) => None,
            (Some(range), false) => Some(DateFilterShape::Relative(range)),
            (None, _) => Some(DateFilterShape::Absolute {
                start: self.start.as_deref(),
                end: self.end.as_deref(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MapFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<MapFilterComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl MapFilter {
    pub fn new(
        comparison: MapFilterComparison,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            comparison: Some(comparison),
            key: Some(key.into()),
            value: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
}

impl IpFilter {
    pub fn new(cidr: impl Into<String>) -> Self {
        Self {
            cidr: Some(cidr.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeywordFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl KeywordFilter {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }
}

// ============================================================================
// FILTER VALUES
// ============================================================================

/// Unordered predicates attached to one filter field.
/// Deserializing needs the field's kind, see `FilterSet::from_wire`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValues {
    String(Vec<StringFilter>),
    Number(Vec<NumberFilter>),
    Date(Vec<DateFilter>),
    Map(Vec<MapFilter>),
    Ip(Vec<IpFilter>),
    Keyword(Vec<KeywordFilter>),
}

impl FilterValues {
    pub fn kind(&self) -> CriteriaKind {
        match self {
            Self::String(_) => CriteriaKind::String,
            Self::Number(_) => CriteriaKind::Number,
            Self::Date(_) => CriteriaKind::Date,
            Self::Map(_) => CriteriaKind::Map,
            Self::Ip(_) => CriteriaKind::Ip,
            Self::Keyword(_) => CriteriaKind::Keyword,
        }
    }

    /// Empty collection of the given kind
    pub fn empty(kind: CriteriaKind) -> Self {
        match kind {
            CriteriaKind::String => Self::String(Vec::new()),
            CriteriaKind::Number => Self::Number(Vec::new()),
            CriteriaKind::Date => Self::Date(Vec::new()),
            CriteriaKind::Map => Self::Map(Vec::new()),
            CriteriaKind::Ip => Self::Ip(Vec::new()),
            CriteriaKind::Keyword => Self::Keyword(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::String(v) => v.len(),
            Self::Number(v) => v.len(),
            Self::Date(v) => v.len(),
            Self::Map(v) => v.len(),
            Self::Ip(v) => v.len(),
            Self::Keyword(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Equality as unordered multisets
    pub fn same_members(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => multiset_eq(a, b),
            (Self::Number(a), Self::Number(b)) => multiset_eq(a, b),
            (Self::Date(a), Self::Date(b)) => multiset_eq(a, b),
            (Self::Map(a), Self::Map(b)) => multiset_eq(a, b),
            (Self::Ip(a), Self::Ip(b)) => multiset_eq(a, b),
            (Self::Keyword(a), Self::Keyword(b)) => multiset_eq(a, b),
            _ => false,
        }
    }
}

fn multiset_eq<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|item| {
        let found = b
            .iter()
            .enumerate()
            .find(|(i, candidate)| !used[*i] && *candidate == item)
            .map(|(i, _)| i);
        match found {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}
