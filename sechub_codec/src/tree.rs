//! Dynamic configuration tree helpers
//!
//! The dynamic tree is a `serde_json::Value`. Arrays stand for unordered sets
//! or single-element blocks; a single-element block may also be written as a
//! bare object. `null` and missing keys are equivalent.

use serde_json::{Map, Value};
use std::fmt;

// ============================================================================
// TREE PATHS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathComponent {
    Field(String),
    Index(usize),
}

/// Location of a node inside the dynamic tree, used in issue reports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreePath {
    components: Vec<PathComponent>,
}

impl TreePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse `a.b[0].c` into a path
    pub fn parse(path: &str) -> Self {
        let mut components = Vec::new();
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            let (name, indices) = match segment.find('[') {
                Some(pos) => segment.split_at(pos),
                None => (segment, ""),
            };
            if !name.is_empty() {
                components.push(PathComponent::Field(name.to_string()));
            }
            for index in indices
                .split(|c| c == '[' || c == ']')
                .filter_map(|s| s.parse::<usize>().ok())
            {
                components.push(PathComponent::Index(index));
            }
        }
        Self { components }
    }

    pub fn field(&self, name: &str) -> Self {
        let mut components = self.components.clone();
        components.push(PathComponent::Field(name.to_string()));
        Self { components }
    }

    pub fn index(&self, index: usize) -> Self {
        let mut components = self.components.clone();
        components.push(PathComponent::Index(index));
        Self { components }
    }

    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return write!(f, "<root>");
        }
        for (i, component) in self.components.iter().enumerate() {
            match component {
                PathComponent::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathComponent::Field(name) => write!(f, ".{}", name)?,
                PathComponent::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

// ============================================================================
// NODE ACCESS
// ============================================================================

/// JSON type name for diagnostics
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Members of a set-like node. A bare object counts as a one-element set.
pub fn elements(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// The map inside a single-element block, if any
pub fn block(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        Value::Array(items) => items.first().and_then(Value::as_object),
        _ => None,
    }
}

/// Whether a key holds something other than null or an empty array
pub fn is_populated(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

/// Wrap a map as a single-element block
pub fn single_block(map: Map<String, Value>) -> Value {
    Value::Array(vec![Value::Object(map)])
}
