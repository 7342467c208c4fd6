//! Expand context
//!
//! Carries the options of one expand pass and collects every issue found,
//! so a tree is rejected once with all of its problems listed.

use crate::config::CodecOptions;
use crate::error::{CodecError, FieldIssue, IssueKind, MalformedInput};
use crate::logging::codes;
use crate::tree::{self, TreePath};
use crate::{codec_debug, codec_error, codec_warn};
use serde_json::{Map, Value};

pub struct ExpandContext<'a> {
    options: &'a CodecOptions,
    issues: Vec<FieldIssue>,
}

impl<'a> ExpandContext<'a> {
    pub fn new(options: &'a CodecOptions) -> Self {
        Self {
            options,
            issues: Vec::new(),
        }
    }

    pub fn options(&self) -> &CodecOptions {
        self.options
    }

    pub fn is_strict(&self) -> bool {
        self.options.is_strict()
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Record an issue regardless of mode
    pub fn report(&mut self, path: TreePath, kind: IssueKind) {
        codec_warn!(code = kind.code(), "Rejecting field", "path" => path, "issue" => kind);
        self.issues.push(FieldIssue::new(path, kind));
    }

    /// Record an issue in strict mode, only log it in legacy mode
    pub fn report_strict(&mut self, path: TreePath, kind: IssueKind) {
        if self.is_strict() {
            self.report(path, kind);
        } else {
            codec_debug!("Ignoring malformed field", "path" => path, "issue" => kind);
        }
    }

    /// Hand back `value` if no issue was recorded
    pub fn finish<T>(self, value: T) -> Result<T, CodecError> {
        if self.issues.is_empty() {
            return Ok(value);
        }
        codec_error!(
            codes::malformed::MALFORMED_INPUT,
            "Configuration tree rejected",
            "issues" => self.issues.len()
        );
        Err(MalformedInput::new(self.issues).into())
    }

    // ========================================================================
    // ATTRIBUTE READERS
    // ========================================================================

    /// Non-empty string attribute. Empty strings read as unset.
    pub fn string(&mut self, map: &Map<String, Value>, key: &str, path: &TreePath) -> Option<String> {
        match map.get(key)? {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => {
                let kind = IssueKind::UnexpectedType {
                    expected: "string",
                    found: tree::type_name(other),
                };
                self.report_strict(path.field(key), kind);
                None
            }
        }
    }

    /// Required string attribute, recorded as missing when absent
    pub fn required_string(
        &mut self,
        map: &Map<String, Value>,
        key: &'static str,
        path: &TreePath,
    ) -> String {
        match self.string(map, key, path) {
            Some(s) => s,
            None => {
                self.report(path.field(key), IssueKind::MissingAttribute { name: key });
                String::new()
            }
        }
    }

    /// Decimal bound written as a string or a JSON number
    pub fn decimal(&mut self, map: &Map<String, Value>, key: &str, path: &TreePath) -> Option<f64> {
        let raw = match map.get(key)? {
            Value::Number(n) => return n.as_f64(),
            Value::String(s) if s.is_empty() => return None,
            Value::String(s) => s,
            Value::Null => return None,
            other => {
                let kind = IssueKind::UnexpectedType {
                    expected: "decimal number",
                    found: tree::type_name(other),
                };
                self.report_strict(path.field(key), kind);
                return None;
            }
        };

        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() || !self.is_strict() => Some(n),
            _ => {
                let kind = IssueKind::MalformedScalar {
                    raw: raw.clone(),
                    expected: "decimal number",
                };
                self.report_strict(path.field(key), kind);
                None
            }
        }
    }

    /// 32-bit integer written as a JSON number or a string
    pub fn integer(&mut self, value: &Value, path: &TreePath) -> Option<i32> {
        let parsed = match value {
            Value::Null => return None,
            Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<i32>().ok(),
            other => {
                let kind = IssueKind::UnexpectedType {
                    expected: "integer",
                    found: tree::type_name(other),
                };
                self.report_strict(path.clone(), kind);
                return None;
            }
        };
        if parsed.is_none() {
            let kind = IssueKind::MalformedScalar {
                raw: scalar_text(value),
                expected: "32-bit integer",
            };
            self.report_strict(path.clone(), kind);
        }
        parsed
    }

    /// Floating point value written as a JSON number or a string
    pub fn double(&mut self, value: &Value, path: &TreePath) -> Option<f64> {
        let parsed = match value {
            Value::Null => return None,
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            other => {
                let kind = IssueKind::UnexpectedType {
                    expected: "number",
                    found: tree::type_name(other),
                };
                self.report_strict(path.clone(), kind);
                return None;
            }
        };
        if parsed.is_none() {
            let kind = IssueKind::MalformedScalar {
                raw: scalar_text(value),
                expected: "number",
            };
            self.report_strict(path.clone(), kind);
        }
        parsed
    }

    /// Boolean written natively or as `"true"` / `"false"`
    pub fn boolean(&mut self, value: &Value, path: &TreePath) -> Option<bool> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => {
                    let kind = IssueKind::MalformedScalar {
                        raw: s.clone(),
                        expected: "boolean",
                    };
                    self.report_strict(path.clone(), kind);
                    None
                }
            },
            other => {
                let kind = IssueKind::UnexpectedType {
                    expected: "boolean",
                    found: tree::type_name(other),
                };
                self.report_strict(path.clone(), kind);
                None
            }
        }
    }

    /// String member of a scalar node, for list elements
    pub fn text(&mut self, value: &Value, path: &TreePath) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => {
                let kind = IssueKind::UnexpectedType {
                    expected: "string",
                    found: tree::type_name(other),
                };
                self.report_strict(path.clone(), kind);
                None
            }
        }
    }

    /// Timestamp attribute, kept verbatim. Checked as RFC 3339 when
    /// timestamp validation is on in strict mode.
    pub fn timestamp(&mut self, map: &Map<String, Value>, key: &str, path: &TreePath) -> Option<String> {
        let raw = self.string(map, key, path)?;
        if self.is_strict()
            && self.options.validate_timestamps
            && chrono::DateTime::parse_from_rfc3339(&raw).is_err()
        {
            let kind = IssueKind::MalformedScalar {
                raw: raw.clone(),
                expected: "RFC 3339 timestamp",
            };
            self.report(path.field(key), kind);
        }
        Some(raw)
    }

    /// Set of strings, `None` when the key is absent or null
    pub fn string_set(
        &mut self,
        map: &Map<String, Value>,
        key: &str,
        path: &TreePath,
    ) -> Option<Vec<String>> {
        let value = map.get(key).filter(|v| !v.is_null())?;
        let path = path.field(key);
        let items = tree::elements(value)
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| self.text(item, &path.index(i)))
            .filter(|s| !s.is_empty())
            .collect();
        Some(items)
    }

    /// Map node, recorded as a type issue otherwise
    pub fn object<'v>(&mut self, value: &'v Value, path: &TreePath) -> Option<&'v Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                let kind = IssueKind::UnexpectedType {
                    expected: "object",
                    found: tree::type_name(other),
                };
                self.report_strict(path.clone(), kind);
                None
            }
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
