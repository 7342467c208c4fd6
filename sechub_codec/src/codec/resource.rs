//! Insight and automation rule codecs

use super::context::ExpandContext;
use super::filter_set::{expand_filters, flatten_filter_set};
use crate::config::CodecOptions;
use crate::error::{CodecError, IssueKind};
use crate::registry::Vocabulary;
use crate::tree::{self, TreePath};
use crate::types::{
    AutomationRule, AutomationRulesAction, AutomationRulesActionType, FilterSet,
    FindingFieldsUpdate, Insight, NoteUpdate, RelatedFinding, RuleStatus, SeverityLabel,
    SeverityUpdate, VerificationState, WorkflowStatus, WorkflowUpdate,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// ============================================================================
// INSIGHT
// ============================================================================

pub fn expand_insight(tree: &Value, options: &CodecOptions) -> Result<Insight, CodecError> {
    let mut ctx = ExpandContext::new(options);
    let root = TreePath::root();
    let empty = Map::new();
    let map = root_block(&mut ctx, tree, &empty);

    let insight = Insight {
        insight_arn: ctx.string(map, "arn", &root),
        name: ctx.required_string(map, "name", &root),
        group_by_attribute: ctx.required_string(map, "group_by_attribute", &root),
        filters: expand_filter_block(&mut ctx, Vocabulary::Insight, map, "filters", &root)
            .unwrap_or_else(|| FilterSet::new(Vocabulary::Insight)),
    };
    ctx.finish(insight)
}

pub fn flatten_insight(insight: &Insight) -> Value {
    let mut map = Map::new();
    if let Some(arn) = &insight.insight_arn {
        map.insert("arn".into(), Value::String(arn.clone()));
    }
    map.insert("name".into(), Value::String(insight.name.clone()));
    map.insert(
        "group_by_attribute".into(),
        Value::String(insight.group_by_attribute.clone()),
    );
    map.insert("filters".into(), filter_block(&insight.filters));
    Value::Object(map)
}

// ============================================================================
// AUTOMATION RULE
// ============================================================================

pub fn expand_automation_rule(
    tree: &Value,
    options: &CodecOptions,
) -> Result<AutomationRule, CodecError> {
    let mut ctx = ExpandContext::new(options);
    let root = TreePath::root();
    let empty = Map::new();
    let map = root_block(&mut ctx, tree, &empty);

    let rule_order = match map.get("rule_order").filter(|v| !v.is_null()) {
        Some(value) => ctx.integer(value, &root.field("rule_order")).unwrap_or_default(),
        None => {
            ctx.report(root.field("rule_order"), IssueKind::MissingAttribute { name: "rule_order" });
            0
        }
    };

    let actions_path = root.field("actions");
    let actions: Vec<AutomationRulesAction> = map
        .get("actions")
        .map(tree::elements)
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(i, element)| {
            let path = actions_path.index(i);
            ctx.object(element, &path)
                .map(|action| expand_action(&mut ctx, action, &path))
        })
        .collect();

    let rule = AutomationRule {
        rule_arn: ctx.string(map, "arn", &root),
        rule_name: ctx.required_string(map, "rule_name", &root),
        rule_order,
        rule_status: ctx
            .string(map, "rule_status", &root)
            .map(|s| RuleStatus::parse(&s)),
        description: ctx.required_string(map, "description", &root),
        is_terminal: map
            .get("is_terminal")
            .and_then(|value| ctx.boolean(value, &root.field("is_terminal")))
            .unwrap_or(false),
        criteria: expand_filter_block(&mut ctx, Vocabulary::AutomationRule, map, "criteria", &root),
        actions,
    };
    ctx.finish(rule)
}

pub fn flatten_automation_rule(rule: &AutomationRule) -> Value {
    let mut map = Map::new();
    if let Some(arn) = &rule.rule_arn {
        map.insert("arn".into(), Value::String(arn.clone()));
    }
    map.insert("rule_name".into(), Value::String(rule.rule_name.clone()));
    map.insert("rule_order".into(), Value::from(rule.rule_order));
    if let Some(status) = &rule.rule_status {
        map.insert("rule_status".into(), Value::String(status.as_str().to_string()));
    }
    map.insert("description".into(), Value::String(rule.description.clone()));
    map.insert("is_terminal".into(), Value::Bool(rule.is_terminal));
    if let Some(criteria) = &rule.criteria {
        map.insert("criteria".into(), filter_block(criteria));
    }
    map.insert(
        "actions".into(),
        Value::Array(rule.actions.iter().map(flatten_action).collect()),
    );
    Value::Object(map)
}

// ============================================================================
// ACTIONS
// ============================================================================

fn expand_action(
    ctx: &mut ExpandContext<'_>,
    map: &Map<String, Value>,
    path: &TreePath,
) -> AutomationRulesAction {
    AutomationRulesAction {
        r#type: ctx
            .string(map, "type", path)
            .map(|s| AutomationRulesActionType::parse(&s)),
        finding_fields_update: map
            .get("finding_fields_update")
            .and_then(tree::block)
            .map(|update| {
                expand_finding_fields_update(ctx, update, &path.field("finding_fields_update").index(0))
            }),
    }
}

fn expand_finding_fields_update(
    ctx: &mut ExpandContext<'_>,
    map: &Map<String, Value>,
    path: &TreePath,
) -> FindingFieldsUpdate {
    let note = map.get("note").and_then(tree::block).map(|note| {
        let note_path = path.field("note").index(0);
        NoteUpdate {
            text: ctx.required_string(note, "text", &note_path),
            updated_by: ctx.required_string(note, "updated_by", &note_path),
        }
    });

    let related_path = path.field("related_findings");
    let related_findings: Vec<RelatedFinding> = map
        .get("related_findings")
        .map(tree::elements)
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(i, element)| {
            let element_path = related_path.index(i);
            ctx.object(element, &element_path).map(|finding| RelatedFinding {
                id: ctx.required_string(finding, "id", &element_path),
                product_arn: ctx.required_string(finding, "product_arn", &element_path),
            })
        })
        .collect();

    let severity = map.get("severity").and_then(tree::block).map(|severity| {
        let severity_path = path.field("severity").index(0);
        SeverityUpdate {
            label: ctx
                .string(severity, "label", &severity_path)
                .map(|s| SeverityLabel::parse(&s)),
            product: severity
                .get("product")
                .and_then(|value| ctx.double(value, &severity_path.field("product"))),
        }
    });

    let mut user_defined_fields = BTreeMap::new();
    if let Some(fields) = map.get("user_defined_fields") {
        let fields_path = path.field("user_defined_fields");
        if let Some(fields) = ctx.object(fields, &fields_path) {
            for (key, value) in fields {
                if let Some(value) = ctx.text(value, &fields_path.field(key)) {
                    user_defined_fields.insert(key.clone(), value);
                }
            }
        }
    }

    let workflow = map.get("workflow").and_then(tree::block).map(|workflow| WorkflowUpdate {
        status: ctx
            .string(workflow, "status", &path.field("workflow").index(0))
            .map(|s| WorkflowStatus::parse(&s)),
    });

    FindingFieldsUpdate {
        confidence: map
            .get("confidence")
            .and_then(|value| ctx.integer(value, &path.field("confidence"))),
        criticality: map
            .get("criticality")
            .and_then(|value| ctx.integer(value, &path.field("criticality"))),
        note,
        related_findings,
        severity,
        types: ctx.string_set(map, "types", path).unwrap_or_default(),
        user_defined_fields,
        verification_state: ctx
            .string(map, "verification_state", path)
            .map(|s| VerificationState::parse(&s)),
        workflow,
    }
}

fn flatten_action(action: &AutomationRulesAction) -> Value {
    let mut map = Map::new();
    if let Some(action_type) = &action.r#type {
        map.insert("type".into(), Value::String(action_type.as_str().to_string()));
    }
    if let Some(update) = &action.finding_fields_update {
        map.insert(
            "finding_fields_update".into(),
            tree::single_block(flatten_finding_fields_update(update)),
        );
    }
    Value::Object(map)
}

fn flatten_finding_fields_update(update: &FindingFieldsUpdate) -> Map<String, Value> {
    let mut map = Map::new();
    if let Some(confidence) = update.confidence {
        map.insert("confidence".into(), Value::from(confidence));
    }
    if let Some(criticality) = update.criticality {
        map.insert("criticality".into(), Value::from(criticality));
    }
    if let Some(note) = &update.note {
        let mut note_map = Map::new();
        note_map.insert("text".into(), Value::String(note.text.clone()));
        note_map.insert("updated_by".into(), Value::String(note.updated_by.clone()));
        map.insert("note".into(), tree::single_block(note_map));
    }
    if !update.related_findings.is_empty() {
        let findings = update
            .related_findings
            .iter()
            .map(|finding| {
                let mut finding_map = Map::new();
                finding_map.insert("id".into(), Value::String(finding.id.clone()));
                finding_map.insert(
                    "product_arn".into(),
                    Value::String(finding.product_arn.clone()),
                );
                Value::Object(finding_map)
            })
            .collect();
        map.insert("related_findings".into(), Value::Array(findings));
    }
    if let Some(severity) = &update.severity {
        let mut severity_map = Map::new();
        if let Some(label) = &severity.label {
            severity_map.insert("label".into(), Value::String(label.as_str().to_string()));
        }
        if let Some(product) = severity.product.and_then(serde_json::Number::from_f64) {
            severity_map.insert("product".into(), Value::Number(product));
        }
        map.insert("severity".into(), tree::single_block(severity_map));
    }
    if !update.types.is_empty() {
        map.insert(
            "types".into(),
            Value::Array(update.types.iter().cloned().map(Value::String).collect()),
        );
    }
    if !update.user_defined_fields.is_empty() {
        let fields = update
            .user_defined_fields
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();
        map.insert("user_defined_fields".into(), Value::Object(fields));
    }
    if let Some(state) = &update.verification_state {
        map.insert(
            "verification_state".into(),
            Value::String(state.as_str().to_string()),
        );
    }
    if let Some(workflow) = &update.workflow {
        let mut workflow_map = Map::new();
        if let Some(status) = &workflow.status {
            workflow_map.insert("status".into(), Value::String(status.as_str().to_string()));
        }
        map.insert("workflow".into(), tree::single_block(workflow_map));
    }
    map
}

// ============================================================================
// HELPERS
// ============================================================================

fn root_block<'v>(
    ctx: &mut ExpandContext<'_>,
    tree: &'v Value,
    empty: &'v Map<String, Value>,
) -> &'v Map<String, Value> {
    match tree::block(tree) {
        Some(map) => map,
        None => {
            ctx.report(
                TreePath::root(),
                IssueKind::UnexpectedType {
                    expected: "object",
                    found: tree::type_name(tree),
                },
            );
            empty
        }
    }
}

fn expand_filter_block(
    ctx: &mut ExpandContext<'_>,
    vocabulary: Vocabulary,
    map: &Map<String, Value>,
    key: &str,
    path: &TreePath,
) -> Option<FilterSet> {
    let block = map.get(key).and_then(tree::block)?;
    Some(expand_filters(ctx, vocabulary, block, &path.field(key)))
}

fn filter_block(set: &FilterSet) -> Value {
    match flatten_filter_set(set) {
        Value::Object(map) => tree::single_block(map),
        other => other,
    }
}
