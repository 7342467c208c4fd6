//! Filter field registries
//!
//! Static tables mapping each filterable attribute of a vocabulary to its
//! dynamic key, API member name and predicate kind. Tables are built once per
//! process and shared read-only afterwards.

use crate::types::CriteriaKind;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

// ============================================================================
// VOCABULARIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vocabulary {
    /// `AwsSecurityFindingFilters`, used by insights
    Insight,
    /// `AutomationRulesFindingFilters`, used by automation rule criteria
    AutomationRule,
}

/// How number filter bounds are written back to the dynamic tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberEncoding {
    /// Decimal strings such as `"20.25"`
    DecimalString,
    /// JSON numbers
    Native,
}

impl Vocabulary {
    pub const ALL: [Vocabulary; 2] = [Vocabulary::Insight, Vocabulary::AutomationRule];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insight => "insight",
            Self::AutomationRule => "automation_rule",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "insight" | "insights" => Some(Self::Insight),
            "automation_rule" | "automation-rule" | "automation" => Some(Self::AutomationRule),
            _ => None,
        }
    }

    pub fn number_encoding(&self) -> NumberEncoding {
        match self {
            Self::Insight => NumberEncoding::DecimalString,
            Self::AutomationRule => NumberEncoding::Native,
        }
    }

    pub fn registry(&self) -> &'static FieldRegistry {
        match self {
            Self::Insight => INSIGHT_REGISTRY.get_or_init(|| {
                FieldRegistry::build(Vocabulary::Insight, INSIGHT_FIELDS)
            }),
            Self::AutomationRule => AUTOMATION_RULE_REGISTRY.get_or_init(|| {
                FieldRegistry::build(Vocabulary::AutomationRule, AUTOMATION_RULE_FIELDS)
            }),
        }
    }
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// FIELD REGISTRY
// ============================================================================

/// One filterable attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key in the dynamic tree
    pub name: &'static str,
    /// Member name in API JSON
    pub wire_key: &'static str,
    pub kind: CriteriaKind,
}

#[derive(Debug)]
pub struct FieldRegistry {
    vocabulary: Vocabulary,
    fields: Vec<FieldSpec>,
    by_name: HashMap<&'static str, usize>,
    by_wire_key: HashMap<&'static str, usize>,
}

impl FieldRegistry {
    fn build(vocabulary: Vocabulary, table: &[(&'static str, &'static str, CriteriaKind)]) -> Self {
        let fields: Vec<FieldSpec> = table
            .iter()
            .map(|&(name, wire_key, kind)| FieldSpec {
                name,
                wire_key,
                kind,
            })
            .collect();
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.name, i))
            .collect();
        let by_wire_key = fields
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.wire_key, i))
            .collect();

        Self {
            vocabulary,
            fields,
            by_name,
            by_wire_key,
        }
    }

    pub fn vocabulary(&self) -> Vocabulary {
        self.vocabulary
    }

    /// Look up by dynamic key
    pub fn lookup(&self, name: &str) -> Option<&FieldSpec> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Look up by API member name
    pub fn lookup_wire(&self, wire_key: &str) -> Option<&FieldSpec> {
        self.by_wire_key.get(wire_key).map(|&i| &self.fields[i])
    }

    /// Fields in table order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

static INSIGHT_REGISTRY: OnceLock<FieldRegistry> = OnceLock::new();
static AUTOMATION_RULE_REGISTRY: OnceLock<FieldRegistry> = OnceLock::new();

// ============================================================================
// FIELD TABLES
// ============================================================================

use CriteriaKind::{Date, Ip, Keyword, Map, Number, String as Str};

const INSIGHT_FIELDS: &[(&str, &str, CriteriaKind)] = &[
    ("aws_account_id", "AwsAccountId", Str),
    ("company_name", "CompanyName", Str),
    ("compliance_status", "ComplianceStatus", Str),
    ("confidence", "Confidence", Number),
    ("created_at", "CreatedAt", Date),
    ("criticality", "Criticality", Number),
    ("description", "Description", Str),
    ("finding_provider_fields_confidence", "FindingProviderFieldsConfidence", Number),
    ("finding_provider_fields_criticality", "FindingProviderFieldsCriticality", Number),
    ("finding_provider_fields_related_findings_id", "FindingProviderFieldsRelatedFindingsId", Str),
    ("finding_provider_fields_related_findings_product_arn", "FindingProviderFieldsRelatedFindingsProductArn", Str),
    ("finding_provider_fields_severity_label", "FindingProviderFieldsSeverityLabel", Str),
    ("finding_provider_fields_severity_original", "FindingProviderFieldsSeverityOriginal", Str),
    ("finding_provider_fields_types", "FindingProviderFieldsTypes", Str),
    ("first_observed_at", "FirstObservedAt", Date),
    ("generator_id", "GeneratorId", Str),
    ("id", "Id", Str),
    ("keyword", "Keyword", Keyword),
    ("last_observed_at", "LastObservedAt", Date),
    ("malware_name", "MalwareName", Str),
    ("malware_path", "MalwarePath", Str),
    ("malware_state", "MalwareState", Str),
    ("malware_type", "MalwareType", Str),
    ("network_destination_domain", "NetworkDestinationDomain", Str),
    ("network_destination_ipv4", "NetworkDestinationIpV4", Ip),
    ("network_destination_ipv6", "NetworkDestinationIpV6", Ip),
    ("network_destination_port", "NetworkDestinationPort", Number),
    ("network_direction", "NetworkDirection", Str),
    ("network_protocol", "NetworkProtocol", Str),
    ("network_source_domain", "NetworkSourceDomain", Str),
    ("network_source_ipv4", "NetworkSourceIpV4", Ip),
    ("network_source_ipv6", "NetworkSourceIpV6", Ip),
    ("network_source_mac", "NetworkSourceMac", Str),
    ("network_source_port", "NetworkSourcePort", Number),
    ("note_text", "NoteText", Str),
    ("note_updated_at", "NoteUpdatedAt", Date),
    ("note_updated_by", "NoteUpdatedBy", Str),
    ("process_launched_at", "ProcessLaunchedAt", Date),
    ("process_name", "ProcessName", Str),
    ("process_parent_pid", "ProcessParentPid", Number),
    ("process_path", "ProcessPath", Str),
    ("process_pid", "ProcessPid", Number),
    ("process_terminated_at", "ProcessTerminatedAt", Date),
    ("product_arn", "ProductArn", Str),
    ("product_fields", "ProductFields", Map),
    ("product_name", "ProductName", Str),
    ("recommendation_text", "RecommendationText", Str),
    ("record_state", "RecordState", Str),
    ("related_findings_id", "RelatedFindingsId", Str),
    ("related_findings_product_arn", "RelatedFindingsProductArn", Str),
    ("resource_aws_ec2_instance_iam_instance_profile_arn", "ResourceAwsEc2InstanceIamInstanceProfileArn", Str),
    ("resource_aws_ec2_instance_image_id", "ResourceAwsEc2InstanceImageId", Str),
    ("resource_aws_ec2_instance_ipv4_addresses", "ResourceAwsEc2InstanceIpV4Addresses", Ip),
    ("resource_aws_ec2_instance_ipv6_addresses", "ResourceAwsEc2InstanceIpV6Addresses", Ip),
    ("resource_aws_ec2_instance_key_name", "ResourceAwsEc2InstanceKeyName", Str),
    ("resource_aws_ec2_instance_launched_at", "ResourceAwsEc2InstanceLaunchedAt", Date),
    ("resource_aws_ec2_instance_subnet_id", "ResourceAwsEc2InstanceSubnetId", Str),
    ("resource_aws_ec2_instance_type", "ResourceAwsEc2InstanceType", Str),
    ("resource_aws_ec2_instance_vpc_id", "ResourceAwsEc2InstanceVpcId", Str),
    ("resource_aws_iam_access_key_created_at", "ResourceAwsIamAccessKeyCreatedAt", Date),
    ("resource_aws_iam_access_key_status", "ResourceAwsIamAccessKeyStatus", Str),
    ("resource_aws_iam_access_key_user_name", "ResourceAwsIamAccessKeyUserName", Str),
    ("resource_aws_s3_bucket_owner_id", "ResourceAwsS3BucketOwnerId", Str),
    ("resource_aws_s3_bucket_owner_name", "ResourceAwsS3BucketOwnerName", Str),
    ("resource_container_image_id", "ResourceContainerImageId", Str),
    ("resource_container_image_name", "ResourceContainerImageName", Str),
    ("resource_container_launched_at", "ResourceContainerLaunchedAt", Date),
    ("resource_container_name", "ResourceContainerName", Str),
    ("resource_details_other", "ResourceDetailsOther", Map),
    ("resource_id", "ResourceId", Str),
    ("resource_partition", "ResourcePartition", Str),
    ("resource_region", "ResourceRegion", Str),
    ("resource_tags", "ResourceTags", Map),
    ("resource_type", "ResourceType", Str),
    ("severity_label", "SeverityLabel", Str),
    ("source_url", "SourceUrl", Str),
    ("threat_intel_indicator_category", "ThreatIntelIndicatorCategory", Str),
    ("threat_intel_indicator_last_observed_at", "ThreatIntelIndicatorLastObservedAt", Date),
    ("threat_intel_indicator_source", "ThreatIntelIndicatorSource", Str),
    ("threat_intel_indicator_source_url", "ThreatIntelIndicatorSourceUrl", Str),
    ("threat_intel_indicator_type", "ThreatIntelIndicatorType", Str),
    ("threat_intel_indicator_value", "ThreatIntelIndicatorValue", Str),
    ("title", "Title", Str),
    ("type", "Type", Str),
    ("updated_at", "UpdatedAt", Date),
    ("user_defined_values", "UserDefinedFields", Map),
    ("verification_state", "VerificationState", Str),
    ("workflow_status", "WorkflowStatus", Str),
];

const AUTOMATION_RULE_FIELDS: &[(&str, &str, CriteriaKind)] = &[
    ("aws_account_id", "AwsAccountId", Str),
    ("aws_account_name", "AwsAccountName", Str),
    ("company_name", "CompanyName", Str),
    ("compliance_associated_standards_id", "ComplianceAssociatedStandardsId", Str),
    ("compliance_security_control_id", "ComplianceSecurityControlId", Str),
    ("compliance_status", "ComplianceStatus", Str),
    ("confidence", "Confidence", Number),
    ("created_at", "CreatedAt", Date),
    ("criticality", "Criticality", Number),
    ("description", "Description", Str),
    ("first_observed_at", "FirstObservedAt", Date),
    ("generator_id", "GeneratorId", Str),
    ("id", "Id", Str),
    ("last_observed_at", "LastObservedAt", Date),
    ("note_text", "NoteText", Str),
    ("note_updated_at", "NoteUpdatedAt", Date),
    ("note_updated_by", "NoteUpdatedBy", Str),
    ("product_arn", "ProductArn", Str),
    ("product_name", "ProductName", Str),
    ("record_state", "RecordState", Str),
    ("related_findings_id", "RelatedFindingsId", Str),
    ("related_findings_product_arn", "RelatedFindingsProductArn", Str),
    ("resource_application_arn", "ResourceApplicationArn", Str),
    ("resource_application_name", "ResourceApplicationName", Str),
    ("resource_details_other", "ResourceDetailsOther", Map),
    ("resource_id", "ResourceId", Str),
    ("resource_partition", "ResourcePartition", Str),
    ("resource_region", "ResourceRegion", Str),
    ("resource_tags", "ResourceTags", Map),
    ("resource_type", "ResourceType", Str),
    ("severity_label", "SeverityLabel", Str),
    ("source_url", "SourceUrl", Str),
    ("title", "Title", Str),
    ("type", "Type", Str),
    ("updated_at", "UpdatedAt", Date),
    ("user_defined_fields", "UserDefinedFields", Map),
    ("verification_state", "VerificationState", Str),
    ("workflow_status", "WorkflowStatus", Str),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_sizes() {
        assert_eq!(Vocabulary::Insight.registry().len(), 88);
        assert_eq!(Vocabulary::AutomationRule.registry().len(), 38);
    }

    #[test]
    fn test_names_and_wire_keys_are_unique() {
        for vocabulary in Vocabulary::ALL {
            let registry = vocabulary.registry();
            for spec in registry.fields() {
                assert_eq!(registry.lookup(spec.name), Some(spec));
                assert_eq!(registry.lookup_wire(spec.wire_key), Some(spec));
            }
        }
    }

    #[test]
    fn test_source_url_maps_to_its_own_member() {
        let registry = Vocabulary::Insight.registry();
        assert_eq!(registry.lookup("source_url").unwrap().wire_key, "SourceUrl");
        assert_eq!(
            registry.lookup("threat_intel_indicator_source_url").unwrap().wire_key,
            "ThreatIntelIndicatorSourceUrl"
        );
    }

    #[test]
    fn test_vocabulary_specific_fields() {
        let insight = Vocabulary::Insight.registry();
        let automation = Vocabulary::AutomationRule.registry();

        assert_eq!(insight.lookup("keyword").unwrap().kind, CriteriaKind::Keyword);
        assert!(automation.lookup("keyword").is_none());
        assert!(insight.lookup("aws_account_name").is_none());
        assert_eq!(
            insight.lookup("user_defined_values").unwrap().wire_key,
            automation.lookup("user_defined_fields").unwrap().wire_key
        );
    }

    #[test]
    fn test_number_encoding() {
        assert_eq!(Vocabulary::Insight.number_encoding(), NumberEncoding::DecimalString);
        assert_eq!(Vocabulary::AutomationRule.number_encoding(), NumberEncoding::Native);
        assert_eq!(Vocabulary::parse("automation-rule"), Some(Vocabulary::AutomationRule));
    }
}
