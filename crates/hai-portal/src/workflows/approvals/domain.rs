use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for network participants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub String);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A participant's policy for accepting trading-connection requests.
///
/// Serialized with the three partitions the core service writes independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApprovalRules {
    #[serde(rename = "bulk_criteria")]
    pub bulk: BulkCriteria,
    pub per_request: PerRequestRules,
    #[serde(rename = "contact_route")]
    pub contact: ContactRoute,
}

/// Conditions for blanket pre-approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BulkCriteria {
    pub publicly_traded: bool,
    pub duns_verified: bool,
    pub min_score: u8,
    pub min_years_on_network: u32,
    pub min_active_trading_pairs: u32,
    pub allowlist_ids: BTreeSet<ParticipantId>,
}

/// Conditions applied when bulk criteria do not auto-approve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerRequestRules {
    pub min_score: u8,
    pub allowed_business_types: BTreeSet<String>,
    pub allowed_regions: BTreeSet<String>,
    pub blocklist_ids: BTreeSet<ParticipantId>,
    pub default_posture: DefaultPosture,
}

/// Where routed connection requests surface for the participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactRoute {
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPosture {
    AutoApproveAll,
    AutoApproveWithRules,
    ManualOnly,
}

impl DefaultPosture {
    pub const fn label(self) -> &'static str {
        match self {
            Self::AutoApproveAll => "Auto-approve all",
            Self::AutoApproveWithRules => "Auto-approve with rules",
            Self::ManualOnly => "Manual review only",
        }
    }
}

/// Candidate attributes supplied to a "test rules" interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluationInput {
    pub behavioral_score: i32,
    pub business_type: String,
    pub region: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalOutcome {
    AutoApprove,
    Queue,
    Reject,
}

impl ApprovalOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            Self::AutoApprove => "Auto-approve",
            Self::Queue => "Queue for review",
            Self::Reject => "Reject",
        }
    }
}

/// Decision returned by either the core service or the local evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub result: ApprovalOutcome,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_criterion: Option<String>,
}

/// Rule fields the local evaluator can attribute a decision to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    BulkMinScore,
    PerRequestMinScore,
    AllowedBusinessTypes,
    AllowedRegions,
}

impl Criterion {
    pub const fn path(self) -> &'static str {
        match self {
            Self::BulkMinScore => "bulk_criteria.min_score",
            Self::PerRequestMinScore => "per_request.min_score",
            Self::AllowedBusinessTypes => "per_request.allowed_business_types",
            Self::AllowedRegions => "per_request.allowed_regions",
        }
    }
}

/// Names of the independently writable rule partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulesPartition {
    BulkCriteria,
    PerRequest,
    ContactRoute,
}

impl RulesPartition {
    pub const fn segment(self) -> &'static str {
        match self {
            Self::BulkCriteria => "bulk_criteria",
            Self::PerRequest => "per_request",
            Self::ContactRoute => "contact_route",
        }
    }
}
