use std::collections::BTreeSet;

use super::domain::{ApprovalRules, BulkCriteria, ContactRoute, DefaultPosture, PerRequestRules};

/// Rules served when the core service cannot be reached or is not configured.
pub fn default_rules() -> ApprovalRules {
    ApprovalRules {
        bulk: BulkCriteria {
            publicly_traded: false,
            duns_verified: true,
            min_score: 80,
            min_years_on_network: 2,
            min_active_trading_pairs: 3,
            allowlist_ids: BTreeSet::new(),
        },
        per_request: PerRequestRules {
            min_score: 60,
            allowed_business_types: ["Corporation", "LLC", "Partnership"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            allowed_regions: BTreeSet::new(),
            blocklist_ids: BTreeSet::new(),
            default_posture: DefaultPosture::AutoApproveWithRules,
        },
        contact: ContactRoute {
            email: "approvals@example.com".to_string(),
            phone: String::new(),
        },
    }
}
