use super::super::domain::{
    ApprovalOutcome, ApprovalRules, Criterion, DefaultPosture, EvaluationResult,
};

// Only `bulk.min_score` is consulted from the bulk partition. The allowlist, blocklist,
// listing flags, and tenure/trading-pair floors are enforced by the core service alone, so
// this fallback never yields `Reject`. Keep the asymmetry until the core contract says
// otherwise.
pub(crate) fn decide(
    rules: &ApprovalRules,
    score: i32,
    business_type: &str,
    region: &str,
) -> EvaluationResult {
    let per_request = &rules.per_request;

    match per_request.default_posture {
        DefaultPosture::AutoApproveAll => {
            return unattributed(ApprovalOutcome::AutoApprove, "Posture is auto-approve all.");
        }
        DefaultPosture::ManualOnly => {
            return unattributed(ApprovalOutcome::Queue, "Posture is manual review only.");
        }
        DefaultPosture::AutoApproveWithRules => {}
    }

    let bulk_min = i32::from(rules.bulk.min_score);
    if score >= bulk_min {
        return attributed(
            ApprovalOutcome::AutoApprove,
            format!("Score {score} meets the bulk approval minimum of {bulk_min}."),
            Criterion::BulkMinScore,
        );
    }

    let per_request_min = i32::from(per_request.min_score);
    if score < per_request_min {
        return attributed(
            ApprovalOutcome::Queue,
            format!("Score {score} is below the per-request minimum of {per_request_min}."),
            Criterion::PerRequestMinScore,
        );
    }

    if !per_request.allowed_business_types.is_empty()
        && !per_request.allowed_business_types.contains(business_type)
    {
        return attributed(
            ApprovalOutcome::Queue,
            format!("Business type \"{business_type}\" is not in the allowed list."),
            Criterion::AllowedBusinessTypes,
        );
    }

    if !per_request.allowed_regions.is_empty() && !per_request.allowed_regions.contains(region) {
        return attributed(
            ApprovalOutcome::Queue,
            format!("Region \"{region}\" is not in the allowed list."),
            Criterion::AllowedRegions,
        );
    }

    unattributed(ApprovalOutcome::AutoApprove, "All per-request rules passed.")
}

fn unattributed(result: ApprovalOutcome, reason: &str) -> EvaluationResult {
    EvaluationResult {
        result,
        reason: reason.to_string(),
        matched_criterion: None,
    }
}

fn attributed(result: ApprovalOutcome, reason: String, criterion: Criterion) -> EvaluationResult {
    EvaluationResult {
        result,
        reason,
        matched_criterion: Some(criterion.path().to_string()),
    }
}
