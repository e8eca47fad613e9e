use std::collections::BTreeSet;

use super::domain::{
    BulkCriteria, ContactRoute, EvaluationInput, ParticipantId, PerRequestRules,
};

pub const MAX_SCORE: i32 = 100;

/// Semantic violations caught after a payload has matched its schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    #[error("{field} must be between 0 and 100, found {found}")]
    ScoreOutOfRange { field: &'static str, found: i32 },
    #[error("{field} must not be blank")]
    Blank { field: &'static str },
    #[error("{field} contains a blank entry")]
    BlankEntry { field: &'static str },
    #[error("contact email '{0}' is not a valid address")]
    InvalidEmail(String),
    #[error("contact phone '{0}' may only contain digits, spaces, '+', '-', '(' and ')'")]
    InvalidPhone(String),
}

pub fn validate_bulk_criteria(bulk: &BulkCriteria) -> Result<(), RuleViolation> {
    check_score("bulk_criteria.min_score", i32::from(bulk.min_score))?;
    check_ids("bulk_criteria.allowlist_ids", &bulk.allowlist_ids)
}

pub fn validate_per_request(rules: &PerRequestRules) -> Result<(), RuleViolation> {
    check_score("per_request.min_score", i32::from(rules.min_score))?;
    check_entries(
        "per_request.allowed_business_types",
        &rules.allowed_business_types,
    )?;
    check_entries("per_request.allowed_regions", &rules.allowed_regions)?;
    check_ids("per_request.blocklist_ids", &rules.blocklist_ids)
}

pub fn validate_contact_route(contact: &ContactRoute) -> Result<(), RuleViolation> {
    let email = contact.email.trim();
    if email.is_empty() {
        return Err(RuleViolation::Blank {
            field: "contact_route.email",
        });
    }
    let valid_email = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid_email {
        return Err(RuleViolation::InvalidEmail(contact.email.clone()));
    }

    let phone_ok = contact
        .phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
    if !phone_ok {
        return Err(RuleViolation::InvalidPhone(contact.phone.clone()));
    }

    Ok(())
}

/// Boundary check for rule tests. The evaluator itself accepts any score.
pub fn validate_evaluation_input(input: &EvaluationInput) -> Result<(), RuleViolation> {
    check_score("behavioral_score", input.behavioral_score)?;
    if input.business_type.trim().is_empty() {
        return Err(RuleViolation::Blank {
            field: "business_type",
        });
    }
    if input.region.trim().is_empty() {
        return Err(RuleViolation::Blank { field: "region" });
    }
    Ok(())
}

fn check_score(field: &'static str, found: i32) -> Result<(), RuleViolation> {
    if (0..=MAX_SCORE).contains(&found) {
        Ok(())
    } else {
        Err(RuleViolation::ScoreOutOfRange { field, found })
    }
}

fn check_entries(field: &'static str, entries: &BTreeSet<String>) -> Result<(), RuleViolation> {
    if entries.iter().any(|entry| entry.trim().is_empty()) {
        return Err(RuleViolation::BlankEntry { field });
    }
    Ok(())
}

fn check_ids(field: &'static str, ids: &BTreeSet<ParticipantId>) -> Result<(), RuleViolation> {
    if ids.iter().any(|id| id.0.trim().is_empty()) {
        return Err(RuleViolation::BlankEntry { field });
    }
    Ok(())
}
