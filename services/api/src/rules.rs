use clap::Args;
use hai_portal::error::AppError;
use hai_portal::workflows::approvals::validation::{
    validate_bulk_criteria, validate_contact_route, validate_evaluation_input,
    validate_per_request,
};
use hai_portal::workflows::approvals::{
    default_rules, evaluate_locally, ApprovalRules, EvaluationInput, EvaluationResult,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct RulesTestArgs {
    /// Behavioral score of the requesting participant (0-100)
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) score: i32,
    /// Business type of the requester, matched exactly against the allowed list
    #[arg(long)]
    pub(crate) business_type: String,
    /// Region of the requester, matched exactly against the allowed list
    #[arg(long)]
    pub(crate) region: String,
    /// Rules document (JSON) to evaluate against instead of the defaults
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Emit the evaluation as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn print_default_rules() -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(&default_rules())?);
    Ok(())
}

pub(crate) fn run_rules_test(args: RulesTestArgs) -> Result<(), AppError> {
    let RulesTestArgs {
        score,
        business_type,
        region,
        rules,
        json,
    } = args;

    let (document, label) = match rules {
        Some(path) => {
            let document = load_rules_document(&path)?;
            (document, path.display().to_string())
        }
        None => (default_rules(), "built-in defaults".to_string()),
    };

    let input = EvaluationInput {
        behavioral_score: score,
        business_type,
        region,
    };
    validate_evaluation_input(&input)?;

    let evaluation = evaluate_locally(&document, &input);
    if json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        print!("{}", render_evaluation(&label, &document, &input, &evaluation));
    }
    Ok(())
}

fn load_rules_document(path: &Path) -> Result<ApprovalRules, AppError> {
    let raw = fs::read_to_string(path)?;
    parse_rules_document(&raw)
}

fn parse_rules_document(raw: &str) -> Result<ApprovalRules, AppError> {
    let rules: ApprovalRules = serde_json::from_str(raw)?;
    validate_bulk_criteria(&rules.bulk)?;
    validate_per_request(&rules.per_request)?;
    validate_contact_route(&rules.contact)?;
    Ok(rules)
}

fn render_evaluation(
    label: &str,
    rules: &ApprovalRules,
    input: &EvaluationInput,
    evaluation: &EvaluationResult,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Approval rule dry run ({label})\n"));
    out.push_str(&format!(
        "- Posture: {}\n",
        rules.per_request.default_posture.label()
    ));
    out.push_str(&format!(
        "- Candidate: score {} | {} | {}\n",
        input.behavioral_score, input.business_type, input.region
    ));
    out.push_str(&format!("- Decision: {}\n", evaluation.result.label()));
    out.push_str(&format!("  Reason: {}\n", evaluation.reason));
    if let Some(criterion) = &evaluation.matched_criterion {
        out.push_str(&format!("  Matched criterion: {criterion}\n"));
    }
    out
}
