//! CLI binary for evaluating a rule tree via stdin.
//!
//! Usage:
//!   echo '{"tree": {...}, "project": {"total_area": 250}, "engineers": [...],
//!          "mode": "CHECK_ENGINEERS", "date": "2025-01-01"}' \
//!     | cargo run --bin evaluate
//!
//! Input (JSON on stdin):
//!   - tree: Object, the rule tree (same shape as the YAML documents, same size limit)
//!   - project: Object, the project snapshot (`total_area`)
//!   - engineers: Array, the candidate pool
//!   - mode: String, `MODIFY_ENGINEERS` or `CHECK_ENGINEERS`
//!   - date: String, evaluation date (YYYY-MM-DD) for license expiry
//!   - allowed_disciplines: Optional<Vec<String>>, evaluate only these disciplines
//!   - levels: Optional<Vec<Object>>, global level catalog (`value`, `order`)
//!   - trace: Optional<bool>, include a rendered evaluation trace
//!
//! Output (JSON on stdout):
//!   - passed: bool, the verdict
//!   - selected_engineers: Vec<String>, ids attributed to requirements
//!   - unassigned: Vec<String>, pool ids nobody accounted for (check mode)
//!   - issues: Vec<Object>, structural defects of a malformed tree
//!   - rejected: Optional<String>, why the inputs were refused (e.g. pool too large)
//!   - trace: Optional<String>, rendered evaluation trace
//!   - error: Optional<String>, error message if the request could not be handled

use eligibility_engine::{
    parse_evaluation_date, EligibilityEvaluator, Engineer, EvaluationMode, LevelCatalog,
    LevelOption, Project, RuleNode, StructuralIssue,
};
use std::io::Read;

#[derive(serde::Deserialize)]
struct EvaluateRequest {
    tree: serde_json::Value,
    project: Project,
    #[serde(default)]
    engineers: Vec<Engineer>,
    mode: EvaluationMode,
    date: String,
    #[serde(default)]
    allowed_disciplines: Vec<String>,
    #[serde(default)]
    levels: Option<Vec<LevelOption>>,
    #[serde(default)]
    trace: bool,
}

#[derive(serde::Serialize, Default)]
struct EvaluateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    passed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected_engineers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unassigned: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<StructuralIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn error_response(msg: String) -> EvaluateResponse {
    EvaluateResponse {
        error: Some(msg),
        ..Default::default()
    }
}

fn fail(msg: String) -> ! {
    let resp = error_response(msg);
    println!("{}", serde_json::to_string(&resp).unwrap_or_default());
    std::process::exit(1);
}

#[cfg(feature = "cli-logging")]
fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(not(feature = "cli-logging"))]
fn init_logging() {}

fn main() {
    init_logging();

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        fail(format!("Failed to read stdin: {e}"));
    }

    let request: EvaluateRequest = match serde_json::from_str(&input) {
        Ok(r) => r,
        Err(e) => fail(format!("Failed to parse request JSON: {e}")),
    };

    let date = match parse_evaluation_date(&request.date) {
        Ok(d) => d,
        Err(e) => fail(format!("{e}: expected YYYY-MM-DD")),
    };

    let tree = match RuleNode::from_json_value(request.tree) {
        Ok(t) => t,
        Err(e) => fail(format!("Failed to parse rule tree: {e}")),
    };

    let catalog = match request.levels.map(LevelCatalog::new).transpose() {
        Ok(c) => c,
        Err(e) => fail(format!("Failed to load level catalog: {e}")),
    };

    let mut evaluator = EligibilityEvaluator::new(date).with_trace(request.trace);
    if let Some(ref catalog) = catalog {
        evaluator = evaluator.with_level_catalog(catalog);
    }

    let result = evaluator.evaluate_with_disciplines(
        &request.project,
        &tree,
        &request.engineers,
        request.mode,
        &request.allowed_disciplines,
    );

    let resp = EvaluateResponse {
        passed: Some(result.passed),
        selected_engineers: Some(
            result
                .selected_ids()
                .into_iter()
                .map(str::to_string)
                .collect(),
        ),
        trace: result.trace.as_ref().map(|t| t.render(0, false)),
        unassigned: result.unassigned,
        issues: result.issues,
        rejected: result.rejected,
        error: None,
    };
    println!("{}", serde_json::to_string(&resp).unwrap_or_default());
}
