//! Then step definitions
//!
//! Steps that verify verdicts, selections and diagnostics.

use cucumber::then;

use crate::helpers::tables::parse_list;
use crate::world::EligibilityWorld;

// =============================================================================
// Verdict
// =============================================================================

#[then("the project is eligible")]
fn assert_eligible(world: &mut EligibilityWorld) {
    let result = world.result();
    assert!(
        result.passed,
        "Expected the project to be eligible, got {:?}",
        result
    );
}

#[then("the project is not eligible")]
fn assert_not_eligible(world: &mut EligibilityWorld) {
    let result = world.result();
    assert!(
        !result.passed,
        "Expected the project not to be eligible, selected {:?}",
        result.selected_ids()
    );
}

// =============================================================================
// Selection
// =============================================================================

#[then(expr = "the selected engineers are {string}")]
fn assert_selected(world: &mut EligibilityWorld, expected: String) {
    let expected = parse_list(&expected);
    assert_eq!(world.result().selected_ids(), expected);
}

#[then("no engineers are selected")]
fn assert_none_selected(world: &mut EligibilityWorld) {
    let selected = world.result().selected_ids();
    assert!(selected.is_empty(), "Expected no selection, got {selected:?}");
}

#[then(expr = "the unassigned engineers are {string}")]
fn assert_unassigned(world: &mut EligibilityWorld, expected: String) {
    assert_eq!(world.result().unassigned, parse_list(&expected));
}

#[then("no engineers are unassigned")]
fn assert_none_unassigned(world: &mut EligibilityWorld) {
    let unassigned = &world.result().unassigned;
    assert!(
        unassigned.is_empty(),
        "Expected every engineer to be assigned, left over {unassigned:?}"
    );
}

// =============================================================================
// Diagnostics
// =============================================================================

#[then("the rule tree is reported as malformed")]
fn assert_malformed(world: &mut EligibilityWorld) {
    assert!(
        world.result().is_malformed(),
        "Expected structural issues, got none"
    );
}

#[then(regex = r#"^node "([^"]+)" has an? "([^"]+)" issue$"#)]
fn assert_issue(world: &mut EligibilityWorld, node: String, kind: String) {
    let issues = &world.result().issues;
    let found = issues.iter().any(|issue| {
        issue.node_id == node
            && serde_json::to_value(&issue.kind)
                .ok()
                .and_then(|v| v.get("kind").and_then(|k| k.as_str()).map(str::to_string))
                .as_deref()
                == Some(kind.as_str())
    });
    assert!(found, "Expected a {kind} issue on node {node}, got {issues:?}");
}

#[then(regex = r#"^the trace shows "([^"]+)" with (\d+) required and (\d+) matched$"#)]
fn assert_trace_counts(world: &mut EligibilityWorld, node: String, required: usize, matched: usize) {
    let trace = world.result().trace.as_ref().expect("trace was not recorded");
    let entry = trace
        .find(&node)
        .unwrap_or_else(|| panic!("node {node} not visited:\n{}", trace.render(0, false)));
    assert_eq!(entry.required, Some(required), "required count of {node}");
    assert_eq!(entry.matched, Some(matched), "matched count of {node}");
}
