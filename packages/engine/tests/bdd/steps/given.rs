//! Given step definitions
//!
//! Steps that set up the rule tree, the project and the engineer pool.

use cucumber::{gherkin::Step, given};
use eligibility_engine::{parse_evaluation_date, LevelCatalog, Project, RuleNode};

use crate::helpers::tables::{parse_engineers, parse_levels, parse_list};
use crate::world::EligibilityWorld;

// =============================================================================
// Background steps
// =============================================================================

#[given(expr = "the evaluation date is {string}")]
fn set_evaluation_date(world: &mut EligibilityWorld, date: String) {
    world.evaluation_date = parse_evaluation_date(&date)
        .unwrap_or_else(|e| panic!("invalid evaluation date '{date}': {e}"));
}

#[given(expr = "the rule tree {string}")]
fn select_rule_tree(world: &mut EligibilityWorld, id: String) {
    let tree = world
        .rule_trees
        .get(&id)
        .unwrap_or_else(|| panic!("rule tree '{id}' not found in rules/"))
        .clone();
    world.tree = Some(tree);
}

#[given(regex = r"^a project with a total area of (\d+(?:\.\d+)?) square meters$")]
fn set_project_area(world: &mut EligibilityWorld, area: String) {
    let total_area: f64 = area.parse().expect("numeric area");
    world.project = Project::new(total_area);
}

// =============================================================================
// Scenario setup
// =============================================================================

#[given("the following rule tree:")]
fn set_inline_rule_tree(world: &mut EligibilityWorld, step: &Step) {
    let yaml = step.docstring.as_ref().expect("rule tree docstring");
    let tree = RuleNode::from_yaml_str(yaml)
        .unwrap_or_else(|e| panic!("inline rule tree does not parse: {e}"));
    world.tree = Some(tree);
}

#[given("the following engineers:")]
fn set_engineers(world: &mut EligibilityWorld, step: &Step) {
    if let Some(table) = &step.table {
        world.engineers = parse_engineers(table);
    }
}

#[given(expr = "only the disciplines {string} are allowed")]
fn set_allowed_disciplines(world: &mut EligibilityWorld, disciplines: String) {
    world.allowed_disciplines = parse_list(&disciplines);
}

#[given("the following license level catalog:")]
fn set_level_catalog(world: &mut EligibilityWorld, step: &Step) {
    if let Some(table) = &step.table {
        let catalog = LevelCatalog::new(parse_levels(table))
            .unwrap_or_else(|e| panic!("invalid level catalog: {e}"));
        world.catalog = Some(catalog);
    }
}
