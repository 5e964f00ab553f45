//! When step definitions
//!
//! Steps that run the evaluator.

use cucumber::when;
use eligibility_engine::EvaluationMode;

use crate::world::EligibilityWorld;

#[when(regex = r"^the staffing is evaluated in (MODIFY_ENGINEERS|CHECK_ENGINEERS) mode$")]
fn evaluate_staffing(world: &mut EligibilityWorld, mode: String) {
    let mode = match mode.as_str() {
        "MODIFY_ENGINEERS" => EvaluationMode::ModifyEngineers,
        _ => EvaluationMode::CheckEngineers,
    };
    world.evaluate(mode);
}
