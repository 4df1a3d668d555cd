//! Calculation logic for equity grants.
//!
//! Every function here is pure. Strict entry points return `Result`; the
//! form-facing `calculate_*` functions and the lenient tax adapters never
//! fail and fall back to documented defaults.

pub mod coerce;
pub mod common;
pub mod decision;
pub mod monetary;
pub mod scenario;
pub mod tax;
pub mod vesting;

pub use decision::calculate_decision_factors;
pub use scenario::{ExitScenario, ScenarioEvaluator, calculate_scenario_result};
pub use tax::{TaxEngine, TaxError, TaxStrategy};
pub use vesting::{VestingEvaluator, VestingEvent, calculate_vested_shares, vested_shares};
