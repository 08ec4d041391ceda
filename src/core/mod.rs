mod engine;
mod error;
mod ledger;
mod report;
mod solver;
mod types;

pub use engine::{calculate, project};
pub use error::{PlanError, ValidationError};
pub use ledger::ScenarioLedger;
pub use report::{format_currency, format_schedule, format_summary};
pub use solver::find_sustainable_age;
pub use types::{
    PlanInputs, PlanParameters, ProjectionResult, ScenarioSnapshot, YearRecord, YearStatus,
};
