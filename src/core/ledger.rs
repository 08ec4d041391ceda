use tracing::info;

use super::engine::run_projection;
use super::error::ValidationError;
use super::types::{PlanParameters, ScenarioSnapshot};

/// Saved scenarios for one calculator session, in the order they were saved.
#[derive(Debug, Clone, Default)]
pub struct ScenarioLedger {
    next_id: u64,
    scenarios: Vec<ScenarioSnapshot>,
}

impl ScenarioLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Projects `params` and appends the outcome.
    pub fn save(&mut self, params: &PlanParameters) -> Result<&ScenarioSnapshot, ValidationError> {
        params.validate()?;
        let projection = run_projection(params);

        self.next_id += 1;
        let snapshot = ScenarioSnapshot {
            id: self.next_id,
            retirement_age: params.retirement_age,
            after_ret_income: params.after_ret_income,
            desired_income: params.desired_income,
            run_out_of_money_age: projection.run_out_of_money_age,
            total_needed: projection.total_amount_needed,
        };
        info!(
            id = snapshot.id,
            retirement_age = snapshot.retirement_age,
            "scenario saved"
        );
        self.scenarios.push(snapshot);
        Ok(&self.scenarios[self.scenarios.len() - 1])
    }

    pub fn remove(&mut self, id: u64) -> Option<ScenarioSnapshot> {
        let index = self.scenarios.iter().position(|s| s.id == id)?;
        info!(id, "scenario deleted");
        Some(self.scenarios.remove(index))
    }

    pub fn get(&self, id: u64) -> Option<&ScenarioSnapshot> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn scenarios(&self) -> &[ScenarioSnapshot] {
        &self.scenarios
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}
