use tracing::{debug, warn};

use super::engine::growth_factor;
use super::error::PlanError;
use super::types::PlanParameters;

/// Smallest retirement age, starting at `params.retirement_age`, whose
/// balance never goes negative before life expectancy.
///
/// Candidates are checked with an unrounded projection that ignores the
/// after-retirement income offset, so the answer can differ from what
/// [`super::project`] reports for the same age. `params` must already be
/// validated.
pub fn find_sustainable_age(params: &PlanParameters) -> Result<u32, PlanError> {
    for candidate in params.retirement_age..=params.life_expectancy {
        if stays_funded(params, candidate) {
            debug!(
                retirement_age = params.retirement_age,
                candidate, "found sustainable retirement age"
            );
            return Ok(candidate);
        }
    }

    warn!(
        retirement_age = params.retirement_age,
        life_expectancy = params.life_expectancy,
        "no sustainable retirement age"
    );
    Err(PlanError::SearchExhausted {
        retirement_age: params.retirement_age,
        life_expectancy: params.life_expectancy,
    })
}

fn stays_funded(params: &PlanParameters, candidate: u32) -> bool {
    let initial_withdrawal =
        params.desired_income * growth_factor(params.cost_inflation, candidate - params.current_age);

    let mut balance = params.current_balance;
    for age in params.current_age..=params.life_expectancy {
        let is_retired = age >= candidate;
        let yearly_income =
            params.current_income * growth_factor(params.wage_inflation, age - params.current_age);
        let annual_savings = if is_retired {
            0.0
        } else {
            yearly_income * params.annual_savings_rate
        };
        let rate = if is_retired {
            params.post_ret_return
        } else {
            params.pre_ret_return
        };
        let earnings = balance * rate;
        let annual_withdrawal = if is_retired {
            initial_withdrawal * growth_factor(params.cost_inflation, age - candidate)
        } else {
            0.0
        };

        balance = balance + earnings + annual_savings - annual_withdrawal;
        if balance < 0.0 {
            return false;
        }
    }
    true
}
