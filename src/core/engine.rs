use tracing::{debug, warn};

use super::error::PlanError;
use super::solver::find_sustainable_age;
use super::types::{PlanParameters, ProjectionResult, YearRecord, YearStatus};

/// Year loop output before the recommended age is resolved.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Projection {
    pub years: Vec<YearRecord>,
    pub run_out_of_money_age: Option<u32>,
    pub total_amount_needed: f64,
}

impl Projection {
    pub(crate) fn is_self_sustaining(&self) -> bool {
        self.run_out_of_money_age.is_none()
    }
}

/// Validates `params`, then projects them.
pub fn calculate(params: &PlanParameters) -> Result<ProjectionResult, PlanError> {
    params.validate()?;
    project(params)
}

/// Full projection including the recommended retirement age. `params` must
/// already be validated; the only failure is an exhausted age search.
pub fn project(params: &PlanParameters) -> Result<ProjectionResult, PlanError> {
    let projection = run_projection(params);
    let is_self_sustaining = projection.is_self_sustaining();
    let recommended_age = if is_self_sustaining {
        params.retirement_age
    } else {
        find_sustainable_age(params)?
    };

    Ok(ProjectionResult {
        years: projection.years,
        run_out_of_money_age: projection.run_out_of_money_age,
        is_self_sustaining,
        total_amount_needed: projection.total_amount_needed,
        recommended_age,
        after_ret_income: params.after_ret_income,
    })
}

/// Year-by-year simulation from the current age to life expectancy. Every
/// monetary amount is rounded up where it is computed. Ages must already be
/// ordered `current < retirement < life expectancy`.
pub(crate) fn run_projection(params: &PlanParameters) -> Projection {
    let initial_withdrawal = (params.desired_income
        * growth_factor(
            params.cost_inflation,
            params.retirement_age - params.current_age,
        ))
    .ceil();

    let mut balance = params.current_balance;
    let mut run_out_of_money_age = None;
    let mut total_amount_needed = 0.0;
    let mut years = Vec::with_capacity(params.horizon_years());

    for age in params.current_age..=params.life_expectancy {
        let is_retired = age >= params.retirement_age;
        let yearly_income = (params.current_income
            * growth_factor(params.wage_inflation, age - params.current_age))
        .ceil();
        let annual_savings = if is_retired {
            0.0
        } else {
            (yearly_income * params.annual_savings_rate).ceil()
        };
        let rate = if is_retired {
            params.post_ret_return
        } else {
            params.pre_ret_return
        };
        let earnings = (balance * rate).ceil();
        let annual_withdrawal = if is_retired {
            ((initial_withdrawal - params.after_ret_income)
                * growth_factor(params.cost_inflation, age - params.retirement_age))
            .ceil()
            .max(0.0)
        } else {
            0.0
        };

        let beginning_balance = balance;
        balance = (beginning_balance + earnings + annual_savings - annual_withdrawal).ceil();

        if is_retired {
            total_amount_needed += annual_withdrawal.ceil();
        }

        if balance < 0.0 && run_out_of_money_age.is_none() {
            warn!(age, balance, "balance depleted, plan is unsustainable");
            run_out_of_money_age = Some(age);
        }

        let status = if balance < 0.0 {
            YearStatus::Depleted
        } else if annual_withdrawal > earnings {
            YearStatus::DrawingDown
        } else {
            YearStatus::Normal
        };

        years.push(YearRecord {
            age,
            yearly_income: if is_retired && annual_withdrawal > 0.0 {
                0.0
            } else {
                yearly_income
            },
            beginning_balance,
            earnings,
            annual_savings,
            annual_withdrawal,
            ending_balance: balance.max(0.0),
            withdrawal_rate: withdrawal_rate(annual_withdrawal, beginning_balance, balance),
            status,
        });
    }

    debug!(
        years = years.len(),
        ?run_out_of_money_age,
        total_amount_needed,
        "projection complete"
    );

    Projection {
        years,
        run_out_of_money_age,
        total_amount_needed,
    }
}

pub(crate) fn growth_factor(rate: f64, years: u32) -> f64 {
    (1.0 + rate).powf(f64::from(years))
}

/// Percent of the beginning balance withdrawn; reported as 0 once the
/// balance is gone or the rate would exceed 100%.
fn withdrawal_rate(annual_withdrawal: f64, beginning_balance: f64, ending_balance: f64) -> f64 {
    if ending_balance <= 0.0 || beginning_balance <= 0.0 {
        return 0.0;
    }
    let rate = annual_withdrawal / beginning_balance * 100.0;
    if rate > 100.0 { 0.0 } else { rate }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn sample_params() -> PlanParameters {
        PlanParameters {
            current_age: 30,
            retirement_age: 65,
            life_expectancy: 90,
            current_balance: 0.0,
            current_income: 60_000.0,
            desired_income: 40_000.0,
            after_ret_income: 0.0,
            pre_ret_return: 0.07,
            post_ret_return: 0.04,
            wage_inflation: 0.03,
            cost_inflation: 0.025,
            annual_savings_rate: 0.15,
        }
    }

    /// Zero growth everywhere so every amount can be worked out by hand.
    fn flat_params() -> PlanParameters {
        PlanParameters {
            current_age: 60,
            retirement_age: 62,
            life_expectancy: 64,
            current_balance: 10_000.0,
            current_income: 50_000.0,
            desired_income: 20_000.0,
            after_ret_income: 5_000.0,
            pre_ret_return: 0.0,
            post_ret_return: 0.0,
            wage_inflation: 0.0,
            cost_inflation: 0.0,
            annual_savings_rate: 0.10,
        }
    }

    #[test]
    fn example_plan_covers_every_age_and_withdraws_only_in_retirement() {
        let params = sample_params();
        let projection = run_projection(&params);

        assert_eq!(projection.years.len(), 61);
        assert_eq!(projection.years[0].age, 30);
        assert_eq!(projection.years[60].age, 90);
        for year in &projection.years {
            if year.age < 65 {
                assert_eq!(year.annual_withdrawal, 0.0, "age {}", year.age);
            } else {
                assert!(year.annual_withdrawal > 0.0, "age {}", year.age);
            }
        }
    }

    #[test]
    fn flat_plan_matches_hand_computed_rows() {
        let projection = run_projection(&flat_params());
        let years = &projection.years;

        // 60 and 61: save 5,000 a year.
        assert_eq!(years[0].annual_savings, 5_000.0);
        assert_eq!(years[0].ending_balance, 15_000.0);
        assert_eq!(years[1].ending_balance, 20_000.0);
        assert_eq!(years[1].yearly_income, 50_000.0);

        // 62 onwards: withdraw 20,000 - 5,000.
        assert_eq!(years[2].annual_withdrawal, 15_000.0);
        assert_eq!(years[2].annual_savings, 0.0);
        assert_eq!(years[2].yearly_income, 0.0);
        assert_eq!(years[2].ending_balance, 5_000.0);
        assert_eq!(years[2].withdrawal_rate, 75.0);
        assert_eq!(years[2].status, YearStatus::DrawingDown);

        assert_eq!(years[3].beginning_balance, 5_000.0);
        assert_eq!(years[3].ending_balance, 0.0);
        assert_eq!(years[3].withdrawal_rate, 0.0);
        assert_eq!(years[3].status, YearStatus::Depleted);
        assert_eq!(projection.run_out_of_money_age, Some(63));

        // The negative balance carries into the next year.
        assert_eq!(years[4].beginning_balance, -10_000.0);
        assert_eq!(years[4].ending_balance, 0.0);
        assert_eq!(projection.total_amount_needed, 45_000.0);
    }

    #[test]
    fn amounts_are_rounded_up() {
        let params = PlanParameters {
            current_age: 40,
            retirement_age: 41,
            life_expectancy: 42,
            current_balance: 1_000.0,
            current_income: 1_001.0,
            desired_income: 10.0,
            after_ret_income: 0.0,
            pre_ret_return: 0.0155,
            post_ret_return: 0.0,
            wage_inflation: 0.0,
            cost_inflation: 0.0,
            annual_savings_rate: 0.10,
        };
        let projection = run_projection(&params);
        let first = &projection.years[0];

        assert_eq!(first.earnings, 16.0);
        assert_eq!(first.annual_savings, 101.0);
        assert_eq!(first.ending_balance, 1_117.0);
    }

    #[test]
    fn after_retirement_income_larger_than_need_floors_withdrawal_at_zero() {
        let mut params = flat_params();
        params.after_ret_income = 50_000.0;
        let projection = run_projection(&params);

        assert!(projection.is_self_sustaining());
        assert_eq!(projection.total_amount_needed, 0.0);
        // No withdrawal, so the wage is still reported.
        assert_eq!(projection.years[2].yearly_income, 50_000.0);
        assert_eq!(projection.years[2].annual_withdrawal, 0.0);
    }

    #[test]
    fn withdrawal_rate_above_one_hundred_percent_is_reported_as_zero() {
        let params = PlanParameters {
            current_age: 40,
            retirement_age: 41,
            life_expectancy: 42,
            current_balance: 1_000.0,
            current_income: 0.0,
            desired_income: 1_200.0,
            after_ret_income: 0.0,
            pre_ret_return: 0.0,
            post_ret_return: 0.30,
            wage_inflation: 0.0,
            cost_inflation: 0.0,
            annual_savings_rate: 0.0,
        };
        let projection = run_projection(&params);
        let first_retired = &projection.years[1];

        // 1,000 + 300 - 1,200 leaves 100, but 1,200 is 120% of 1,000.
        assert_eq!(first_retired.beginning_balance, 1_000.0);
        assert_eq!(first_retired.earnings, 300.0);
        assert_eq!(first_retired.annual_withdrawal, 1_200.0);
        assert_eq!(first_retired.ending_balance, 100.0);
        assert_eq!(first_retired.withdrawal_rate, 0.0);
        assert_eq!(first_retired.status, YearStatus::DrawingDown);
        assert_eq!(projection.run_out_of_money_age, Some(42));
    }

    #[test]
    fn calculate_rejects_inverted_ages_without_simulating() {
        let mut params = sample_params();
        params.current_age = 70;
        let err = calculate(&params).expect_err("must reject");
        assert!(matches!(err, PlanError::Validation(_)));
    }

    #[test]
    fn immediate_depletion_reports_retirement_age_and_recommends_later() {
        let params = PlanParameters {
            current_age: 30,
            retirement_age: 31,
            life_expectancy: 90,
            current_balance: 0.0,
            current_income: 50_000.0,
            desired_income: 100_000.0,
            after_ret_income: 0.0,
            pre_ret_return: 0.05,
            post_ret_return: 0.0,
            wage_inflation: 0.0,
            cost_inflation: 0.0,
            annual_savings_rate: 0.10,
        };
        let result = project(&params).expect("a later age is sustainable");

        assert!(!result.is_self_sustaining);
        assert_eq!(result.run_out_of_money_age, Some(31));
        assert!(result.recommended_age > params.retirement_age);
        assert!(result.recommended_age <= params.life_expectancy);
    }

    #[test]
    fn sustainable_plan_recommends_its_own_retirement_age() {
        let mut params = sample_params();
        params.current_balance = 5_000_000.0;
        let result = project(&params).expect("projection succeeds");

        assert!(result.is_self_sustaining);
        assert_eq!(result.run_out_of_money_age, None);
        assert_eq!(result.recommended_age, 65);
    }

    #[test]
    fn calculate_rejects_invalid_parameters_before_simulating() {
        let mut params = sample_params();
        params.life_expectancy = 60;
        let err = calculate(&params).expect_err("must reject");
        match err {
            PlanError::Validation(validation) => assert!(
                validation
                    .violations()
                    .contains(&"Life expectancy must be greater than retirement age".to_string())
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn project_is_idempotent() {
        let params = sample_params();
        let first = project(&params).expect("projection succeeds");
        let second = project(&params).expect("projection succeeds");
        assert_eq!(first, second);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_projection_invariants_hold(
            current_age in 18u32..80,
            retirement_span in 1u32..30,
            horizon_extra in 1u32..30,
            current_balance in 0u32..2_000_000,
            current_income in 0u32..300_000,
            desired_income in 0u32..200_000,
            after_ret_income in 0u32..60_000,
            pre_ret_bp in -2000i32..=3000,
            post_ret_bp in -2000i32..=3000,
            wage_bp in -500i32..=2000,
            cost_bp in -500i32..=2000,
            savings_bp in 0u32..=10_000
        ) {
            let retirement_age = (current_age + retirement_span).min(119);
            let life_expectancy = (retirement_age + horizon_extra).min(120);
            let params = PlanParameters {
                current_age,
                retirement_age,
                life_expectancy,
                current_balance: current_balance as f64,
                current_income: current_income as f64,
                desired_income: desired_income as f64,
                after_ret_income: after_ret_income as f64,
                pre_ret_return: pre_ret_bp as f64 / 10_000.0,
                post_ret_return: post_ret_bp as f64 / 10_000.0,
                wage_inflation: wage_bp as f64 / 10_000.0,
                cost_inflation: cost_bp as f64 / 10_000.0,
                annual_savings_rate: savings_bp as f64 / 10_000.0,
            };
            prop_assert!(params.validate().is_ok());

            let projection = run_projection(&params);
            prop_assert_eq!(
                projection.years.len(),
                (life_expectancy - current_age + 1) as usize
            );
            for (offset, year) in projection.years.iter().enumerate() {
                prop_assert_eq!(year.age, current_age + offset as u32);
                prop_assert!(year.ending_balance >= 0.0);
                prop_assert!(year.withdrawal_rate >= 0.0 && year.withdrawal_rate <= 100.0);
                if year.age < retirement_age {
                    prop_assert_eq!(year.annual_withdrawal, 0.0);
                }
            }

            let first_depleted = projection
                .years
                .iter()
                .find(|year| year.status == YearStatus::Depleted)
                .map(|year| year.age);
            prop_assert_eq!(projection.run_out_of_money_age, first_depleted);
            prop_assert_eq!(
                projection.is_self_sustaining(),
                projection.run_out_of_money_age.is_none()
            );

            let retired_total: f64 = projection
                .years
                .iter()
                .filter(|year| year.age >= retirement_age)
                .map(|year| year.annual_withdrawal.ceil())
                .sum();
            prop_assert_eq!(projection.total_amount_needed, retired_total);

            prop_assert_eq!(run_projection(&params), projection);
        }

        #[test]
        fn prop_more_starting_balance_never_breaks_a_sustainable_plan(
            current_balance in 0u32..1_500_000,
            extra_balance in 1u32..1_000_000,
            desired_income in 10_000u32..120_000,
            post_ret_bp in -2000i32..=3000,
            savings_bp in 0u32..=5_000
        ) {
            let mut params = sample_params();
            params.desired_income = desired_income as f64;
            params.post_ret_return = post_ret_bp as f64 / 10_000.0;
            params.annual_savings_rate = savings_bp as f64 / 10_000.0;
            params.current_balance = current_balance as f64;
            let base = run_projection(&params);

            params.current_balance += extra_balance as f64;
            let richer = run_projection(&params);

            if base.is_self_sustaining() {
                prop_assert!(richer.is_self_sustaining());
            }
        }
    }
}
