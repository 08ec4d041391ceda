use serde::{Serialize, Serializer};

use super::error::ValidationError;

const MAX_INCOME: f64 = 1_000_000_000.0;
const MAX_BALANCE: f64 = 1_000_000_000_000.0;
const MIN_AGE: f64 = 18.0;
const MAX_AGE: f64 = 120.0;

/// Plan as entered on the calculator form: rates and the savings rate are
/// percentages, everything else is in currency units or whole years.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub current_balance: f64,
    pub current_income: f64,
    pub desired_income: f64,
    pub after_ret_income: f64,
    pub pre_ret_return: f64,
    pub post_ret_return: f64,
    pub wage_inflation: f64,
    pub cost_inflation: f64,
    pub annual_savings_rate: f64,
}

impl Default for PlanInputs {
    fn default() -> Self {
        Self {
            current_age: 30,
            retirement_age: 65,
            life_expectancy: 90,
            current_balance: 0.0,
            current_income: 60_000.0,
            desired_income: 40_000.0,
            after_ret_income: 0.0,
            pre_ret_return: 7.0,
            post_ret_return: 4.0,
            wage_inflation: 3.0,
            cost_inflation: 2.5,
            annual_savings_rate: 15.0,
        }
    }
}

impl PlanInputs {
    /// Converts percentages to fractions and validates the result.
    pub fn into_params(self) -> Result<PlanParameters, ValidationError> {
        let params = PlanParameters {
            current_age: self.current_age,
            retirement_age: self.retirement_age,
            life_expectancy: self.life_expectancy,
            current_balance: self.current_balance,
            current_income: self.current_income,
            desired_income: self.desired_income,
            after_ret_income: self.after_ret_income,
            pre_ret_return: self.pre_ret_return / 100.0,
            post_ret_return: self.post_ret_return / 100.0,
            wage_inflation: self.wage_inflation / 100.0,
            cost_inflation: self.cost_inflation / 100.0,
            annual_savings_rate: self.annual_savings_rate / 100.0,
        };
        params.validate()?;
        Ok(params)
    }
}

/// Validated projection input. Rates are annual fractions (0.07 = 7%).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanParameters {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub current_balance: f64,
    pub current_income: f64,
    pub desired_income: f64,
    pub after_ret_income: f64,
    pub pre_ret_return: f64,
    pub post_ret_return: f64,
    pub wage_inflation: f64,
    pub cost_inflation: f64,
    pub annual_savings_rate: f64,
}

impl PlanParameters {
    /// Checks every field and cross-field rule, collecting all violations.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();
        let mut check = |field: &str, value: f64, min: f64, max: f64, message: &str| {
            if !value.is_finite() {
                violations.push(format!("{field} must be a valid number"));
            } else if value < min || value > max {
                violations.push(message.to_string());
            }
        };

        check(
            "desiredIncome",
            self.desired_income,
            0.0,
            MAX_INCOME,
            "Desired income must be between $0 and $1,000,000,000",
        );
        check(
            "afterRetIncome",
            self.after_ret_income,
            0.0,
            MAX_INCOME,
            "After Retirement Income must be between $0 and $1,000,000,000",
        );
        check(
            "preRetReturn",
            self.pre_ret_return,
            -0.20,
            0.30,
            "Pre-retirement return must be between -20% and 30%",
        );
        check(
            "postRetReturn",
            self.post_ret_return,
            -0.20,
            0.30,
            "Post-retirement return must be between -20% and 30%",
        );
        check(
            "currentAge",
            f64::from(self.current_age),
            MIN_AGE,
            MAX_AGE,
            "Current age must be between 18 and 120",
        );
        check(
            "retirementAge",
            f64::from(self.retirement_age),
            MIN_AGE,
            MAX_AGE,
            "Retirement age must be between 18 and 120",
        );
        check(
            "currentBalance",
            self.current_balance,
            0.0,
            MAX_BALANCE,
            "Current balance must be between $0 and $1,000,000,000,000",
        );
        check(
            "wageInflation",
            self.wage_inflation,
            -0.05,
            0.20,
            "Wage inflation must be between -5% and 20%",
        );
        check(
            "costInflation",
            self.cost_inflation,
            -0.05,
            0.20,
            "Cost of living inflation must be between -5% and 20%",
        );
        check(
            "currentIncome",
            self.current_income,
            0.0,
            MAX_INCOME,
            "Current income must be between $0 and $1,000,000,000",
        );
        check(
            "annualSavingsRate",
            self.annual_savings_rate,
            0.0,
            1.0,
            "Annual savings rate must be between 0% and 100%",
        );
        check(
            "lifeExpectancy",
            f64::from(self.life_expectancy),
            MIN_AGE,
            MAX_AGE,
            "Life expectancy must be between 18 and 120",
        );

        if self.retirement_age <= self.current_age {
            violations.push("Retirement age must be greater than current age".to_string());
        }
        if self.life_expectancy <= self.retirement_age {
            violations.push("Life expectancy must be greater than retirement age".to_string());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations))
        }
    }

    /// Same plan retiring at `retirement_age`, e.g. a recommended age.
    pub fn with_retirement_age(self, retirement_age: u32) -> Self {
        Self {
            retirement_age,
            ..self
        }
    }

    pub(crate) fn horizon_years(&self) -> usize {
        (self.life_expectancy - self.current_age + 1) as usize
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum YearStatus {
    Normal,
    /// Withdrawal is larger than the year's earnings.
    DrawingDown,
    /// Balance went negative this year.
    Depleted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRecord {
    pub age: u32,
    pub yearly_income: f64,
    pub beginning_balance: f64,
    pub earnings: f64,
    pub annual_savings: f64,
    pub annual_withdrawal: f64,
    /// Floored at zero; the simulation itself carries the negative balance.
    pub ending_balance: f64,
    pub withdrawal_rate: f64,
    pub status: YearStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub years: Vec<YearRecord>,
    pub run_out_of_money_age: Option<u32>,
    pub is_self_sustaining: bool,
    pub total_amount_needed: f64,
    pub recommended_age: u32,
    pub after_ret_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSnapshot {
    pub id: u64,
    pub retirement_age: u32,
    pub after_ret_income: f64,
    pub desired_income: f64,
    #[serde(serialize_with = "age_or_never")]
    pub run_out_of_money_age: Option<u32>,
    pub total_needed: f64,
}

fn age_or_never<S: Serializer>(age: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
    match age {
        Some(age) => serializer.serialize_u32(*age),
        None => serializer.serialize_str("Never"),
    }
}
