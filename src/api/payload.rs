use clap::Args;
use serde::Deserialize;

use crate::core::PlanInputs;

/// Calculator form fields as JSON or query parameters; anything missing
/// falls back to the default plan.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlanPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    life_expectancy: Option<u32>,
    current_balance: Option<f64>,
    current_income: Option<f64>,
    desired_income: Option<f64>,
    after_ret_income: Option<f64>,
    pre_ret_return: Option<f64>,
    post_ret_return: Option<f64>,
    wage_inflation: Option<f64>,
    cost_inflation: Option<f64>,
    annual_savings_rate: Option<f64>,
}

impl PlanPayload {
    pub fn into_inputs(self) -> PlanInputs {
        let mut inputs = PlanInputs::default();

        if let Some(v) = self.current_age {
            inputs.current_age = v;
        }
        if let Some(v) = self.retirement_age {
            inputs.retirement_age = v;
        }
        if let Some(v) = self.life_expectancy {
            inputs.life_expectancy = v;
        }
        if let Some(v) = self.current_balance {
            inputs.current_balance = v;
        }
        if let Some(v) = self.current_income {
            inputs.current_income = v;
        }
        if let Some(v) = self.desired_income {
            inputs.desired_income = v;
        }
        if let Some(v) = self.after_ret_income {
            inputs.after_ret_income = v;
        }
        if let Some(v) = self.pre_ret_return {
            inputs.pre_ret_return = v;
        }
        if let Some(v) = self.post_ret_return {
            inputs.post_ret_return = v;
        }
        if let Some(v) = self.wage_inflation {
            inputs.wage_inflation = v;
        }
        if let Some(v) = self.cost_inflation {
            inputs.cost_inflation = v;
        }
        if let Some(v) = self.annual_savings_rate {
            inputs.annual_savings_rate = v;
        }

        inputs
    }
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[arg(long, default_value_t = 30)]
    pub current_age: u32,
    #[arg(long, default_value_t = 65)]
    pub retirement_age: u32,
    #[arg(long, default_value_t = 90)]
    pub life_expectancy: u32,
    #[arg(long, default_value_t = 0.0)]
    pub current_balance: f64,
    #[arg(long, default_value_t = 60_000.0)]
    pub current_income: f64,
    #[arg(
        long,
        default_value_t = 40_000.0,
        help = "Yearly income wanted in retirement, in today's money"
    )]
    pub desired_income: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Yearly income still received after retiring (pension, rent)"
    )]
    pub after_ret_income: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        allow_negative_numbers = true,
        help = "Pre-retirement return in percent"
    )]
    pub pre_ret_return: f64,
    #[arg(
        long,
        default_value_t = 4.0,
        allow_negative_numbers = true,
        help = "Post-retirement return in percent"
    )]
    pub post_ret_return: f64,
    #[arg(
        long,
        default_value_t = 3.0,
        allow_negative_numbers = true,
        help = "Wage inflation in percent"
    )]
    pub wage_inflation: f64,
    #[arg(
        long,
        default_value_t = 2.5,
        allow_negative_numbers = true,
        help = "Cost of living inflation in percent"
    )]
    pub cost_inflation: f64,
    #[arg(
        long,
        default_value_t = 15.0,
        help = "Share of income saved each year, in percent"
    )]
    pub annual_savings_rate: f64,
}

impl From<PlanArgs> for PlanInputs {
    fn from(args: PlanArgs) -> Self {
        PlanInputs {
            current_age: args.current_age,
            retirement_age: args.retirement_age,
            life_expectancy: args.life_expectancy,
            current_balance: args.current_balance,
            current_income: args.current_income,
            desired_income: args.desired_income,
            after_ret_income: args.after_ret_income,
            pre_ret_return: args.pre_ret_return,
            post_ret_return: args.post_ret_return,
            wage_inflation: args.wage_inflation,
            cost_inflation: args.cost_inflation,
            annual_savings_rate: args.annual_savings_rate,
        }
    }
}
