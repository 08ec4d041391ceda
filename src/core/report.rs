use super::types::{ProjectionResult, YearRecord, YearStatus};

pub fn format_summary(result: &ProjectionResult) -> String {
    let sustainability = if result.is_self_sustaining {
        "Sustainable"
    } else {
        "Unsustainable"
    };
    let run_out = match result.run_out_of_money_age {
        Some(age) => age.to_string(),
        None => "Never".to_string(),
    };

    let mut lines = Vec::new();
    lines.push(format!("Plan Sustainability: {sustainability}"));
    lines.push(format!("Run Out of Money Age: {run_out}"));
    lines.push(format!("Recommended Retirement Age: {}", result.recommended_age));
    lines.push(format!(
        "Total Amount Needed for Retirement: {}",
        format_currency(result.total_amount_needed)
    ));
    lines.push(format!(
        "After Retirement Income: {}",
        format_currency(result.after_ret_income)
    ));
    lines.join("\n")
}

const SCHEDULE_HEADER: &str = "Age | Yearly Income | Beginning Balance | Earnings | \
     Est Annual Savings | Annual Withdrawal | Ending Balance | Withdrawal Rate (%) | Status";
const SCHEDULE_RULE: &str = "----|---------------|-------------------|----------|\
     --------------------|-------------------|----------------|---------------------|-------";

pub fn format_schedule(years: &[YearRecord]) -> String {
    let mut lines = Vec::with_capacity(years.len() + 2);
    lines.push(SCHEDULE_HEADER.to_string());
    lines.push(SCHEDULE_RULE.to_string());
    lines.extend(years.iter().map(format_year_row));
    lines.join("\n")
}

fn format_year_row(year: &YearRecord) -> String {
    let status = match year.status {
        YearStatus::Normal => "-",
        YearStatus::DrawingDown => "drawing down",
        YearStatus::Depleted => "depleted",
    };
    format!(
        "{} | {} | {} | {} | {} | {} | {} | {:.2}% | {}",
        year.age,
        format_currency(year.yearly_income),
        format_currency(year.beginning_balance.max(0.0)),
        format_currency(year.earnings.max(0.0)),
        format_currency(year.annual_savings),
        format_currency(year.annual_withdrawal),
        format_currency(year.ending_balance),
        year.withdrawal_rate,
        status
    )
}

/// `$1,234,567`, with cents only when the amount has them.
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (digits, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    if cents == "00" {
        format!("{sign}${grouped}")
    } else {
        format!("{sign}${grouped}.{cents}")
    }
}
