use super::types::{CalculatorInput, ProjectionResult, ProjectionYear};

/// Simple annual-compounding annuity model: each year's contributions are
/// added first, then the fund's growth rate applies to the whole balance, so
/// money compounds from the year it is paid in.
pub fn project(input: &CalculatorInput) -> ProjectionResult {
    let growth_rate = input.fund_type.annual_growth_rate();
    let annual_contribution = input.monthly_contribution * 12.0;

    let mut balance = 0.0;
    let mut projection_by_year = Vec::with_capacity(input.years_to_retirement as usize);
    for year in 1..=input.years_to_retirement {
        balance = (balance + annual_contribution) * (1.0 + growth_rate);
        projection_by_year.push(ProjectionYear {
            year,
            contributions: input.monthly_contribution * 12.0 * f64::from(year),
            balance,
        });
    }

    let total_contributions =
        input.monthly_contribution * 12.0 * f64::from(input.years_to_retirement);
    ProjectionResult {
        total_contributions,
        total_growth: balance - total_contributions,
        final_balance: balance,
        projection_by_year,
    }
}
