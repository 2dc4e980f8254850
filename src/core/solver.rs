use serde::Serialize;

use super::engine::project;
use super::types::CalculatorInput;

#[derive(Debug, Clone, Copy)]
pub struct SolveConfig {
    pub target_balance: f64,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_contribution: f64,
    pub final_balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResult {
    pub target_balance: f64,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub solved_monthly_contribution: Option<f64>,
    pub achieved_balance: Option<f64>,
    pub iterations: Vec<SolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

/// Bisects the monthly contribution until the projected final balance reaches
/// `target_balance`. The projection is monotone in the contribution, so the
/// bracket [lo, hi] always straddles the target once the bound checks pass.
pub fn solve_required_contribution(
    input: &CalculatorInput,
    config: SolveConfig,
) -> Result<SolveResult, String> {
    validate_config(config)?;

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let low_balance = final_balance_with_contribution(input, config.search_min);
    let high_balance = final_balance_with_contribution(input, config.search_max);

    let mut solved_value = None;
    let mut converged = false;
    let feasible;
    let message;

    if low_balance >= config.target_balance {
        solved_value = Some(config.search_min);
        converged = true;
        feasible = true;
        message = "Already meets target at the lower contribution bound.".to_string();
    } else if high_balance < config.target_balance {
        feasible = false;
        message = "No feasible contribution found within the search bounds.".to_string();
    } else {
        let mut lo = config.search_min;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            let balance = final_balance_with_contribution(input, mid);
            iterations.push(SolveIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_contribution: mid,
                final_balance: balance,
            });

            if balance >= config.target_balance {
                hi = mid;
            } else {
                lo = mid;
            }

            if (hi - lo).abs() <= config.tolerance {
                converged = true;
                solved_value = Some(hi);
                break;
            }
        }
        if solved_value.is_none() {
            solved_value = Some(hi);
        }
        feasible = true;
        message = if converged {
            "Solved required monthly contribution.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate.".to_string()
        };
    }

    let achieved_balance =
        solved_value.map(|value| final_balance_with_contribution(input, value));

    Ok(SolveResult {
        target_balance: config.target_balance,
        search_min: config.search_min,
        search_max: config.search_max,
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
        solved_monthly_contribution: solved_value,
        achieved_balance,
        iterations,
        converged,
        feasible,
        message,
    })
}

fn final_balance_with_contribution(input: &CalculatorInput, monthly_contribution: f64) -> f64 {
    let mut candidate = input.clone();
    candidate.monthly_contribution = monthly_contribution.max(0.0);
    project(&candidate).final_balance
}

fn validate_config(config: SolveConfig) -> Result<(), String> {
    if !config.target_balance.is_finite() || config.target_balance <= 0.0 {
        return Err("target_balance must be > 0".to_string());
    }
    if !config.search_min.is_finite() || config.search_min < 0.0 {
        return Err("search_min must be >= 0".to_string());
    }
    if !config.search_max.is_finite() || config.search_max <= config.search_min {
        return Err("search_max must be greater than search_min".to_string());
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err("tolerance must be > 0".to_string());
    }
    if config.max_iterations == 0 {
        return Err("max_iterations must be > 0".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FundType;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn base_input(fund_type: FundType, years: u32) -> CalculatorInput {
        CalculatorInput {
            age: 40,
            salary: 3_000.0,
            monthly_contribution: 0.0,
            fund_type,
            years_to_retirement: years,
        }
    }

    fn config(target_balance: f64, search_max: f64) -> SolveConfig {
        SolveConfig {
            target_balance,
            search_min: 0.0,
            search_max,
            tolerance: 0.01,
            max_iterations: 64,
        }
    }

    #[test]
    fn finds_the_contribution_for_a_reachable_target() {
        let input = base_input(FundType::Balanced, 20);
        let result =
            solve_required_contribution(&input, config(100_000.0, 5_000.0)).expect("must solve");

        assert!(result.feasible);
        assert!(result.converged);
        let solved = result.solved_monthly_contribution.expect("value expected");
        // Closed-form annuity requirement is ~149.44/month at 9% over 20 years.
        assert_close(solved, 149.44, 0.05);

        let achieved = result.achieved_balance.expect("balance expected");
        assert!(achieved >= result.target_balance);
        assert!(!result.iterations.is_empty());
    }

    #[test]
    fn solved_bracket_is_tight() {
        let input = base_input(FundType::Conservative, 30);
        let result =
            solve_required_contribution(&input, config(250_000.0, 10_000.0)).expect("must solve");

        let solved = result.solved_monthly_contribution.expect("value expected");
        let just_below = (solved - 2.0 * result.tolerance).max(0.0);
        let mut cheaper = input.clone();
        cheaper.monthly_contribution = just_below;
        assert!(project(&cheaper).final_balance < result.target_balance);
    }

    #[test]
    fn lower_bound_already_meeting_target_short_circuits() {
        let mut input = base_input(FundType::Growth, 30);
        input.monthly_contribution = 500.0;

        let mut cfg = config(10_000.0, 1_000.0);
        cfg.search_min = 100.0;
        let result = solve_required_contribution(&input, cfg).expect("must solve");

        assert!(result.feasible);
        assert!(result.converged);
        assert_eq!(result.solved_monthly_contribution, Some(100.0));
        assert!(result.iterations.is_empty());
    }

    #[test]
    fn reports_infeasible_when_bounds_are_too_low() {
        let input = base_input(FundType::CapitalPreservation, 5);
        let result =
            solve_required_contribution(&input, config(1_000_000.0, 100.0)).expect("must return");

        assert!(!result.feasible);
        assert!(!result.converged);
        assert!(result.solved_monthly_contribution.is_none());
        assert!(result.achieved_balance.is_none());
    }

    #[test]
    fn rejects_invalid_configs() {
        let input = base_input(FundType::Balanced, 20);

        let cases = [
            (config(0.0, 5_000.0), "target_balance"),
            (config(-5.0, 5_000.0), "target_balance"),
            (
                SolveConfig {
                    search_min: -1.0,
                    ..config(100_000.0, 5_000.0)
                },
                "search_min",
            ),
            (
                SolveConfig {
                    search_max: 0.0,
                    ..config(100_000.0, 5_000.0)
                },
                "search_max",
            ),
            (
                SolveConfig {
                    tolerance: 0.0,
                    ..config(100_000.0, 5_000.0)
                },
                "tolerance",
            ),
            (
                SolveConfig {
                    max_iterations: 0,
                    ..config(100_000.0, 5_000.0)
                },
                "max_iterations",
            ),
        ];

        for (cfg, expected) in cases {
            let err = solve_required_contribution(&input, cfg).expect_err("config must fail");
            assert!(err.contains(expected), "{err} should mention {expected}");
        }
    }
}
