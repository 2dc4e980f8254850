mod engine;
mod solver;
mod types;
mod validate;

pub use engine::project;
pub use solver::{SolveConfig, SolveIteration, SolveResult, solve_required_contribution};
pub use types::{
    CalculatorInput, FUND_PROFILES, FieldError, FieldErrors, FundProfile, FundType,
    InvalidFundType, ProjectionResult, ProjectionYear, RawCalculatorInput,
};
pub use validate::{
    MAX_AGE, MAX_YEARS_TO_RETIREMENT, MIN_AGE, MIN_MONTHLY_SALARY, MIN_YEARS_TO_RETIREMENT,
    validate,
};
