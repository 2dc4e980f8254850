use super::types::{CalculatorInput, FieldErrors, FundType, RawCalculatorInput};

pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 65;
/// Peruvian monthly minimum wage, the salary floor the enrolment rules use.
pub const MIN_MONTHLY_SALARY: f64 = 930.0;
pub const MIN_YEARS_TO_RETIREMENT: u32 = 1;
pub const MAX_YEARS_TO_RETIREMENT: u32 = 47;

// Field keys match the camelCase names the form posts, so the UI can map
// each message back onto its input control.
const AGE: &str = "age";
const SALARY: &str = "salary";
const MONTHLY_CONTRIBUTION: &str = "monthlyContribution";
const FUND_TYPE: &str = "fundType";
const YEARS_TO_RETIREMENT: &str = "yearsToRetirement";

/// Coerces the raw form fields to numbers and bounds-checks them. Every
/// violated field is reported, one message each, in field declaration order.
pub fn validate(raw: &RawCalculatorInput) -> Result<CalculatorInput, FieldErrors> {
    let mut errors = FieldErrors::default();

    let age = require_u32(&mut errors, AGE, raw.age.as_deref(), "age");
    let age = age.filter(|&value| check_age(&mut errors, value));

    let salary = require_f64(&mut errors, SALARY, raw.salary.as_deref(), "salary");
    let salary = salary.filter(|&value| check_salary(&mut errors, value));

    let monthly_contribution = require_f64(
        &mut errors,
        MONTHLY_CONTRIBUTION,
        raw.monthly_contribution.as_deref(),
        "monthly contribution",
    );
    let monthly_contribution =
        monthly_contribution.filter(|&value| check_monthly_contribution(&mut errors, value));

    let fund_type = require_fund_type(&mut errors, raw.fund_type.as_deref());

    let years_to_retirement = require_u32(
        &mut errors,
        YEARS_TO_RETIREMENT,
        raw.years_to_retirement.as_deref(),
        "years to retirement",
    );
    let years_to_retirement =
        years_to_retirement.filter(|&value| check_years_to_retirement(&mut errors, value));

    match (
        age,
        salary,
        monthly_contribution,
        fund_type,
        years_to_retirement,
    ) {
        (
            Some(age),
            Some(salary),
            Some(monthly_contribution),
            Some(fund_type),
            Some(years_to_retirement),
        ) => Ok(CalculatorInput {
            age,
            salary,
            monthly_contribution,
            fund_type,
            years_to_retirement,
        }),
        _ => Err(errors),
    }
}

impl CalculatorInput {
    /// Bounds-checks already-typed values, for callers (like the CLI) whose
    /// arguments never existed as form strings.
    pub fn new(
        age: u32,
        salary: f64,
        monthly_contribution: f64,
        fund_type: FundType,
        years_to_retirement: u32,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::default();
        check_age(&mut errors, age);
        check_salary(&mut errors, salary);
        check_monthly_contribution(&mut errors, monthly_contribution);
        check_years_to_retirement(&mut errors, years_to_retirement);

        if errors.is_empty() {
            Ok(Self {
                age,
                salary,
                monthly_contribution,
                fund_type,
                years_to_retirement,
            })
        } else {
            Err(errors)
        }
    }
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|text| !text.is_empty())
}

fn require_u32(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: Option<&str>,
    noun: &str,
) -> Option<u32> {
    let Some(text) = present(raw) else {
        errors.push(field, format!("{noun} is required"));
        return None;
    };
    match text.parse::<u32>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(field, format!("{noun} must be a whole number"));
            None
        }
    }
}

fn require_f64(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: Option<&str>,
    noun: &str,
) -> Option<f64> {
    let Some(text) = present(raw) else {
        errors.push(field, format!("{noun} is required"));
        return None;
    };
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            errors.push(field, format!("{noun} must be a number"));
            None
        }
    }
}

fn require_fund_type(errors: &mut FieldErrors, raw: Option<&str>) -> Option<FundType> {
    let Some(code) = present(raw) else {
        errors.push(FUND_TYPE, "fund type is required");
        return None;
    };
    match FundType::from_code(code) {
        Ok(fund) => Some(fund),
        Err(_) => {
            errors.push(FUND_TYPE, "fund type must be one of 0, 1, 2 or 3");
            None
        }
    }
}

fn check_age(errors: &mut FieldErrors, age: u32) -> bool {
    if (MIN_AGE..=MAX_AGE).contains(&age) {
        true
    } else {
        errors.push(AGE, format!("age must be between {MIN_AGE} and {MAX_AGE}"));
        false
    }
}

fn check_salary(errors: &mut FieldErrors, salary: f64) -> bool {
    if salary >= MIN_MONTHLY_SALARY {
        true
    } else {
        errors.push(
            SALARY,
            format!("salary must be at least {MIN_MONTHLY_SALARY}"),
        );
        false
    }
}

fn check_monthly_contribution(errors: &mut FieldErrors, monthly_contribution: f64) -> bool {
    if monthly_contribution >= 0.0 {
        true
    } else {
        errors.push(MONTHLY_CONTRIBUTION, "monthly contribution must be 0 or greater");
        false
    }
}

fn check_years_to_retirement(errors: &mut FieldErrors, years: u32) -> bool {
    if (MIN_YEARS_TO_RETIREMENT..=MAX_YEARS_TO_RETIREMENT).contains(&years) {
        true
    } else {
        errors.push(
            YEARS_TO_RETIREMENT,
            format!(
                "years to retirement must be between {MIN_YEARS_TO_RETIREMENT} and {MAX_YEARS_TO_RETIREMENT}"
            ),
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn raw(
        age: &str,
        salary: &str,
        monthly_contribution: &str,
        fund_type: &str,
        years_to_retirement: &str,
    ) -> RawCalculatorInput {
        let field = |text: &str| {
            if text.is_empty() {
                None
            } else {
                Some(text.to_string())
            }
        };
        RawCalculatorInput {
            age: field(age),
            salary: field(salary),
            monthly_contribution: field(monthly_contribution),
            fund_type: field(fund_type),
            years_to_retirement: field(years_to_retirement),
        }
    }

    #[test]
    fn accepts_the_reference_scenario() {
        let input = validate(&raw("35", "2500", "250", "1", "30")).expect("valid input");
        assert_eq!(input.age, 35);
        assert_eq!(input.salary, 2500.0);
        assert_eq!(input.monthly_contribution, 250.0);
        assert_eq!(input.fund_type, FundType::Conservative);
        assert_eq!(input.years_to_retirement, 30);
    }

    #[test]
    fn trims_whitespace_before_coercion() {
        let input = validate(&raw("  35 ", " 2500.50", "0 ", " 2", " 30 ")).expect("valid input");
        assert_eq!(input.age, 35);
        assert_eq!(input.salary, 2500.5);
        assert_eq!(input.monthly_contribution, 0.0);
        assert_eq!(input.fund_type, FundType::Balanced);
    }

    #[test]
    fn underage_applicant_gets_exactly_one_error() {
        let errors = validate(&raw("17", "2500", "250", "1", "30")).expect_err("17 is underage");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.message_for("age"),
            Some("age must be between 18 and 65")
        );
    }

    #[test]
    fn below_minimum_wage_gets_exactly_one_error() {
        let errors = validate(&raw("35", "500", "250", "1", "30")).expect_err("500 < 930");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.message_for("salary"),
            Some("salary must be at least 930")
        );
    }

    #[test]
    fn every_violated_field_is_reported_in_declaration_order() {
        let errors =
            validate(&raw("17", "500", "-1", "9", "0")).expect_err("all five fields violated");
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "age",
                "salary",
                "monthlyContribution",
                "fundType",
                "yearsToRetirement"
            ]
        );
    }

    #[test]
    fn missing_fields_are_required() {
        let errors = validate(&RawCalculatorInput::default()).expect_err("empty form");
        assert_eq!(errors.len(), 5);
        assert_eq!(errors.message_for("age"), Some("age is required"));
        assert_eq!(
            errors.message_for("fundType"),
            Some("fund type is required")
        );
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let errors = validate(&raw("  ", "2500", "250", "1", "30")).expect_err("blank age");
        assert_eq!(errors.message_for("age"), Some("age is required"));
    }

    #[test]
    fn malformed_numbers_are_rejected_before_bounds() {
        let errors = validate(&raw("treinta", "2,500", "250", "1", "30.5"))
            .expect_err("unparseable fields");
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.message_for("age"),
            Some("age must be a whole number")
        );
        assert_eq!(
            errors.message_for("salary"),
            Some("salary must be a number")
        );
        assert_eq!(
            errors.message_for("yearsToRetirement"),
            Some("years to retirement must be a whole number")
        );
    }

    #[test]
    fn non_finite_salary_is_not_a_number() {
        let errors = validate(&raw("35", "inf", "250", "1", "30")).expect_err("inf salary");
        assert_eq!(
            errors.message_for("salary"),
            Some("salary must be a number")
        );
    }

    #[test]
    fn fund_type_membership_is_closed() {
        for code in ["0", "1", "2", "3"] {
            assert!(validate(&raw("35", "2500", "250", code, "30")).is_ok());
        }
        for code in ["4", "-1", "03", "conservador"] {
            let errors =
                validate(&raw("35", "2500", "250", code, "30")).expect_err("code outside the enum");
            assert_eq!(
                errors.message_for("fundType"),
                Some("fund type must be one of 0, 1, 2 or 3"),
                "code {code}"
            );
        }
    }

    #[test]
    fn field_bounds_are_inclusive() {
        assert!(validate(&raw("18", "930", "0", "0", "1")).is_ok());
        assert!(validate(&raw("65", "930", "0", "3", "47")).is_ok());
        assert!(validate(&raw("66", "930", "0", "3", "47")).is_err());
        assert!(validate(&raw("65", "929.99", "0", "3", "47")).is_err());
        assert!(validate(&raw("65", "930", "-0.01", "3", "47")).is_err());
        assert!(validate(&raw("65", "930", "0", "3", "48")).is_err());
        assert!(validate(&raw("65", "930", "0", "3", "0")).is_err());
    }

    #[test]
    fn typed_constructor_applies_the_same_bounds() {
        assert!(CalculatorInput::new(35, 2500.0, 250.0, FundType::Conservative, 30).is_ok());

        let errors = CalculatorInput::new(17, 500.0, -1.0, FundType::Growth, 0)
            .expect_err("four fields violated");
        assert_eq!(errors.len(), 4);
        assert_eq!(
            errors.message_for("age"),
            Some("age must be between 18 and 65")
        );
        assert_eq!(errors.message_for("fundType"), None);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_age_bounds_are_enforced_exactly(age in 0u32..120) {
            let result = validate(&raw(&age.to_string(), "2500", "250", "1", "30"));
            let in_range = (MIN_AGE..=MAX_AGE).contains(&age);
            match result {
                Ok(input) => {
                    prop_assert!(in_range);
                    prop_assert_eq!(input.age, age);
                }
                Err(errors) => {
                    prop_assert!(!in_range);
                    prop_assert!(errors.message_for("age").is_some());
                    prop_assert_eq!(errors.len(), 1);
                }
            }
        }

        #[test]
        fn prop_years_bounds_are_enforced_exactly(years in 0u32..100) {
            let result = validate(&raw("35", "2500", "250", "1", &years.to_string()));
            let in_range = (MIN_YEARS_TO_RETIREMENT..=MAX_YEARS_TO_RETIREMENT).contains(&years);
            match result {
                Ok(input) => {
                    prop_assert!(in_range);
                    prop_assert_eq!(input.years_to_retirement, years);
                }
                Err(errors) => {
                    prop_assert!(!in_range);
                    prop_assert!(errors.message_for("yearsToRetirement").is_some());
                }
            }
        }
    }
}
