use serde::Serialize;
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FundType {
    CapitalPreservation,
    Conservative,
    Balanced,
    Growth,
}

#[derive(Debug, Clone, Copy)]
pub struct FundProfile {
    pub fund_type: FundType,
    pub code: &'static str,
    pub label: &'static str,
    pub annual_growth_rate: f64,
}

// Assumed nominal annual growth per fund. The SBS publishes historical
// returns only, so these are policy constants kept inside the ranges the
// product copy quotes (conservative 4-6%, aggressive 10-14%).
pub static FUND_PROFILES: [FundProfile; 4] = [
    FundProfile {
        fund_type: FundType::CapitalPreservation,
        code: "0",
        label: "Fondo 0 - Proteccion de capital",
        annual_growth_rate: 0.04,
    },
    FundProfile {
        fund_type: FundType::Conservative,
        code: "1",
        label: "Fondo 1 - Conservador",
        annual_growth_rate: 0.06,
    },
    FundProfile {
        fund_type: FundType::Balanced,
        code: "2",
        label: "Fondo 2 - Mixto",
        annual_growth_rate: 0.09,
    },
    FundProfile {
        fund_type: FundType::Growth,
        code: "3",
        label: "Fondo 3 - Crecimiento",
        annual_growth_rate: 0.12,
    },
];

#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("unknown fund type code {code:?}; expected one of 0, 1, 2 or 3")]
pub struct InvalidFundType {
    pub code: String,
}

impl FundType {
    pub const ALL: [FundType; 4] = [
        FundType::CapitalPreservation,
        FundType::Conservative,
        FundType::Balanced,
        FundType::Growth,
    ];

    pub fn from_code(code: &str) -> Result<Self, InvalidFundType> {
        match code {
            "0" => Ok(FundType::CapitalPreservation),
            "1" => Ok(FundType::Conservative),
            "2" => Ok(FundType::Balanced),
            "3" => Ok(FundType::Growth),
            other => Err(InvalidFundType {
                code: other.to_string(),
            }),
        }
    }

    pub fn profile(self) -> &'static FundProfile {
        match self {
            FundType::CapitalPreservation => &FUND_PROFILES[0],
            FundType::Conservative => &FUND_PROFILES[1],
            FundType::Balanced => &FUND_PROFILES[2],
            FundType::Growth => &FUND_PROFILES[3],
        }
    }

    pub fn code(self) -> &'static str {
        self.profile().code
    }

    pub fn annual_growth_rate(self) -> f64 {
        self.profile().annual_growth_rate
    }
}

/// The five calculator fields exactly as the form delivers them, before any
/// coercion. Absent and empty values are equivalent to the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCalculatorInput {
    pub age: Option<String>,
    pub salary: Option<String>,
    pub monthly_contribution: Option<String>,
    pub fund_type: Option<String>,
    pub years_to_retirement: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorInput {
    pub age: u32,
    pub salary: f64,
    pub monthly_contribution: f64,
    pub fund_type: FundType,
    pub years_to_retirement: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Per-field validation failures, in field declaration order. Returned as
/// data rather than panicked: a rejected form is the expected outcome while
/// the user is still typing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (idx, error) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionYear {
    pub year: u32,
    pub contributions: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub total_contributions: f64,
    pub total_growth: f64,
    pub final_balance: f64,
    pub projection_by_year: Vec<ProjectionYear>,
}
