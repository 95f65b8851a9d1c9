use thiserror::Error;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("annualInterestRate must be between -50 and 50 percent, got {0}")]
    InvalidRate(f64),
    #[error("investmentPeriodYears must be between 1 and 100, got {0}")]
    InvalidPeriod(u32),
    #[error("{field} must be >= 0, got {value}")]
    NegativeAmount { field: &'static str, value: f64 },
    #[error("inflationRate must be >= 0 percent, got {0}")]
    InvalidInflation(f64),
    #[error("taxRate must be between 0 and 100 percent, got {0}")]
    InvalidTaxRate(f64),
    #[error("goalAmount must be > 0, got {0}")]
    InvalidGoal(f64),
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("{field} is too large to represent as a finite number")]
    Overflow { field: &'static str },
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::InvalidRate(_) => "annualInterestRate",
            FieldError::InvalidPeriod(_) => "investmentPeriodYears",
            FieldError::NegativeAmount { field, .. } => *field,
            FieldError::InvalidInflation(_) => "inflationRate",
            FieldError::InvalidTaxRate(_) => "taxRate",
            FieldError::InvalidGoal(_) => "goalAmount",
            FieldError::NonFinite { field } => *field,
            FieldError::Overflow { field } => *field,
        }
    }
}

/// Every field that failed validation for a single request.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid projection settings: {}", join_messages(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.iter().map(FieldError::field)
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
