use thiserror::Error;

/// Every rule a set of plan parameters violated, in checking order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid plan parameters: {}", .violations.join("; "))]
pub struct ValidationError {
    violations: Vec<String>,
}

impl ValidationError {
    pub(crate) fn new(violations: Vec<String>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No retirement age up to life expectancy keeps the balance non-negative.
    #[error(
        "unable to find a sustainable retirement age between {retirement_age} and {life_expectancy}"
    )]
    SearchExhausted {
        retirement_age: u32,
        life_expectancy: u32,
    },
}
