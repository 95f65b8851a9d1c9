mod adjust;
mod engine;
mod error;
mod monte_carlo;
mod projection;
mod rates;
mod solver;
mod types;

pub use adjust::{after_tax, real_value};
pub use engine::{simulate_growth, simulate_growth_at, summarize_years};
pub use error::{FieldError, ValidationError};
pub use monte_carlo::{
    Gaussian, MonteCarloConfig, ReturnSampler, SIMULATIONS, UniformPerturbation, estimate_success,
};
pub use projection::{project, project_with_rng, validate};
pub use rates::{convert_rate, effective_annual_rate, monthly_rate, periods_per_year};
pub use solver::{GoalSolveConfig, months_to_goal, required_monthly_contribution, solve_goal};
pub use types::{
    AccountType, AdvancedSettings, CompoundingFrequency, GoalAnalysis, GoalIndeterminate,
    GrowthTrajectory, InvestmentSettings, MonteCarloSummary, MonthlyBreakdownEntry, MonthsToGoal,
    ProjectionResult, RateConversion, RetirementAnalysis, RiskTolerance, SamplingMethod,
    YearlySummary,
};
