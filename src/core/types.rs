use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CompoundingFrequency {
    Daily,
    Monthly,
    Quarterly,
    Annually,
    Continuous,
}

/// Tax treatment applied to the terminal balance. 401(k) and traditional IRA
/// accounts are both `TaxDeferred`; Roth IRA is `TaxFree`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AccountType {
    Taxable,
    TaxDeferred,
    TaxFree,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    /// Annual `(mean return, volatility)` as fractions.
    pub fn return_profile(self) -> (f64, f64) {
        match self {
            RiskTolerance::Conservative => (0.04, 0.05),
            RiskTolerance::Moderate => (0.07, 0.12),
            RiskTolerance::Aggressive => (0.10, 0.18),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SamplingMethod {
    #[default]
    UniformPerturbation,
    Gaussian,
}

/// One calculation request. Rates are percents as entered (7.0 means 7%).
#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentSettings {
    pub initial_amount: f64,
    pub monthly_contribution: f64,
    pub annual_interest_rate: f64,
    pub compounding_frequency: CompoundingFrequency,
    pub investment_period_years: u32,
    pub inflation_rate: f64,
    pub tax_rate: f64,
    pub account_type: AccountType,
}

impl InvestmentSettings {
    pub fn rate_fraction(&self) -> f64 {
        self.annual_interest_rate / 100.0
    }

    pub fn inflation_fraction(&self) -> f64 {
        self.inflation_rate / 100.0
    }

    pub fn tax_fraction(&self) -> f64 {
        self.tax_rate / 100.0
    }

    pub fn total_months(&self) -> u32 {
        self.investment_period_years * 12
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvancedSettings {
    /// Accepted but not applied by the simulator.
    pub contribution_growth_rate: f64,
    pub risk_tolerance: Option<RiskTolerance>,
    pub sampling_method: SamplingMethod,
    pub goal_amount: Option<f64>,
    pub current_age: Option<u32>,
    pub retirement_age: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateConversion {
    pub nominal_rate: f64,
    /// `None` for continuous compounding.
    pub periods_per_year: Option<u32>,
    pub effective_annual_rate: f64,
    pub monthly_rate: f64,
    pub continuous_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBreakdownEntry {
    pub month: u32,
    pub contribution: f64,
    pub interest_earned: f64,
    pub nominal_balance: f64,
    pub real_balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlySummary {
    pub year: u32,
    pub contributions: f64,
    pub interest_earned: f64,
    pub nominal_balance: f64,
    pub real_balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GrowthTrajectory {
    pub months: Vec<MonthlyBreakdownEntry>,
    pub total_contributions: f64,
    pub total_interest: f64,
}

impl GrowthTrajectory {
    pub fn future_value(&self) -> f64 {
        self.months.last().map(|m| m.nominal_balance).unwrap_or(0.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GoalIndeterminate {
    NonPositiveInitialAmount,
    NonPositiveMonthlyRate,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "value")]
pub enum MonthsToGoal {
    Months(f64),
    Indeterminate(GoalIndeterminate),
}

impl MonthsToGoal {
    pub fn months(self) -> Option<f64> {
        match self {
            MonthsToGoal::Months(m) => Some(m),
            MonthsToGoal::Indeterminate(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalAnalysis {
    pub goal_amount: f64,
    pub months_to_goal: MonthsToGoal,
    pub years_to_goal: Option<f64>,
    pub required_monthly_contribution: f64,
    pub on_track: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloSummary {
    pub simulations: u32,
    pub success_probability: f64,
    pub median_terminal_balance: f64,
    pub p10_terminal_balance: f64,
    pub p90_terminal_balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementAnalysis {
    pub mean_annual_return: f64,
    pub annual_volatility: f64,
    pub success_probability: f64,
    pub median_terminal_balance: f64,
    pub p10_terminal_balance: f64,
    pub p90_terminal_balance: f64,
    pub safe_annual_withdrawal: f64,
    pub safe_monthly_withdrawal: f64,
    pub years_to_retirement: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub future_value: f64,
    pub continuous_compounding_value: f64,
    pub effective_annual_rate: f64,
    pub total_contributions: f64,
    pub total_interest: f64,
    pub real_value: f64,
    pub after_tax_value: f64,
    pub rate: RateConversion,
    pub monthly_breakdown: Vec<MonthlyBreakdownEntry>,
    pub yearly_summary: Vec<YearlySummary>,
    pub retirement_analysis: Option<RetirementAnalysis>,
    pub goal_analysis: Option<GoalAnalysis>,
}
