use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::adjust::{after_tax, real_value};
use super::engine::{simulate_growth, simulate_growth_at, summarize_years};
use super::error::{FieldError, ValidationError};
use super::monte_carlo::{MonteCarloConfig, SIMULATIONS, estimate_success};
use super::rates::convert_rate;
use super::solver::{GoalSolveConfig, solve_goal};
use super::types::{
    AdvancedSettings, CompoundingFrequency, InvestmentSettings, ProjectionResult,
    RetirementAnalysis, RiskTolerance,
};

/// Annual share of the portfolio the 4% rule treats as a sustainable draw.
const SAFE_WITHDRAWAL_RATE: f64 = 0.04;

/// Projects with a Monte Carlo source seeded from OS entropy.
pub fn project(
    settings: &InvestmentSettings,
    advanced: &AdvancedSettings,
) -> Result<ProjectionResult, ValidationError> {
    let mut rng = StdRng::from_entropy();
    project_with_rng(settings, advanced, &mut rng)
}

/// Validates once, then runs every stage in order. `rng` is only consumed
/// when a risk-tolerance profile is present.
pub fn project_with_rng<R: Rng + ?Sized>(
    settings: &InvestmentSettings,
    advanced: &AdvancedSettings,
    rng: &mut R,
) -> Result<ProjectionResult, ValidationError> {
    validate(settings, advanced)?;

    let rate = convert_rate(settings.rate_fraction(), settings.compounding_frequency);
    debug!(
        effective_annual_rate = rate.effective_annual_rate,
        monthly_rate = rate.monthly_rate,
        "converted nominal rate"
    );

    let trajectory = simulate_growth(settings);
    let future_value = ensure_finite("futureValue", trajectory.future_value())?;
    let continuous_compounding_value = ensure_finite(
        "continuousCompoundingValue",
        simulate_growth_at(settings, CompoundingFrequency::Continuous).future_value(),
    )?;

    let real = real_value(
        future_value,
        settings.inflation_fraction(),
        settings.investment_period_years,
    );
    let after_tax_value = after_tax(
        future_value,
        settings.tax_fraction(),
        settings.account_type,
    );
    debug!(future_value, real, after_tax_value, "applied adjustments");

    let goal_analysis = advanced.goal_amount.map(|goal_amount| {
        solve_goal(
            GoalSolveConfig {
                goal_amount,
                initial_amount: settings.initial_amount,
                monthly_rate: rate.monthly_rate,
                investment_period_years: settings.investment_period_years,
            },
            future_value,
        )
    });

    let retirement_analysis = match advanced.risk_tolerance {
        Some(profile) => Some(analyse_retirement(
            settings,
            advanced,
            profile,
            future_value,
            rng,
        )?),
        None => None,
    };

    info!(
        years = settings.investment_period_years,
        future_value,
        total_contributions = trajectory.total_contributions,
        goal = goal_analysis.is_some(),
        monte_carlo = retirement_analysis.is_some(),
        "projection complete"
    );

    let yearly_summary = summarize_years(&trajectory.months);
    Ok(ProjectionResult {
        future_value,
        continuous_compounding_value,
        effective_annual_rate: rate.effective_annual_rate,
        total_contributions: trajectory.total_contributions,
        total_interest: trajectory.total_interest,
        real_value: real,
        after_tax_value,
        rate,
        monthly_breakdown: trajectory.months,
        yearly_summary,
        retirement_analysis,
        goal_analysis,
    })
}

fn analyse_retirement<R: Rng + ?Sized>(
    settings: &InvestmentSettings,
    advanced: &AdvancedSettings,
    profile: RiskTolerance,
    future_value: f64,
    rng: &mut R,
) -> Result<RetirementAnalysis, ValidationError> {
    let (mean_annual_return, annual_volatility) = profile.return_profile();
    let summary = estimate_success(
        MonteCarloConfig {
            initial_amount: settings.initial_amount,
            monthly_contribution: settings.monthly_contribution,
            years: settings.investment_period_years,
            mean_return: mean_annual_return,
            volatility: annual_volatility,
            target_amount: advanced.goal_amount,
            simulations: SIMULATIONS,
        },
        &advanced.sampling_method,
        rng,
    );
    let safe_annual_withdrawal = future_value * SAFE_WITHDRAWAL_RATE;

    Ok(RetirementAnalysis {
        mean_annual_return,
        annual_volatility,
        success_probability: summary.success_probability,
        median_terminal_balance: ensure_finite(
            "medianTerminalBalance",
            summary.median_terminal_balance,
        )?,
        p10_terminal_balance: ensure_finite("p10TerminalBalance", summary.p10_terminal_balance)?,
        p90_terminal_balance: ensure_finite("p90TerminalBalance", summary.p90_terminal_balance)?,
        safe_annual_withdrawal,
        safe_monthly_withdrawal: safe_annual_withdrawal / 12.0,
        years_to_retirement: match (advanced.current_age, advanced.retirement_age) {
            (Some(current), Some(retirement)) => Some(retirement.saturating_sub(current)),
            _ => None,
        },
    })
}

/// Valid inputs can still compound past `f64::MAX`; report that instead of
/// passing `inf` downstream.
fn ensure_finite(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError {
            errors: vec![FieldError::Overflow { field }],
        })
    }
}

/// Collects every violated constraint before any computation runs.
pub fn validate(
    settings: &InvestmentSettings,
    advanced: &AdvancedSettings,
) -> Result<(), ValidationError> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("initialAmount", settings.initial_amount),
        ("monthlyContribution", settings.monthly_contribution),
    ] {
        if !value.is_finite() {
            errors.push(FieldError::NonFinite { field });
        } else if value < 0.0 {
            errors.push(FieldError::NegativeAmount { field, value });
        }
    }

    if !settings.annual_interest_rate.is_finite() {
        errors.push(FieldError::NonFinite {
            field: "annualInterestRate",
        });
    } else if !(-50.0..=50.0).contains(&settings.annual_interest_rate) {
        errors.push(FieldError::InvalidRate(settings.annual_interest_rate));
    }

    if !(1..=100).contains(&settings.investment_period_years) {
        errors.push(FieldError::InvalidPeriod(settings.investment_period_years));
    }

    if !settings.inflation_rate.is_finite() {
        errors.push(FieldError::NonFinite {
            field: "inflationRate",
        });
    } else if settings.inflation_rate < 0.0 {
        errors.push(FieldError::InvalidInflation(settings.inflation_rate));
    }

    if !settings.tax_rate.is_finite() {
        errors.push(FieldError::NonFinite { field: "taxRate" });
    } else if !(0.0..=100.0).contains(&settings.tax_rate) {
        errors.push(FieldError::InvalidTaxRate(settings.tax_rate));
    }

    if !advanced.contribution_growth_rate.is_finite() {
        errors.push(FieldError::NonFinite {
            field: "contributionGrowthRate",
        });
    }

    if let Some(goal) = advanced.goal_amount {
        if !goal.is_finite() {
            errors.push(FieldError::NonFinite {
                field: "goalAmount",
            });
        } else if goal <= 0.0 {
            errors.push(FieldError::InvalidGoal(goal));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { errors })
    }
}
