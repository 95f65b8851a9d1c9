use super::types::{GoalAnalysis, GoalIndeterminate, MonthsToGoal};

#[derive(Debug, Clone, Copy)]
pub struct GoalSolveConfig {
    pub goal_amount: f64,
    pub initial_amount: f64,
    pub monthly_rate: f64,
    pub investment_period_years: u32,
}

/// Months for the initial amount alone to grow to the goal at `monthly_rate`.
pub fn months_to_goal(goal_amount: f64, initial_amount: f64, monthly_rate: f64) -> MonthsToGoal {
    if initial_amount <= 0.0 {
        return MonthsToGoal::Indeterminate(GoalIndeterminate::NonPositiveInitialAmount);
    }
    if goal_amount <= initial_amount {
        return MonthsToGoal::Months(0.0);
    }
    if monthly_rate <= 0.0 {
        return MonthsToGoal::Indeterminate(GoalIndeterminate::NonPositiveMonthlyRate);
    }

    let months = (goal_amount / initial_amount).ln() / monthly_rate.ln_1p();
    MonthsToGoal::Months(months.max(0.0))
}

/// Level monthly deposit that, together with the initial amount, reaches the
/// goal after `months` using `FV = P(1+i)^n + C((1+i)^n - 1)/i`.
pub fn required_monthly_contribution(
    goal_amount: f64,
    initial_amount: f64,
    monthly_rate: f64,
    months: u32,
) -> f64 {
    if months == 0 {
        return 0.0;
    }

    let n = months as f64;
    let growth = (1.0 + monthly_rate).powf(n);
    let shortfall = goal_amount - initial_amount * growth;
    let annuity_factor = if monthly_rate.abs() < 1e-12 {
        n
    } else {
        (growth - 1.0) / monthly_rate
    };
    if annuity_factor <= 0.0 {
        return 0.0;
    }

    (shortfall / annuity_factor).max(0.0)
}

pub fn solve_goal(config: GoalSolveConfig, future_value: f64) -> GoalAnalysis {
    let months_to_goal = months_to_goal(
        config.goal_amount,
        config.initial_amount,
        config.monthly_rate,
    );
    let required_monthly_contribution = required_monthly_contribution(
        config.goal_amount,
        config.initial_amount,
        config.monthly_rate,
        config.investment_period_years * 12,
    );

    GoalAnalysis {
        goal_amount: config.goal_amount,
        months_to_goal,
        years_to_goal: months_to_goal.months().map(|m| m / 12.0),
        required_monthly_contribution,
        on_track: future_value >= config.goal_amount,
    }
}
