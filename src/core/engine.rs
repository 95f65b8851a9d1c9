use super::rates::monthly_rate;
use super::types::{
    CompoundingFrequency, GrowthTrajectory, InvestmentSettings, MonthlyBreakdownEntry,
    YearlySummary,
};

/// Steps the balance month by month under the settings' own compounding
/// frequency.
pub fn simulate_growth(settings: &InvestmentSettings) -> GrowthTrajectory {
    simulate_growth_at(settings, settings.compounding_frequency)
}

/// Same schedule as [`simulate_growth`] with the compounding frequency
/// overridden, used to produce the continuous-compounding comparison.
pub fn simulate_growth_at(
    settings: &InvestmentSettings,
    frequency: CompoundingFrequency,
) -> GrowthTrajectory {
    let rate = monthly_rate(settings.rate_fraction(), frequency);
    let inflation = settings.inflation_fraction();
    let total_months = settings.total_months();

    let mut balance = settings.initial_amount;
    let mut total_contributions = settings.initial_amount;
    let mut months = Vec::with_capacity(total_months as usize);

    for month in 1..=total_months {
        let contribution = if month > 1 {
            balance += settings.monthly_contribution;
            total_contributions += settings.monthly_contribution;
            settings.monthly_contribution
        } else {
            settings.initial_amount
        };

        let interest_earned = balance * rate;
        balance += interest_earned;

        months.push(MonthlyBreakdownEntry {
            month,
            contribution,
            interest_earned,
            nominal_balance: balance,
            real_balance: deflate(balance, inflation, month as f64 / 12.0),
        });
    }

    let future_value = months.last().map(|m| m.nominal_balance).unwrap_or(balance);
    GrowthTrajectory {
        months,
        total_contributions,
        total_interest: future_value - total_contributions,
    }
}

/// Rolls the monthly breakdown up into calendar years of the projection.
/// A trailing partial year is still reported.
pub fn summarize_years(months: &[MonthlyBreakdownEntry]) -> Vec<YearlySummary> {
    months
        .chunks(12)
        .enumerate()
        .filter_map(|(idx, chunk)| {
            let last = chunk.last()?;
            Some(YearlySummary {
                year: idx as u32 + 1,
                contributions: chunk.iter().map(|m| m.contribution).sum(),
                interest_earned: chunk.iter().map(|m| m.interest_earned).sum(),
                nominal_balance: last.nominal_balance,
                real_balance: last.real_balance,
            })
        })
        .collect()
}

pub(super) fn deflate(value: f64, inflation: f64, years: f64) -> f64 {
    value / (1.0 + inflation).powf(years)
}
