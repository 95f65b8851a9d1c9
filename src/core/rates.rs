use super::types::{CompoundingFrequency, RateConversion};

pub fn periods_per_year(frequency: CompoundingFrequency) -> Option<u32> {
    match frequency {
        CompoundingFrequency::Daily => Some(365),
        CompoundingFrequency::Monthly => Some(12),
        CompoundingFrequency::Quarterly => Some(4),
        CompoundingFrequency::Annually => Some(1),
        CompoundingFrequency::Continuous => None,
    }
}

pub fn effective_annual_rate(rate: f64, frequency: CompoundingFrequency) -> f64 {
    match periods_per_year(frequency) {
        Some(n) => {
            let n = n as f64;
            (1.0 + rate / n).powf(n) - 1.0
        }
        None => rate.exp_m1(),
    }
}

/// Growth rate applied once per simulated month.
///
/// Daily, quarterly and annual compounding are folded into an equivalent
/// monthly rate so the simulator can step every frequency the same way.
pub fn monthly_rate(rate: f64, frequency: CompoundingFrequency) -> f64 {
    match frequency {
        CompoundingFrequency::Monthly => rate / 12.0,
        CompoundingFrequency::Continuous => (rate / 12.0).exp_m1(),
        _ => {
            let n = periods_per_year(frequency).unwrap_or(12) as f64;
            (1.0 + rate / n).powf(n / 12.0) - 1.0
        }
    }
}

/// `rate` is the nominal annual rate as a fraction.
pub fn convert_rate(rate: f64, frequency: CompoundingFrequency) -> RateConversion {
    let effective_annual_rate = effective_annual_rate(rate, frequency);
    RateConversion {
        nominal_rate: rate,
        periods_per_year: periods_per_year(frequency),
        effective_annual_rate,
        monthly_rate: monthly_rate(rate, frequency),
        continuous_rate: (1.0 + effective_annual_rate).ln(),
    }
}
