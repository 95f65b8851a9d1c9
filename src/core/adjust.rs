use super::engine::deflate;
use super::types::AccountType;

/// Share of the tax rate charged on taxable accounts, a rough stand-in for
/// long-term capital gains treatment.
const TAXABLE_ACCOUNT_TAX_SHARE: f64 = 0.15;

/// Expresses a nominal terminal value in today's purchasing power.
pub fn real_value(nominal_future_value: f64, inflation_rate: f64, years: u32) -> f64 {
    deflate(nominal_future_value, inflation_rate, years as f64)
}

/// `tax_rate` is a fraction in [0, 1].
pub fn after_tax(value: f64, tax_rate: f64, account_type: AccountType) -> f64 {
    match account_type {
        AccountType::TaxFree => value,
        AccountType::TaxDeferred => value * (1.0 - tax_rate),
        AccountType::Taxable => value * (1.0 - tax_rate * TAXABLE_ACCOUNT_TAX_SHARE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn real_value_discounts_by_compound_inflation() {
        assert_approx(real_value(1_000.0, 0.0, 10), 1_000.0);
        assert_approx(real_value(1_102.5, 0.05, 2), 1_000.0);
    }

    #[test]
    fn tax_free_accounts_are_untouched() {
        assert_approx(after_tax(250_000.0, 0.37, AccountType::TaxFree), 250_000.0);
    }

    #[test]
    fn tax_deferred_accounts_pay_full_rate() {
        assert_approx(after_tax(100_000.0, 0.22, AccountType::TaxDeferred), 78_000.0);
    }

    #[test]
    fn taxable_accounts_pay_a_fraction_of_the_rate() {
        assert_approx(after_tax(100_000.0, 0.22, AccountType::Taxable), 96_700.0);
    }

    #[test]
    fn zero_tax_rate_leaves_every_account_whole() {
        for account in [
            AccountType::Taxable,
            AccountType::TaxDeferred,
            AccountType::TaxFree,
        ] {
            assert_approx(after_tax(5_000.0, 0.0, account), 5_000.0);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_tax_ordering_holds(
            value in 0u32..10_000_000,
            tax_bp in 1u32..10_001
        ) {
            let value = value as f64;
            let tax = tax_bp as f64 / 10_000.0;
            let free = after_tax(value, tax, AccountType::TaxFree);
            let deferred = after_tax(value, tax, AccountType::TaxDeferred);
            let taxable = after_tax(value, tax, AccountType::Taxable);

            prop_assert_eq!(free, value);
            prop_assert!(deferred <= value);
            prop_assert!(taxable <= value);
            prop_assert!(deferred <= taxable);
        }
    }
}
