//! Commission policy.
//!
//! The platform takes a fixed-rate cut of every produce sale, credited to a
//! designated administrator. Rate and beneficiary come from configuration
//! ([`agrilink_shared::config::CommissionConfig`]); there is no hidden
//! module-level constant and no "first admin found" lookup.

use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use agrilink_shared::config::CommissionConfig;

/// Commission policy applied to produce sales.
#[derive(Debug, Clone, Copy)]
pub struct CommissionPolicy {
    rate: Decimal,
    beneficiary_id: Uuid,
}

impl CommissionPolicy {
    /// Creates a policy with the given rate and beneficiary.
    #[must_use]
    pub const fn new(rate: Decimal, beneficiary_id: Uuid) -> Self {
        Self {
            rate,
            beneficiary_id,
        }
    }

    /// The commission rate as a fraction of the sale total.
    #[must_use]
    pub const fn rate(&self) -> Decimal {
        self.rate
    }

    /// The administrator credited with commissions.
    #[must_use]
    pub const fn beneficiary_id(&self) -> Uuid {
        self.beneficiary_id
    }

    /// Derives the commission amount from a sale total.
    ///
    /// Rounds half-even to 2 decimal places, matching the money columns.
    #[must_use]
    pub fn compute(&self, sale_total: Decimal) -> Decimal {
        (sale_total * self.rate).round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
    }
}

impl From<&CommissionConfig> for CommissionPolicy {
    fn from(config: &CommissionConfig) -> Self {
        Self::new(config.rate, config.beneficiary_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn policy() -> CommissionPolicy {
        CommissionPolicy::new(dec!(0.05), Uuid::new_v4())
    }

    #[test]
    fn test_five_percent_of_sale_total() {
        assert_eq!(policy().compute(dec!(15.00)), dec!(0.75));
        assert_eq!(policy().compute(dec!(100.00)), dec!(5.00));
    }

    #[test]
    fn test_zero_total_yields_zero_commission() {
        assert_eq!(policy().compute(dec!(0)), dec!(0));
    }

    #[test]
    fn test_rounds_half_even_to_cents() {
        // 2.50 * 0.05 = 0.125, a midpoint -> 0.12 (even cent)
        assert_eq!(policy().compute(dec!(2.50)), dec!(0.12));
        // 2.70 * 0.05 = 0.135, a midpoint -> 0.14 (even cent)
        assert_eq!(policy().compute(dec!(2.70)), dec!(0.14));
    }

    #[test]
    fn test_from_config() {
        let config = CommissionConfig {
            rate: dec!(0.10),
            beneficiary_id: Uuid::new_v4(),
        };
        let policy = CommissionPolicy::from(&config);
        assert_eq!(policy.rate(), dec!(0.10));
        assert_eq!(policy.beneficiary_id(), config.beneficiary_id);
        assert_eq!(policy.compute(dec!(50.00)), dec!(5.00));
    }
}
