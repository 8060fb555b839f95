//! Credit standing and the operations allowed on it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::CreditError;

/// A farmer's credit standing: the limit and the amount currently owed.
///
/// Invariant: `0 <= current_balance <= credit_limit`. Constructing through
/// [`CreditStanding::new`] and mutating only via [`reserve`](Self::reserve)
/// and [`apply_repayment`](Self::apply_repayment) keeps it that way; the
/// database CHECK constraint is a backstop, not the enforcement point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditStanding {
    /// Maximum debt the farmer may carry.
    pub credit_limit: Decimal,
    /// Amount currently owed (not available credit).
    pub current_balance: Decimal,
}

impl CreditStanding {
    /// Creates a standing, validating `0 <= balance <= limit`.
    ///
    /// # Errors
    ///
    /// Returns `CreditError::InvalidStanding` if the pair violates the
    /// invariant.
    pub fn new(credit_limit: Decimal, current_balance: Decimal) -> Result<Self, CreditError> {
        if credit_limit < Decimal::ZERO
            || current_balance < Decimal::ZERO
            || current_balance > credit_limit
        {
            return Err(CreditError::InvalidStanding {
                limit: credit_limit,
                balance: current_balance,
            });
        }

        Ok(Self {
            credit_limit,
            current_balance,
        })
    }

    /// Credit still available to spend: `credit_limit - current_balance`.
    #[must_use]
    pub fn available_credit(&self) -> Decimal {
        self.credit_limit - self.current_balance
    }

    /// Amounts must be positive and no finer than the two decimal places
    /// the money columns keep, or the stored ledger row would drift from
    /// the balance it explains.
    fn validate_amount(amount: Decimal) -> Result<(), CreditError> {
        if amount <= Decimal::ZERO || amount.normalize().scale() > 2 {
            return Err(CreditError::InvalidAmount);
        }
        Ok(())
    }

    /// Reserves `amount` of credit for a purchase, returning the new
    /// standing (balance increased by `amount`).
    ///
    /// # Errors
    ///
    /// - `CreditError::InvalidAmount` if `amount <= 0` or finer than two
    ///   decimal places
    /// - `CreditError::LimitExceeded` if `amount` exceeds available credit
    pub fn reserve(&self, amount: Decimal) -> Result<Self, CreditError> {
        Self::validate_amount(amount)?;

        let available = self.available_credit();
        if amount > available {
            return Err(CreditError::LimitExceeded {
                available,
                required: amount,
            });
        }

        Ok(Self {
            credit_limit: self.credit_limit,
            current_balance: self.current_balance + amount,
        })
    }

    /// Applies a repayment, returning the new standing (balance decreased
    /// by `amount`).
    ///
    /// # Errors
    ///
    /// - `CreditError::InvalidAmount` if `amount <= 0` or finer than two
    ///   decimal places
    /// - `CreditError::ExceedsBalance` if `amount > current_balance`
    pub fn apply_repayment(&self, amount: Decimal) -> Result<Self, CreditError> {
        Self::validate_amount(amount)?;

        if amount > self.current_balance {
            return Err(CreditError::ExceedsBalance {
                balance: self.current_balance,
                amount,
            });
        }

        Ok(Self {
            credit_limit: self.credit_limit,
            current_balance: self.current_balance - amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_validates_bounds() {
        assert!(CreditStanding::new(dec!(100), dec!(0)).is_ok());
        assert!(CreditStanding::new(dec!(100), dec!(100)).is_ok());
        assert!(matches!(
            CreditStanding::new(dec!(100), dec!(-1)),
            Err(CreditError::InvalidStanding { .. })
        ));
        assert!(matches!(
            CreditStanding::new(dec!(100), dec!(101)),
            Err(CreditError::InvalidStanding { .. })
        ));
        assert!(matches!(
            CreditStanding::new(dec!(-5), dec!(0)),
            Err(CreditError::InvalidStanding { .. })
        ));
    }

    #[test]
    fn test_available_credit() {
        let standing = CreditStanding::new(dec!(100), dec!(90)).unwrap();
        assert_eq!(standing.available_credit(), dec!(10));
    }

    #[test]
    fn test_reserve_within_limit() {
        let standing = CreditStanding::new(dec!(100), dec!(40)).unwrap();
        let after = standing.reserve(dec!(60)).unwrap();
        assert_eq!(after.current_balance, dec!(100));
        assert_eq!(after.available_credit(), dec!(0));
    }

    #[test]
    fn test_reserve_over_limit_rejected() {
        // limit=100, balance=90: a 20.00 purchase must fail, balance untouched.
        let standing = CreditStanding::new(dec!(100), dec!(90)).unwrap();
        let result = standing.reserve(dec!(20));
        assert_eq!(
            result.unwrap_err(),
            CreditError::LimitExceeded {
                available: dec!(10),
                required: dec!(20),
            }
        );
        assert_eq!(standing.current_balance, dec!(90));
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-10))]
    fn test_reserve_non_positive_rejected(#[case] amount: Decimal) {
        let standing = CreditStanding::new(dec!(100), dec!(0)).unwrap();
        assert_eq!(standing.reserve(amount).unwrap_err(), CreditError::InvalidAmount);
    }

    #[test]
    fn test_repayment_sequence() {
        // balance=90: repay 50 -> 40, second repay 50 must fail at 40.
        let standing = CreditStanding::new(dec!(100), dec!(90)).unwrap();
        let after = standing.apply_repayment(dec!(50)).unwrap();
        assert_eq!(after.current_balance, dec!(40));

        let result = after.apply_repayment(dec!(50));
        assert_eq!(
            result.unwrap_err(),
            CreditError::ExceedsBalance {
                balance: dec!(40),
                amount: dec!(50),
            }
        );
        assert_eq!(after.current_balance, dec!(40));
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-1))]
    #[case(dec!(0.005))]
    fn test_repayment_non_positive_rejected(#[case] amount: Decimal) {
        let standing = CreditStanding::new(dec!(100), dec!(50)).unwrap();
        assert_eq!(
            standing.apply_repayment(amount).unwrap_err(),
            CreditError::InvalidAmount
        );
    }
}
