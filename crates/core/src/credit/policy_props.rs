//! Property-based tests for credit policy.
//!
//! For every sequence of reservations and repayments, a standing that
//! starts valid stays within `0 <= current_balance <= credit_limit`.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::policy::CreditStanding;

/// A reservation or repayment amount in cents (may be out of range on
/// purpose; invalid steps must be rejected without corrupting state).
#[derive(Debug, Clone)]
enum Step {
    Reserve(Decimal),
    Repay(Decimal),
}

fn amount() -> impl Strategy<Value = Decimal> {
    (-1_000i64..20_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![amount().prop_map(Step::Reserve), amount().prop_map(Step::Repay)]
}

proptest! {
    #[test]
    fn prop_balance_stays_within_bounds(
        limit_cents in 0i64..100_000i64,
        steps in proptest::collection::vec(step(), 0..40),
    ) {
        let limit = Decimal::new(limit_cents, 2);
        let mut standing = CreditStanding::new(limit, Decimal::ZERO).unwrap();

        for step in steps {
            let next = match step {
                Step::Reserve(amount) => standing.reserve(amount),
                Step::Repay(amount) => standing.apply_repayment(amount),
            };

            // Rejected steps must leave the standing untouched.
            if let Ok(next) = next {
                standing = next;
            }

            prop_assert!(standing.current_balance >= Decimal::ZERO);
            prop_assert!(standing.current_balance <= standing.credit_limit);
            prop_assert_eq!(standing.credit_limit, limit);
        }
    }

    #[test]
    fn prop_reserve_then_repay_is_identity(
        limit_cents in 1i64..100_000i64,
        amount_cents in 1i64..100_000i64,
    ) {
        let limit = Decimal::new(limit_cents, 2);
        let amount = Decimal::new(amount_cents, 2);
        let standing = CreditStanding::new(limit, Decimal::ZERO).unwrap();

        if let Ok(reserved) = standing.reserve(amount) {
            let repaid = reserved.apply_repayment(amount).unwrap();
            prop_assert_eq!(repaid, standing);
        }
    }
}
