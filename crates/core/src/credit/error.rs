//! Error types for credit operations.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by credit policy checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreditError {
    /// Amount must be strictly positive with at most two decimal places.
    #[error("amount must be positive with at most two decimal places")]
    InvalidAmount,

    /// A limit/balance pair that violates `0 <= balance <= limit`.
    #[error("invalid credit standing: balance {balance} outside [0, {limit}]")]
    InvalidStanding {
        /// The credit limit.
        limit: Decimal,
        /// The offending balance.
        balance: Decimal,
    },

    /// The purchase total exceeds the farmer's available credit.
    #[error("insufficient credit: available {available}, required {required}")]
    LimitExceeded {
        /// `credit_limit - current_balance`.
        available: Decimal,
        /// The purchase total.
        required: Decimal,
    },

    /// A repayment larger than the outstanding balance.
    #[error("repayment {amount} exceeds current balance {balance}")]
    ExceedsBalance {
        /// The outstanding balance.
        balance: Decimal,
        /// The attempted repayment.
        amount: Decimal,
    },
}
