//! Credit account policy.
//!
//! Pure rules for the farmer credit subsystem: available-credit math,
//! reservations made by credit purchases, and repayment validation. The
//! persistence layer applies the resulting balances under row locks.

pub mod error;
pub mod policy;

#[cfg(test)]
mod policy_props;

pub use error::CreditError;
pub use policy::CreditStanding;
