//! Commission derivation for produce sales.

pub mod policy;

pub use policy::CommissionPolicy;
