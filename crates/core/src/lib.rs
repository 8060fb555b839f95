//! Core business logic for AgriLink.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations live
//! here; persistence is the `agrilink-db` crate's concern.
//!
//! # Modules
//!
//! - `order` - Order validation, line resolution, and stock planning
//! - `credit` - Credit account policy (limits, reservations, repayments)
//! - `commission` - Commission derivation for produce sales

pub mod commission;
pub mod credit;
pub mod order;
