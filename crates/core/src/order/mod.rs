//! Order validation and resolution.
//!
//! This module implements the pure half of the order engine:
//! - Domain types for order requests (tagged by transaction kind)
//! - Role/type authorization rules
//! - Line-item resolution with price snapshots and stock checks
//! - The stock decrement plan handed to the persistence layer

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::OrderError;
pub use service::OrderService;
pub use types::{
    Actor, LineTarget, OrderItems, OrderKind, OrderPlan, OrderRequest, PaymentMethod, ProduceInfo,
    ProduceLine, ProductInfo, ProductLine, ResolvedLine, Role, StockDecrement, TransactionStatus,
};
