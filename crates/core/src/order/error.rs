//! Error types for order validation and resolution.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::types::{OrderKind, Role};

/// Errors raised while validating and resolving an order.
///
/// Every variant is a rejected operation, not a process failure: the order
/// aborts, nothing is committed, and the caller may correct and resubmit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The acting user is deactivated.
    #[error("user {0} is not active")]
    ActorInactive(Uuid),

    /// The actor's role may not create this kind of transaction.
    #[error("role {role} may not create a {kind} transaction")]
    RoleNotAllowed {
        /// The actor's role.
        role: Role,
        /// The requested transaction kind.
        kind: OrderKind,
    },

    /// Credit purchases are reserved for farmers.
    #[error("only farmers can purchase on credit")]
    CreditRequiresFarmer,

    /// The order carries no line items.
    #[error("order contains no line items")]
    EmptyOrder,

    /// A line quantity was not positive, or finer than two decimal places.
    #[error("line quantity must be positive with at most two decimal places")]
    InvalidQuantity,

    /// A unit price was not positive, or finer than two decimal places.
    #[error("unit price must be positive with at most two decimal places")]
    InvalidUnitPrice,

    /// The referenced product does not exist.
    #[error("product not found: {0}")]
    ProductNotFound(Uuid),

    /// The referenced produce lot does not exist.
    #[error("produce not found: {0}")]
    ProduceNotFound(Uuid),

    /// The referenced produce lot has been withdrawn from sale.
    #[error("produce lot {0} is not available")]
    ProduceUnavailable(Uuid),

    /// Not enough stock left to satisfy the line.
    #[error("insufficient stock for {target}: available {available}, requested {requested}")]
    InsufficientStock {
        /// The product or produce row that ran short.
        target: Uuid,
        /// Quantity still available, counting earlier lines of this order.
        available: Decimal,
        /// Quantity this line requested.
        requested: Decimal,
    },
}
