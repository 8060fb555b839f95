//! Order domain types.
//!
//! The order request is tagged by transaction kind: a product purchase can
//! only carry product lines and a produce sale can only carry produce lines,
//! so a sale line referencing a product id is unrepresentable.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User role, as asserted by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform administrator.
    Admin,
    /// Salesperson recording purchases and produce sales.
    Salesperson,
    /// Farmer buying inputs and listing produce.
    Farmer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Salesperson => write!(f, "salesperson"),
            Self::Farmer => write!(f, "farmer"),
        }
    }
}

/// The acting principal for an order, already authenticated upstream.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    /// User ID.
    pub id: Uuid,
    /// Role claim.
    pub role: Role,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Payment method for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash payment.
    Cash,
    /// Purchase against the farmer's credit account.
    Credit,
    /// Mobile money payment.
    MobileMoney,
}

/// Transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Awaiting settlement.
    Pending,
    /// Settled.
    Completed,
    /// Failed settlement.
    Failed,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        Self::Completed
    }
}

/// Transaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    /// Stocked input sold to a farmer or salesperson.
    ProductPurchase,
    /// Farmer produce sold on by a salesperson.
    ProduceSale,
}

impl std::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProductPurchase => write!(f, "product_purchase"),
            Self::ProduceSale => write!(f, "produce_sale"),
        }
    }
}

/// One requested line against a stocked product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductLine {
    /// The product to purchase.
    pub product_id: Uuid,
    /// Requested quantity (whole units, must be positive).
    pub quantity: i32,
    /// Optional unit price override; the catalog price is used when absent.
    pub unit_price: Option<Decimal>,
}

/// One requested line against a perishable produce lot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProduceLine {
    /// The produce lot to sell from.
    pub produce_id: Uuid,
    /// Requested quantity (must be positive; fractional units allowed).
    pub quantity: Decimal,
    /// Optional unit price override; the listed price is used when absent.
    pub unit_price: Option<Decimal>,
}

/// The line items of an order, tagged by transaction kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "transaction_type", content = "items", rename_all = "snake_case")]
pub enum OrderItems {
    /// A product purchase carries product lines only.
    ProductPurchase(Vec<ProductLine>),
    /// A produce sale carries produce lines only.
    ProduceSale(Vec<ProduceLine>),
}

impl OrderItems {
    /// Returns the transaction kind of these items.
    #[must_use]
    pub const fn kind(&self) -> OrderKind {
        match self {
            Self::ProductPurchase(_) => OrderKind::ProductPurchase,
            Self::ProduceSale(_) => OrderKind::ProduceSale,
        }
    }

    /// Returns the number of requested lines.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::ProductPurchase(lines) => lines.len(),
            Self::ProduceSale(lines) => lines.len(),
        }
    }

    /// Returns true if no lines were requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An order submitted to the order engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    /// How the order is paid.
    pub payment_method: PaymentMethod,
    /// Initial status (defaults to completed).
    #[serde(default)]
    pub status: TransactionStatus,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// The requested line items, tagged by kind.
    #[serde(flatten)]
    pub items: OrderItems,
}

/// Catalog snapshot of a product, read under lock at commit time.
#[derive(Debug, Clone)]
pub struct ProductInfo {
    /// Product ID.
    pub id: Uuid,
    /// Current catalog price.
    pub price: Decimal,
    /// Units currently in stock.
    pub quantity_in_stock: i32,
}

/// Catalog snapshot of a produce lot, read under lock at commit time.
#[derive(Debug, Clone)]
pub struct ProduceInfo {
    /// Produce lot ID.
    pub id: Uuid,
    /// Current listed price per unit.
    pub price_per_unit: Decimal,
    /// Remaining quantity in the lot.
    pub quantity: Decimal,
    /// Whether the lot is on sale.
    pub is_available: bool,
}

/// Reference to the catalog row a resolved line draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTarget {
    /// A stocked product.
    Product(Uuid),
    /// A produce lot.
    Produce(Uuid),
}

/// A validated line with its price snapshot.
#[derive(Debug, Clone)]
pub struct ResolvedLine {
    /// The catalog row this line draws from.
    pub target: LineTarget,
    /// Requested quantity.
    pub quantity: Decimal,
    /// Unit price captured at resolution time (override or catalog price).
    pub unit_price: Decimal,
    /// `quantity * unit_price`, rounded half-even to two decimal places.
    pub line_total: Decimal,
}

/// A stock mutation to apply inside the commit, aggregated per catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockDecrement {
    /// Decrement a product's stock count.
    Product {
        /// Product ID.
        id: Uuid,
        /// Total units drawn across all lines of the order.
        quantity: i32,
    },
    /// Decrement a produce lot's remaining quantity.
    Produce {
        /// Produce lot ID.
        id: Uuid,
        /// Total quantity drawn across all lines of the order.
        quantity: Decimal,
    },
}

/// The fully resolved order, ready for the atomic commit.
#[derive(Debug, Clone)]
pub struct OrderPlan {
    /// Transaction kind.
    pub kind: OrderKind,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Transaction status to record.
    pub status: TransactionStatus,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Resolved lines, in request order.
    pub lines: Vec<ResolvedLine>,
    /// Stock mutations, one per touched catalog row (first-seen order).
    pub decrements: Vec<StockDecrement>,
    /// Sum of line totals.
    pub total: Decimal,
    /// Amount to reserve against the actor's credit account, when paying
    /// by credit.
    pub credit_charge: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_items_kind() {
        let purchase = OrderItems::ProductPurchase(vec![]);
        assert_eq!(purchase.kind(), OrderKind::ProductPurchase);
        assert!(purchase.is_empty());

        let sale = OrderItems::ProduceSale(vec![ProduceLine {
            produce_id: Uuid::new_v4(),
            quantity: dec!(5),
            unit_price: None,
        }]);
        assert_eq!(sale.kind(), OrderKind::ProduceSale);
        assert_eq!(sale.len(), 1);
    }

    #[test]
    fn test_status_defaults_to_completed() {
        assert_eq!(TransactionStatus::default(), TransactionStatus::Completed);
    }

    #[test]
    fn test_request_deserializes_tagged_kind() {
        let json = serde_json::json!({
            "payment_method": "cash",
            "transaction_type": "product_purchase",
            "items": [{ "product_id": Uuid::new_v4(), "quantity": 2 }],
        });

        let request: OrderRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.items.kind(), OrderKind::ProductPurchase);
        assert_eq!(request.status, TransactionStatus::Completed);
    }

    #[test]
    fn test_request_rejects_unknown_kind() {
        let json = serde_json::json!({
            "payment_method": "cash",
            "transaction_type": "inventory_adjustment",
            "items": [],
        });

        assert!(serde_json::from_value::<OrderRequest>(json).is_err());
    }
}
