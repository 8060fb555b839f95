//! Property-based tests for order resolution.
//!
//! - For every resolved plan, `total == sum(line_total)` exactly, and with
//!   cent-scale prices and integer quantities each line total equals
//!   `quantity * unit_price`.
//! - Planned decrements never exceed the stock the catalog reported.
//! - Resolution either fails cleanly or accounts for every requested line.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::service::OrderService;
use super::types::{
    Actor, OrderItems, OrderRequest, PaymentMethod, ProduceInfo, ProductInfo, ProductLine, Role,
    StockDecrement, TransactionStatus,
};

/// Strategy for positive money amounts (0.01 to 10,000.00).
fn price() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a purchase order over a small shared product pool.
///
/// Uses a fixed pool of product ids so lines collide and exercise the
/// shared remaining-stock tracking.
fn purchase_lines() -> impl Strategy<Value = (Vec<(Uuid, Decimal, i32)>, Vec<ProductLine>)> {
    let pool: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

    (
        proptest::collection::vec((price(), 0i32..50), 4),
        proptest::collection::vec((0usize..4, 1i32..20, proptest::option::of(price())), 1..8),
    )
        .prop_map(move |(stock, picks)| {
            let catalog: Vec<(Uuid, Decimal, i32)> = pool
                .iter()
                .zip(stock)
                .map(|(id, (p, q))| (*id, p, q))
                .collect();
            let lines = picks
                .into_iter()
                .map(|(idx, quantity, unit_price)| ProductLine {
                    product_id: pool[idx],
                    quantity,
                    unit_price,
                })
                .collect();
            (catalog, lines)
        })
}

fn farmer() -> Actor {
    Actor {
        id: Uuid::new_v4(),
        role: Role::Farmer,
        is_active: true,
    }
}

fn lookup(
    catalog: Vec<(Uuid, Decimal, i32)>,
) -> impl Fn(Uuid) -> Result<ProductInfo, super::error::OrderError> {
    move |id| {
        catalog
            .iter()
            .find(|(pid, _, _)| *pid == id)
            .map(|&(pid, p, q)| ProductInfo {
                id: pid,
                price: p,
                quantity_in_stock: q,
            })
            .ok_or(super::error::OrderError::ProductNotFound(id))
    }
}

fn no_produce(id: Uuid) -> Result<ProduceInfo, super::error::OrderError> {
    Err(super::error::OrderError::ProduceNotFound(id))
}

proptest! {
    #[test]
    fn prop_total_is_sum_of_line_totals((catalog, lines) in purchase_lines()) {
        let request = OrderRequest {
            payment_method: PaymentMethod::Cash,
            status: TransactionStatus::Completed,
            notes: None,
            items: OrderItems::ProductPurchase(lines),
        };

        if let Ok(plan) = OrderService::resolve_order(&farmer(), &request, lookup(catalog), no_produce) {
            let expected: Decimal = plan.lines.iter().map(|l| l.quantity * l.unit_price).sum();
            prop_assert_eq!(plan.total, expected);
            let kept: Decimal = plan.lines.iter().map(|l| l.line_total).sum();
            prop_assert_eq!(plan.total, kept);
        }
    }

    #[test]
    fn prop_decrements_never_exceed_stock((catalog, lines) in purchase_lines()) {
        let request = OrderRequest {
            payment_method: PaymentMethod::Cash,
            status: TransactionStatus::Completed,
            notes: None,
            items: OrderItems::ProductPurchase(lines),
        };

        if let Ok(plan) = OrderService::resolve_order(&farmer(), &request, lookup(catalog.clone()), no_produce) {
            for decrement in &plan.decrements {
                match decrement {
                    StockDecrement::Product { id, quantity } => {
                        let stocked = catalog
                            .iter()
                            .find(|(pid, _, _)| pid == id)
                            .map(|(_, _, q)| *q)
                            .unwrap_or(0);
                        prop_assert!(*quantity > 0);
                        prop_assert!(*quantity <= stocked);
                    }
                    StockDecrement::Produce { .. } => {
                        prop_assert!(false, "purchase plan contained a produce decrement");
                    }
                }
            }
        }
    }

    #[test]
    fn prop_decrements_match_line_quantities((catalog, lines) in purchase_lines()) {
        let request = OrderRequest {
            payment_method: PaymentMethod::Cash,
            status: TransactionStatus::Completed,
            notes: None,
            items: OrderItems::ProductPurchase(lines),
        };

        if let Ok(plan) = OrderService::resolve_order(&farmer(), &request, lookup(catalog), no_produce) {
            let planned: Decimal = plan
                .decrements
                .iter()
                .map(|d| match d {
                    StockDecrement::Product { quantity, .. } => Decimal::from(*quantity),
                    StockDecrement::Produce { quantity, .. } => *quantity,
                })
                .sum();
            let requested: Decimal = plan.lines.iter().map(|l| l.quantity).sum();
            prop_assert_eq!(planned, requested);
        }
    }
}
