//! Order resolution service.
//!
//! This is the pure half of the order engine: it authorizes the actor,
//! resolves every line against catalog snapshots supplied by the caller, and
//! produces the stock decrement plan. The persistence layer fetches the
//! snapshots under row locks and applies the plan inside one database
//! transaction, so a plan produced here can be committed without re-checking.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use super::error::OrderError;
use super::types::{
    Actor, LineTarget, OrderItems, OrderKind, OrderPlan, OrderRequest, PaymentMethod, ProduceInfo,
    ProduceLine, ProductInfo, ProductLine, ResolvedLine, Role, StockDecrement,
};

/// Order resolution service.
///
/// Contains pure business logic with no database dependencies. Catalog state
/// is injected through lookup functions so the same rules run identically in
/// unit tests and inside the repository's commit boundary.
pub struct OrderService;

impl OrderService {
    /// Validates an order and resolves it into a commit-ready plan.
    ///
    /// Steps, first failure wins:
    /// 1. The actor must be active and allowed to create this kind of
    ///    transaction (product purchases: farmer or salesperson; produce
    ///    sales: salesperson only).
    /// 2. Each line is resolved in request order: the catalog row must
    ///    exist and (for produce) be on sale, the requested quantity must
    ///    be positive, no finer than two decimal places and covered by
    ///    remaining stock, and the unit price is snapshotted (caller
    ///    override when valid, catalog price otherwise). Lines targeting
    ///    the same row draw down a shared remaining quantity. Line totals
    ///    are rounded half-even to two decimal places and the order total
    ///    is their sum, so the plan carries exactly the values the money
    ///    columns will keep.
    /// 3. Paying by credit requires the farmer role; the plan then carries
    ///    the total as a credit charge for the persistence layer to reserve.
    ///
    /// # Errors
    ///
    /// Returns `OrderError` if any validation step fails; no state has been
    /// touched at that point.
    pub fn resolve_order<P, Q>(
        actor: &Actor,
        request: &OrderRequest,
        product_lookup: P,
        produce_lookup: Q,
    ) -> Result<OrderPlan, OrderError>
    where
        P: Fn(Uuid) -> Result<ProductInfo, OrderError>,
        Q: Fn(Uuid) -> Result<ProduceInfo, OrderError>,
    {
        if !actor.is_active {
            return Err(OrderError::ActorInactive(actor.id));
        }

        let kind = request.items.kind();
        Self::authorize(actor.role, kind)?;

        if request.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let (lines, decrements) = match &request.items {
            OrderItems::ProductPurchase(items) => Self::resolve_product_lines(items, &product_lookup)?,
            OrderItems::ProduceSale(items) => Self::resolve_produce_lines(items, &produce_lookup)?,
        };

        let total: Decimal = lines.iter().map(|l| l.line_total).sum();

        let credit_charge = match request.payment_method {
            PaymentMethod::Credit => {
                if actor.role != Role::Farmer {
                    return Err(OrderError::CreditRequiresFarmer);
                }
                Some(total)
            }
            PaymentMethod::Cash | PaymentMethod::MobileMoney => None,
        };

        Ok(OrderPlan {
            kind,
            payment_method: request.payment_method,
            status: request.status,
            notes: request.notes.clone(),
            lines,
            decrements,
            total,
            credit_charge,
        })
    }

    /// Checks the role/transaction-kind authorization matrix.
    ///
    /// Policy: administrators manage the catalog but do not transact, so
    /// product purchases are limited to farmers and salespersons.
    fn authorize(role: Role, kind: OrderKind) -> Result<(), OrderError> {
        let allowed = match kind {
            OrderKind::ProductPurchase => matches!(role, Role::Farmer | Role::Salesperson),
            OrderKind::ProduceSale => matches!(role, Role::Salesperson),
        };

        if allowed {
            Ok(())
        } else {
            Err(OrderError::RoleNotAllowed { role, kind })
        }
    }

    /// Picks the unit price to snapshot onto a line.
    ///
    /// The money columns hold two decimal places, so the snapshot must be
    /// positive and representable at that scale or the store would reshape
    /// it silently at insert.
    fn snapshot_price(
        override_price: Option<Decimal>,
        catalog_price: Decimal,
    ) -> Result<Decimal, OrderError> {
        let price = override_price.unwrap_or(catalog_price);
        if price <= Decimal::ZERO || price.normalize().scale() > 2 {
            return Err(OrderError::InvalidUnitPrice);
        }
        Ok(price)
    }

    /// Computes a line total at the scale the money columns keep.
    fn line_total(quantity: Decimal, unit_price: Decimal) -> Decimal {
        (quantity * unit_price).round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
    }

    fn resolve_product_lines<P>(
        items: &[ProductLine],
        product_lookup: &P,
    ) -> Result<(Vec<ResolvedLine>, Vec<StockDecrement>), OrderError>
    where
        P: Fn(Uuid) -> Result<ProductInfo, OrderError>,
    {
        let mut lines = Vec::with_capacity(items.len());
        // Remaining stock per product, shared across lines of this order.
        let mut remaining: HashMap<Uuid, i32> = HashMap::new();
        let mut prices: HashMap<Uuid, Decimal> = HashMap::new();
        let mut drawn: HashMap<Uuid, i32> = HashMap::new();
        let mut touched: Vec<Uuid> = Vec::new();

        for item in items {
            if item.quantity <= 0 {
                return Err(OrderError::InvalidQuantity);
            }

            if !remaining.contains_key(&item.product_id) {
                let info = product_lookup(item.product_id)?;
                touched.push(item.product_id);
                remaining.insert(item.product_id, info.quantity_in_stock);
                prices.insert(item.product_id, info.price);
                drawn.insert(item.product_id, 0);
            }

            let left = remaining[&item.product_id];
            if item.quantity > left {
                return Err(OrderError::InsufficientStock {
                    target: item.product_id,
                    available: Decimal::from(left),
                    requested: Decimal::from(item.quantity),
                });
            }

            let unit_price = Self::snapshot_price(item.unit_price, prices[&item.product_id])?;
            let quantity = Decimal::from(item.quantity);

            remaining.insert(item.product_id, left - item.quantity);
            *drawn.entry(item.product_id).or_insert(0) += item.quantity;

            lines.push(ResolvedLine {
                target: LineTarget::Product(item.product_id),
                quantity,
                unit_price,
                line_total: Self::line_total(quantity, unit_price),
            });
        }

        let decrements = touched
            .into_iter()
            .map(|id| StockDecrement::Product {
                id,
                quantity: drawn[&id],
            })
            .collect();

        Ok((lines, decrements))
    }

    fn resolve_produce_lines<Q>(
        items: &[ProduceLine],
        produce_lookup: &Q,
    ) -> Result<(Vec<ResolvedLine>, Vec<StockDecrement>), OrderError>
    where
        Q: Fn(Uuid) -> Result<ProduceInfo, OrderError>,
    {
        let mut lines = Vec::with_capacity(items.len());
        let mut remaining: HashMap<Uuid, Decimal> = HashMap::new();
        let mut prices: HashMap<Uuid, Decimal> = HashMap::new();
        let mut drawn: HashMap<Uuid, Decimal> = HashMap::new();
        let mut touched: Vec<Uuid> = Vec::new();

        for item in items {
            if item.quantity <= Decimal::ZERO || item.quantity.normalize().scale() > 2 {
                return Err(OrderError::InvalidQuantity);
            }

            if !remaining.contains_key(&item.produce_id) {
                let info = produce_lookup(item.produce_id)?;
                // A withdrawn lot cannot be sold from, whatever its quantity.
                if !info.is_available {
                    return Err(OrderError::ProduceUnavailable(item.produce_id));
                }
                touched.push(item.produce_id);
                remaining.insert(item.produce_id, info.quantity);
                prices.insert(item.produce_id, info.price_per_unit);
                drawn.insert(item.produce_id, Decimal::ZERO);
            }

            let left = remaining[&item.produce_id];
            if item.quantity > left {
                return Err(OrderError::InsufficientStock {
                    target: item.produce_id,
                    available: left,
                    requested: item.quantity,
                });
            }

            let unit_price = Self::snapshot_price(item.unit_price, prices[&item.produce_id])?;

            remaining.insert(item.produce_id, left - item.quantity);
            *drawn.entry(item.produce_id).or_insert(Decimal::ZERO) += item.quantity;

            lines.push(ResolvedLine {
                target: LineTarget::Produce(item.produce_id),
                quantity: item.quantity,
                unit_price,
                line_total: Self::line_total(item.quantity, unit_price),
            });
        }

        let decrements = touched
            .into_iter()
            .map(|id| StockDecrement::Produce {
                id,
                quantity: drawn[&id],
            })
            .collect();

        Ok((lines, decrements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_actor(role: Role) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role,
            is_active: true,
        }
    }

    fn purchase_request(items: Vec<ProductLine>, payment: PaymentMethod) -> OrderRequest {
        OrderRequest {
            payment_method: payment,
            status: super::super::types::TransactionStatus::Completed,
            notes: None,
            items: OrderItems::ProductPurchase(items),
        }
    }

    fn sale_request(items: Vec<ProduceLine>) -> OrderRequest {
        OrderRequest {
            payment_method: PaymentMethod::Cash,
            status: super::super::types::TransactionStatus::Completed,
            notes: None,
            items: OrderItems::ProduceSale(items),
        }
    }

    fn product_catalog(
        entries: Vec<(Uuid, Decimal, i32)>,
    ) -> impl Fn(Uuid) -> Result<ProductInfo, OrderError> {
        move |id| {
            entries
                .iter()
                .find(|(pid, _, _)| *pid == id)
                .map(|&(pid, price, stock)| ProductInfo {
                    id: pid,
                    price,
                    quantity_in_stock: stock,
                })
                .ok_or(OrderError::ProductNotFound(id))
        }
    }

    fn produce_catalog(
        entries: Vec<(Uuid, Decimal, Decimal, bool)>,
    ) -> impl Fn(Uuid) -> Result<ProduceInfo, OrderError> {
        move |id| {
            entries
                .iter()
                .find(|(pid, _, _, _)| *pid == id)
                .map(|&(pid, price, qty, avail)| ProduceInfo {
                    id: pid,
                    price_per_unit: price,
                    quantity: qty,
                    is_available: avail,
                })
                .ok_or(OrderError::ProduceNotFound(id))
        }
    }

    fn no_products(id: Uuid) -> Result<ProductInfo, OrderError> {
        Err(OrderError::ProductNotFound(id))
    }

    fn no_produce(id: Uuid) -> Result<ProduceInfo, OrderError> {
        Err(OrderError::ProduceNotFound(id))
    }

    #[test]
    fn test_purchase_snapshots_price_and_plans_decrement() {
        let product_id = Uuid::new_v4();
        let actor = make_actor(Role::Farmer);
        let request = purchase_request(
            vec![ProductLine {
                product_id,
                quantity: 4,
                unit_price: None,
            }],
            PaymentMethod::Cash,
        );
        let catalog = product_catalog(vec![(product_id, dec!(2.00), 10)]);

        let plan = OrderService::resolve_order(&actor, &request, catalog, no_produce).unwrap();

        assert_eq!(plan.total, dec!(8.00));
        assert_eq!(plan.lines.len(), 1);
        assert_eq!(plan.lines[0].unit_price, dec!(2.00));
        assert_eq!(plan.lines[0].line_total, dec!(8.00));
        assert_eq!(
            plan.decrements,
            vec![StockDecrement::Product {
                id: product_id,
                quantity: 4
            }]
        );
        assert!(plan.credit_charge.is_none());
    }

    #[test]
    fn test_purchase_uses_price_override() {
        let product_id = Uuid::new_v4();
        let actor = make_actor(Role::Salesperson);
        let request = purchase_request(
            vec![ProductLine {
                product_id,
                quantity: 2,
                unit_price: Some(dec!(1.50)),
            }],
            PaymentMethod::Cash,
        );
        let catalog = product_catalog(vec![(product_id, dec!(2.00), 10)]);

        let plan = OrderService::resolve_order(&actor, &request, catalog, no_produce).unwrap();

        assert_eq!(plan.lines[0].unit_price, dec!(1.50));
        assert_eq!(plan.total, dec!(3.00));
    }

    #[test]
    fn test_non_positive_price_override_rejected() {
        let product_id = Uuid::new_v4();
        let actor = make_actor(Role::Farmer);
        let request = purchase_request(
            vec![ProductLine {
                product_id,
                quantity: 1,
                unit_price: Some(dec!(0)),
            }],
            PaymentMethod::Cash,
        );
        let catalog = product_catalog(vec![(product_id, dec!(2.00), 10)]);

        let result = OrderService::resolve_order(&actor, &request, catalog, no_produce);
        assert_eq!(result.unwrap_err(), OrderError::InvalidUnitPrice);
    }

    #[test]
    fn test_sub_cent_price_override_rejected() {
        // 3 x 0.333 would make a total no two-decimal row set can restate.
        let product_id = Uuid::new_v4();
        let actor = make_actor(Role::Farmer);
        let request = purchase_request(
            vec![ProductLine {
                product_id,
                quantity: 3,
                unit_price: Some(dec!(0.333)),
            }],
            PaymentMethod::Cash,
        );
        let catalog = product_catalog(vec![(product_id, dec!(2.00), 10)]);

        let result = OrderService::resolve_order(&actor, &request, catalog, no_produce);
        assert_eq!(result.unwrap_err(), OrderError::InvalidUnitPrice);
    }

    #[test]
    fn test_trailing_zero_price_override_accepted() {
        let product_id = Uuid::new_v4();
        let actor = make_actor(Role::Farmer);
        let request = purchase_request(
            vec![ProductLine {
                product_id,
                quantity: 2,
                unit_price: Some(dec!(1.500)),
            }],
            PaymentMethod::Cash,
        );
        let catalog = product_catalog(vec![(product_id, dec!(2.00), 10)]);

        let plan = OrderService::resolve_order(&actor, &request, catalog, no_produce).unwrap();
        assert_eq!(plan.total, dec!(3.00));
    }

    #[test]
    fn test_sub_cent_produce_quantity_rejected() {
        let produce_id = Uuid::new_v4();
        let actor = make_actor(Role::Salesperson);
        let request = sale_request(vec![ProduceLine {
            produce_id,
            quantity: dec!(0.125),
            unit_price: None,
        }]);
        let catalog = produce_catalog(vec![(produce_id, dec!(3.00), dec!(5), true)]);

        let result = OrderService::resolve_order(&actor, &request, no_products, catalog);
        assert_eq!(result.unwrap_err(), OrderError::InvalidQuantity);
    }

    #[test]
    fn test_zero_catalog_price_rejected() {
        let product_id = Uuid::new_v4();
        let actor = make_actor(Role::Farmer);
        let request = purchase_request(
            vec![ProductLine {
                product_id,
                quantity: 1,
                unit_price: None,
            }],
            PaymentMethod::Cash,
        );
        let catalog = product_catalog(vec![(product_id, dec!(0), 10)]);

        let result = OrderService::resolve_order(&actor, &request, catalog, no_produce);
        assert_eq!(result.unwrap_err(), OrderError::InvalidUnitPrice);
    }

    #[test]
    fn test_fractional_sale_rounds_line_totals_half_even() {
        // 2.50 kg at 3.33 is 8.325, kept as 8.32; 1.50 kg at 2.25 is
        // 3.375, kept as 3.38. The total is the sum of the kept values.
        let beans = Uuid::new_v4();
        let maize = Uuid::new_v4();
        let actor = make_actor(Role::Salesperson);
        let request = sale_request(vec![
            ProduceLine {
                produce_id: beans,
                quantity: dec!(2.50),
                unit_price: None,
            },
            ProduceLine {
                produce_id: maize,
                quantity: dec!(1.50),
                unit_price: None,
            },
        ]);
        let catalog = produce_catalog(vec![
            (beans, dec!(3.33), dec!(5), true),
            (maize, dec!(2.25), dec!(5), true),
        ]);

        let plan = OrderService::resolve_order(&actor, &request, no_products, catalog).unwrap();

        assert_eq!(plan.lines[0].line_total, dec!(8.32));
        assert_eq!(plan.lines[1].line_total, dec!(3.38));
        assert_eq!(plan.total, dec!(11.70));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let product_id = Uuid::new_v4();
        let actor = make_actor(Role::Farmer);
        let request = purchase_request(
            vec![ProductLine {
                product_id,
                quantity: 0,
                unit_price: None,
            }],
            PaymentMethod::Cash,
        );
        let catalog = product_catalog(vec![(product_id, dec!(2.00), 10)]);

        let result = OrderService::resolve_order(&actor, &request, catalog, no_produce);
        assert_eq!(result.unwrap_err(), OrderError::InvalidQuantity);
    }

    #[test]
    fn test_admin_may_not_purchase() {
        let actor = make_actor(Role::Admin);
        let request = purchase_request(
            vec![ProductLine {
                product_id: Uuid::new_v4(),
                quantity: 1,
                unit_price: None,
            }],
            PaymentMethod::Cash,
        );

        let result = OrderService::resolve_order(&actor, &request, no_products, no_produce);
        assert!(matches!(
            result,
            Err(OrderError::RoleNotAllowed {
                role: Role::Admin,
                kind: OrderKind::ProductPurchase
            })
        ));
    }

    #[test]
    fn test_only_salesperson_records_sales() {
        let produce_id = Uuid::new_v4();
        let line = ProduceLine {
            produce_id,
            quantity: dec!(1),
            unit_price: None,
        };

        for role in [Role::Farmer, Role::Admin] {
            let actor = make_actor(role);
            let result = OrderService::resolve_order(
                &actor,
                &sale_request(vec![line.clone()]),
                no_products,
                no_produce,
            );
            assert!(matches!(result, Err(OrderError::RoleNotAllowed { .. })));
        }

        let actor = make_actor(Role::Salesperson);
        let catalog = produce_catalog(vec![(produce_id, dec!(3.00), dec!(5), true)]);
        let plan =
            OrderService::resolve_order(&actor, &sale_request(vec![line]), no_products, catalog)
                .unwrap();
        assert_eq!(plan.kind, OrderKind::ProduceSale);
    }

    #[test]
    fn test_inactive_actor_rejected() {
        let mut actor = make_actor(Role::Farmer);
        actor.is_active = false;
        let request = purchase_request(vec![], PaymentMethod::Cash);

        let result = OrderService::resolve_order(&actor, &request, no_products, no_produce);
        assert_eq!(result.unwrap_err(), OrderError::ActorInactive(actor.id));
    }

    #[test]
    fn test_empty_order_rejected() {
        let actor = make_actor(Role::Farmer);
        let request = purchase_request(vec![], PaymentMethod::Cash);

        let result = OrderService::resolve_order(&actor, &request, no_products, no_produce);
        assert_eq!(result.unwrap_err(), OrderError::EmptyOrder);
    }

    #[test]
    fn test_unknown_product_rejected() {
        let product_id = Uuid::new_v4();
        let actor = make_actor(Role::Farmer);
        let request = purchase_request(
            vec![ProductLine {
                product_id,
                quantity: 1,
                unit_price: None,
            }],
            PaymentMethod::Cash,
        );

        let result = OrderService::resolve_order(&actor, &request, no_products, no_produce);
        assert_eq!(result.unwrap_err(), OrderError::ProductNotFound(product_id));
    }

    #[test]
    fn test_withdrawn_produce_rejected() {
        let produce_id = Uuid::new_v4();
        let actor = make_actor(Role::Salesperson);
        let request = sale_request(vec![ProduceLine {
            produce_id,
            quantity: dec!(1),
            unit_price: None,
        }]);
        let catalog = produce_catalog(vec![(produce_id, dec!(3.00), dec!(5), false)]);

        let result = OrderService::resolve_order(&actor, &request, no_products, catalog);
        assert_eq!(result.unwrap_err(), OrderError::ProduceUnavailable(produce_id));
    }

    #[test]
    fn test_lines_share_remaining_stock() {
        // Two lines draw from the same product: 6 + 5 against 10 in stock.
        // The second line must see only 4 left.
        let product_id = Uuid::new_v4();
        let actor = make_actor(Role::Farmer);
        let request = purchase_request(
            vec![
                ProductLine {
                    product_id,
                    quantity: 6,
                    unit_price: None,
                },
                ProductLine {
                    product_id,
                    quantity: 5,
                    unit_price: None,
                },
            ],
            PaymentMethod::Cash,
        );
        let catalog = product_catalog(vec![(product_id, dec!(2.00), 10)]);

        let result = OrderService::resolve_order(&actor, &request, catalog, no_produce);
        assert_eq!(
            result.unwrap_err(),
            OrderError::InsufficientStock {
                target: product_id,
                available: dec!(4),
                requested: dec!(5),
            }
        );
    }

    #[test]
    fn test_repeated_lines_aggregate_into_one_decrement() {
        let product_id = Uuid::new_v4();
        let actor = make_actor(Role::Farmer);
        let request = purchase_request(
            vec![
                ProductLine {
                    product_id,
                    quantity: 3,
                    unit_price: None,
                },
                ProductLine {
                    product_id,
                    quantity: 2,
                    unit_price: Some(dec!(1.00)),
                },
            ],
            PaymentMethod::Cash,
        );
        let catalog = product_catalog(vec![(product_id, dec!(2.00), 10)]);

        let plan = OrderService::resolve_order(&actor, &request, catalog, no_produce).unwrap();

        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.total, dec!(8.00));
        assert_eq!(
            plan.decrements,
            vec![StockDecrement::Product {
                id: product_id,
                quantity: 5
            }]
        );
    }

    #[test]
    fn test_first_failing_line_wins() {
        let missing = Uuid::new_v4();
        let stocked = Uuid::new_v4();
        let actor = make_actor(Role::Farmer);
        let request = purchase_request(
            vec![
                ProductLine {
                    product_id: missing,
                    quantity: 1,
                    unit_price: None,
                },
                ProductLine {
                    product_id: stocked,
                    quantity: 99,
                    unit_price: None,
                },
            ],
            PaymentMethod::Cash,
        );
        let catalog = product_catalog(vec![(stocked, dec!(2.00), 1)]);

        let result = OrderService::resolve_order(&actor, &request, catalog, no_produce);
        assert_eq!(result.unwrap_err(), OrderError::ProductNotFound(missing));
    }

    #[test]
    fn test_sale_exhausting_lot() {
        let produce_id = Uuid::new_v4();
        let actor = make_actor(Role::Salesperson);
        let request = sale_request(vec![ProduceLine {
            produce_id,
            quantity: dec!(5),
            unit_price: None,
        }]);
        let catalog = produce_catalog(vec![(produce_id, dec!(3.00), dec!(5), true)]);

        let plan = OrderService::resolve_order(&actor, &request, no_products, catalog).unwrap();

        assert_eq!(plan.total, dec!(15.00));
        assert_eq!(
            plan.decrements,
            vec![StockDecrement::Produce {
                id: produce_id,
                quantity: dec!(5)
            }]
        );
    }

    #[test]
    fn test_credit_purchase_requires_farmer() {
        let product_id = Uuid::new_v4();
        let request = purchase_request(
            vec![ProductLine {
                product_id,
                quantity: 1,
                unit_price: None,
            }],
            PaymentMethod::Credit,
        );
        let catalog = product_catalog(vec![(product_id, dec!(2.00), 10)]);

        let salesperson = make_actor(Role::Salesperson);
        let result = OrderService::resolve_order(&salesperson, &request, &catalog, no_produce);
        assert_eq!(result.unwrap_err(), OrderError::CreditRequiresFarmer);

        let farmer = make_actor(Role::Farmer);
        let plan = OrderService::resolve_order(&farmer, &request, &catalog, no_produce).unwrap();
        assert_eq!(plan.credit_charge, Some(dec!(2.00)));
    }
}
