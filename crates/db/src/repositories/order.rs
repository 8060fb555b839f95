//! Order repository: the atomic commit boundary for marketplace orders.
//!
//! Validation and resolution are pure and live in `agrilink_core`; this
//! repository supplies catalog snapshots read under `SELECT ... FOR UPDATE`,
//! then applies the resolved plan (stock decrements, credit reservation,
//! header, line items, commission) inside one database transaction. Any
//! failure before the commit drops the transaction and rolls everything
//! back.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use agrilink_core::commission::CommissionPolicy;
use agrilink_core::credit::{CreditError, CreditStanding};
use agrilink_core::order as rules;
use agrilink_core::order::{LineTarget, OrderItems, OrderKind, StockDecrement};
use agrilink_shared::AppError;

use super::user::as_actor;
use crate::entities::{
    commissions, credit_accounts, produce, products, sea_orm_active_enums, transaction_items,
    transactions, users,
};

/// Error types for order operations.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// The order was rejected by a validation rule; nothing was written.
    #[error(transparent)]
    Rejected(#[from] rules::OrderError),

    /// The acting user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(Uuid),

    /// Credit payment requested but the farmer has no credit account.
    #[error("farmer {0} has no credit account")]
    NoCreditAccount(Uuid),

    /// Credit policy violation (limit exceeded, invalid standing).
    #[error(transparent)]
    Credit(#[from] CreditError),

    /// The configured commission beneficiary is missing or not an admin.
    #[error("commission beneficiary {0} is not an active administrator")]
    InvalidBeneficiary(Uuid),

    /// Transaction not found.
    #[error("transaction not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match &err {
            OrderError::Rejected(rule) => match rule {
                rules::OrderError::ActorInactive(_)
                | rules::OrderError::RoleNotAllowed { .. }
                | rules::OrderError::CreditRequiresFarmer => Self::Forbidden(err.to_string()),
                rules::OrderError::EmptyOrder
                | rules::OrderError::InvalidQuantity
                | rules::OrderError::InvalidUnitPrice => Self::Validation(err.to_string()),
                rules::OrderError::ProductNotFound(_) | rules::OrderError::ProduceNotFound(_) => {
                    Self::NotFound(err.to_string())
                }
                rules::OrderError::ProduceUnavailable(_)
                | rules::OrderError::InsufficientStock { .. } => {
                    Self::BusinessRule(err.to_string())
                }
            },
            OrderError::UserNotFound(_) | OrderError::NotFound(_) => Self::NotFound(err.to_string()),
            OrderError::NoCreditAccount(_) => Self::BusinessRule(err.to_string()),
            OrderError::Credit(CreditError::InvalidAmount) => Self::Validation(err.to_string()),
            OrderError::Credit(_) => Self::BusinessRule(err.to_string()),
            OrderError::InvalidBeneficiary(_) => Self::Internal(err.to_string()),
            OrderError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// A committed transaction with its line items and commission, if any.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    /// Transaction header.
    pub transaction: transactions::Model,
    /// Line items with price snapshots, in request order.
    pub items: Vec<transaction_items::Model>,
    /// Commission row, present for produce sales.
    pub commission: Option<commissions::Model>,
}

/// Order repository owning the atomic order workflow.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: DatabaseConnection,
    commission: CommissionPolicy,
}

impl OrderRepository {
    /// Creates a new order repository with the given commission policy.
    #[must_use]
    pub const fn new(db: DatabaseConnection, commission: CommissionPolicy) -> Self {
        Self { db, commission }
    }

    /// Creates an order: validates, decrements stock, reserves credit and
    /// derives the commission, all in one database transaction.
    ///
    /// Catalog rows named by the request are locked in ascending-id order
    /// before resolution, so concurrent orders against the same rows
    /// serialize instead of deadlocking, and the snapshots the rules see
    /// are the rows the commit updates.
    ///
    /// # Errors
    ///
    /// Returns an error if validation rejects the order, the credit
    /// reservation fails, the commission beneficiary is misconfigured, or
    /// a database operation fails. In every case nothing is committed.
    pub async fn create_order(
        &self,
        user_id: Uuid,
        request: &rules::OrderRequest,
    ) -> Result<OrderWithItems, OrderError> {
        let txn = self.db.begin().await?;

        let user = users::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or(OrderError::UserNotFound(user_id))?;
        let actor = as_actor(&user);

        let plan = match &request.items {
            OrderItems::ProductPurchase(items) => {
                let ids: Vec<Uuid> = items.iter().map(|l| l.product_id).collect();
                let stock = Self::lock_products(&txn, &ids).await?;
                let snapshots: HashMap<Uuid, rules::ProductInfo> = stock
                    .iter()
                    .map(|(id, row)| {
                        (
                            *id,
                            rules::ProductInfo {
                                id: row.id,
                                price: row.price,
                                quantity_in_stock: row.quantity_in_stock,
                            },
                        )
                    })
                    .collect();

                let plan = rules::OrderService::resolve_order(
                    &actor,
                    request,
                    |id| {
                        snapshots
                            .get(&id)
                            .cloned()
                            .ok_or(rules::OrderError::ProductNotFound(id))
                    },
                    |id| Err(rules::OrderError::ProduceNotFound(id)),
                )?;

                Self::apply_product_decrements(&txn, &plan.decrements, stock).await?;
                plan
            }
            OrderItems::ProduceSale(items) => {
                let ids: Vec<Uuid> = items.iter().map(|l| l.produce_id).collect();
                let stock = Self::lock_produce(&txn, &ids).await?;
                let snapshots: HashMap<Uuid, rules::ProduceInfo> = stock
                    .iter()
                    .map(|(id, row)| {
                        (
                            *id,
                            rules::ProduceInfo {
                                id: row.id,
                                price_per_unit: row.price_per_unit,
                                quantity: row.quantity,
                                is_available: row.is_available,
                            },
                        )
                    })
                    .collect();

                let plan = rules::OrderService::resolve_order(
                    &actor,
                    request,
                    |id| Err(rules::OrderError::ProductNotFound(id)),
                    |id| {
                        snapshots
                            .get(&id)
                            .cloned()
                            .ok_or(rules::OrderError::ProduceNotFound(id))
                    },
                )?;

                Self::apply_produce_decrements(&txn, &plan.decrements, stock).await?;
                plan
            }
        };

        if let Some(charge) = plan.credit_charge {
            Self::reserve_credit(&txn, user_id, charge).await?;
        }

        let now = chrono::Utc::now().into();
        let transaction_id = Uuid::new_v4();

        let header = transactions::ActiveModel {
            id: Set(transaction_id),
            user_id: Set(user_id),
            transaction_type: Set(db_transaction_type(plan.kind)),
            total_amount: Set(plan.total),
            payment_method: Set(db_payment_method(plan.payment_method)),
            status: Set(db_status(plan.status)),
            notes: Set(plan.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let transaction = header.insert(&txn).await?;

        let mut items = Vec::with_capacity(plan.lines.len());
        for line in &plan.lines {
            let (product_id, produce_id) = match line.target {
                LineTarget::Product(id) => (Some(id), None),
                LineTarget::Produce(id) => (None, Some(id)),
            };
            let item = transaction_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                transaction_id: Set(transaction_id),
                product_id: Set(product_id),
                produce_id: Set(produce_id),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                line_total: Set(line.line_total),
                created_at: Set(now),
            };
            items.push(item.insert(&txn).await?);
        }

        let commission = if plan.kind == OrderKind::ProduceSale {
            Some(self.insert_commission(&txn, transaction_id, plan.total).await?)
        } else {
            None
        };

        txn.commit().await?;

        info!(
            transaction_id = %transaction.id,
            user_id = %user_id,
            kind = %plan.kind,
            total = %plan.total,
            on_credit = plan.credit_charge.is_some(),
            "Order committed"
        );

        Ok(OrderWithItems {
            transaction,
            items,
            commission,
        })
    }

    /// Fetches a committed transaction with its items and commission.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if no such transaction exists, or a
    /// database error.
    pub async fn find_order(&self, id: Uuid) -> Result<OrderWithItems, OrderError> {
        let transaction = transactions::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(OrderError::NotFound(id))?;

        let items = transaction
            .find_related(transaction_items::Entity)
            .order_by_asc(transaction_items::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let commission = transaction
            .find_related(commissions::Entity)
            .one(&self.db)
            .await?;

        Ok(OrderWithItems {
            transaction,
            items,
            commission,
        })
    }

    /// Lists a user's transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_orders_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<transactions::Model>, DbErr> {
        transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Locks the product rows named by an order, ascending by id.
    async fn lock_products(
        txn: &DatabaseTransaction,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, products::Model>, DbErr> {
        let mut sorted: Vec<Uuid> = ids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let rows = products::Entity::find()
            .filter(products::Column::Id.is_in(sorted))
            .order_by_asc(products::Column::Id)
            .lock_exclusive()
            .all(txn)
            .await?;

        Ok(rows.into_iter().map(|row| (row.id, row)).collect())
    }

    /// Locks the produce rows named by an order, ascending by id.
    async fn lock_produce(
        txn: &DatabaseTransaction,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, produce::Model>, DbErr> {
        let mut sorted: Vec<Uuid> = ids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let rows = produce::Entity::find()
            .filter(produce::Column::Id.is_in(sorted))
            .order_by_asc(produce::Column::Id)
            .lock_exclusive()
            .all(txn)
            .await?;

        Ok(rows.into_iter().map(|row| (row.id, row)).collect())
    }

    /// Writes back decremented product stock levels.
    async fn apply_product_decrements(
        txn: &DatabaseTransaction,
        decrements: &[StockDecrement],
        mut stock: HashMap<Uuid, products::Model>,
    ) -> Result<(), DbErr> {
        for decrement in decrements {
            let StockDecrement::Product { id, quantity } = decrement else {
                continue;
            };
            let Some(row) = stock.remove(id) else {
                continue;
            };

            let remaining = (row.quantity_in_stock - *quantity).max(0);
            let mut active: products::ActiveModel = row.into();
            active.quantity_in_stock = Set(remaining);
            active.update(txn).await?;
        }

        Ok(())
    }

    /// Writes back decremented produce quantities and availability.
    async fn apply_produce_decrements(
        txn: &DatabaseTransaction,
        decrements: &[StockDecrement],
        mut stock: HashMap<Uuid, produce::Model>,
    ) -> Result<(), DbErr> {
        for decrement in decrements {
            let StockDecrement::Produce { id, quantity } = decrement else {
                continue;
            };
            let Some(row) = stock.remove(id) else {
                continue;
            };

            let remaining = (row.quantity - *quantity).max(Decimal::ZERO);
            let mut active: produce::ActiveModel = row.into();
            active.quantity = Set(remaining);
            active.is_available = Set(remaining > Decimal::ZERO);
            active.update(txn).await?;
        }

        Ok(())
    }

    /// Locks the farmer's credit account and reserves the purchase total.
    async fn reserve_credit(
        txn: &DatabaseTransaction,
        farmer_id: Uuid,
        charge: Decimal,
    ) -> Result<credit_accounts::Model, OrderError> {
        let account = credit_accounts::Entity::find()
            .filter(credit_accounts::Column::FarmerId.eq(farmer_id))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(OrderError::NoCreditAccount(farmer_id))?;

        let standing = CreditStanding::new(account.credit_limit, account.current_balance)?
            .reserve(charge)?;

        let mut active: credit_accounts::ActiveModel = account.into();
        active.current_balance = Set(standing.current_balance);
        Ok(active.update(txn).await?)
    }

    /// Inserts the commission row for a produce sale.
    ///
    /// The beneficiary comes from configuration and must be an active
    /// administrator; a misconfigured beneficiary aborts the whole order.
    async fn insert_commission(
        &self,
        txn: &DatabaseTransaction,
        transaction_id: Uuid,
        sale_total: Decimal,
    ) -> Result<commissions::Model, OrderError> {
        let beneficiary_id = self.commission.beneficiary_id();
        let beneficiary = users::Entity::find_by_id(beneficiary_id)
            .one(txn)
            .await?
            .ok_or(OrderError::InvalidBeneficiary(beneficiary_id))?;

        if beneficiary.role != sea_orm_active_enums::UserRole::Admin || !beneficiary.is_active {
            return Err(OrderError::InvalidBeneficiary(beneficiary_id));
        }

        let now = chrono::Utc::now().into();
        let commission = commissions::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(transaction_id),
            amount: Set(self.commission.compute(sale_total)),
            commission_rate: Set(self.commission.rate()),
            beneficiary_id: Set(beneficiary_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(commission.insert(txn).await?)
    }
}

const fn db_transaction_type(kind: OrderKind) -> sea_orm_active_enums::TransactionType {
    match kind {
        OrderKind::ProductPurchase => sea_orm_active_enums::TransactionType::ProductPurchase,
        OrderKind::ProduceSale => sea_orm_active_enums::TransactionType::ProduceSale,
    }
}

const fn db_payment_method(method: rules::PaymentMethod) -> sea_orm_active_enums::PaymentMethod {
    match method {
        rules::PaymentMethod::Cash => sea_orm_active_enums::PaymentMethod::Cash,
        rules::PaymentMethod::Credit => sea_orm_active_enums::PaymentMethod::Credit,
        rules::PaymentMethod::MobileMoney => sea_orm_active_enums::PaymentMethod::MobileMoney,
    }
}

const fn db_status(status: rules::TransactionStatus) -> sea_orm_active_enums::TransactionStatus {
    match status {
        rules::TransactionStatus::Pending => sea_orm_active_enums::TransactionStatus::Pending,
        rules::TransactionStatus::Completed => sea_orm_active_enums::TransactionStatus::Completed,
        rules::TransactionStatus::Failed => sea_orm_active_enums::TransactionStatus::Failed,
    }
}
