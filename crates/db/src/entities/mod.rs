//! `SeaORM` entity definitions for the marketplace schema.

pub mod commissions;
pub mod credit_accounts;
pub mod credit_repayments;
pub mod produce;
pub mod products;
pub mod sea_orm_active_enums;
pub mod transaction_items;
pub mod transactions;
pub mod users;
