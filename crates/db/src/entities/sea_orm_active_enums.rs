//! Postgres enum types used across the schema.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User role.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Platform administrator.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Salesperson.
    #[sea_orm(string_value = "salesperson")]
    Salesperson,
    /// Farmer.
    #[sea_orm(string_value = "farmer")]
    Farmer,
}

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "product_category")]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    /// Seeds.
    #[sea_orm(string_value = "seed")]
    Seed,
    /// Fertilizers.
    #[sea_orm(string_value = "fertilizer")]
    Fertilizer,
    /// Tools.
    #[sea_orm(string_value = "tool")]
    Tool,
    /// Pesticides.
    #[sea_orm(string_value = "pesticide")]
    Pesticide,
    /// Anything else.
    #[sea_orm(string_value = "other")]
    Other,
}

/// Transaction type.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Stocked input sold to a farmer or salesperson.
    #[sea_orm(string_value = "product_purchase")]
    ProductPurchase,
    /// Farmer produce sold on by a salesperson.
    #[sea_orm(string_value = "produce_sale")]
    ProduceSale,
}

/// Payment method.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Against the farmer's credit account.
    #[sea_orm(string_value = "credit")]
    Credit,
    /// Mobile money.
    #[sea_orm(string_value = "mobile_money")]
    MobileMoney,
}

/// Transaction status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_status")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Awaiting settlement.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Settled.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Failed settlement.
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// Repayment method.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "repayment_method")]
#[serde(rename_all = "snake_case")]
pub enum RepaymentMethod {
    /// Cash.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Mobile money.
    #[sea_orm(string_value = "mobile_money")]
    MobileMoney,
}
