//! Credit repository for farmer credit accounts and repayments.
//!
//! Each farmer has at most one account. Balances only move through
//! [`CreditStanding`], so `0 <= current_balance <= credit_limit` holds on
//! every committed row; the database CHECK constraint is a backstop.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use agrilink_core::credit::{CreditError, CreditStanding};
use agrilink_shared::AppError;

use crate::entities::{
    credit_accounts, credit_repayments,
    sea_orm_active_enums::{RepaymentMethod, UserRole},
    users,
};

/// Error types for credit account operations.
#[derive(Debug, thiserror::Error)]
pub enum CreditAccountError {
    /// The referenced user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(Uuid),

    /// Credit accounts are for farmers only.
    #[error("user {0} is not a farmer")]
    NotAFarmer(Uuid),

    /// The farmer already has a credit account.
    #[error("farmer {0} already has a credit account")]
    DuplicateAccount(Uuid),

    /// Credit account not found.
    #[error("credit account not found: {0}")]
    AccountNotFound(Uuid),

    /// Credit policy violation (amount, limit or balance rule).
    #[error(transparent)]
    Policy(#[from] CreditError),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CreditAccountError> for AppError {
    fn from(err: CreditAccountError) -> Self {
        match err {
            CreditAccountError::UserNotFound(_) | CreditAccountError::AccountNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            CreditAccountError::NotAFarmer(_) => Self::Validation(err.to_string()),
            CreditAccountError::DuplicateAccount(_) => Self::Conflict(err.to_string()),
            CreditAccountError::Policy(CreditError::InvalidAmount) => {
                Self::Validation(err.to_string())
            }
            CreditAccountError::Policy(_) => Self::BusinessRule(err.to_string()),
            CreditAccountError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for recording a repayment.
#[derive(Debug, Clone)]
pub struct RepaymentInput {
    /// Amount repaid, strictly positive.
    pub amount: Decimal,
    /// How the repayment was made.
    pub repayment_method: RepaymentMethod,
    /// Optional notes.
    pub notes: Option<String>,
    /// Staff member who recorded the repayment.
    pub recorded_by: Uuid,
}

/// Credit repository for account and repayment operations.
#[derive(Debug, Clone)]
pub struct CreditRepository {
    db: DatabaseConnection,
}

impl CreditRepository {
    /// Creates a new credit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens a credit account for a farmer.
    ///
    /// The opening balance is usually zero, but migrated accounts may
    /// carry existing debt.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is missing or not a farmer, an account
    /// already exists, the limit/balance pair is invalid, or the insert
    /// fails.
    pub async fn create_account(
        &self,
        farmer_id: Uuid,
        credit_limit: Decimal,
        current_balance: Decimal,
        created_by: Uuid,
    ) -> Result<credit_accounts::Model, CreditAccountError> {
        let user = users::Entity::find_by_id(farmer_id)
            .one(&self.db)
            .await?
            .ok_or(CreditAccountError::UserNotFound(farmer_id))?;

        if user.role != UserRole::Farmer {
            return Err(CreditAccountError::NotAFarmer(farmer_id));
        }

        // Validates 0 <= balance <= limit before anything is written.
        let standing = CreditStanding::new(credit_limit, current_balance)?;

        let now = chrono::Utc::now().into();
        let account = credit_accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            farmer_id: Set(farmer_id),
            credit_limit: Set(standing.credit_limit),
            current_balance: Set(standing.current_balance),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // The UNIQUE constraint on farmer_id decides duplicates, so two
        // concurrent opens cannot both succeed.
        let account = account.insert(&self.db).await.map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                CreditAccountError::DuplicateAccount(farmer_id)
            }
            _ => CreditAccountError::Database(err),
        })?;
        info!(
            account_id = %account.id,
            farmer_id = %farmer_id,
            credit_limit = %account.credit_limit,
            "Credit account opened"
        );
        Ok(account)
    }

    /// Finds a credit account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_account(&self, id: Uuid) -> Result<Option<credit_accounts::Model>, DbErr> {
        credit_accounts::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds a farmer's credit account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_account_by_farmer(
        &self,
        farmer_id: Uuid,
    ) -> Result<Option<credit_accounts::Model>, DbErr> {
        credit_accounts::Entity::find()
            .filter(credit_accounts::Column::FarmerId.eq(farmer_id))
            .one(&self.db)
            .await
    }

    /// Changes an account's credit limit.
    ///
    /// The new limit must still cover the outstanding balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing, the new limit is below
    /// the current balance, or the update fails.
    pub async fn update_limit(
        &self,
        account_id: Uuid,
        new_limit: Decimal,
    ) -> Result<credit_accounts::Model, CreditAccountError> {
        let txn = self.db.begin().await?;

        let account = credit_accounts::Entity::find_by_id(account_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(CreditAccountError::AccountNotFound(account_id))?;

        let standing = CreditStanding::new(new_limit, account.current_balance)?;

        let mut active: credit_accounts::ActiveModel = account.into();
        active.credit_limit = Set(standing.credit_limit);
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Records a repayment against an account.
    ///
    /// The account row is locked for the duration, the balance is reduced
    /// and the repayment row inserted in one database transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing, the amount is not
    /// positive or exceeds the outstanding balance, or a write fails.
    pub async fn post_repayment(
        &self,
        account_id: Uuid,
        input: RepaymentInput,
    ) -> Result<(credit_accounts::Model, credit_repayments::Model), CreditAccountError> {
        let txn = self.db.begin().await?;

        let account = credit_accounts::Entity::find_by_id(account_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(CreditAccountError::AccountNotFound(account_id))?;

        let standing = CreditStanding::new(account.credit_limit, account.current_balance)?
            .apply_repayment(input.amount)?;

        let now = chrono::Utc::now().into();

        let mut active: credit_accounts::ActiveModel = account.into();
        active.current_balance = Set(standing.current_balance);
        active.updated_at = Set(now);
        let updated_account = active.update(&txn).await?;

        let repayment = credit_repayments::ActiveModel {
            id: Set(Uuid::new_v4()),
            credit_account_id: Set(account_id),
            amount: Set(input.amount),
            repayment_method: Set(input.repayment_method),
            notes: Set(input.notes),
            recorded_by: Set(input.recorded_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let repayment = repayment.insert(&txn).await?;

        txn.commit().await?;

        info!(
            account_id = %account_id,
            amount = %repayment.amount,
            balance = %updated_account.current_balance,
            "Repayment recorded"
        );
        Ok((updated_account, repayment))
    }

    /// Lists an account's repayments, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_repayments(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<credit_repayments::Model>, DbErr> {
        credit_repayments::Entity::find()
            .filter(credit_repayments::Column::CreditAccountId.eq(account_id))
            .order_by_desc(credit_repayments::Column::CreatedAt)
            .all(&self.db)
            .await
    }
}
