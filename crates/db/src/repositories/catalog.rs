//! Catalog repository for products and produce lots.
//!
//! Products are platform-stocked farm inputs; produce lots are listed by
//! farmers. Stock decrements happen inside the order repository's commit
//! boundary, so this repository only covers catalog management: creation,
//! lookup and restocking.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use agrilink_shared::AppError;

use crate::entities::{produce, products, sea_orm_active_enums::ProductCategory};

/// Error types for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Product not found.
    #[error("product not found: {0}")]
    ProductNotFound(Uuid),

    /// Produce lot not found.
    #[error("produce not found: {0}")]
    ProduceNotFound(Uuid),

    /// Rejected input (non-positive price, non-positive restock, ...).
    #[error("invalid catalog input: {0}")]
    Validation(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ProductNotFound(_) | CatalogError::ProduceNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            CatalogError::Validation(msg) => Self::Validation(msg),
            CatalogError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    /// Product name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Category.
    pub category: ProductCategory,
    /// Catalog price per unit.
    pub price: Decimal,
    /// Initial stock level.
    pub quantity_in_stock: i32,
    /// Unit of sale (bag, litre, piece, ...).
    pub unit: String,
    /// Admin who created the product.
    pub created_by: Uuid,
}

/// Input for creating a produce lot.
#[derive(Debug, Clone)]
pub struct CreateProduceInput {
    /// Produce name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Free-form category (maize, beans, ...).
    pub category: String,
    /// Quantity offered.
    pub quantity: Decimal,
    /// Unit of sale (kg, crate, ...).
    pub unit: String,
    /// Asking price per unit.
    pub price_per_unit: Decimal,
    /// Farmer who owns the lot.
    pub farmer_id: Uuid,
}

/// Catalog repository for product and produce operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    /// Creates a new catalog repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new product.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is invalid or the insert fails.
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<products::Model, CatalogError> {
        if input.price <= Decimal::ZERO {
            return Err(CatalogError::Validation("price must be positive".into()));
        }
        if input.quantity_in_stock < 0 {
            return Err(CatalogError::Validation(
                "stock level must not be negative".into(),
            ));
        }

        let now = chrono::Utc::now().into();
        let product = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            category: Set(input.category),
            price: Set(input.price),
            quantity_in_stock: Set(input.quantity_in_stock),
            unit: Set(input.unit),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(product.insert(&self.db).await?)
    }

    /// Creates a new produce lot. The lot starts available only if the
    /// offered quantity is positive.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is invalid or the insert fails.
    pub async fn create_produce(
        &self,
        input: CreateProduceInput,
    ) -> Result<produce::Model, CatalogError> {
        if input.price_per_unit <= Decimal::ZERO {
            return Err(CatalogError::Validation("price must be positive".into()));
        }
        if input.quantity < Decimal::ZERO {
            return Err(CatalogError::Validation(
                "quantity must not be negative".into(),
            ));
        }

        let now = chrono::Utc::now().into();
        let lot = produce::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            category: Set(input.category),
            quantity: Set(input.quantity),
            unit: Set(input.unit),
            price_per_unit: Set(input.price_per_unit),
            farmer_id: Set(input.farmer_id),
            is_available: Set(input.quantity > Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(lot.insert(&self.db).await?)
    }

    /// Finds a product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_product(&self, id: Uuid) -> Result<Option<products::Model>, DbErr> {
        products::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds a produce lot by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_produce(&self, id: Uuid) -> Result<Option<produce::Model>, DbErr> {
        produce::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists all products.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_products(&self) -> Result<Vec<products::Model>, DbErr> {
        products::Entity::find().all(&self.db).await
    }

    /// Lists produce lots currently on sale.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_available_produce(&self) -> Result<Vec<produce::Model>, DbErr> {
        produce::Entity::find()
            .filter(produce::Column::IsAvailable.eq(true))
            .all(&self.db)
            .await
    }

    /// Lists a farmer's produce lots, including sold-out ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_produce_by_farmer(
        &self,
        farmer_id: Uuid,
    ) -> Result<Vec<produce::Model>, DbErr> {
        produce::Entity::find()
            .filter(produce::Column::FarmerId.eq(farmer_id))
            .all(&self.db)
            .await
    }

    /// Adds stock to a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist, the amount is not
    /// positive, or the update fails.
    pub async fn restock_product(
        &self,
        id: Uuid,
        additional: i32,
    ) -> Result<products::Model, CatalogError> {
        if additional <= 0 {
            return Err(CatalogError::Validation(
                "restock amount must be positive".into(),
            ));
        }

        let product = products::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;

        let new_stock = product.quantity_in_stock + additional;
        let mut active: products::ActiveModel = product.into();
        active.quantity_in_stock = Set(new_stock);
        Ok(active.update(&self.db).await?)
    }

    /// Adds quantity to a produce lot and puts it back on sale.
    ///
    /// # Errors
    ///
    /// Returns an error if the lot does not exist, the amount is not
    /// positive, or the update fails.
    pub async fn restock_produce(
        &self,
        id: Uuid,
        additional: Decimal,
    ) -> Result<produce::Model, CatalogError> {
        if additional <= Decimal::ZERO {
            return Err(CatalogError::Validation(
                "restock amount must be positive".into(),
            ));
        }

        let lot = produce::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CatalogError::ProduceNotFound(id))?;

        let new_quantity = lot.quantity + additional;
        let mut active: produce::ActiveModel = lot.into();
        active.quantity = Set(new_quantity);
        active.is_available = Set(new_quantity > Decimal::ZERO);
        Ok(active.update(&self.db).await?)
    }
}
