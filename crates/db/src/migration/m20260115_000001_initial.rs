//! Initial database migration.
//!
//! Creates all core enums and tables for the marketplace ledger, with
//! database-level constraints backing the invariants the repositories
//! enforce in application code.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: USERS & CATALOG
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(PRODUCTS_SQL).await?;
        db.execute_unprepared(PRODUCE_SQL).await?;

        // ============================================================
        // PART 3: CREDIT LEDGER
        // ============================================================
        db.execute_unprepared(CREDIT_ACCOUNTS_SQL).await?;
        db.execute_unprepared(CREDIT_REPAYMENTS_SQL).await?;

        // ============================================================
        // PART 4: ORDERS & COMMISSIONS
        // ============================================================
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(TRANSACTION_ITEMS_SQL).await?;
        db.execute_unprepared(COMMISSIONS_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- User roles
CREATE TYPE user_role AS ENUM (
    'admin',
    'salesperson',
    'farmer'
);

-- Product categories for purchased farm inputs
CREATE TYPE product_category AS ENUM (
    'seed',
    'fertilizer',
    'tool',
    'pesticide',
    'other'
);

-- Transaction type
CREATE TYPE transaction_type AS ENUM (
    'product_purchase',
    'produce_sale'
);

-- Payment method
CREATE TYPE payment_method AS ENUM (
    'cash',
    'credit',
    'mobile_money'
);

-- Transaction status
CREATE TYPE transaction_status AS ENUM (
    'pending',
    'completed',
    'failed'
);

-- Repayment method (credit is not a valid way to repay credit)
CREATE TYPE repayment_method AS ENUM (
    'cash',
    'mobile_money'
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    username VARCHAR(100) NOT NULL UNIQUE,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    full_name VARCHAR(255),
    phone_number VARCHAR(50),
    role user_role NOT NULL DEFAULT 'farmer',
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_email ON users(email) WHERE is_active = true;
CREATE INDEX idx_users_role ON users(role);
";

const PRODUCTS_SQL: &str = r"
CREATE TABLE products (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    description TEXT,
    category product_category NOT NULL DEFAULT 'other',
    price NUMERIC(10, 2) NOT NULL,
    quantity_in_stock INTEGER NOT NULL DEFAULT 0,
    unit VARCHAR(50) NOT NULL,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_product_price CHECK (price > 0),
    CONSTRAINT chk_product_stock CHECK (quantity_in_stock >= 0)
);

CREATE INDEX idx_products_category ON products(category);
";

const PRODUCE_SQL: &str = r"
CREATE TABLE produce (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    description TEXT,
    category VARCHAR(100) NOT NULL,
    quantity NUMERIC(10, 2) NOT NULL DEFAULT 0,
    unit VARCHAR(50) NOT NULL,
    price_per_unit NUMERIC(10, 2) NOT NULL,
    farmer_id UUID NOT NULL REFERENCES users(id),
    is_available BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_produce_price CHECK (price_per_unit > 0),
    CONSTRAINT chk_produce_quantity CHECK (quantity >= 0)
);

CREATE INDEX idx_produce_farmer ON produce(farmer_id);
CREATE INDEX idx_produce_available ON produce(is_available) WHERE is_available = true;
";

const CREDIT_ACCOUNTS_SQL: &str = r"
CREATE TABLE credit_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    farmer_id UUID NOT NULL UNIQUE REFERENCES users(id),
    credit_limit NUMERIC(10, 2) NOT NULL DEFAULT 0,
    current_balance NUMERIC(10, 2) NOT NULL DEFAULT 0,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_credit_limit CHECK (credit_limit >= 0),
    CONSTRAINT chk_credit_balance CHECK (
        current_balance >= 0 AND current_balance <= credit_limit
    )
);
";

const CREDIT_REPAYMENTS_SQL: &str = r"
CREATE TABLE credit_repayments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    credit_account_id UUID NOT NULL REFERENCES credit_accounts(id) ON DELETE CASCADE,
    amount NUMERIC(10, 2) NOT NULL,
    repayment_method repayment_method NOT NULL DEFAULT 'cash',
    notes TEXT,
    recorded_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_repayment_amount CHECK (amount > 0)
);

CREATE INDEX idx_repayments_account ON credit_repayments(credit_account_id, created_at);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id),
    transaction_type transaction_type NOT NULL,
    total_amount NUMERIC(10, 2) NOT NULL,
    payment_method payment_method NOT NULL,
    status transaction_status NOT NULL DEFAULT 'completed',
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_txn_total CHECK (total_amount >= 0)
);

CREATE INDEX idx_txn_user ON transactions(user_id, created_at);
CREATE INDEX idx_txn_type ON transactions(transaction_type);
";

const TRANSACTION_ITEMS_SQL: &str = r"
CREATE TABLE transaction_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    transaction_id UUID NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    product_id UUID REFERENCES products(id),
    produce_id UUID REFERENCES produce(id),
    quantity NUMERIC(10, 2) NOT NULL,
    unit_price NUMERIC(10, 2) NOT NULL,
    line_total NUMERIC(10, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_item_quantity CHECK (quantity > 0),
    CONSTRAINT chk_item_unit_price CHECK (unit_price > 0),
    CONSTRAINT chk_item_line_total CHECK (line_total >= 0),
    -- exactly one of product_id / produce_id per line
    CONSTRAINT chk_item_target CHECK ((product_id IS NULL) <> (produce_id IS NULL))
);

CREATE INDEX idx_items_transaction ON transaction_items(transaction_id);
CREATE INDEX idx_items_product ON transaction_items(product_id) WHERE product_id IS NOT NULL;
CREATE INDEX idx_items_produce ON transaction_items(produce_id) WHERE produce_id IS NOT NULL;
";

const COMMISSIONS_SQL: &str = r"
CREATE TABLE commissions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    transaction_id UUID NOT NULL UNIQUE REFERENCES transactions(id) ON DELETE CASCADE,
    amount NUMERIC(10, 2) NOT NULL,
    commission_rate NUMERIC(5, 4) NOT NULL,
    beneficiary_id UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_commission_amount CHECK (amount >= 0),
    CONSTRAINT chk_commission_rate CHECK (commission_rate >= 0)
);

CREATE INDEX idx_commissions_beneficiary ON commissions(beneficiary_id);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: set_updated_at
-- Keeps updated_at current on every row update
-- ============================================================
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at := now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_users_updated_at
BEFORE UPDATE ON users
FOR EACH ROW
EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_products_updated_at
BEFORE UPDATE ON products
FOR EACH ROW
EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_produce_updated_at
BEFORE UPDATE ON produce
FOR EACH ROW
EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_credit_accounts_updated_at
BEFORE UPDATE ON credit_accounts
FOR EACH ROW
EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_credit_repayments_updated_at
BEFORE UPDATE ON credit_repayments
FOR EACH ROW
EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_transactions_updated_at
BEFORE UPDATE ON transactions
FOR EACH ROW
EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_commissions_updated_at
BEFORE UPDATE ON commissions
FOR EACH ROW
EXECUTE FUNCTION set_updated_at();

-- ============================================================
-- FUNCTION: sync_produce_availability
-- Keeps is_available in lockstep with remaining quantity
-- ============================================================
CREATE OR REPLACE FUNCTION sync_produce_availability()
RETURNS TRIGGER AS $$
BEGIN
    NEW.is_available := NEW.quantity > 0;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_produce_availability
BEFORE INSERT OR UPDATE ON produce
FOR EACH ROW
EXECUTE FUNCTION sync_produce_availability();
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

-- Drop triggers
DROP TRIGGER IF EXISTS trg_produce_availability ON produce;
DROP TRIGGER IF EXISTS trg_commissions_updated_at ON commissions;
DROP TRIGGER IF EXISTS trg_transactions_updated_at ON transactions;
DROP TRIGGER IF EXISTS trg_credit_repayments_updated_at ON credit_repayments;
DROP TRIGGER IF EXISTS trg_credit_accounts_updated_at ON credit_accounts;
DROP TRIGGER IF EXISTS trg_produce_updated_at ON produce;
DROP TRIGGER IF EXISTS trg_products_updated_at ON products;
DROP TRIGGER IF EXISTS trg_users_updated_at ON users;

-- Drop functions
DROP FUNCTION IF EXISTS sync_produce_availability();
DROP FUNCTION IF EXISTS set_updated_at();

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS commissions CASCADE;
DROP TABLE IF EXISTS transaction_items CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS credit_repayments CASCADE;
DROP TABLE IF EXISTS credit_accounts CASCADE;
DROP TABLE IF EXISTS produce CASCADE;
DROP TABLE IF EXISTS products CASCADE;
DROP TABLE IF EXISTS users CASCADE;

-- Drop enums
DROP TYPE IF EXISTS repayment_method CASCADE;
DROP TYPE IF EXISTS transaction_status CASCADE;
DROP TYPE IF EXISTS payment_method CASCADE;
DROP TYPE IF EXISTS transaction_type CASCADE;
DROP TYPE IF EXISTS product_category CASCADE;
DROP TYPE IF EXISTS user_role CASCADE;
";
