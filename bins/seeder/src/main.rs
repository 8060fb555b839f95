//! Database seeder for AgriLink development and testing.
//!
//! Seeds an admin (the default commission beneficiary), a salesperson, a
//! farmer with a credit account, and a handful of catalog rows for local
//! development.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use agrilink_db::entities::{
    credit_accounts, produce, products,
    sea_orm_active_enums::{ProductCategory, UserRole},
    users,
};

/// Admin user ID (consistent for all seeds; matches the default
/// commission beneficiary in config/default.toml)
const ADMIN_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Salesperson user ID
const SALESPERSON_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Farmer user ID
const FARMER_ID: &str = "00000000-0000-0000-0000-000000000003";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agrilink=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = agrilink_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    println!("Seeding users...");
    seed_users(&db).await;

    println!("Seeding products...");
    seed_products(&db).await;

    println!("Seeding produce...");
    seed_produce(&db).await;

    println!("Seeding credit account...");
    seed_credit_account(&db).await;

    println!("Seeding complete!");
    Ok(())
}

fn admin_id() -> Uuid {
    Uuid::parse_str(ADMIN_ID).unwrap()
}

fn salesperson_id() -> Uuid {
    Uuid::parse_str(SALESPERSON_ID).unwrap()
}

fn farmer_id() -> Uuid {
    Uuid::parse_str(FARMER_ID).unwrap()
}

async fn seed_user(
    db: &DatabaseConnection,
    id: Uuid,
    username: &str,
    role: UserRole,
    full_name: &str,
) {
    if users::Entity::find_by_id(id).one(db).await.ok().flatten().is_some() {
        println!("  User {username} already exists, skipping...");
        return;
    }

    let now = Utc::now().into();
    let user = users::ActiveModel {
        id: Set(id),
        username: Set(username.to_string()),
        email: Set(format!("{username}@agrilink.dev")),
        password_hash: Set("$argon2id$v=19$m=65536,t=3,p=4$dev_hash".to_string()),
        full_name: Set(Some(full_name.to_string())),
        phone_number: Set(None),
        role: Set(role),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    if let Err(e) = user.insert(db).await {
        eprintln!("Failed to insert user {username}: {e}");
    } else {
        println!("  Created user: {username}@agrilink.dev");
    }
}

async fn seed_users(db: &DatabaseConnection) {
    seed_user(db, admin_id(), "admin", UserRole::Admin, "Platform Admin").await;
    seed_user(
        db,
        salesperson_id(),
        "sales",
        UserRole::Salesperson,
        "Demo Salesperson",
    )
    .await;
    seed_user(db, farmer_id(), "farmer", UserRole::Farmer, "Demo Farmer").await;
}

async fn seed_products(db: &DatabaseConnection) {
    let items: [(&str, ProductCategory, Decimal, i32, &str); 3] = [
        ("Maize Seed 10kg", ProductCategory::Seed, dec!(12.50), 100, "bag"),
        ("NPK Fertilizer 50kg", ProductCategory::Fertilizer, dec!(35.00), 40, "bag"),
        ("Hand Hoe", ProductCategory::Tool, dec!(8.00), 25, "piece"),
    ];

    for (name, category, price, stock, unit) in items {
        let now = Utc::now().into();
        let product = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(None),
            category: Set(category),
            price: Set(price),
            quantity_in_stock: Set(stock),
            unit: Set(unit.to_string()),
            created_by: Set(admin_id()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        if let Err(e) = product.insert(db).await {
            eprintln!("Failed to insert product {name}: {e}");
        } else {
            println!("  Created product: {name}");
        }
    }
}

async fn seed_produce(db: &DatabaseConnection) {
    let lots: [(&str, &str, Decimal, Decimal, &str); 2] = [
        ("Green Beans", "vegetable", dec!(120.00), dec!(1.80), "kg"),
        ("Maize", "grain", dec!(500.00), dec!(0.45), "kg"),
    ];

    for (name, category, quantity, price, unit) in lots {
        let now = Utc::now().into();
        let lot = produce::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(None),
            category: Set(category.to_string()),
            quantity: Set(quantity),
            unit: Set(unit.to_string()),
            price_per_unit: Set(price),
            farmer_id: Set(farmer_id()),
            is_available: Set(quantity > Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        };

        if let Err(e) = lot.insert(db).await {
            eprintln!("Failed to insert produce {name}: {e}");
        } else {
            println!("  Created produce lot: {name}");
        }
    }
}

async fn seed_credit_account(db: &DatabaseConnection) {
    let existing = credit_accounts::Entity::find().one(db).await.ok().flatten();
    if existing.is_some() {
        println!("  Credit account already exists, skipping...");
        return;
    }

    let now = Utc::now().into();
    let account = credit_accounts::ActiveModel {
        id: Set(Uuid::new_v4()),
        farmer_id: Set(farmer_id()),
        credit_limit: Set(dec!(200.00)),
        current_balance: Set(Decimal::ZERO),
        created_by: Set(admin_id()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    if let Err(e) = account.insert(db).await {
        eprintln!("Failed to insert credit account: {e}");
    } else {
        println!("  Created credit account for the demo farmer (limit 200.00)");
    }
}
