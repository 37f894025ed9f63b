//! Database seeder for Almacen development and testing.
//!
//! Seeds a demo Local with one provider, one customer and a handful of
//! stocked products. Running it again leaves existing rows alone.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use almacen_db::entities::{customers, locals, products, providers};
use almacen_shared::AppConfig;

/// Demo Local ID, for use as the `X-Local-ID` header.
const DEMO_LOCAL_ID: Uuid = Uuid::from_u128(1);
/// Demo provider ID.
const DEMO_PROVIDER_ID: Uuid = Uuid::from_u128(2);
/// Demo customer ID.
const DEMO_CUSTOMER_ID: Uuid = Uuid::from_u128(3);

/// `(id, code, name, stock_on_hand, avg_cost, sale_price, min_stock)`
const DEMO_PRODUCTS: [(u128, &str, &str, Decimal, Decimal, Decimal, Decimal); 4] = [
    (0x10, "RICE-1KG", "Rice 1 kg", dec!(40), dec!(950), dec!(1300), dec!(10)),
    (0x11, "OIL-900ML", "Sunflower oil 900 ml", dec!(24), dec!(1800), dec!(2450), dec!(6)),
    (0x12, "SUGAR-1KG", "Sugar 1 kg", dec!(30), dec!(870), dec!(1150), dec!(10)),
    (0x13, "COFFEE-250G", "Ground coffee 250 g", dec!(0), dec!(0), dec!(3900), dec!(4)),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = almacen_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    println!("Seeding demo Local...");
    seed_local(&db).await?;

    println!("Seeding counterparties...");
    seed_counterparties(&db).await?;

    println!("Seeding products...");
    seed_products(&db).await?;

    println!("Seeding complete! Use X-Local-ID: {DEMO_LOCAL_ID}");
    Ok(())
}

async fn seed_local(db: &DatabaseConnection) -> anyhow::Result<()> {
    if locals::Entity::find_by_id(DEMO_LOCAL_ID).one(db).await?.is_some() {
        println!("  Demo Local already exists, skipping...");
        return Ok(());
    }

    let now = Utc::now();
    locals::ActiveModel {
        id: Set(DEMO_LOCAL_ID),
        code: Set("DEMO".to_string()),
        name: Set("Demo Store".to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .context("Failed to insert demo Local")?;

    println!("  Created Local DEMO");
    Ok(())
}

async fn seed_counterparties(db: &DatabaseConnection) -> anyhow::Result<()> {
    let now = Utc::now();

    if providers::Entity::find_by_id(DEMO_PROVIDER_ID).one(db).await?.is_none() {
        providers::ActiveModel {
            id: Set(DEMO_PROVIDER_ID),
            local_id: Set(DEMO_LOCAL_ID),
            name: Set("Demo Wholesale".to_string()),
            tax_id: Set(Some("30-00000000-1".to_string())),
            active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await
        .context("Failed to insert demo provider")?;
        println!("  Created provider {DEMO_PROVIDER_ID}");
    }

    if customers::Entity::find_by_id(DEMO_CUSTOMER_ID).one(db).await?.is_none() {
        customers::ActiveModel {
            id: Set(DEMO_CUSTOMER_ID),
            local_id: Set(DEMO_LOCAL_ID),
            name: Set("Walk-in Customer".to_string()),
            document: Set(None),
            active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await
        .context("Failed to insert demo customer")?;
        println!("  Created customer {DEMO_CUSTOMER_ID}");
    }

    Ok(())
}

async fn seed_products(db: &DatabaseConnection) -> anyhow::Result<()> {
    let now = Utc::now();

    for (id, code, name, stock_on_hand, avg_cost, sale_price, min_stock) in DEMO_PRODUCTS {
        let id = Uuid::from_u128(id);
        if products::Entity::find_by_id(id).one(db).await?.is_some() {
            println!("  Product {code} already exists, skipping...");
            continue;
        }

        products::ActiveModel {
            id: Set(id),
            local_id: Set(DEMO_LOCAL_ID),
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            avg_cost: Set(avg_cost),
            sale_price: Set(sale_price),
            stock_on_hand: Set(stock_on_hand),
            min_stock: Set(min_stock),
            active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await
        .with_context(|| format!("Failed to insert product {code}"))?;
        println!("  Created product {code} ({id})");
    }

    Ok(())
}
