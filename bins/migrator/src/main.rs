//! Database migration runner for Almacen.
//!
//! Reads `DATABASE_URL` and accepts the standard sea-orm-migration
//! subcommands:
//!   migrator up      - Create the schema
//!   migrator down    - Drop it again
//!   migrator status  - Show which migrations are applied
//!   migrator fresh   - Drop everything and re-create

use sea_orm_migration::prelude::*;
use almacen_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    cli::run_cli(Migrator).await;
}
