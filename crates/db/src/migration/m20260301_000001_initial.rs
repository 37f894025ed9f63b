//! Initial database migration.
//!
//! Creates the enums, tenancy and catalog tables, orders with their lines,
//! and the purchase cost history.

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
        // PART 2: TENANCY & COUNTERPARTIES
        // ============================================================
        db.execute_unprepared(LOCALS_SQL).await?;
        db.execute_unprepared(PROVIDERS_SQL).await?;
        db.execute_unprepared(CUSTOMERS_SQL).await?;

        // ============================================================
        // PART 3: CATALOG
        // ============================================================
        db.execute_unprepared(PRODUCTS_SQL).await?;

        // ============================================================
        // PART 4: ORDERS
        // ============================================================
        db.execute_unprepared(ORDERS_SQL).await?;
        db.execute_unprepared(ORDER_LINES_SQL).await?;

        // ============================================================
        // PART 5: COST HISTORY
        // ============================================================
        db.execute_unprepared(COST_HISTORY_SQL).await?;

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
CREATE TYPE order_kind AS ENUM ('purchase', 'sale');

CREATE TYPE order_status AS ENUM ('draft', 'confirmed', 'annulled');
";

const LOCALS_SQL: &str = r"
CREATE TABLE locals (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(20) NOT NULL UNIQUE,
    name VARCHAR(120) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const PROVIDERS_SQL: &str = r"
CREATE TABLE providers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    local_id UUID NOT NULL REFERENCES locals(id) ON DELETE CASCADE,
    name VARCHAR(200) NOT NULL,
    tax_id VARCHAR(30),
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_providers_local ON providers(local_id);
";

const CUSTOMERS_SQL: &str = r"
CREATE TABLE customers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    local_id UUID NOT NULL REFERENCES locals(id) ON DELETE CASCADE,
    name VARCHAR(200) NOT NULL,
    document VARCHAR(30),
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_customers_local ON customers(local_id);
";

const PRODUCTS_SQL: &str = r"
CREATE TABLE products (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    local_id UUID NOT NULL REFERENCES locals(id) ON DELETE CASCADE,
    code VARCHAR(50) NOT NULL,
    name VARCHAR(200) NOT NULL,
    avg_cost NUMERIC(14, 4) NOT NULL DEFAULT 0,
    sale_price NUMERIC(14, 4) NOT NULL DEFAULT 0,
    stock_on_hand NUMERIC(14, 4) NOT NULL DEFAULT 0,
    min_stock NUMERIC(14, 4) NOT NULL DEFAULT 0,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (local_id, code),
    CONSTRAINT chk_products_avg_cost CHECK (avg_cost >= 0),
    CONSTRAINT chk_products_sale_price CHECK (sale_price >= 0)
);

CREATE INDEX idx_products_local ON products(local_id);
";

const ORDERS_SQL: &str = r"
CREATE TABLE orders (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    local_id UUID NOT NULL REFERENCES locals(id) ON DELETE CASCADE,
    kind order_kind NOT NULL,
    provider_id UUID REFERENCES providers(id),
    customer_id UUID REFERENCES customers(id),
    status order_status NOT NULL DEFAULT 'draft',
    occurred_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    subtotal NUMERIC(14, 4) NOT NULL DEFAULT 0,
    discount_total NUMERIC(14, 4) NOT NULL DEFAULT 0,
    tax_total NUMERIC(14, 4) NOT NULL DEFAULT 0,
    grand_total NUMERIC(14, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_orders_counterparty CHECK (
        (kind = 'purchase' AND provider_id IS NOT NULL AND customer_id IS NULL)
        OR (kind = 'sale' AND provider_id IS NULL)
    ),
    CONSTRAINT chk_orders_totals CHECK (
        grand_total = subtotal - discount_total + tax_total
    )
);

CREATE INDEX idx_orders_local_kind_occurred ON orders(local_id, kind, occurred_at DESC);
CREATE INDEX idx_orders_local_kind_status ON orders(local_id, kind, status);
";

const ORDER_LINES_SQL: &str = r"
CREATE TABLE order_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    line_no INTEGER NOT NULL,
    product_id UUID NOT NULL REFERENCES products(id),
    quantity NUMERIC(14, 4) NOT NULL,
    unit_price NUMERIC(14, 4) NOT NULL,
    discount NUMERIC(14, 4) NOT NULL DEFAULT 0,
    tax NUMERIC(14, 4) NOT NULL DEFAULT 0,
    line_total NUMERIC(14, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (order_id, line_no),
    CONSTRAINT chk_order_lines_line_no CHECK (line_no >= 1),
    CONSTRAINT chk_order_lines_quantity CHECK (quantity > 0),
    CONSTRAINT chk_order_lines_amounts CHECK (unit_price >= 0 AND discount >= 0 AND tax >= 0),
    CONSTRAINT chk_order_lines_total CHECK (
        line_total = ROUND(quantity * unit_price, 4) - discount + tax
    )
);

CREATE INDEX idx_order_lines_order ON order_lines(order_id);
CREATE INDEX idx_order_lines_product ON order_lines(product_id);
";

const COST_HISTORY_SQL: &str = r"
CREATE TABLE cost_history (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    product_id UUID NOT NULL REFERENCES products(id) ON DELETE CASCADE,
    provider_id UUID REFERENCES providers(id),
    order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    unit_cost NUMERIC(14, 4) NOT NULL,
    quantity NUMERIC(14, 4) NOT NULL,
    occurred_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_cost_history_product ON cost_history(product_id, occurred_at DESC);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS cost_history;
DROP TABLE IF EXISTS order_lines;
DROP TABLE IF EXISTS orders;
DROP TABLE IF EXISTS products;
DROP TABLE IF EXISTS customers;
DROP TABLE IF EXISTS providers;
DROP TABLE IF EXISTS locals;
DROP TYPE IF EXISTS order_status;
DROP TYPE IF EXISTS order_kind;
";
