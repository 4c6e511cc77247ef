//! Idempotent schema bootstrap and seed data.
//!
//! The original deployment model for this system created its database and
//! reference data inline at startup. Here that is an explicit, idempotent
//! routine: [`ensure_schema`] issues `CREATE TABLE IF NOT EXISTS` statements
//! and [`seed`] inserts reference data only when the `users` table is empty.
//! Both are invoked once at process start and exposed through
//! `clem-cli migrate` / `clem-cli seed`; no ambient global state remains
//! afterwards.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::services::auth::{self, AuthError};

/// Errors that can occur during bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to hash seed password: {0}")]
    PasswordHash(#[from] AuthError),
}

/// Schema DDL, one statement per entry, safe to re-run.
const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS users (
        id            SERIAL PRIMARY KEY,
        email         TEXT NOT NULL UNIQUE,
        name          TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        role          TEXT NOT NULL DEFAULT 'User',
        phone         TEXT,
        department    TEXT,
        is_active     BOOLEAN NOT NULL DEFAULT TRUE,
        last_login_at TIMESTAMPTZ,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS categories (
        id          SERIAL PRIMARY KEY,
        name        TEXT NOT NULL,
        description TEXT,
        image_url   TEXT,
        is_active   BOOLEAN NOT NULL DEFAULT TRUE,
        sort_order  INTEGER NOT NULL DEFAULT 0,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS brands (
        id          SERIAL PRIMARY KEY,
        name        TEXT NOT NULL,
        description TEXT,
        logo_url    TEXT,
        is_active   BOOLEAN NOT NULL DEFAULT TRUE,
        sort_order  INTEGER NOT NULL DEFAULT 0,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS products (
        id             SERIAL PRIMARY KEY,
        name           TEXT NOT NULL,
        description    TEXT,
        price          NUMERIC(10, 2) NOT NULL CHECK (price > 0),
        category_id    INTEGER NOT NULL REFERENCES categories (id),
        brand          TEXT,
        brand_id       INTEGER REFERENCES brands (id),
        sku            TEXT,
        stock          INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
        image_url      TEXT,
        is_active      BOOLEAN NOT NULL DEFAULT TRUE,
        is_featured    BOOLEAN NOT NULL DEFAULT FALSE,
        discount_price NUMERIC(10, 2),
        created_by_id  INTEGER NOT NULL REFERENCES users (id),
        created_at     TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at     TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS cart_items (
        id         SERIAL PRIMARY KEY,
        user_id    INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        product_id INTEGER NOT NULL REFERENCES products (id) ON DELETE CASCADE,
        quantity   INTEGER NOT NULL CHECK (quantity >= 1),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        UNIQUE (user_id, product_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS orders (
        id               SERIAL PRIMARY KEY,
        order_number     TEXT NOT NULL UNIQUE,
        user_id          INTEGER NOT NULL REFERENCES users (id),
        total_amount     NUMERIC(10, 2) NOT NULL,
        status           TEXT NOT NULL DEFAULT 'Pending',
        payment_id       TEXT,
        payment_status   TEXT,
        shipping_name    TEXT NOT NULL,
        shipping_address TEXT NOT NULL,
        shipping_address2 TEXT,
        shipping_city    TEXT NOT NULL,
        shipping_state   TEXT NOT NULL,
        shipping_zip     TEXT NOT NULL,
        shipping_country TEXT NOT NULL,
        notes            TEXT,
        created_at       TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at       TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS order_items (
        id                SERIAL PRIMARY KEY,
        order_id          INTEGER NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
        product_id        INTEGER NOT NULL REFERENCES products (id) ON DELETE RESTRICT,
        quantity          INTEGER NOT NULL CHECK (quantity >= 1),
        unit_price        NUMERIC(10, 2) NOT NULL,
        total_price       NUMERIC(10, 2) NOT NULL,
        product_name      TEXT NOT NULL,
        product_image_url TEXT
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS app_config (
        id          SERIAL PRIMARY KEY,
        key         TEXT NOT NULL UNIQUE,
        value       TEXT NOT NULL,
        description TEXT,
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_products_category ON products (category_id)",
    "CREATE INDEX IF NOT EXISTS idx_products_brand ON products (brand_id)",
    "CREATE INDEX IF NOT EXISTS idx_cart_items_user ON cart_items (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_orders_user ON orders (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items (order_id)",
];

/// Create all tables and indexes if they do not exist yet.
///
/// # Errors
///
/// Returns `BootstrapError::Database` if any DDL statement fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), BootstrapError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("Database schema ensured");
    Ok(())
}

/// Seed reference data on an empty database.
///
/// Guarded by an existence check on `users`: if any user exists the seed is
/// a no-op, making this safe to run on every start.
///
/// Seeds a development admin account (`admin@clementine.store` / `admin123`),
/// the base category and brand taxonomy, app-config defaults (including the
/// `tax_rate` key the cart and checkout read), and a small starter catalog.
///
/// # Errors
///
/// Returns `BootstrapError` if a statement fails or the seed password
/// cannot be hashed.
pub async fn seed(pool: &PgPool) -> Result<(), BootstrapError> {
    let already_seeded: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users)")
        .fetch_one(pool)
        .await?;

    if already_seeded {
        tracing::debug!("Seed skipped: users table is not empty");
        return Ok(());
    }

    tracing::info!("Seeding reference data");

    let password_hash = auth::hash_password("admin123")?;
    let admin_id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO users (email, name, password_hash, role, is_active)
        VALUES ($1, $2, $3, 'Admin', TRUE)
        RETURNING id
        ",
    )
    .bind("admin@clementine.store")
    .bind("Admin User")
    .bind(&password_hash)
    .fetch_one(pool)
    .await?;

    let categories: &[(&str, &str, i32)] = &[
        ("Electronics", "Electronic devices and gadgets", 1),
        ("Clothing", "Fashion and apparel", 2),
        ("Home & Garden", "Home improvement and garden supplies", 3),
        ("Sports & Outdoors", "Sports equipment and outdoor gear", 4),
        ("Books", "Books and educational materials", 5),
    ];
    for (name, description, sort_order) in categories {
        sqlx::query("INSERT INTO categories (name, description, sort_order) VALUES ($1, $2, $3)")
            .bind(name)
            .bind(description)
            .bind(sort_order)
            .execute(pool)
            .await?;
    }

    let brands: &[(&str, &str, i32)] = &[
        ("TechSound", "Premium audio equipment", 1),
        ("SmartTech", "Smart devices and wearables", 2),
        ("StreamCam", "Professional streaming equipment", 3),
        ("FashionForward", "Modern fashion and apparel", 4),
        ("HomeComfort", "Home and garden essentials", 5),
        ("SportsPro", "Professional sports equipment", 6),
        ("BookWise", "Educational and entertainment books", 7),
        ("CookMaster", "Kitchen and cooking essentials", 8),
    ];
    for (name, description, sort_order) in brands {
        sqlx::query("INSERT INTO brands (name, description, sort_order) VALUES ($1, $2, $3)")
            .bind(name)
            .bind(description)
            .bind(sort_order)
            .execute(pool)
            .await?;
    }

    let configs: &[(&str, &str, &str)] = &[
        ("currency", "USD", "Default currency"),
        ("tax_rate", "0.08", "Tax rate (8%)"),
        ("max_cart_items", "50", "Maximum items in cart"),
        ("site_name", "Clementine", "Site name"),
        ("support_email", "support@clementine.store", "Support email"),
    ];
    for (key, value, description) in configs {
        sqlx::query("INSERT INTO app_config (key, value, description) VALUES ($1, $2, $3)")
            .bind(key)
            .bind(value)
            .bind(description)
            .execute(pool)
            .await?;
    }

    // Starter catalog: (name, description, price in cents, category sort_order,
    // brand, stock, featured)
    let products: &[(&str, &str, i64, i32, &str, i32, bool)] = &[
        (
            "Wireless Headphones",
            "Over-ear wireless headphones with active noise cancellation",
            12999,
            1,
            "TechSound",
            25,
            true,
        ),
        (
            "Smart Watch",
            "Fitness tracking smart watch with heart-rate monitor",
            19999,
            1,
            "SmartTech",
            15,
            true,
        ),
        (
            "HD Webcam",
            "1080p webcam with built-in microphone",
            5999,
            1,
            "StreamCam",
            40,
            false,
        ),
        (
            "Cotton T-Shirt",
            "Classic-fit cotton t-shirt",
            1499,
            2,
            "FashionForward",
            100,
            false,
        ),
        (
            "Garden Tool Set",
            "Five-piece stainless steel garden tool set",
            3499,
            3,
            "HomeComfort",
            30,
            false,
        ),
        (
            "Yoga Mat",
            "Non-slip exercise yoga mat, 6mm",
            2499,
            4,
            "SportsPro",
            50,
            true,
        ),
        (
            "Cookbook: Weeknight Dinners",
            "120 recipes for fast weeknight cooking",
            1999,
            5,
            "BookWise",
            60,
            false,
        ),
    ];
    for (name, description, price_cents, category_sort, brand, stock, featured) in products {
        let price = Decimal::new(*price_cents, 2);
        sqlx::query(
            r"
            INSERT INTO products
                (name, description, price, category_id, brand, brand_id, stock,
                 is_featured, created_by_id)
            SELECT $1, $2, $3, c.id, $4, b.id, $5, $6, $7
            FROM categories c, brands b
            WHERE c.sort_order = $8 AND b.name = $4
            ",
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(brand)
        .bind(stock)
        .bind(featured)
        .bind(admin_id)
        .bind(category_sort)
        .execute(pool)
        .await?;
    }

    tracing::info!("Seed complete");
    Ok(())
}
