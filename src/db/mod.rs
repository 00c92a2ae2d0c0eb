use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::time::Duration;

use crate::{
    config::Config,
    models::{NewUser, Role},
    services::auth_service::hash_password,
};

pub mod booking_store;
pub mod slot_store;
pub mod user_store;

pub use booking_store::BookingStore;
pub use slot_store::SlotStore;
pub use user_store::UserStore;

pub type DbPool = Pool<Sqlite>;

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        is_admin INTEGER NOT NULL DEFAULT 0
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS slots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        slot_number INTEGER NOT NULL UNIQUE,
        is_active INTEGER NOT NULL DEFAULT 1
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bookings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        slot_id INTEGER NOT NULL,
        start_time TEXT NOT NULL,
        end_time TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'booked',
        amount INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        FOREIGN KEY(user_id) REFERENCES users(id),
        FOREIGN KEY(slot_id) REFERENCES slots(id) ON DELETE CASCADE
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_bookings_slot_status ON bookings (slot_id, status);",
];

/// Initialize the database connection pool, schema and seed data
pub async fn init_db_pool(config: &Config) -> Result<DbPool> {
    let database_url = config.database_url.as_str();

    // Create the database if it doesn't exist
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        Sqlite::create_database(database_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_pool_size.max(1))
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    setup_database(&pool, config).await?;
    tracing::info!("Database ready at {}", database_url);

    Ok(pool)
}

/// Create the tables and seed the admin account and the initial slots
async fn setup_database(pool: &DbPool, config: &Config) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    let users = UserStore::new(pool.clone());
    if users.get_user_by_email(&config.admin_email).await?.is_none() {
        users
            .create_user(NewUser {
                name: config.admin_name.clone(),
                email: config.admin_email.clone(),
                password_hash: hash_password(&config.admin_password)?,
                role: Role::Admin,
            })
            .await?;
        tracing::info!("Seeded admin account {}", config.admin_email);
    }

    let slots = SlotStore::new(pool.clone());
    if slots.count_slots().await? == 0 && config.seed_slots > 0 {
        slot_store::insert_numbered_slots(pool, config.seed_slots).await?;
        tracing::info!("Seeded {} slots", config.seed_slots);
    }

    Ok(())
}
