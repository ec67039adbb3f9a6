//! PostgreSQL storage handle shared by every request handler.
//!
//! [`Database`] owns the process-wide `sqlx::PgPool`. It is created once at
//! startup, applies each module's idempotent schema statements, and is closed
//! when the `db` core module stops.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};

use bookstore_kernel::{settings::DatabaseSettings, InitCtx, Migration, Module};

/// Process-wide storage handle.
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open the pool and establish the first connection.
    pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(connect_options(settings))
            .await
            .with_context(|| {
                format!(
                    "failed to connect to postgres at {}:{}/{}",
                    settings.host, settings.port, settings.name
                )
            })?;

        tracing::info!(
            target: "bookstore-db",
            host = %settings.host,
            port = settings.port,
            database = %settings.name,
            "connected to PostgreSQL database"
        );

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial statement to prove the server is reachable.
    pub async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("database ping failed")?;
        Ok(())
    }

    /// Execute module migrations in the given order.
    pub async fn apply_migrations(&self, migrations: &[(String, Migration)]) -> anyhow::Result<()> {
        for (module, migration) in migrations {
            tracing::info!(
                target: "bookstore-db",
                module = %module,
                migration = migration.id,
                "applying migration"
            );

            sqlx::raw_sql(migration.up)
                .execute(&self.pool)
                .await
                .with_context(|| {
                    format!("failed to apply migration {}/{}", module, migration.id)
                })?;
        }

        Ok(())
    }

    /// Wait for checked-out connections to return, then close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!(target: "bookstore-db", "database connection closed");
    }
}

/// Connection options built from settings only; `PG*` variables are ignored
/// for every field set here.
pub fn connect_options(settings: &DatabaseSettings) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
        .database(&settings.name)
        .ssl_mode(PgSslMode::Disable)
        .application_name("bookstore")
}

/// Core module tying the storage handle to the registry lifecycle.
pub struct DatabaseModule {
    db: Arc<Database>,
}

impl DatabaseModule {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Module for DatabaseModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.db.ping().await
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.db.close().await;
        Ok(())
    }
}

/// Create the `db` core module for the given handle
pub fn create_module(db: Arc<Database>) -> Arc<dyn Module> {
    Arc::new(DatabaseModule::new(db))
}
