use std::path::Path;

use sqlx::{Error, SqlitePool};
use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePoolOptions;

use crate::configs::schema::SchemaManager;
use crate::configs::settings::Database;

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(database: Database, schema_manager: SchemaManager) -> Result<Self, Error> {
        let pool = Self::pool_options(&database.url)
            .connect(&database.url)
            .await?;

        Self::create_schema(&pool, &schema_manager, &database).await?;

        Ok(Self { pool })
    }

    // every connection to an in-memory url opens its own empty database, so
    // that single connection must never be reaped
    fn pool_options(url: &str) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new().min_connections(1);

        if url.contains(":memory:") {
            options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            options.max_connections(10)
        }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_schema(pool: &SqlitePool, schema: &SchemaManager, database: &Database) -> Result<(), Error> {
        let mut statements = Vec::new();

        if database.clean_start {
            sqlx::query("DROP TABLE IF EXISTS _sqlx_migrations")
                .execute(pool)
                .await?;

            statements.extend(schema.dispose_schema());

            tracing::warn!("perform a clean boot: clean and recreate schema");
        }

        statements.extend(schema.create_schema());

        sqlx::query(&statements.join("\n"))
            .execute(pool)
            .await?;

        tracing::debug!(tables = ?schema.table_names(), "database schema ready");

        if let Some(migration_path) = database.migration_path.clone() {
            let mut pool_connection = pool.acquire().await?;
            let migrator = Migrator::new(Path::new(&migration_path)).await?;
            migrator.run(&mut pool_connection).await?;

            tracing::info!("database migration success");
        }

        Ok(())
    }
}
