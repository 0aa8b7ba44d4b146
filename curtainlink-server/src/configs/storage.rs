use sqlx::{Error, SqlitePool};
use sqlx::sqlite::SqlitePoolOptions;

use crate::configs::settings::Database;
use crate::models::{CurtainStateTable, Table};

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(database: &Database) -> Result<Self, Error> {
        // every connection to an in memory db sees its own empty database
        let max_connections = if database.url.contains(":memory:") { 1 } else { 10 };

        let pool = SqlitePoolOptions::new()
            .min_connections(1) // in memory db might drop connection when 0
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(&database.url)
            .await?;

        Self::create_schema(&pool, &schema(), database.clean_start).await?;

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_schema(pool: &SqlitePool, tables: &[Box<dyn Table>], clean_start: bool) -> Result<(), Error> {
        if clean_start {
            for table in tables.iter().rev() {
                sqlx::query(&table.dispose()).execute(pool).await?;
            }

            tracing::warn!("perform a clean boot: dropped persisted curtain state");
        }

        for table in tables {
            sqlx::query(&table.create()).execute(pool).await?;
            tracing::debug!("table `{}` ready", table.name());
        }

        Ok(())
    }
}

fn schema() -> Vec<Box<dyn Table>> {
    vec![Box::new(CurtainStateTable)]
}
