use std::sync::Arc;

use sqlx::Error;

use crate::configs::Storage;
use crate::models::CurtainStateRecord;

pub struct CurtainStateRepository {
    storage: Arc<Storage>,
}

impl CurtainStateRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl CurtainStateRepository {
    pub async fn upsert(&self, item: &CurtainStateRecord) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO curtain_states (name, position, last_manual_update, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO UPDATE
            SET position = excluded.position,
                last_manual_update = excluded.last_manual_update,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&item.name)
        .bind(item.position)
        .bind(item.last_manual_update)
        .bind(item.updated_at)
        .execute(self.storage.get_pool())
        .await?;

        Ok(())
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<CurtainStateRecord>, Error> {
        let record: Option<CurtainStateRecord> =
            sqlx::query_as("SELECT * FROM curtain_states WHERE name = $1")
                .bind(name)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::configs::Database;

    use super::*;

    async fn setup_repository() -> CurtainStateRepository {
        let database = Database {
            url: "sqlite::memory:".to_string(),
            clean_start: true,
        };
        let storage = Storage::new(&database).await.unwrap();

        CurtainStateRepository::new(Arc::new(storage))
    }

    fn record(position: i64) -> CurtainStateRecord {
        CurtainStateRecord {
            name: "Bedroom".to_string(),
            position,
            last_manual_update: None,
            updated_at: datetime!(2024-05-01 08:00 UTC),
        }
    }

    #[tokio::test]
    async fn test_find_missing() {
        let repository = setup_repository().await;

        assert!(repository.find_by_name("Bedroom").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let repository = setup_repository().await;

        repository.upsert(&record(40)).await.unwrap();

        let mut updated = record(75);
        updated.last_manual_update = Some(datetime!(2024-05-01 09:30 UTC));
        updated.updated_at = datetime!(2024-05-01 09:30 UTC);
        repository.upsert(&updated).await.unwrap();

        let found = repository.find_by_name("Bedroom").await.unwrap().unwrap();
        assert_eq!(found, updated);
    }

    #[tokio::test]
    async fn test_position_is_constrained() {
        let repository = setup_repository().await;

        assert!(repository.upsert(&record(101)).await.is_err());
    }
}
