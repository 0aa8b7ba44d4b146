use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::Table;

/// Last known position of a curtain, keyed by its configured name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CurtainStateRecord {
    pub name: String,
    /// Estimated position in a range of [0, 100].
    pub position: i64,
    pub last_manual_update: Option<OffsetDateTime>,
    pub updated_at: OffsetDateTime,
}

pub struct CurtainStateTable;

impl Table for CurtainStateTable {
    fn name(&self) -> &'static str {
        "curtain_states"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS curtain_states (
                name TEXT PRIMARY KEY,
                position INTEGER NOT NULL CHECK (position BETWEEN 0 AND 100),
                last_manual_update TEXT,
                updated_at TEXT NOT NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS curtain_states;")
    }
}
