use crate::error::CheckpointError;
use chrono::{DateTime, Utc};
use model::pagination::cursor::Cursor;
use serde::{Deserialize, Serialize};

/// Who a checkpoint belongs to.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SourceIdentity {
    pub source_name: String,
    pub url: String,
    pub table: String,
    pub columns_to_select: String,
    pub incremental_column: Option<String>,
}

impl SourceIdentity {
    /// Refuses to resume a cursor recorded for a different source.
    pub fn verify(&self, stored: &SourceIdentity) -> Result<(), CheckpointError> {
        let checks = [
            ("source_name", &stored.source_name, &self.source_name),
            ("url", &stored.url, &self.url),
            ("table", &stored.table, &self.table),
        ];

        for (field, stored, configured) in checks {
            if stored != configured {
                return Err(CheckpointError::IdentityMismatch {
                    field,
                    stored: stored.clone(),
                    configured: configured.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Checkpoint {
    #[serde(flatten)]
    pub identity: SourceIdentity,
    pub last_value: Cursor,
    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(identity: SourceIdentity, last_value: Cursor) -> Self {
        Self {
            identity,
            last_value,
            updated_at: Utc::now(),
        }
    }
}
