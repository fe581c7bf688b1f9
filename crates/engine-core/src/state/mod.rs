use crate::{
    error::CheckpointError,
    state::models::{Checkpoint, SourceIdentity},
};
use async_trait::async_trait;
use model::pagination::cursor::Cursor;
use std::sync::Arc;
use tracing::info;

pub mod models;
pub mod status_file;

#[async_trait]
pub trait StateStore: Send + Sync {
    /// Prepares the backing location. Called once before the first load.
    async fn prepare(&self) -> Result<(), CheckpointError>;

    async fn load_checkpoint(&self) -> Result<Option<Checkpoint>, CheckpointError>;

    /// Replaces the stored checkpoint. Must not leave a partial write behind.
    async fn save_checkpoint(&self, cp: &Checkpoint) -> Result<(), CheckpointError>;

    /// Human readable location, for logs.
    fn location(&self) -> String;
}

/// Binds a store to one source identity and its initial cursor.
#[derive(Clone)]
pub struct CheckpointManager {
    store: Arc<dyn StateStore>,
    identity: SourceIdentity,
    initial: Cursor,
}

impl CheckpointManager {
    pub fn new(store: Arc<dyn StateStore>, identity: SourceIdentity, initial: Cursor) -> Self {
        Self {
            store,
            identity,
            initial,
        }
    }

    pub fn identity(&self) -> &SourceIdentity {
        &self.identity
    }

    /// Returns the persisted cursor, seeding the store from the initial value
    /// when nothing has been recorded yet.
    pub async fn restore(&self) -> Result<Cursor, CheckpointError> {
        self.store.prepare().await?;

        if let Some(cp) = self.store.load_checkpoint().await? {
            self.identity.verify(&cp.identity)?;
            info!(
                location = %self.store.location(),
                cursor = %cp.last_value,
                "Resuming from checkpoint"
            );
            return Ok(cp.last_value);
        }

        self.commit(&self.initial).await?;
        info!(
            location = %self.store.location(),
            cursor = %self.initial,
            "Seeded new checkpoint"
        );
        Ok(self.initial.clone())
    }

    pub async fn commit(&self, cursor: &Cursor) -> Result<(), CheckpointError> {
        let cp = Checkpoint::new(self.identity.clone(), cursor.clone());
        self.store.save_checkpoint(&cp).await
    }
}
