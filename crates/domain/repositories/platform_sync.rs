use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::ingestion_jobs::SyncRequest;

/// Runs one platform sync. Any error is recorded on the job as its failure message.
#[async_trait]
#[automock]
pub trait PlatformSync {
    async fn sync(&self, request: SyncRequest) -> Result<()>;
}
