use async_trait::async_trait;

use crate::alerts::{NewPanicAlert, PanicAlert};
use crate::errors::Result;

/// Storage contract for panic alerts.
#[async_trait]
pub trait PanicAlertRepositoryTrait: Send + Sync {
    fn find_by_id(&self, id: &str) -> Result<Option<PanicAlert>>;
    /// The officer's `Active` alert, if one exists.
    fn find_active_for_officer(&self, officer_id: &str) -> Result<Option<PanicAlert>>;
    /// All `Active` alerts, newest first.
    fn list_active(&self) -> Result<Vec<PanicAlert>>;

    async fn insert(&self, new_alert: NewPanicAlert) -> Result<PanicAlert>;
    /// Mark the alert acknowledged and record who did it.
    async fn acknowledge(&self, id: &str, acknowledged_by: Option<&str>) -> Result<PanicAlert>;
    async fn delete_all(&self) -> Result<usize>;
}
