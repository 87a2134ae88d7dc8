use async_trait::async_trait;

use crate::errors::{Error, Result};
use crate::geo::Coordinates;
use crate::officers::{NewOfficer, Officer, OfficerStatus};

/// Storage contract for officer accounts. Reads are synchronous;
/// writes go through the storage crate's serialized writer and are
/// therefore async.
#[async_trait]
pub trait OfficerRepositoryTrait: Send + Sync {
    fn find_by_id(&self, id: &str) -> Result<Option<Officer>>;
    fn find_by_code(&self, officer_code: &str) -> Result<Option<Officer>>;
    fn find_by_email(&self, email: &str) -> Result<Option<Officer>>;
    fn list_by_ids(&self, ids: &[String]) -> Result<Vec<Officer>>;
    fn count_active(&self) -> Result<i64>;
    fn count_with_status(&self, status: OfficerStatus) -> Result<i64>;

    async fn insert(&self, new_officer: NewOfficer) -> Result<Officer>;
    async fn set_status(&self, id: &str, status: OfficerStatus) -> Result<Officer>;
    async fn set_status_and_location(
        &self,
        id: &str,
        status: OfficerStatus,
        location: Option<Coordinates>,
    ) -> Result<Officer>;
    async fn set_location(&self, id: &str, location: Coordinates) -> Result<Officer>;
    async fn delete_all(&self) -> Result<usize>;
}

/// Look up an officer by force-issued code, requiring the account to
/// still be active. Deactivated accounts behave as if they never
/// existed.
pub fn require_active(
    repository: &dyn OfficerRepositoryTrait,
    officer_code: &str,
) -> Result<Officer> {
    repository
        .find_by_code(officer_code)?
        .filter(|officer| officer.is_active)
        .ok_or_else(|| Error::not_found("Officer not found or inactive"))
}
