use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::duties::{Duty, DutyStatus, NewDuty};
use crate::errors::Result;

/// Storage contract for duty assignments.
///
/// "Active" follow-the-officer lookups also match `CheckoutPending`
/// where noted, because a pending checkout is still a running duty.
#[async_trait]
pub trait DutyRepositoryTrait: Send + Sync {
    fn find_by_id(&self, id: &str) -> Result<Option<Duty>>;
    /// The officer's `Active` duty, if any.
    fn find_active_for_officer(&self, officer_id: &str) -> Result<Option<Duty>>;
    /// The officer's running duty: `Active` or `CheckoutPending`.
    fn find_current_for_officer(&self, officer_id: &str) -> Result<Option<Duty>>;
    /// Most recently created `Assigned` duty for the officer.
    fn latest_assigned_for_officer(&self, officer_id: &str) -> Result<Option<Duty>>;
    /// Officer's duty history, newest first.
    fn list_for_officer(&self, officer_id: &str, limit: i64) -> Result<Vec<Duty>>;
    /// Most recently created duties across all officers, newest first.
    fn list_recent(&self, limit: i64) -> Result<Vec<Duty>>;
    /// All duties in one status, most recently updated first.
    fn list_with_status(&self, status: DutyStatus) -> Result<Vec<Duty>>;
    /// `Active` duties created by one supervisor.
    fn list_active_assigned_by(&self, supervisor_id: &str) -> Result<Vec<Duty>>;
    /// Officer's duties created at or after `since`, newest first.
    fn list_created_since(&self, officer_id: &str, since: DateTime<Utc>) -> Result<Vec<Duty>>;
    fn list_all(&self) -> Result<Vec<Duty>>;
    fn distinct_sectors(&self) -> Result<Vec<String>>;
    fn distinct_zones(&self) -> Result<Vec<String>>;

    async fn insert(&self, new_duty: NewDuty) -> Result<Duty>;
    /// Persist every mutable field of `duty` and bump `updated_at`.
    async fn update(&self, duty: Duty) -> Result<Duty>;
    async fn delete_all(&self) -> Result<usize>;
}
