//! In-memory repository fakes and fixtures shared by the service
//! tests. Ordering mirrors the SQL backend: creation-time descending
//! with insertion order breaking ties.

use std::collections::BTreeSet;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::alerts::{NewPanicAlert, PanicAlert, PanicAlertRepositoryTrait, PanicAlertStatus};
use crate::duties::{Duty, DutyRepositoryTrait, DutyStatus, NewDuty};
use crate::errors::{Error, Result};
use crate::events::{BroadcastEvent, Broadcaster};
use crate::geo::Coordinates;
use crate::notifications::{NewNotification, Notification, NotificationRepositoryTrait};
use crate::officers::{
    NewOfficer, Officer, OfficerRepositoryTrait, OfficerRole, OfficerStatus, Rank,
};

// ────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────

pub(crate) fn officer_fixture(code: &str) -> Officer {
    let now = Utc::now();
    Officer {
        id: Uuid::new_v4().to_string(),
        officer_id: code.to_string(),
        name: format!("Officer {code}"),
        email: format!("{}@police.gov.in", code.to_lowercase()),
        password_hash: String::new(),
        rank: Rank::Pc,
        role: OfficerRole::Officer,
        home_police_station: "Panaji Police Station".to_string(),
        current_status: OfficerStatus::OffDuty,
        is_active: true,
        current_location: None,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn supervisor_fixture(code: &str) -> Officer {
    let mut officer = officer_fixture(code);
    officer.name = format!("Supervisor {code}");
    officer.rank = Rank::Pi;
    officer.role = OfficerRole::Supervisor;
    officer
}

pub(crate) fn duty_fixture(officer_id: &str, status: DutyStatus) -> Duty {
    let now = Utc::now();
    Duty {
        id: Uuid::new_v4().to_string(),
        officer_id: officer_id.to_string(),
        assigned_by: None,
        bandobast_name: "Ganesh Chaturthi Bandobast".to_string(),
        sector: "Sector 1".to_string(),
        zone: "Zone A".to_string(),
        post: "Post 3".to_string(),
        duty_date: "2026-08-26".to_string(),
        shift: "Morning".to_string(),
        description: String::new(),
        status,
        assigned_location: Coordinates::new(15.4989, 73.8278),
        current_location: None,
        check_in_time: None,
        check_out_time: None,
        is_outside_geofence: false,
        time_outside_geofence_in_seconds: 0,
        geofence_alert_raised: false,
        last_location_timestamp: None,
        created_at: now,
        updated_at: now,
    }
}

// ────────────────────────────────────────────────────────────────────
// Broadcast capture
// ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct CapturingBroadcaster {
    events: Mutex<Vec<BroadcastEvent>>,
}

impl CapturingBroadcaster {
    pub(crate) fn events(&self) -> Vec<BroadcastEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .map(|event| event.name)
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Broadcaster for CapturingBroadcaster {
    fn publish(&self, event: BroadcastEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn sorted_desc_by<T: Clone, K: Ord>(rows: &[T], key: impl Fn(&T) -> K) -> Vec<T> {
    let mut indexed: Vec<(usize, &T)> = rows.iter().enumerate().collect();
    indexed.sort_by(|a, b| key(b.1).cmp(&key(a.1)).then(b.0.cmp(&a.0)));
    indexed.into_iter().map(|(_, row)| row.clone()).collect()
}

// ────────────────────────────────────────────────────────────────────
// Officers
// ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct InMemoryOfficerRepository {
    rows: RwLock<Vec<Officer>>,
}

impl InMemoryOfficerRepository {
    /// Store an officer as-is, bypassing insert defaults.
    pub(crate) fn seed(&self, officer: Officer) -> Officer {
        self.rows.write().unwrap().push(officer.clone());
        officer
    }

    pub(crate) fn deactivate(&self, officer_code: &str) {
        let mut rows = self.rows.write().unwrap();
        if let Some(officer) = rows
            .iter_mut()
            .find(|officer| officer.officer_id == officer_code)
        {
            officer.is_active = false;
        }
    }

    fn mutate(&self, id: &str, apply: impl FnOnce(&mut Officer)) -> Result<Officer> {
        let mut rows = self.rows.write().unwrap();
        let officer = rows
            .iter_mut()
            .find(|officer| officer.id == id)
            .ok_or_else(|| Error::not_found("Officer not found"))?;
        apply(officer);
        officer.updated_at = Utc::now();
        Ok(officer.clone())
    }
}

#[async_trait]
impl OfficerRepositoryTrait for InMemoryOfficerRepository {
    fn find_by_id(&self, id: &str) -> Result<Option<Officer>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .find(|officer| officer.id == id)
            .cloned())
    }

    fn find_by_code(&self, officer_code: &str) -> Result<Option<Officer>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .find(|officer| officer.officer_id == officer_code)
            .cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Officer>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .find(|officer| officer.email == email)
            .cloned())
    }

    fn list_by_ids(&self, ids: &[String]) -> Result<Vec<Officer>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .filter(|officer| ids.contains(&officer.id))
            .cloned()
            .collect())
    }

    fn count_active(&self) -> Result<i64> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .filter(|officer| officer.is_active)
            .count() as i64)
    }

    fn count_with_status(&self, status: OfficerStatus) -> Result<i64> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .filter(|officer| officer.current_status == status)
            .count() as i64)
    }

    async fn insert(&self, new_officer: NewOfficer) -> Result<Officer> {
        let now = Utc::now();
        let officer = Officer {
            id: Uuid::new_v4().to_string(),
            officer_id: new_officer.officer_id,
            name: new_officer.name,
            email: new_officer.email,
            password_hash: new_officer.password_hash,
            rank: new_officer.rank,
            role: new_officer.role,
            home_police_station: new_officer.home_police_station,
            current_status: OfficerStatus::OffDuty,
            is_active: true,
            current_location: None,
            created_at: now,
            updated_at: now,
        };
        Ok(self.seed(officer))
    }

    async fn set_status(&self, id: &str, status: OfficerStatus) -> Result<Officer> {
        self.mutate(id, |officer| officer.current_status = status)
    }

    async fn set_status_and_location(
        &self,
        id: &str,
        status: OfficerStatus,
        location: Option<Coordinates>,
    ) -> Result<Officer> {
        self.mutate(id, |officer| {
            officer.current_status = status;
            officer.current_location = location;
        })
    }

    async fn set_location(&self, id: &str, location: Coordinates) -> Result<Officer> {
        self.mutate(id, |officer| officer.current_location = Some(location))
    }

    async fn delete_all(&self) -> Result<usize> {
        let mut rows = self.rows.write().unwrap();
        let removed = rows.len();
        rows.clear();
        Ok(removed)
    }
}

// ────────────────────────────────────────────────────────────────────
// Duties
// ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct InMemoryDutyRepository {
    rows: RwLock<Vec<Duty>>,
}

impl InMemoryDutyRepository {
    pub(crate) fn seed(&self, duty: Duty) -> Duty {
        self.rows.write().unwrap().push(duty.clone());
        duty
    }

    /// Shift the duty's last ping into the past to simulate elapsed
    /// dwell time between location updates.
    pub(crate) fn backdate_last_ping(&self, duty_id: &str, by: Duration) {
        let mut rows = self.rows.write().unwrap();
        if let Some(duty) = rows.iter_mut().find(|duty| duty.id == duty_id) {
            duty.last_location_timestamp = duty
                .last_location_timestamp
                .map(|timestamp| timestamp - by);
        }
    }
}

#[async_trait]
impl DutyRepositoryTrait for InMemoryDutyRepository {
    fn find_by_id(&self, id: &str) -> Result<Option<Duty>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .find(|duty| duty.id == id)
            .cloned())
    }

    fn find_active_for_officer(&self, officer_id: &str) -> Result<Option<Duty>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .find(|duty| duty.officer_id == officer_id && duty.status == DutyStatus::Active)
            .cloned())
    }

    fn find_current_for_officer(&self, officer_id: &str) -> Result<Option<Duty>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .find(|duty| {
                duty.officer_id == officer_id
                    && matches!(
                        duty.status,
                        DutyStatus::Active | DutyStatus::CheckoutPending
                    )
            })
            .cloned())
    }

    fn latest_assigned_for_officer(&self, officer_id: &str) -> Result<Option<Duty>> {
        let rows = self.rows.read().unwrap();
        let matching: Vec<Duty> = rows
            .iter()
            .filter(|duty| duty.officer_id == officer_id && duty.status == DutyStatus::Assigned)
            .cloned()
            .collect();
        Ok(sorted_desc_by(&matching, |duty| duty.created_at).into_iter().next())
    }

    fn list_for_officer(&self, officer_id: &str, limit: i64) -> Result<Vec<Duty>> {
        let rows = self.rows.read().unwrap();
        let matching: Vec<Duty> = rows
            .iter()
            .filter(|duty| duty.officer_id == officer_id)
            .cloned()
            .collect();
        let mut sorted = sorted_desc_by(&matching, |duty| duty.created_at);
        sorted.truncate(limit as usize);
        Ok(sorted)
    }

    fn list_recent(&self, limit: i64) -> Result<Vec<Duty>> {
        let rows = self.rows.read().unwrap();
        let mut sorted = sorted_desc_by(rows.as_slice(), |duty| duty.created_at);
        sorted.truncate(limit as usize);
        Ok(sorted)
    }

    fn list_with_status(&self, status: DutyStatus) -> Result<Vec<Duty>> {
        let rows = self.rows.read().unwrap();
        let matching: Vec<Duty> = rows
            .iter()
            .filter(|duty| duty.status == status)
            .cloned()
            .collect();
        Ok(sorted_desc_by(&matching, |duty| duty.updated_at))
    }

    fn list_active_assigned_by(&self, supervisor_id: &str) -> Result<Vec<Duty>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .filter(|duty| {
                duty.status == DutyStatus::Active
                    && duty.assigned_by.as_deref() == Some(supervisor_id)
            })
            .cloned()
            .collect())
    }

    fn list_created_since(&self, officer_id: &str, since: DateTime<Utc>) -> Result<Vec<Duty>> {
        let rows = self.rows.read().unwrap();
        let matching: Vec<Duty> = rows
            .iter()
            .filter(|duty| duty.officer_id == officer_id && duty.created_at >= since)
            .cloned()
            .collect();
        Ok(sorted_desc_by(&matching, |duty| duty.created_at))
    }

    fn list_all(&self) -> Result<Vec<Duty>> {
        Ok(self.rows.read().unwrap().clone())
    }

    fn distinct_sectors(&self) -> Result<Vec<String>> {
        let set: BTreeSet<String> = self
            .rows
            .read()
            .unwrap()
            .iter()
            .map(|duty| duty.sector.clone())
            .collect();
        Ok(set.into_iter().collect())
    }

    fn distinct_zones(&self) -> Result<Vec<String>> {
        let set: BTreeSet<String> = self
            .rows
            .read()
            .unwrap()
            .iter()
            .map(|duty| duty.zone.clone())
            .collect();
        Ok(set.into_iter().collect())
    }

    async fn insert(&self, new_duty: NewDuty) -> Result<Duty> {
        let now = Utc::now();
        let duty = Duty {
            id: Uuid::new_v4().to_string(),
            officer_id: new_duty.officer_id,
            assigned_by: new_duty.assigned_by,
            bandobast_name: new_duty.bandobast_name,
            sector: new_duty.sector,
            zone: new_duty.zone,
            post: new_duty.post,
            duty_date: new_duty.duty_date,
            shift: new_duty.shift,
            description: new_duty.description,
            status: DutyStatus::Assigned,
            assigned_location: new_duty.assigned_location,
            current_location: None,
            check_in_time: None,
            check_out_time: None,
            is_outside_geofence: false,
            time_outside_geofence_in_seconds: 0,
            geofence_alert_raised: false,
            last_location_timestamp: None,
            created_at: now,
            updated_at: now,
        };
        Ok(self.seed(duty))
    }

    async fn update(&self, mut duty: Duty) -> Result<Duty> {
        let mut rows = self.rows.write().unwrap();
        let slot = rows
            .iter_mut()
            .find(|row| row.id == duty.id)
            .ok_or_else(|| Error::not_found("Duty not found"))?;
        duty.updated_at = Utc::now();
        *slot = duty.clone();
        Ok(duty)
    }

    async fn delete_all(&self) -> Result<usize> {
        let mut rows = self.rows.write().unwrap();
        let removed = rows.len();
        rows.clear();
        Ok(removed)
    }
}

// ────────────────────────────────────────────────────────────────────
// Panic alerts
// ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct InMemoryPanicAlertRepository {
    rows: RwLock<Vec<PanicAlert>>,
}

#[async_trait]
impl PanicAlertRepositoryTrait for InMemoryPanicAlertRepository {
    fn find_by_id(&self, id: &str) -> Result<Option<PanicAlert>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .find(|alert| alert.id == id)
            .cloned())
    }

    fn find_active_for_officer(&self, officer_id: &str) -> Result<Option<PanicAlert>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .find(|alert| {
                alert.officer_id == officer_id && alert.status == PanicAlertStatus::Active
            })
            .cloned())
    }

    fn list_active(&self) -> Result<Vec<PanicAlert>> {
        let rows = self.rows.read().unwrap();
        let matching: Vec<PanicAlert> = rows
            .iter()
            .filter(|alert| alert.status == PanicAlertStatus::Active)
            .cloned()
            .collect();
        Ok(sorted_desc_by(&matching, |alert| alert.created_at))
    }

    async fn insert(&self, new_alert: NewPanicAlert) -> Result<PanicAlert> {
        let now = Utc::now();
        let alert = PanicAlert {
            id: Uuid::new_v4().to_string(),
            officer_id: new_alert.officer_id,
            location: new_alert.location,
            status: PanicAlertStatus::Active,
            acknowledged_by: None,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().unwrap().push(alert.clone());
        Ok(alert)
    }

    async fn acknowledge(&self, id: &str, acknowledged_by: Option<&str>) -> Result<PanicAlert> {
        let mut rows = self.rows.write().unwrap();
        let alert = rows
            .iter_mut()
            .find(|alert| alert.id == id)
            .ok_or_else(|| Error::not_found("Panic alert not found"))?;
        alert.status = PanicAlertStatus::Acknowledged;
        alert.acknowledged_by = acknowledged_by.map(|id| id.to_string());
        alert.updated_at = Utc::now();
        Ok(alert.clone())
    }

    async fn delete_all(&self) -> Result<usize> {
        let mut rows = self.rows.write().unwrap();
        let removed = rows.len();
        rows.clear();
        Ok(removed)
    }
}

// ────────────────────────────────────────────────────────────────────
// Notifications
// ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct InMemoryNotificationRepository {
    rows: RwLock<Vec<Notification>>,
}

#[async_trait]
impl NotificationRepositoryTrait for InMemoryNotificationRepository {
    fn list_for_recipient(&self, recipient_id: &str, limit: i64) -> Result<Vec<Notification>> {
        let rows = self.rows.read().unwrap();
        let matching: Vec<Notification> = rows
            .iter()
            .filter(|notification| notification.recipient_id == recipient_id)
            .cloned()
            .collect();
        let mut sorted = sorted_desc_by(&matching, |notification| notification.created_at);
        sorted.truncate(limit as usize);
        Ok(sorted)
    }

    async fn insert(&self, new_notification: NewNotification) -> Result<Notification> {
        let now = Utc::now();
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            recipient_id: new_notification.recipient_id,
            kind: new_notification.kind,
            message: new_notification.message,
            is_read: false,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().unwrap().push(notification.clone());
        Ok(notification)
    }

    async fn mark_all_read(&self, recipient_id: &str) -> Result<usize> {
        let mut rows = self.rows.write().unwrap();
        let mut changed = 0;
        for notification in rows
            .iter_mut()
            .filter(|notification| notification.recipient_id == recipient_id)
        {
            if !notification.is_read {
                notification.is_read = true;
                notification.updated_at = Utc::now();
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete_all(&self) -> Result<usize> {
        let mut rows = self.rows.write().unwrap();
        let removed = rows.len();
        rows.clear();
        Ok(removed)
    }
}
