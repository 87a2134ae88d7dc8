use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::{info, warn};
use serde_json::json;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::duties::{
    evaluate, CheckoutDecision, CreatedAssignment, Duty, DutyHours, DutyRepositoryTrait,
    DutyStatus, DutyWithOfficer, GeofenceConfig, GeofenceState, HoursToday,
    LocationUpdateOutcome, NewDuty, RosterOutcome, RosterRow, DEFAULT_ASSIGNED_LOCATION,
    DEFAULT_BANDOBAST_NAME, DEFAULT_POST, DEFAULT_SECTOR, DEFAULT_SHIFT, DEFAULT_ZONE,
};
use crate::errors::{Error, Result};
use crate::events::{
    BroadcastEvent, Broadcaster, NoOpBroadcaster, CHECKOUT_APPROVED, CHECKOUT_DENIED,
    NEW_CHECKOUT_REQUEST, OFFICER_GEOFENCE_ENTER, OFFICER_GEOFENCE_EXIT,
    OFFICER_LOCATION_UPDATED, OFFICER_WENT_OFF_DUTY, SUPERVISOR_GEOFENCE_ALERT,
};
use crate::geo::Coordinates;
use crate::notifications::{NotificationServiceTrait, KIND_DUTY_CANCELLED, KIND_NEW_DUTY};
use crate::officers::{
    require_active, Officer, OfficerRepositoryTrait, OfficerRole, OfficerStatus,
};

/// Duty lifecycle operations and live tracking.
#[async_trait]
pub trait DutyServiceTrait: Send + Sync {
    /// Activate the officer's most recent `Assigned` duty.
    async fn clock_in(&self, officer_code: &str) -> Result<DutyWithOfficer>;
    /// Complete the officer's `Active` duty directly.
    async fn clock_out(&self, officer_code: &str) -> Result<DutyWithOfficer>;
    /// Ask a supervisor to approve ending the officer's `Active` duty.
    async fn request_checkout(&self, officer_code: &str) -> Result<DutyWithOfficer>;
    /// Supervisor verdict on a `CheckoutPending` duty.
    async fn respond_to_checkout(
        &self,
        duty_id: &str,
        decision: CheckoutDecision,
        reason: Option<String>,
    ) -> Result<DutyWithOfficer>;
    /// Supervisor withdraws an `Assigned` duty before clock-in.
    async fn cancel(
        &self,
        duty_id: &str,
        supervisor_code: &str,
        reason: Option<String>,
    ) -> Result<DutyWithOfficer>;
    /// Accept a location ping from an on-duty officer and run the
    /// geofence check.
    async fn update_location(
        &self,
        officer_code: &str,
        lat: f64,
        lon: f64,
    ) -> Result<LocationUpdateOutcome>;
    /// Create one `Assigned` duty per resolvable roster row.
    async fn ingest_roster(
        &self,
        supervisor_code: &str,
        rows: Vec<RosterRow>,
    ) -> Result<RosterOutcome>;

    fn my_duties(&self, officer_code: &str) -> Result<Vec<Duty>>;
    fn recent_duties(&self) -> Result<Vec<DutyWithOfficer>>;
    fn pending_checkout_requests(&self) -> Result<Vec<DutyWithOfficer>>;
    fn on_duty_officers(&self, supervisor_code: &str) -> Result<Vec<Officer>>;
    fn hours_today(&self, officer_code: &str) -> Result<HoursToday>;
}

/// One async mutex per officer code. Transitions for the same officer
/// run one at a time; different officers proceed in parallel.
#[derive(Default)]
struct OfficerLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl OfficerLocks {
    async fn acquire(&self, officer_code: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut map = self.inner.lock().await;
            Arc::clone(map.entry(officer_code.to_string()).or_default())
        };
        slot.lock_owned().await
    }
}

const DUTY_HISTORY_LIMIT: i64 = 20;
const RECENT_DUTIES_LIMIT: i64 = 20;

#[derive(Clone)]
pub struct DutyService {
    duty_repository: Arc<dyn DutyRepositoryTrait>,
    officer_repository: Arc<dyn OfficerRepositoryTrait>,
    notification_service: Arc<dyn NotificationServiceTrait>,
    broadcaster: Arc<dyn Broadcaster>,
    geofence: GeofenceConfig,
    officer_locks: Arc<OfficerLocks>,
}

impl DutyService {
    pub fn new(
        duty_repository: Arc<dyn DutyRepositoryTrait>,
        officer_repository: Arc<dyn OfficerRepositoryTrait>,
        notification_service: Arc<dyn NotificationServiceTrait>,
    ) -> Self {
        Self {
            duty_repository,
            officer_repository,
            notification_service,
            broadcaster: Arc::new(NoOpBroadcaster),
            geofence: GeofenceConfig::default(),
            officer_locks: Arc::new(OfficerLocks::default()),
        }
    }

    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    pub fn with_geofence(mut self, geofence: GeofenceConfig) -> Self {
        self.geofence = geofence;
        self
    }

    fn find_duty(&self, duty_id: &str) -> Result<Duty> {
        Uuid::parse_str(duty_id).map_err(|_| Error::validation("Invalid duty ID"))?;
        self.duty_repository
            .find_by_id(duty_id)?
            .ok_or_else(|| Error::not_found("Duty not found"))
    }

    fn require_supervisor(&self, officer_code: &str) -> Result<Officer> {
        self.officer_repository
            .find_by_code(officer_code)?
            .filter(|officer| officer.is_active && officer.role == OfficerRole::Supervisor)
            .ok_or_else(|| Error::not_found("Supervisor not found or invalid supervisor ID"))
    }

    /// Join duties with their officers' identity fields, dropping any
    /// duty whose officer row has vanished underneath it.
    fn join_officers(&self, duties: Vec<Duty>) -> Result<Vec<DutyWithOfficer>> {
        let mut ids: Vec<String> = duties.iter().map(|duty| duty.officer_id.clone()).collect();
        ids.sort();
        ids.dedup();
        let officers = self.officer_repository.list_by_ids(&ids)?;
        let by_id: HashMap<&str, &Officer> = officers
            .iter()
            .map(|officer| (officer.id.as_str(), officer))
            .collect();

        Ok(duties
            .into_iter()
            .filter_map(|duty| match by_id.get(duty.officer_id.as_str()) {
                Some(officer) => Some(DutyWithOfficer {
                    officer: officer.summary(),
                    duty,
                }),
                None => {
                    warn!(
                        "Duty {} references missing officer {}; skipping",
                        duty.id, duty.officer_id
                    );
                    None
                }
            })
            .collect())
    }
}

#[async_trait]
impl DutyServiceTrait for DutyService {
    async fn clock_in(&self, officer_code: &str) -> Result<DutyWithOfficer> {
        let _guard = self.officer_locks.acquire(officer_code).await;

        let officer = require_active(self.officer_repository.as_ref(), officer_code)?;

        if let Some(active) = self.duty_repository.find_active_for_officer(&officer.id)? {
            return Err(Error::conflict(format!(
                "Officer is already on active duty: {} in {}",
                active.post, active.zone
            )));
        }

        let Some(mut duty) = self
            .duty_repository
            .latest_assigned_for_officer(&officer.id)?
        else {
            return Err(Error::not_found("No assigned duty found for this officer"));
        };

        let now = Utc::now();
        duty.status = DutyStatus::Active;
        duty.check_in_time = Some(now);
        duty.check_out_time = None;
        duty.is_outside_geofence = false;
        duty.time_outside_geofence_in_seconds = 0;
        duty.geofence_alert_raised = false;
        duty.last_location_timestamp = Some(now);
        let duty = self.duty_repository.update(duty).await?;

        let officer = self
            .officer_repository
            .set_status(&officer.id, OfficerStatus::OnDuty)
            .await?;

        info!(
            "Officer {} clocked in to {} at {}",
            officer.officer_id, duty.bandobast_name, duty.post
        );
        Ok(DutyWithOfficer {
            officer: officer.summary(),
            duty,
        })
    }

    async fn clock_out(&self, officer_code: &str) -> Result<DutyWithOfficer> {
        let _guard = self.officer_locks.acquire(officer_code).await;

        let officer = require_active(self.officer_repository.as_ref(), officer_code)?;

        let Some(mut duty) = self.duty_repository.find_active_for_officer(&officer.id)? else {
            return Err(Error::not_found("No active duty found for this officer"));
        };

        duty.status = DutyStatus::Completed;
        duty.check_out_time = Some(Utc::now());
        let duty = self.duty_repository.update(duty).await?;

        let officer = self
            .officer_repository
            .set_status_and_location(&officer.id, OfficerStatus::OffDuty, None)
            .await?;

        self.broadcaster.publish(BroadcastEvent::broadcast(
            OFFICER_WENT_OFF_DUTY,
            json!({ "officerId": officer.officer_id }),
        ));

        info!("Officer {} clocked out of {}", officer.officer_id, duty.bandobast_name);
        Ok(DutyWithOfficer {
            officer: officer.summary(),
            duty,
        })
    }

    async fn request_checkout(&self, officer_code: &str) -> Result<DutyWithOfficer> {
        let _guard = self.officer_locks.acquire(officer_code).await;

        let officer = self
            .officer_repository
            .find_by_code(officer_code)?
            .ok_or_else(|| Error::not_found("Officer not found"))?;

        let Some(mut duty) = self.duty_repository.find_active_for_officer(&officer.id)? else {
            return Err(Error::not_found("No active duty found for this officer"));
        };

        duty.status = DutyStatus::CheckoutPending;
        let duty = self.duty_repository.update(duty).await?;

        self.broadcaster.publish(BroadcastEvent::broadcast(
            NEW_CHECKOUT_REQUEST,
            json!({
                "dutyId": duty.id,
                "officerId": officer.officer_id,
                "officerName": officer.name,
                "officerRank": officer.rank,
                "dutyDetails": {
                    "bandobastName": duty.bandobast_name,
                    "sector": duty.sector,
                    "zone": duty.zone,
                    "post": duty.post,
                    "checkInTime": duty.check_in_time,
                    "status": duty.status,
                },
                "requestedAt": duty.updated_at,
            }),
        ));

        info!("Officer {} requested checkout from {}", officer.officer_id, duty.post);
        Ok(DutyWithOfficer {
            officer: officer.summary(),
            duty,
        })
    }

    async fn respond_to_checkout(
        &self,
        duty_id: &str,
        decision: CheckoutDecision,
        reason: Option<String>,
    ) -> Result<DutyWithOfficer> {
        let duty = self.find_duty(duty_id)?;
        let officer = self
            .officer_repository
            .find_by_id(&duty.officer_id)?
            .ok_or_else(|| Error::not_found("Officer not found"))?;

        let _guard = self.officer_locks.acquire(&officer.officer_id).await;

        // Re-read now that we hold the officer's lock; the duty may
        // have moved on while we were waiting.
        let mut duty = self.find_duty(duty_id)?;
        if duty.status != DutyStatus::CheckoutPending {
            return Err(Error::validation("Duty is not in checkout pending status"));
        }

        match decision {
            CheckoutDecision::Approved => {
                duty.status = DutyStatus::Completed;
                duty.check_out_time = Some(Utc::now());
                let duty = self.duty_repository.update(duty).await?;

                let officer = self
                    .officer_repository
                    .set_status_and_location(&officer.id, OfficerStatus::OffDuty, None)
                    .await?;

                self.broadcaster.publish(BroadcastEvent::to_officer(
                    CHECKOUT_APPROVED,
                    &officer.officer_id,
                    json!({
                        "dutyId": duty.id,
                        "officerId": officer.officer_id,
                        "officerName": officer.name,
                        "dutyDetails": {
                            "bandobastName": duty.bandobast_name,
                            "sector": duty.sector,
                            "zone": duty.zone,
                            "post": duty.post,
                            "checkOutTime": duty.check_out_time,
                        },
                        "approvedAt": duty.updated_at,
                    }),
                ));

                info!("Checkout approved for officer {} on duty {}", officer.officer_id, duty.id);
                Ok(DutyWithOfficer {
                    officer: officer.summary(),
                    duty,
                })
            }
            CheckoutDecision::Denied => {
                duty.status = DutyStatus::Active;
                let duty = self.duty_repository.update(duty).await?;

                let reason = reason
                    .filter(|text| !text.trim().is_empty())
                    .unwrap_or_else(|| "No reason provided".to_string());

                self.broadcaster.publish(BroadcastEvent::to_officer(
                    CHECKOUT_DENIED,
                    &officer.officer_id,
                    json!({
                        "dutyId": duty.id,
                        "officerId": officer.officer_id,
                        "officerName": officer.name,
                        "reason": reason,
                        "deniedAt": duty.updated_at,
                    }),
                ));

                info!("Checkout denied for officer {} on duty {}", officer.officer_id, duty.id);
                Ok(DutyWithOfficer {
                    officer: officer.summary(),
                    duty,
                })
            }
        }
    }

    async fn cancel(
        &self,
        duty_id: &str,
        supervisor_code: &str,
        reason: Option<String>,
    ) -> Result<DutyWithOfficer> {
        let supervisor = self.require_supervisor(supervisor_code)?;
        let duty = self.find_duty(duty_id)?;
        let officer = self
            .officer_repository
            .find_by_id(&duty.officer_id)?
            .ok_or_else(|| Error::not_found("Officer not found"))?;

        let _guard = self.officer_locks.acquire(&officer.officer_id).await;

        let mut duty = self.find_duty(duty_id)?;
        if duty.status != DutyStatus::Assigned {
            return Err(Error::validation("Only assigned duties can be cancelled"));
        }

        duty.status = DutyStatus::Cancelled;
        let duty = self.duty_repository.update(duty).await?;

        let message = match reason.filter(|text| !text.trim().is_empty()) {
            Some(reason) => format!(
                "Duty cancelled: {} in {} ({})",
                duty.post, duty.zone, reason
            ),
            None => format!("Duty cancelled: {} in {}", duty.post, duty.zone),
        };
        if let Err(err) = self
            .notification_service
            .notify(&officer, KIND_DUTY_CANCELLED, &message)
            .await
        {
            warn!(
                "Failed to notify officer {} about cancelled duty {}: {}",
                officer.officer_id, duty.id, err
            );
        }

        info!(
            "Supervisor {} cancelled duty {} for officer {}",
            supervisor.officer_id, duty.id, officer.officer_id
        );
        Ok(DutyWithOfficer {
            officer: officer.summary(),
            duty,
        })
    }

    async fn update_location(
        &self,
        officer_code: &str,
        lat: f64,
        lon: f64,
    ) -> Result<LocationUpdateOutcome> {
        let location =
            Coordinates::validated(lat, lon).map_err(|err| Error::validation(err.to_string()))?;

        let _guard = self.officer_locks.acquire(officer_code).await;

        let officer = require_active(self.officer_repository.as_ref(), officer_code)?;
        if officer.current_status != OfficerStatus::OnDuty {
            return Err(Error::forbidden("Officer is not currently on duty"));
        }

        let Some(mut duty) = self.duty_repository.find_active_for_officer(&officer.id)? else {
            return Err(Error::not_found("No active duty found for this officer"));
        };

        let now = Utc::now();
        let elapsed_seconds = duty
            .last_location_timestamp
            .map(|last| (now - last).num_seconds())
            .unwrap_or(0);

        let check = evaluate(
            &self.geofence,
            duty.assigned_location,
            location,
            GeofenceState {
                is_outside: duty.is_outside_geofence,
                alert_raised: duty.geofence_alert_raised,
                seconds_outside: duty.time_outside_geofence_in_seconds,
            },
            elapsed_seconds,
        );

        duty.current_location = Some(location);
        duty.last_location_timestamp = Some(now);
        duty.is_outside_geofence = check.state.is_outside;
        duty.time_outside_geofence_in_seconds = check.state.seconds_outside;
        duty.geofence_alert_raised = check.state.alert_raised;
        let duty = self.duty_repository.update(duty).await?;

        let officer = self
            .officer_repository
            .set_location(&officer.id, location)
            .await?;

        let rounded_distance = check.distance_meters.round() as i64;
        if check.exited {
            warn!(
                "Officer {} left geofence for {} ({}m from post)",
                officer.officer_id, duty.post, rounded_distance
            );
            self.broadcaster.publish(BroadcastEvent::broadcast(
                OFFICER_GEOFENCE_EXIT,
                json!({
                    "officerId": officer.officer_id,
                    "officerName": officer.name,
                    "distance": rounded_distance,
                    "location": location,
                }),
            ));
        }
        if check.entered {
            info!(
                "Officer {} returned inside geofence for {}",
                officer.officer_id, duty.post
            );
            self.broadcaster.publish(BroadcastEvent::broadcast(
                OFFICER_GEOFENCE_ENTER,
                json!({
                    "officerId": officer.officer_id,
                    "officerName": officer.name,
                    "distance": rounded_distance,
                    "location": location,
                }),
            ));
        }
        if check.raise_alert {
            warn!(
                "Officer {} outside geofence for {}s; raising supervisor alert",
                officer.officer_id, check.state.seconds_outside
            );
            self.broadcaster.publish(BroadcastEvent::broadcast(
                SUPERVISOR_GEOFENCE_ALERT,
                json!({
                    "officerId": officer.officer_id,
                    "officerName": officer.name,
                    "rank": officer.rank,
                    "homePoliceStation": officer.home_police_station,
                    "dutyName": duty.bandobast_name,
                    "sector": duty.sector,
                    "zone": duty.zone,
                    "post": duty.post,
                    "timeOutsideGeofence": check.state.seconds_outside,
                    "distance": rounded_distance,
                    "location": location,
                    "timestamp": now,
                }),
            ));
        }

        self.broadcaster.publish(BroadcastEvent::broadcast(
            OFFICER_LOCATION_UPDATED,
            json!({
                "officerId": officer.officer_id,
                "location": location,
            }),
        ));

        Ok(LocationUpdateOutcome {
            officer,
            duty,
            distance_from_post_meters: check.distance_meters,
            timestamp: now,
        })
    }

    async fn ingest_roster(
        &self,
        supervisor_code: &str,
        rows: Vec<RosterRow>,
    ) -> Result<RosterOutcome> {
        let supervisor = self.require_supervisor(supervisor_code)?;

        let mut outcome = RosterOutcome {
            total_rows: rows.len(),
            ..Default::default()
        };

        for row in rows {
            let code = row.officer_code.trim();
            if code.is_empty() {
                continue;
            }

            let Some(officer) = self.officer_repository.find_by_code(code)? else {
                warn!("Roster row references unknown officer {}", code);
                outcome.unfound_officer_ids.push(code.to_string());
                continue;
            };

            let assigned_location = match (row.latitude, row.longitude) {
                (Some(lat), Some(lon)) => {
                    Coordinates::validated(lat, lon).unwrap_or(DEFAULT_ASSIGNED_LOCATION)
                }
                _ => DEFAULT_ASSIGNED_LOCATION,
            };

            let duty = self
                .duty_repository
                .insert(NewDuty {
                    officer_id: officer.id.clone(),
                    assigned_by: Some(supervisor.id.clone()),
                    bandobast_name: row
                        .duty_name
                        .unwrap_or_else(|| DEFAULT_BANDOBAST_NAME.to_string()),
                    sector: row.sector.unwrap_or_else(|| DEFAULT_SECTOR.to_string()),
                    zone: row.zone.unwrap_or_else(|| DEFAULT_ZONE.to_string()),
                    post: row.post.unwrap_or_else(|| DEFAULT_POST.to_string()),
                    duty_date: row
                        .duty_date
                        .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string()),
                    shift: row.shift.unwrap_or_else(|| DEFAULT_SHIFT.to_string()),
                    description: row.description.unwrap_or_default(),
                    assigned_location,
                })
                .await?;

            let message = format!("New duty assigned: {} in {}", duty.post, duty.zone);
            if let Err(err) = self
                .notification_service
                .notify(&officer, KIND_NEW_DUTY, &message)
                .await
            {
                warn!(
                    "Failed to create assignment notification for {}: {}",
                    officer.officer_id, err
                );
            }

            outcome.created_duties.push(CreatedAssignment {
                duty_id: duty.id.clone(),
                officer_id: officer.officer_id.clone(),
                officer_name: officer.name.clone(),
                bandobast_name: duty.bandobast_name.clone(),
                sector: duty.sector.clone(),
                zone: duty.zone.clone(),
                post: duty.post.clone(),
                duty_date: duty.duty_date.clone(),
                shift: duty.shift.clone(),
            });
            outcome.successful_assignments += 1;
        }

        info!(
            "Roster ingested by {}: {} of {} rows assigned, {} unknown officers",
            supervisor.officer_id,
            outcome.successful_assignments,
            outcome.total_rows,
            outcome.unfound_officer_ids.len()
        );
        Ok(outcome)
    }

    fn my_duties(&self, officer_code: &str) -> Result<Vec<Duty>> {
        let officer = self
            .officer_repository
            .find_by_code(officer_code)?
            .ok_or_else(|| Error::not_found("Officer not found"))?;
        self.duty_repository
            .list_for_officer(&officer.id, DUTY_HISTORY_LIMIT)
    }

    fn recent_duties(&self) -> Result<Vec<DutyWithOfficer>> {
        let duties = self.duty_repository.list_recent(RECENT_DUTIES_LIMIT)?;
        self.join_officers(duties)
    }

    fn pending_checkout_requests(&self) -> Result<Vec<DutyWithOfficer>> {
        let duties = self
            .duty_repository
            .list_with_status(DutyStatus::CheckoutPending)?;
        self.join_officers(duties)
    }

    fn on_duty_officers(&self, supervisor_code: &str) -> Result<Vec<Officer>> {
        let supervisor = self.require_supervisor(supervisor_code)?;
        let duties = self
            .duty_repository
            .list_active_assigned_by(&supervisor.id)?;

        let mut ids: Vec<String> = duties.into_iter().map(|duty| duty.officer_id).collect();
        ids.sort();
        ids.dedup();

        let officers = self.officer_repository.list_by_ids(&ids)?;
        Ok(officers
            .into_iter()
            .filter(|officer| officer.current_status == OfficerStatus::OnDuty)
            .collect())
    }

    fn hours_today(&self, officer_code: &str) -> Result<HoursToday> {
        let officer = self
            .officer_repository
            .find_by_code(officer_code)?
            .ok_or_else(|| Error::not_found("Officer not found"))?;

        let now = Utc::now();
        let since = now - Duration::hours(24);
        let duties = self.duty_repository.list_created_since(&officer.id, since)?;

        let mut entries = Vec::new();
        let mut total_duration_ms: i64 = 0;
        for duty in &duties {
            let Some(check_in) = duty.check_in_time else {
                continue;
            };
            // Running duties count up to the moment of the query.
            let end = duty.check_out_time.unwrap_or(now);
            let duration_ms = (end - check_in).num_milliseconds();
            if duration_ms <= 0 {
                continue;
            }
            total_duration_ms += duration_ms;
            entries.push(DutyHours {
                duty_id: duty.id.clone(),
                post: duty.post.clone(),
                zone: duty.zone.clone(),
                status: duty.status,
                check_in_time: check_in,
                check_out_time: duty.check_out_time,
                duration_ms,
                duration_hours: round_to_hundredth(duration_ms as f64 / 3_600_000.0),
            });
        }

        let total_hours = total_duration_ms as f64 / 3_600_000.0;
        Ok(HoursToday {
            officer_id: officer.officer_id,
            officer_name: officer.name,
            time_from: since,
            time_to: now,
            total_hours: (total_hours * 2.0).round() / 2.0,
            total_hours_raw: round_to_hundredth(total_hours),
            total_duration_ms,
            duties_count: duties.len(),
            duties: entries,
        })
    }
}

fn round_to_hundredth(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
