use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};
use serde_json::json;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::alerts::{
    AlertDetails, NewPanicAlert, PanicAlert, PanicAlertRepositoryTrait, PanicAlertStatus,
    TriggeredAlert, DEFAULT_PANIC_LOCATION,
};
use crate::duties::DutyRepositoryTrait;
use crate::errors::{Error, Result};
use crate::events::{BroadcastEvent, Broadcaster, NoOpBroadcaster, PANIC_ALERT_TRIGGERED};
use crate::geo::Coordinates;
use crate::officers::{require_active, OfficerRepositoryTrait, OfficerRole, OfficerSummary};

/// Panic alert lifecycle.
#[async_trait]
pub trait AlertServiceTrait: Send + Sync {
    /// Raise an SOS for the officer. Returns the existing alert
    /// instead of creating a duplicate while one is still `Active`.
    async fn trigger_panic(
        &self,
        officer_code: &str,
        location: Option<Coordinates>,
    ) -> Result<TriggeredAlert>;
    /// Supervisor marks an alert as handled.
    async fn acknowledge(
        &self,
        alert_id: &str,
        supervisor_code: Option<&str>,
    ) -> Result<AcknowledgedAlert>;
    /// Every `Active` alert with officer and duty context.
    fn list_active(&self) -> Result<Vec<AlertDetails>>;
}

/// Acknowledgement receipt: the updated alert plus the identity of
/// the officer who raised it.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgedAlert {
    pub alert: PanicAlert,
    pub officer: OfficerSummary,
}

#[derive(Clone)]
pub struct AlertService {
    alert_repository: Arc<dyn PanicAlertRepositoryTrait>,
    officer_repository: Arc<dyn OfficerRepositoryTrait>,
    duty_repository: Arc<dyn DutyRepositoryTrait>,
    broadcaster: Arc<dyn Broadcaster>,
    /// Serializes trigger checks so a double-tap cannot slip two
    /// `Active` alerts past the dedup lookup.
    trigger_lock: Arc<Mutex<()>>,
}

impl AlertService {
    pub fn new(
        alert_repository: Arc<dyn PanicAlertRepositoryTrait>,
        officer_repository: Arc<dyn OfficerRepositoryTrait>,
        duty_repository: Arc<dyn DutyRepositoryTrait>,
    ) -> Self {
        Self {
            alert_repository,
            officer_repository,
            duty_repository,
            broadcaster: Arc::new(NoOpBroadcaster),
            trigger_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }
}

#[async_trait]
impl AlertServiceTrait for AlertService {
    async fn trigger_panic(
        &self,
        officer_code: &str,
        location: Option<Coordinates>,
    ) -> Result<TriggeredAlert> {
        let _guard = self.trigger_lock.lock().await;

        let officer = require_active(self.officer_repository.as_ref(), officer_code)?;
        let duty = self.duty_repository.find_current_for_officer(&officer.id)?;

        if let Some(existing) = self.alert_repository.find_active_for_officer(&officer.id)? {
            info!(
                "Panic alert already active for officer {}; returning alert {}",
                officer.officer_id, existing.id
            );
            return Ok(TriggeredAlert {
                details: AlertDetails {
                    alert: existing,
                    officer,
                    duty,
                },
                deduplicated: true,
            });
        }

        // Devices without a fix send no location (or an all-zero one);
        // both fall back to the default.
        let location = location
            .filter(|loc| loc.lat != 0.0 || loc.lon != 0.0)
            .and_then(|loc| Coordinates::validated(loc.lat, loc.lon).ok())
            .unwrap_or(DEFAULT_PANIC_LOCATION);

        let alert = self
            .alert_repository
            .insert(NewPanicAlert {
                officer_id: officer.id.clone(),
                location,
            })
            .await?;

        self.broadcaster.publish(BroadcastEvent::broadcast(
            PANIC_ALERT_TRIGGERED,
            json!({
                "alertId": alert.id,
                "officer": {
                    "officerId": officer.officer_id,
                    "name": officer.name,
                    "rank": officer.rank,
                    "homePoliceStation": officer.home_police_station,
                    "currentStatus": officer.current_status,
                    "email": officer.email,
                },
                "duty": duty.as_ref().map(|duty| json!({
                    "bandobastName": duty.bandobast_name,
                    "sector": duty.sector,
                    "zone": duty.zone,
                    "post": duty.post,
                    "status": duty.status,
                })),
                "location": alert.location,
                "status": alert.status,
                "acknowledgedBy": serde_json::Value::Null,
                "triggeredAt": alert.created_at,
                "priority": "HIGH",
            }),
        ));

        warn!(
            "Panic alert {} triggered by officer {} at ({}, {})",
            alert.id, officer.officer_id, location.lat, location.lon
        );
        Ok(TriggeredAlert {
            details: AlertDetails {
                alert,
                officer,
                duty,
            },
            deduplicated: false,
        })
    }

    async fn acknowledge(
        &self,
        alert_id: &str,
        supervisor_code: Option<&str>,
    ) -> Result<AcknowledgedAlert> {
        Uuid::parse_str(alert_id).map_err(|_| Error::validation("Invalid alert ID"))?;

        let alert = self
            .alert_repository
            .find_by_id(alert_id)?
            .ok_or_else(|| Error::not_found("Panic alert not found"))?;

        if alert.status == PanicAlertStatus::Acknowledged {
            return Err(Error::conflict("Alert has already been acknowledged"));
        }

        // An unknown or non-supervisor code still acknowledges, it
        // just leaves the attribution empty.
        let mut acknowledged_by = None;
        if let Some(code) = supervisor_code {
            if let Some(supervisor) = self.officer_repository.find_by_code(code)? {
                if supervisor.role == OfficerRole::Supervisor {
                    acknowledged_by = Some(supervisor.id);
                }
            }
        }

        let alert = self
            .alert_repository
            .acknowledge(&alert.id, acknowledged_by.as_deref())
            .await?;

        let officer = self
            .officer_repository
            .find_by_id(&alert.officer_id)?
            .ok_or_else(|| Error::not_found("Officer not found"))?;

        info!("Panic alert {} acknowledged", alert.id);
        Ok(AcknowledgedAlert {
            alert,
            officer: officer.summary(),
        })
    }

    fn list_active(&self) -> Result<Vec<AlertDetails>> {
        let alerts = self.alert_repository.list_active()?;

        let mut details = Vec::with_capacity(alerts.len());
        for alert in alerts {
            let Some(officer) = self.officer_repository.find_by_id(&alert.officer_id)? else {
                warn!(
                    "Panic alert {} references missing officer {}; skipping",
                    alert.id, alert.officer_id
                );
                continue;
            };
            let duty = self.duty_repository.find_current_for_officer(&officer.id)?;
            details.push(AlertDetails {
                alert,
                officer,
                duty,
            });
        }
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duties::DutyStatus;
    use crate::testing::{
        duty_fixture, officer_fixture, supervisor_fixture, CapturingBroadcaster,
        InMemoryDutyRepository, InMemoryOfficerRepository, InMemoryPanicAlertRepository,
    };

    struct Harness {
        service: AlertService,
        officers: Arc<InMemoryOfficerRepository>,
        duties: Arc<InMemoryDutyRepository>,
        broadcaster: Arc<CapturingBroadcaster>,
    }

    fn harness() -> Harness {
        let alerts = Arc::new(InMemoryPanicAlertRepository::default());
        let officers = Arc::new(InMemoryOfficerRepository::default());
        let duties = Arc::new(InMemoryDutyRepository::default());
        let broadcaster = Arc::new(CapturingBroadcaster::default());

        let service = AlertService::new(alerts, officers.clone(), duties.clone())
            .with_broadcaster(broadcaster.clone());

        Harness {
            service,
            officers,
            duties,
            broadcaster,
        }
    }

    #[tokio::test]
    async fn test_trigger_creates_an_alert_and_broadcasts_it() {
        let h = harness();
        let officer = h.officers.seed(officer_fixture("OFF003"));
        h.duties.seed(duty_fixture(&officer.id, DutyStatus::Active));

        let triggered = h
            .service
            .trigger_panic("OFF003", Some(Coordinates::new(15.4989, 73.8278)))
            .await
            .unwrap();

        assert!(!triggered.deduplicated);
        assert_eq!(triggered.details.alert.status, PanicAlertStatus::Active);
        assert_eq!(
            triggered.details.alert.location,
            Coordinates::new(15.4989, 73.8278)
        );
        assert!(triggered.details.duty.is_some());

        let events = h.broadcaster.events();
        let event = events
            .iter()
            .find(|event| event.name == PANIC_ALERT_TRIGGERED)
            .unwrap();
        assert!(!event.is_targeted());
        assert_eq!(event.payload["officer"]["officerId"], "OFF003");
        assert_eq!(event.payload["priority"], "HIGH");
        assert_eq!(event.payload["duty"]["post"], "Post 3");
    }

    #[tokio::test]
    async fn test_trigger_without_location_uses_the_goa_default() {
        let h = harness();
        h.officers.seed(officer_fixture("OFF003"));

        let triggered = h.service.trigger_panic("OFF003", None).await.unwrap();
        assert_eq!(triggered.details.alert.location, DEFAULT_PANIC_LOCATION);
        assert!(triggered.details.duty.is_none());

        // An all-zero fix means "no fix" on the wire.
        let h = harness();
        h.officers.seed(officer_fixture("OFF004"));
        let triggered = h
            .service
            .trigger_panic("OFF004", Some(Coordinates::new(0.0, 0.0)))
            .await
            .unwrap();
        assert_eq!(triggered.details.alert.location, DEFAULT_PANIC_LOCATION);
    }

    #[tokio::test]
    async fn test_second_trigger_returns_the_existing_alert() {
        let h = harness();
        h.officers.seed(officer_fixture("OFF003"));

        let first = h.service.trigger_panic("OFF003", None).await.unwrap();
        h.broadcaster.clear();

        let second = h.service.trigger_panic("OFF003", None).await.unwrap();

        assert!(second.deduplicated);
        assert_eq!(second.details.alert.id, first.details.alert.id);
        assert!(
            h.broadcaster.events().is_empty(),
            "deduplicated trigger must not broadcast"
        );
    }

    #[tokio::test]
    async fn test_trigger_for_unknown_officer_is_not_found() {
        let h = harness();

        let err = h.service.trigger_panic("GHOST99", None).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(err.to_string(), "Officer not found or inactive");
    }

    #[tokio::test]
    async fn test_acknowledge_records_the_supervisor() {
        let h = harness();
        let supervisor = h.officers.seed(supervisor_fixture("SUPER001"));
        h.officers.seed(officer_fixture("OFF003"));
        let triggered = h.service.trigger_panic("OFF003", None).await.unwrap();

        let acknowledged = h
            .service
            .acknowledge(&triggered.details.alert.id, Some("SUPER001"))
            .await
            .unwrap();

        assert_eq!(acknowledged.alert.status, PanicAlertStatus::Acknowledged);
        assert_eq!(acknowledged.alert.acknowledged_by, Some(supervisor.id));
        assert_eq!(acknowledged.officer.officer_id, "OFF003");
    }

    #[tokio::test]
    async fn test_acknowledge_twice_is_a_conflict() {
        let h = harness();
        h.officers.seed(officer_fixture("OFF003"));
        let triggered = h.service.trigger_panic("OFF003", None).await.unwrap();

        h.service
            .acknowledge(&triggered.details.alert.id, None)
            .await
            .unwrap();
        let err = h
            .service
            .acknowledge(&triggered.details.alert.id, None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(err.to_string(), "Alert has already been acknowledged");
    }

    #[tokio::test]
    async fn test_acknowledge_by_a_non_supervisor_leaves_attribution_empty() {
        let h = harness();
        h.officers.seed(officer_fixture("OFF001"));
        h.officers.seed(officer_fixture("OFF003"));
        let triggered = h.service.trigger_panic("OFF003", None).await.unwrap();

        let acknowledged = h
            .service
            .acknowledge(&triggered.details.alert.id, Some("OFF001"))
            .await
            .unwrap();
        assert_eq!(acknowledged.alert.acknowledged_by, None);
    }

    #[tokio::test]
    async fn test_acknowledge_validates_the_alert_id() {
        let h = harness();

        let err = h.service.acknowledge("not-a-uuid", None).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = h
            .service
            .acknowledge(&Uuid::new_v4().to_string(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_active_skips_acknowledged_alerts() {
        let h = harness();
        h.officers.seed(officer_fixture("OFF001"));
        h.officers.seed(officer_fixture("OFF003"));

        let kept = h.service.trigger_panic("OFF001", None).await.unwrap();
        let handled = h.service.trigger_panic("OFF003", None).await.unwrap();
        h.service
            .acknowledge(&handled.details.alert.id, None)
            .await
            .unwrap();

        let active = h.service.list_active().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].alert.id, kept.details.alert.id);
        assert_eq!(active[0].officer.officer_id, "OFF001");
    }
}
