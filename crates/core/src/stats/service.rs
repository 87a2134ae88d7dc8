use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::warn;
use serde::Serialize;

use crate::duties::{Duty, DutyRepositoryTrait, DutyStatus};
use crate::errors::Result;
use crate::officers::{Officer, OfficerRepositoryTrait, OfficerStatus, OfficerSummary};

/// Aggregates are computed in application code over full table scans.
/// Deployments are a few hundred officers; simplicity wins over
/// pushed-down SQL aggregation at that size.
pub trait StatsServiceTrait: Send + Sync {
    fn supervisor_overview(&self) -> Result<SupervisorOverview>;
    fn sector_breakdown(&self) -> Result<Vec<SectorBreakdown>>;
}

/// Headline numbers for the supervisor dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorOverview {
    pub active_officers: i64,
    pub on_duty_officers: i64,
    pub distinct_sectors: usize,
    pub distinct_zones: usize,
}

/// Per-status duty tallies shared by sector and zone rollups.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyTally {
    pub active_duties: usize,
    pub assigned_duties: usize,
    pub checkout_pending_duties: usize,
    pub completed_duties: usize,
    pub cancelled_duties: usize,
    pub total_duties: usize,
}

impl DutyTally {
    fn count(&mut self, status: DutyStatus) {
        match status {
            DutyStatus::Active => self.active_duties += 1,
            DutyStatus::Assigned => self.assigned_duties += 1,
            DutyStatus::CheckoutPending => self.checkout_pending_duties += 1,
            DutyStatus::Completed => self.completed_duties += 1,
            DutyStatus::Cancelled => self.cancelled_duties += 1,
        }
        self.total_duties += 1;
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorBreakdown {
    pub name: String,
    pub total_zones: usize,
    pub total_officers: usize,
    #[serde(flatten)]
    pub tally: DutyTally,
    pub zones: Vec<ZoneBreakdown>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneBreakdown {
    pub name: String,
    pub total_officers: usize,
    #[serde(flatten)]
    pub tally: DutyTally,
    pub duties: Vec<ZoneDuty>,
}

/// One duty row inside a zone rollup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDuty {
    pub id: String,
    pub bandobast_name: String,
    pub post: String,
    pub status: DutyStatus,
    pub officer: OfficerSummary,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct ZoneAccumulator {
    officers: BTreeSet<String>,
    tally: DutyTally,
    duties: Vec<ZoneDuty>,
}

#[derive(Default)]
struct SectorAccumulator {
    officers: BTreeSet<String>,
    tally: DutyTally,
    zones: BTreeMap<String, ZoneAccumulator>,
}

#[derive(Clone)]
pub struct StatsService {
    duty_repository: Arc<dyn DutyRepositoryTrait>,
    officer_repository: Arc<dyn OfficerRepositoryTrait>,
}

impl StatsService {
    pub fn new(
        duty_repository: Arc<dyn DutyRepositoryTrait>,
        officer_repository: Arc<dyn OfficerRepositoryTrait>,
    ) -> Self {
        Self {
            duty_repository,
            officer_repository,
        }
    }

    fn officers_for(&self, duties: &[Duty]) -> Result<HashMap<String, Officer>> {
        let mut ids: Vec<String> = duties.iter().map(|duty| duty.officer_id.clone()).collect();
        ids.sort();
        ids.dedup();
        let officers = self.officer_repository.list_by_ids(&ids)?;
        Ok(officers
            .into_iter()
            .map(|officer| (officer.id.clone(), officer))
            .collect())
    }
}

impl StatsServiceTrait for StatsService {
    fn supervisor_overview(&self) -> Result<SupervisorOverview> {
        Ok(SupervisorOverview {
            active_officers: self.officer_repository.count_active()?,
            on_duty_officers: self
                .officer_repository
                .count_with_status(OfficerStatus::OnDuty)?,
            distinct_sectors: self.duty_repository.distinct_sectors()?.len(),
            distinct_zones: self.duty_repository.distinct_zones()?.len(),
        })
    }

    fn sector_breakdown(&self) -> Result<Vec<SectorBreakdown>> {
        let duties = self.duty_repository.list_all()?;
        let officers = self.officers_for(&duties)?;

        let mut sectors: BTreeMap<String, SectorAccumulator> = BTreeMap::new();
        for duty in duties {
            let Some(officer) = officers.get(&duty.officer_id) else {
                warn!(
                    "Duty {} references missing officer {}; skipping in rollup",
                    duty.id, duty.officer_id
                );
                continue;
            };

            let sector = sectors.entry(duty.sector.clone()).or_default();
            sector.officers.insert(officer.officer_id.clone());
            sector.tally.count(duty.status);

            let zone = sector.zones.entry(duty.zone.clone()).or_default();
            zone.officers.insert(officer.officer_id.clone());
            zone.tally.count(duty.status);
            zone.duties.push(ZoneDuty {
                id: duty.id,
                bandobast_name: duty.bandobast_name,
                post: duty.post,
                status: duty.status,
                officer: officer.summary(),
                check_in_time: duty.check_in_time,
                check_out_time: duty.check_out_time,
            });
        }

        Ok(sectors
            .into_iter()
            .map(|(name, sector)| SectorBreakdown {
                name,
                total_zones: sector.zones.len(),
                total_officers: sector.officers.len(),
                tally: sector.tally,
                zones: sector
                    .zones
                    .into_iter()
                    .map(|(name, zone)| ZoneBreakdown {
                        name,
                        total_officers: zone.officers.len(),
                        tally: zone.tally,
                        duties: zone.duties,
                    })
                    .collect(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        duty_fixture, officer_fixture, InMemoryDutyRepository, InMemoryOfficerRepository,
    };

    fn harness() -> (
        StatsService,
        Arc<InMemoryDutyRepository>,
        Arc<InMemoryOfficerRepository>,
    ) {
        let duties = Arc::new(InMemoryDutyRepository::default());
        let officers = Arc::new(InMemoryOfficerRepository::default());
        let service = StatsService::new(duties.clone(), officers.clone());
        (service, duties, officers)
    }

    #[test]
    fn test_overview_counts_statuses_and_distinct_areas() {
        let (service, duties, officers) = harness();
        let first = officers.seed(officer_fixture("OFF001"));
        let mut second = officer_fixture("OFF002");
        second.current_status = OfficerStatus::OnDuty;
        let second = officers.seed(second);
        let mut retired = officer_fixture("OFF003");
        retired.is_active = false;
        officers.seed(retired);

        let mut a = duty_fixture(&first.id, DutyStatus::Assigned);
        a.sector = "Sector 1".into();
        a.zone = "Zone A".into();
        duties.seed(a);
        let mut b = duty_fixture(&second.id, DutyStatus::Active);
        b.sector = "Sector 2".into();
        b.zone = "Zone B".into();
        duties.seed(b);
        let mut c = duty_fixture(&second.id, DutyStatus::Completed);
        c.sector = "Sector 2".into();
        c.zone = "Zone B".into();
        duties.seed(c);

        let overview = service.supervisor_overview().unwrap();
        assert_eq!(overview.active_officers, 2);
        assert_eq!(overview.on_duty_officers, 1);
        assert_eq!(overview.distinct_sectors, 2);
        assert_eq!(overview.distinct_zones, 2);
    }

    #[test]
    fn test_sector_breakdown_groups_zones_and_tallies() {
        let (service, duties, officers) = harness();
        let first = officers.seed(officer_fixture("OFF001"));
        let second = officers.seed(officer_fixture("OFF002"));

        let mut a = duty_fixture(&first.id, DutyStatus::Active);
        a.sector = "North Goa".into();
        a.zone = "Zone A".into();
        duties.seed(a);

        let mut b = duty_fixture(&second.id, DutyStatus::Assigned);
        b.sector = "North Goa".into();
        b.zone = "Zone B".into();
        duties.seed(b);

        let mut c = duty_fixture(&first.id, DutyStatus::CheckoutPending);
        c.sector = "South Goa".into();
        c.zone = "Zone A".into();
        duties.seed(c);

        let sectors = service.sector_breakdown().unwrap();
        assert_eq!(sectors.len(), 2);

        let north = &sectors[0];
        assert_eq!(north.name, "North Goa");
        assert_eq!(north.total_zones, 2);
        assert_eq!(north.total_officers, 2);
        assert_eq!(north.tally.active_duties, 1);
        assert_eq!(north.tally.assigned_duties, 1);
        assert_eq!(north.tally.total_duties, 2);

        let south = &sectors[1];
        assert_eq!(south.name, "South Goa");
        assert_eq!(south.tally.checkout_pending_duties, 1);
        assert_eq!(south.tally.total_duties, 1);
        assert_eq!(south.zones[0].duties[0].officer.officer_id, "OFF001");
    }

    #[test]
    fn test_rollup_serializes_flat_tallies() {
        let (service, duties, officers) = harness();
        let officer = officers.seed(officer_fixture("OFF001"));
        duties.seed(duty_fixture(&officer.id, DutyStatus::Active));

        let sectors = service.sector_breakdown().unwrap();
        let value = serde_json::to_value(&sectors).unwrap();
        assert_eq!(value[0]["activeDuties"], 1);
        assert_eq!(value[0]["totalDuties"], 1);
        assert_eq!(value[0]["zones"][0]["activeDuties"], 1);
        assert!(value[0].get("tally").is_none());
    }
}
