//! Operational helpers behind the debug switch: wiping state between
//! demos and seeding a known set of accounts.

use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};
use serde::Serialize;

use crate::alerts::PanicAlertRepositoryTrait;
use crate::auth::{hash_password, BCRYPT_COST};
use crate::duties::DutyRepositoryTrait;
use crate::errors::Result;
use crate::notifications::NotificationRepositoryTrait;
use crate::officers::{NewOfficer, Officer, OfficerRepositoryTrait, OfficerRole, Rank};

/// Every demo account logs in with this password.
pub const DEMO_PASSWORD: &str = "password123";

/// Row counts removed by a reset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetSummary {
    pub officers: usize,
    pub duties: usize,
    pub panic_alerts: usize,
    pub notifications: usize,
}

#[async_trait]
pub trait MaintenanceServiceTrait: Send + Sync {
    /// Delete every row in every table. Children go first so foreign
    /// keys never dangle mid-way.
    async fn reset_database(&self) -> Result<ResetSummary>;
    /// Create the demo accounts that are missing; existing codes are
    /// left untouched, so the call is repeatable.
    async fn seed_demo_officers(&self) -> Result<Vec<Officer>>;
}

struct DemoAccount {
    officer_id: &'static str,
    name: &'static str,
    rank: Rank,
    role: OfficerRole,
    home_police_station: &'static str,
}

const DEMO_ACCOUNTS: [DemoAccount; 5] = [
    DemoAccount {
        officer_id: "DEMO001",
        name: "John Smith",
        rank: Rank::Pc,
        role: OfficerRole::Officer,
        home_police_station: "Panaji Police Station",
    },
    DemoAccount {
        officer_id: "DEMO002",
        name: "Sarah Fernandes",
        rank: Rank::Psi,
        role: OfficerRole::Officer,
        home_police_station: "Calangute Police Station",
    },
    DemoAccount {
        officer_id: "DEMO003",
        name: "Amit Patel",
        rank: Rank::Hc,
        role: OfficerRole::Officer,
        home_police_station: "Margao Police Station",
    },
    DemoAccount {
        officer_id: "OFF003",
        name: "Vikram Patel",
        rank: Rank::Pc,
        role: OfficerRole::Officer,
        home_police_station: "Panaji Police Station",
    },
    DemoAccount {
        officer_id: "SUPER001",
        name: "Rajesh Kumar",
        rank: Rank::Pi,
        role: OfficerRole::Supervisor,
        home_police_station: "Panaji Police Station",
    },
];

#[derive(Clone)]
pub struct MaintenanceService {
    officer_repository: Arc<dyn OfficerRepositoryTrait>,
    duty_repository: Arc<dyn DutyRepositoryTrait>,
    alert_repository: Arc<dyn PanicAlertRepositoryTrait>,
    notification_repository: Arc<dyn NotificationRepositoryTrait>,
    bcrypt_cost: u32,
}

impl MaintenanceService {
    pub fn new(
        officer_repository: Arc<dyn OfficerRepositoryTrait>,
        duty_repository: Arc<dyn DutyRepositoryTrait>,
        alert_repository: Arc<dyn PanicAlertRepositoryTrait>,
        notification_repository: Arc<dyn NotificationRepositoryTrait>,
    ) -> Self {
        Self {
            officer_repository,
            duty_repository,
            alert_repository,
            notification_repository,
            bcrypt_cost: BCRYPT_COST,
        }
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }
}

#[async_trait]
impl MaintenanceServiceTrait for MaintenanceService {
    async fn reset_database(&self) -> Result<ResetSummary> {
        let notifications = self.notification_repository.delete_all().await?;
        let panic_alerts = self.alert_repository.delete_all().await?;
        let duties = self.duty_repository.delete_all().await?;
        let officers = self.officer_repository.delete_all().await?;

        warn!(
            "Database reset: removed {} officers, {} duties, {} alerts, {} notifications",
            officers, duties, panic_alerts, notifications
        );
        Ok(ResetSummary {
            officers,
            duties,
            panic_alerts,
            notifications,
        })
    }

    async fn seed_demo_officers(&self) -> Result<Vec<Officer>> {
        let mut created = Vec::new();
        for account in &DEMO_ACCOUNTS {
            if self
                .officer_repository
                .find_by_code(account.officer_id)?
                .is_some()
            {
                continue;
            }

            let password_hash = hash_password(DEMO_PASSWORD.to_string(), self.bcrypt_cost).await?;
            let officer = self
                .officer_repository
                .insert(NewOfficer {
                    officer_id: account.officer_id.to_string(),
                    name: account.name.to_string(),
                    email: format!("{}@police.gov.in", account.officer_id.to_lowercase()),
                    password_hash,
                    rank: account.rank,
                    role: account.role,
                    home_police_station: account.home_police_station.to_string(),
                })
                .await?;
            created.push(officer);
        }

        info!(
            "Demo seed complete: {} accounts created, {} already present",
            created.len(),
            DEMO_ACCOUNTS.len() - created.len()
        );
        Ok(created)
    }
}
