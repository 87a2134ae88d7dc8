//! Shared fixtures for repository tests. Every test gets its own
//! migrated database file under the system temp directory.

use std::sync::Arc;

use tempfile::tempdir;

use bandobast_core::duties::NewDuty;
use bandobast_core::geo::Coordinates;
use bandobast_core::officers::{NewOfficer, OfficerRole, Rank};

use crate::db::write_actor::spawn_writer;
use crate::db::{create_pool, init, run_migrations, DbPool, WriteHandle};

pub(crate) fn setup_db() -> (Arc<DbPool>, WriteHandle) {
    let app_data = tempdir()
        .expect("tempdir")
        .keep()
        .to_string_lossy()
        .to_string();
    let db_path = init(&app_data).expect("init db");
    run_migrations(&db_path).expect("migrate db");
    let pool = create_pool(&db_path).expect("create pool");
    let writer = spawn_writer(pool.as_ref().clone());
    (pool, writer)
}

pub(crate) fn new_officer(code: &str) -> NewOfficer {
    NewOfficer {
        officer_id: code.to_string(),
        name: format!("Officer {code}"),
        email: format!("{}@police.gov.in", code.to_lowercase()),
        password_hash: "$2b$12$fixture".to_string(),
        rank: Rank::Pc,
        role: OfficerRole::Officer,
        home_police_station: "Panaji Police Station".to_string(),
    }
}

pub(crate) fn new_duty(officer_id: &str) -> NewDuty {
    NewDuty {
        officer_id: officer_id.to_string(),
        assigned_by: None,
        bandobast_name: "Ganesh Chaturthi Bandobast".to_string(),
        sector: "Sector 1".to_string(),
        zone: "Zone A".to_string(),
        post: "Post 3".to_string(),
        duty_date: "2026-08-26".to_string(),
        shift: "Morning".to_string(),
        description: String::new(),
        assigned_location: Coordinates {
            lat: 15.4989,
            lon: 73.8278,
        },
    }
}
