//! Runtime configuration resolved once at startup from `BANDOBAST_*`
//! environment variables. Anything unset or unparseable falls back to
//! a documented default so a bare `bandobast-server` always boots.

use std::{env, fmt::Display, str::FromStr};

use bandobast_core::duties::GeofenceConfig;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port the HTTP listener binds on.
    pub port: u16,
    /// Directory the SQLite database lives in; created if missing.
    pub data_dir: String,
    /// Geofence radius around the assigned post, in meters.
    pub geofence_radius_meters: f64,
    /// Cumulative out-of-fence seconds before the supervisor alert.
    pub geofence_alert_seconds: i64,
    /// Capacity of the realtime broadcast channel. Subscribers that
    /// fall further behind than this miss events.
    pub event_capacity: usize,
    /// Exposes the destructive `/api/debug` routes when `true`.
    pub enable_debug_routes: bool,
    /// Allowed CORS origin; `*` means any.
    pub cors_origin: String,
}

impl ServerConfig {
    pub fn load() -> Self {
        Self {
            port: try_load("BANDOBAST_PORT", "3000"),
            data_dir: try_load("BANDOBAST_DATA_DIR", "data"),
            geofence_radius_meters: try_load("BANDOBAST_GEOFENCE_RADIUS_M", "200"),
            geofence_alert_seconds: try_load("BANDOBAST_GEOFENCE_ALERT_SECS", "600"),
            event_capacity: try_load("BANDOBAST_EVENT_CAPACITY", "256"),
            enable_debug_routes: try_load("BANDOBAST_ENABLE_DEBUG_ROUTES", "false"),
            cors_origin: try_load("BANDOBAST_CORS_ORIGIN", "*"),
        }
    }

    pub fn geofence(&self) -> GeofenceConfig {
        GeofenceConfig {
            radius_meters: self.geofence_radius_meters,
            alert_threshold_seconds: self.geofence_alert_seconds,
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("{key} not set, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|_| default.to_string());
    match raw.trim().parse() {
        Ok(value) => value,
        Err(err) => {
            warn!("Invalid {key} value {raw:?}: {err}; using default {default}");
            default
                .parse()
                .unwrap_or_else(|err| panic!("Default for {key} does not parse: {err}"))
        }
    }
}
