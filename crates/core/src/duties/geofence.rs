//! Pure geofence evaluation.
//!
//! Each accepted location ping runs one [`evaluate`] step against the
//! duty's persisted [`GeofenceState`]; the caller stores the returned
//! state and publishes events for whichever edges fired.

use crate::geo::{self, Coordinates};

pub const DEFAULT_GEOFENCE_RADIUS_METERS: f64 = 200.0;
pub const DEFAULT_ALERT_THRESHOLD_SECONDS: i64 = 600;

#[derive(Debug, Clone, Copy)]
pub struct GeofenceConfig {
    pub radius_meters: f64,
    /// Cumulative out-of-fence seconds before the supervisor alert.
    pub alert_threshold_seconds: i64,
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_GEOFENCE_RADIUS_METERS,
            alert_threshold_seconds: DEFAULT_ALERT_THRESHOLD_SECONDS,
        }
    }
}

/// The per-duty state the evaluator carries between pings.
///
/// `seconds_outside` accumulates across excursions and only resets at
/// clock-in. `alert_raised` debounces the supervisor alert for the
/// current excursion and clears on re-entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeofenceState {
    pub is_outside: bool,
    pub alert_raised: bool,
    pub seconds_outside: i64,
}

/// Outcome of one evaluation step. `exited`/`entered` flag boundary
/// crossings relative to the previous ping; `raise_alert` fires at
/// most once per excursion.
#[derive(Debug, Clone, PartialEq)]
pub struct GeofenceCheck {
    pub distance_meters: f64,
    pub exited: bool,
    pub entered: bool,
    pub raise_alert: bool,
    pub state: GeofenceState,
}

pub fn evaluate(
    config: &GeofenceConfig,
    assigned: Coordinates,
    observed: Coordinates,
    previous: GeofenceState,
    elapsed_seconds: i64,
) -> GeofenceCheck {
    let distance_meters = geo::distance_meters(observed, assigned);
    let outside = distance_meters > config.radius_meters;

    let mut state = previous;
    let mut exited = false;
    let mut entered = false;
    let mut raise_alert = false;

    if outside {
        exited = !previous.is_outside;
        state.is_outside = true;
        state.seconds_outside = previous
            .seconds_outside
            .saturating_add(elapsed_seconds.max(0));
        if state.seconds_outside >= config.alert_threshold_seconds && !previous.alert_raised {
            raise_alert = true;
            state.alert_raised = true;
        }
    } else {
        entered = previous.is_outside;
        state.is_outside = false;
        state.alert_raised = false;
    }

    GeofenceCheck {
        distance_meters,
        exited,
        entered,
        raise_alert,
        state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST: Coordinates = Coordinates {
        lat: 15.4989,
        lon: 73.8278,
    };

    /// ~300 m north of the post, clearly outside the 200 m fence.
    const OUTSIDE: Coordinates = Coordinates {
        lat: 15.4989 + 0.0027,
        lon: 73.8278,
    };

    /// ~50 m north of the post, well inside the fence.
    const INSIDE: Coordinates = Coordinates {
        lat: 15.4989 + 0.00045,
        lon: 73.8278,
    };

    fn config() -> GeofenceConfig {
        GeofenceConfig::default()
    }

    #[test]
    fn test_inside_ping_keeps_a_clean_state() {
        let check = evaluate(&config(), POST, INSIDE, GeofenceState::default(), 30);
        assert!(!check.exited && !check.entered && !check.raise_alert);
        assert_eq!(check.state, GeofenceState::default());
        assert!(check.distance_meters < 100.0);
    }

    #[test]
    fn test_first_outside_ping_flags_an_exit() {
        let check = evaluate(&config(), POST, OUTSIDE, GeofenceState::default(), 30);
        assert!(check.exited);
        assert!(!check.entered);
        assert!(check.state.is_outside);
        assert_eq!(check.state.seconds_outside, 30);
        assert!(check.distance_meters > 200.0);
    }

    #[test]
    fn test_staying_outside_accumulates_without_repeating_the_exit() {
        let first = evaluate(&config(), POST, OUTSIDE, GeofenceState::default(), 45);
        let second = evaluate(&config(), POST, OUTSIDE, first.state, 60);
        assert!(!second.exited);
        assert_eq!(second.state.seconds_outside, 105);
    }

    #[test]
    fn test_alert_fires_once_when_dwell_crosses_the_threshold() {
        let mut state = GeofenceState {
            is_outside: true,
            alert_raised: false,
            seconds_outside: 590,
        };

        let crossing = evaluate(&config(), POST, OUTSIDE, state, 15);
        assert!(crossing.raise_alert);
        assert!(crossing.state.alert_raised);
        assert_eq!(crossing.state.seconds_outside, 605);

        state = crossing.state;
        let after = evaluate(&config(), POST, OUTSIDE, state, 60);
        assert!(!after.raise_alert, "alert must not repeat while outside");
        assert!(after.state.alert_raised);
    }

    #[test]
    fn test_reentry_clears_the_alert_flag_but_keeps_the_clock() {
        let state = GeofenceState {
            is_outside: true,
            alert_raised: true,
            seconds_outside: 700,
        };

        let check = evaluate(&config(), POST, INSIDE, state, 20);
        assert!(check.entered);
        assert!(!check.state.is_outside);
        assert!(!check.state.alert_raised);
        assert_eq!(check.state.seconds_outside, 700);
    }

    #[test]
    fn test_new_excursion_can_alert_again_after_reentry() {
        // Already over the threshold from an earlier excursion.
        let inside = GeofenceState {
            is_outside: false,
            alert_raised: false,
            seconds_outside: 700,
        };

        let check = evaluate(&config(), POST, OUTSIDE, inside, 10);
        assert!(check.exited);
        assert!(check.raise_alert, "cleared flag re-arms the alert");
    }

    #[test]
    fn test_negative_elapsed_is_treated_as_zero() {
        let check = evaluate(&config(), POST, OUTSIDE, GeofenceState::default(), -5);
        assert_eq!(check.state.seconds_outside, 0);
    }

    #[test]
    fn test_boundary_distance_is_not_outside() {
        // A point measurably at the radius stays inside: the check is
        // a strict greater-than.
        let near_edge = Coordinates {
            lat: 15.4989 + 0.00179,
            lon: 73.8278,
        };
        let check = evaluate(&config(), POST, near_edge, GeofenceState::default(), 10);
        assert!(check.distance_meters < 200.0);
        assert!(!check.state.is_outside);
    }
}
