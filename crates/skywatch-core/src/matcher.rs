//! Alert matching engine.
//!
//! Evaluation is pure: it reads a criteria slice and a clock value and
//! returns the alerts to raise. No I/O, no failure mode.

use chrono::{DateTime, Utc};
use skywatch_types::{Aircraft, Alert, AlertCriterion};

/// Evaluate one telemetry record against the criteria list.
///
/// Criteria are visited in the order they were added. Every matching
/// criterion yields its own [`Alert`], so one record can raise several
/// alerts. Overlapping criteria are not deduplicated.
pub fn evaluate(
    aircraft: &Aircraft,
    criteria: &[AlertCriterion],
    now: DateTime<Utc>,
) -> Vec<Alert> {
    criteria
        .iter()
        .filter(|criterion| criterion.matches(aircraft))
        .map(|criterion| Alert::raise(aircraft, criterion, now))
        .collect()
}
