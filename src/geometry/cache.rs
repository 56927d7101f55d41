//! Memoising cache in front of the motion planners.

use std::collections::HashMap;
use std::sync::RwLock;

use qtty::{Quantity, Second};

use super::configuration::{Configuration, ConfigurationKey};
use super::error::MotionError;
use crate::team::Species;

type CacheKey = (String, ConfigurationKey, ConfigurationKey);

/// Cached outcome of one planner query.
///
/// Failures poison the entry so a failed pair is never re-planned; a timed
/// out query keeps its own kind so replays report it as such.
#[derive(Debug, Clone, Copy, PartialEq)]
enum CacheSlot {
    Duration(f64),
    Unreachable,
    TimedOut(f64),
}

/// Shared travel-duration cache.
///
/// `travel_time` memoises full planner queries per
/// `(species, from, to)` triple; `lower_bound` answers an admissible
/// straight-line estimate without consulting the planner at all.
///
/// Reads take a shared lock, so concurrent solver threads only contend on
/// genuinely new pairs.
#[derive(Debug, Default)]
pub struct MotionCache {
    entries: RwLock<HashMap<CacheKey, CacheSlot>>,
}

impl MotionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Travel duration for `species` from `from` to `to`.
    ///
    /// Equal configurations succeed immediately with a zero duration. The
    /// first failed query poisons the entry; later calls return the failure
    /// without touching the planner again.
    ///
    /// # Errors
    ///
    /// [`MotionError::Unreachable`] for a pair the planner cannot connect,
    /// [`MotionError::Timeout`] when the per-query budget expired first.
    /// Both poison the entry.
    pub fn travel_time(
        &self,
        species: &Species,
        from: &Configuration,
        to: &Configuration,
        timeout: Quantity<Second>,
    ) -> Result<Quantity<Second>, MotionError> {
        let from_key = from.key();
        let to_key = to.key();
        if from_key == to_key {
            return Ok(Quantity::new(0.0));
        }

        let key = (species.name().to_owned(), from_key, to_key);
        if let Some(slot) = self
            .entries
            .read()
            .expect("motion cache lock poisoned")
            .get(&key)
        {
            return match *slot {
                CacheSlot::Duration(seconds) => Ok(Quantity::new(seconds)),
                CacheSlot::Unreachable => Err(MotionError::Unreachable {
                    species: species.name().to_owned(),
                }),
                CacheSlot::TimedOut(timeout) => Err(MotionError::Timeout {
                    species: species.name().to_owned(),
                    timeout,
                }),
            };
        }

        let outcome = species
            .motion_planner()
            .plan(species.bounding_radius(), from, to, timeout)
            .map(|length| length / species.speed());

        let mut entries = self.entries.write().expect("motion cache lock poisoned");
        match outcome {
            Ok(seconds) => {
                entries.insert(key, CacheSlot::Duration(seconds));
                Ok(Quantity::new(seconds))
            }
            Err(MotionError::Timeout { .. }) => {
                entries.insert(key, CacheSlot::TimedOut(timeout.value()));
                Err(MotionError::Timeout {
                    species: species.name().to_owned(),
                    timeout: timeout.value(),
                })
            }
            Err(_) => {
                entries.insert(key, CacheSlot::Unreachable);
                Err(MotionError::Unreachable {
                    species: species.name().to_owned(),
                })
            }
        }
    }

    /// Admissible lower bound on the travel duration.
    ///
    /// Straight-line workspace distance over nominal speed; configurations
    /// without a metric embedding get the trivial bound of zero.
    pub fn lower_bound(
        &self,
        species: &Species,
        from: &Configuration,
        to: &Configuration,
    ) -> Quantity<Second> {
        let distance = from.euclidean_distance(to).unwrap_or(0.0);
        Quantity::new(distance / species.speed())
    }

    /// Number of memoised pairs (poisoned entries included).
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .expect("motion cache lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
