pub mod types;

pub use types::{
    CompletedFlight, DestinationState, FlightAggregate, FlightFact, FlightField, FlightPhase,
    StateError,
};

use crate::types::ICAOAddress;

pub const DEFAULT_TTL_SECONDS: i64 = 600;

#[derive(Debug)]
struct StoreEntry {
    aggregate: FlightAggregate,
    last_updated: chrono::DateTime<chrono::Utc>,
}

/// Volatile per-flight aggregation buffer. Entries expire once `ttl` has
/// passed since their last write; reads do not extend the lifetime.
#[derive(Debug)]
pub struct FlightStateStore {
    ttl: chrono::TimeDelta,
    entries: std::collections::HashMap<ICAOAddress, StoreEntry>,
}

impl FlightStateStore {
    #[must_use]
    pub fn new(ttl: chrono::TimeDelta) -> Self {
        FlightStateStore {
            ttl,
            entries: std::collections::HashMap::new(),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> chrono::TimeDelta {
        self.ttl
    }

    pub fn get(&mut self, flight: ICAOAddress, field: FlightField) -> Option<FlightFact> {
        self.get_at(flight, field, chrono::Utc::now())
    }

    pub fn get_at(
        &mut self,
        flight: ICAOAddress,
        field: FlightField,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Option<FlightFact> {
        self.aggregate_at(flight, now)
            .and_then(|aggregate| aggregate.field(field))
    }

    pub fn aggregate(&mut self, flight: ICAOAddress) -> Option<&FlightAggregate> {
        self.aggregate_at(flight, chrono::Utc::now())
    }

    pub fn aggregate_at(
        &mut self,
        flight: ICAOAddress,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Option<&FlightAggregate> {
        if self.remove_if_expired(flight, now) {
            return None;
        }
        self.entries.get(&flight).map(|entry| &entry.aggregate)
    }

    pub fn set(&mut self, flight: ICAOAddress, fact: FlightFact) -> Result<(), StateError> {
        self.set_at(flight, fact, chrono::Utc::now())
    }

    /// Applies one fact to the flight's aggregate, creating a fresh aggregate
    /// for unseen or expired flights. A rejected fact leaves the store as it was.
    pub fn set_at(
        &mut self,
        flight: ICAOAddress,
        fact: FlightFact,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), StateError> {
        let fresh = self.remove_if_expired(flight, now) || !self.entries.contains_key(&flight);

        let entry = self.entries.entry(flight).or_insert_with(|| StoreEntry {
            aggregate: FlightAggregate::default(),
            last_updated: now,
        });
        let result = entry.aggregate.apply(fact);
        if result.is_ok() {
            entry.last_updated = now;
        } else if fresh {
            self.entries.remove(&flight);
        }
        result
    }

    /// Marks a live flight as still active without changing its facts.
    /// Returns false if the flight is unknown or has already expired.
    pub fn touch_at(&mut self, flight: ICAOAddress, now: chrono::DateTime<chrono::Utc>) -> bool {
        if self.remove_if_expired(flight, now) {
            return false;
        }
        match self.entries.get_mut(&flight) {
            Some(entry) => {
                entry.last_updated = now;
                true
            }
            None => false,
        }
    }

    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(chrono::Utc::now())
    }

    pub fn purge_expired_at(&mut self, now: chrono::DateTime<chrono::Utc>) -> usize {
        let before = self.entries.len();
        let cutoff_time = now - self.ttl;
        self.entries
            .retain(|_, entry| entry.last_updated > cutoff_time);
        before - self.entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove_if_expired(&mut self, flight: ICAOAddress, now: chrono::DateTime<chrono::Utc>) -> bool {
        let expired = self
            .entries
            .get(&flight)
            .is_some_and(|entry| now - entry.last_updated >= self.ttl);
        if expired {
            self.entries.remove(&flight);
        }
        expired
    }
}

impl Default for FlightStateStore {
    fn default() -> Self {
        FlightStateStore::new(chrono::TimeDelta::seconds(DEFAULT_TTL_SECONDS))
    }
}
