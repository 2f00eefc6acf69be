use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::substrate::{ExternalChange, Substrate};

/// A named, ordered sequence of records persisted as one JSON array under a
/// namespaced key. The `ERP_` prefix keeps unrelated data in the same
/// substrate from colliding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Staff,
    Students,
    Transactions,
    Leaves,
    Events,
    Attendance,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Staff,
        Collection::Students,
        Collection::Transactions,
        Collection::Leaves,
        Collection::Events,
        Collection::Attendance,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Collection::Staff => "ERP_STAFF",
            Collection::Students => "ERP_STUDENTS",
            Collection::Transactions => "ERP_TRANSACTIONS",
            Collection::Leaves => "ERP_LEAVES",
            Collection::Events => "ERP_EVENTS",
            Collection::Attendance => "ERP_ATTENDANCE",
        }
    }

    pub fn from_key(key: &str) -> Option<Collection> {
        Collection::ALL.into_iter().find(|c| c.key() == key)
    }
}

/// Loads collections on first access (seeding when absent) and writes them
/// back whole on every change. Storage and parse failures never reach the
/// caller: a load degrades to the seed value, a failed save is logged and
/// dropped.
pub struct RecordStore<S: Substrate> {
    substrate: S,
}

impl<S: Substrate> RecordStore<S> {
    pub fn new(substrate: S) -> Self {
        Self { substrate }
    }

    /// Returns the stored sequence for `collection`. A missing key seeds the
    /// substrate with `seed` and returns it; an unparseable payload returns
    /// `seed` without overwriting what is stored.
    pub fn load_or_seed<T>(&mut self, collection: Collection, seed: Vec<T>) -> Vec<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let key = collection.key();
        match self.substrate.get(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!(key, error = %e, "stored payload unparseable, using seed");
                    seed
                }
            },
            Ok(None) => {
                self.save(collection, &seed);
                seed
            }
            Err(e) => {
                warn!(key, error = %e, "substrate read failed, using seed");
                seed
            }
        }
    }

    /// Serializes and writes the full next state of the collection. No merge,
    /// no concurrency check: the last writer's value wins.
    pub fn save<T: Serialize>(&mut self, collection: Collection, value: &[T]) {
        let key = collection.key();
        match serde_json::to_string(value) {
            Ok(raw) => {
                if let Err(e) = self.substrate.set(key, &raw) {
                    warn!(key, error = %e, "substrate write failed");
                }
            }
            Err(e) => warn!(key, error = %e, "serialize failed"),
        }
    }

    pub fn poll_external(&mut self) -> Vec<ExternalChange> {
        match self.substrate.poll_external() {
            Ok(changes) => changes,
            Err(e) => {
                warn!(error = %e, "external change poll failed");
                Vec::new()
            }
        }
    }
}
