//! The validator roster: address → endpoint, plus a liveness bit per
//! validator refreshed by a periodic probe.

use std::collections::HashMap;

use isaac_types::Address;
use parking_lot::RwLock;

/// Address → endpoint mapping with per-validator liveness, shared across the
/// tasks that probe and broadcast.
pub struct ValidatorRoster {
    entries: RwLock<HashMap<Address, RosterEntry>>,
}

struct RosterEntry {
    endpoint: String,
    live: bool,
}

impl ValidatorRoster {
    #[must_use]
    pub fn new() -> Self {
        ValidatorRoster {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Registers or updates a validator's endpoint. A freshly registered
    /// validator starts marked live; liveness is then maintained by the
    /// periodic probe.
    pub fn upsert(&self, address: Address, endpoint: String) {
        self.entries
            .write()
            .insert(address, RosterEntry { endpoint, live: true });
    }

    /// Records that `address` exists, without claiming to be connected to
    /// it: no endpoint on file yet, and not counted toward `connected`.
    /// Used when a handshake reports a validator we don't yet have a direct
    /// connection to — it becomes `is_known`, so that validator's own later
    /// handshake attempt is no longer rejected as unknown. A no-op if the
    /// address is already on the roster, live or not: a real endpoint must
    /// never be downgraded back to an empty placeholder.
    pub fn learn(&self, address: Address) {
        self.entries.write().entry(address).or_insert(RosterEntry {
            endpoint: String::new(),
            live: false,
        });
    }

    pub fn remove(&self, address: &Address) {
        self.entries.write().remove(address);
    }

    #[must_use]
    pub fn endpoint(&self, address: &Address) -> Option<String> {
        self.entries.read().get(address).map(|e| e.endpoint.clone())
    }

    #[must_use]
    pub fn is_known(&self, address: &Address) -> bool {
        self.entries.read().contains_key(address)
    }

    pub fn set_live(&self, address: &Address, live: bool) {
        if let Some(entry) = self.entries.write().get_mut(address) {
            entry.live = live;
        }
    }

    /// Every validator currently marked live.
    #[must_use]
    pub fn connected(&self) -> Vec<Address> {
        self.entries
            .read()
            .iter()
            .filter(|(_, e)| e.live)
            .map(|(addr, _)| addr.clone())
            .collect()
    }

    #[must_use]
    pub fn connected_count(&self) -> usize {
        self.entries.read().values().filter(|e| e.live).count()
    }

    /// The full roster, regardless of liveness — this is `N`, the validator
    /// count the quorum threshold is computed against.
    #[must_use]
    pub fn all(&self) -> Vec<Address> {
        self.entries.read().keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ValidatorRoster {
    fn default() -> Self {
        Self::new()
    }
}
