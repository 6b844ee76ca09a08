//! # Cooldown Tracker - Per-Key Minimum-Spacing Gate
//!
//! Every rule in the pipeline funnels through this gate before emitting.
//! A key identifies one (rule, subject) pair, for example `cpu:worker-3`
//! or `log-burst:auth-service`. The tracker remembers when each key last
//! fired and refuses emission until the caller-supplied cooldown has
//! elapsed.
//!
//! The check and the timestamp update happen inside one critical section,
//! so concurrent pipelines racing on the same key can never both pass the
//! gate within a cooldown window. Keys are independent of each other and
//! the cooldown duration is supplied per call; the tracker stores nothing
//! but last-fire instants.
//!
//! The key set grows monotonically for the lifetime of the process. That
//! is bounded by (rules x subjects) for the monitored fleet and is not
//! garbage collected.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Per-key minimum-spacing gate shared by the cluster, pod, and log pipelines
#[derive(Debug, Default)]
pub struct CooldownTracker {
    /// Last-fire instant per key, guarded as one critical section
    last_fired: Mutex<HashMap<String, Instant>>,
}

impl CooldownTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self {
            last_fired: Mutex::new(HashMap::new()),
        }
    }

    /// Check whether `key` may fire, consuming the slot when it may
    ///
    /// Returns true when no prior fire is recorded for `key`, or when at
    /// least `cooldown` has elapsed since the recorded fire. On a true
    /// return the stored instant is replaced with the current time, in the
    /// same critical section as the check.
    pub fn allow(&self, key: &str, cooldown: Duration) -> bool {
        let mut last_fired = self.last_fired.lock();
        let now = Instant::now();

        match last_fired.get(key) {
            Some(last) if now.duration_since(*last) < cooldown => false,
            _ => {
                last_fired.insert(key.to_string(), now);
                true
            }
        }
    }

    /// Number of keys that have ever fired
    pub fn tracked_keys(&self) -> usize {
        self.last_fired.lock().len()
    }
}
