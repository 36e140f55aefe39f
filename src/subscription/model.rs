use std::collections::HashMap;

use crate::domain::Sport;

use super::ticker::PeriodicTask;

pub type ClientId = i64;

/// The score most recently *emitted* to a client for each sport it is
/// subscribed to, plus the handle of its periodic dispatch task.
/// Invariant: every sport in the client's current request set has a
/// baseline entry, and `task` is `Some` iff the subscription is
/// installed (spec §3).
pub struct ClientSubscription {
    pub baselines: HashMap<Sport, f32>,
    pub task: Option<PeriodicTask>,
}

impl ClientSubscription {
    pub fn new(baselines: HashMap<Sport, f32>) -> Self {
        Self {
            baselines,
            task: None,
        }
    }
}
