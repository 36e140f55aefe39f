use std::sync::Arc;

use crate::domain::{Sport, SportLine};
use crate::errors::DeltaError;
use crate::store::ScoreStore;

use super::model::ClientSubscription;

/// Computes the lines to emit for an (already-installed) subscription
/// and updates its baselines in place. Split into a store read
/// (`fetch_scores`, no lock involved) and a pure baseline diff/update
/// (`apply_diff`) so a caller holding the per-client registry lock only
/// ever does so around the latter, never across the store I/O in the
/// former — spec §5 is explicit that no lock is held across I/O to the
/// store. `calculate` composes the two for callers that don't need to
/// split the lock scope themselves (e.g. tests against a plain
/// `&mut ClientSubscription`).
pub struct DeltaService {
    store: Arc<dyn ScoreStore>,
}

impl DeltaService {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self { store }
    }

    /// Reads the current scores for `sports` from the store. Does no
    /// locking of its own; the caller is free to run this before
    /// acquiring any per-client lock.
    pub async fn fetch_scores(&self, sports: &[Sport]) -> Result<Vec<SportLine>, DeltaError> {
        Ok(self.store.read_scores(sports).await?)
    }

    /// Applies the absolute/delta transform to already-fetched `lines`
    /// and updates `subscription`'s baselines in place. Purely
    /// in-memory — safe to run while holding the per-client lock
    /// without blocking it on I/O (spec §4.6, §5).
    pub fn apply_diff(
        &self,
        lines: &mut [SportLine],
        need_delta: bool,
        subscription: &mut ClientSubscription,
    ) {
        for line in lines.iter_mut() {
            let current = line.score;
            let prev = *subscription.baselines.get(&line.sport).unwrap_or(&0.0);
            if need_delta {
                line.score = current - prev;
            }
            // The baseline always tracks the raw score, never the
            // delta, so the next tick's delta is computed against the
            // true previous value.
            subscription.baselines.insert(line.sport, current);
        }
    }

    pub async fn calculate(
        &self,
        sports: &[Sport],
        need_delta: bool,
        subscription: &mut ClientSubscription,
    ) -> Result<Vec<SportLine>, DeltaError> {
        let mut lines = self.fetch_scores(sports).await?;
        self.apply_diff(&mut lines, need_delta, subscription);
        Ok(lines)
    }

    /// Whether a resubscription changes the installed subscription.
    /// Order is irrelevant; cardinality plus key-membership is the
    /// whole test (spec §4.6's corrected contract — the original
    /// source's inverted predicate combination is not reproduced).
    pub fn is_subscription_changed(
        &self,
        exists: bool,
        old_baselines: &std::collections::HashMap<Sport, f32>,
        new_sports: &[Sport],
    ) -> bool {
        if new_sports.is_empty() {
            return false;
        }
        if !exists {
            return true;
        }
        if old_baselines.len() != new_sports.len() {
            return true;
        }
        new_sports.iter().any(|s| !old_baselines.contains_key(s))
    }
}
