mod postgres;

pub use postgres::PgScoreStore;

use crate::domain::{Sport, SportLine};
use crate::errors::StoreError;
use async_trait::async_trait;

/// The score store's contract (spec §4.1). `read_scores` returns, in
/// unspecified order, one entry per sport present in the store that
/// matches the request. `write_score` sets the score column for the
/// matching row; zero rows affected is `NotFound`.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn read_scores(&self, sports: &[Sport]) -> Result<Vec<SportLine>, StoreError>;
    async fn write_score(&self, line: &SportLine) -> Result<(), StoreError>;
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::sync::Mutex;

    /// In-memory score store used by subscription/delta-service tests.
    /// Mirrors the real store's contract without a database.
    pub struct FakeScoreStore {
        scores: Mutex<HashMap<Sport, f32>>,
        pub table_missing: bool,
        read_delay: Mutex<Duration>,
    }

    impl FakeScoreStore {
        pub fn new(seed: impl IntoIterator<Item = (Sport, f32)>) -> Self {
            Self {
                scores: Mutex::new(seed.into_iter().collect()),
                table_missing: false,
                read_delay: Mutex::new(Duration::ZERO),
            }
        }

        pub async fn set(&self, sport: Sport, score: f32) {
            self.scores.lock().await.insert(sport, score);
        }

        /// Makes `read_scores` sleep for `delay` before returning, so
        /// tests can pin down exactly when a caller's lock is (or isn't)
        /// held across the store read.
        pub async fn set_read_delay(&self, delay: Duration) {
            *self.read_delay.lock().await = delay;
        }
    }

    #[async_trait]
    impl ScoreStore for FakeScoreStore {
        async fn read_scores(&self, sports: &[Sport]) -> Result<Vec<SportLine>, StoreError> {
            if sports.is_empty() {
                return Err(StoreError::InvalidArgument("empty sport list".into()));
            }
            if self.table_missing {
                return Err(StoreError::TableMissing);
            }
            let delay = *self.read_delay.lock().await;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let scores = self.scores.lock().await;
            Ok(sports
                .iter()
                .filter_map(|s| scores.get(s).map(|score| SportLine::new(*s, *score)))
                .collect())
        }

        async fn write_score(&self, line: &SportLine) -> Result<(), StoreError> {
            let mut scores = self.scores.lock().await;
            if !scores.contains_key(&line.sport) {
                return Err(StoreError::NotFound);
            }
            scores.insert(line.sport, line.score);
            Ok(())
        }
    }
}
