//! One worker per supported sport. Each worker fetches the latest score
//! from the lines provider and writes it to the store on a fixed
//! cadence; a failure on one sport never blocks another, and neither
//! failure mode tears the worker down (spec §4.3).

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::domain::SUPPORTED_SPORTS;
use crate::provider::LinesProviderClient;
use crate::store::ScoreStore;

pub struct PollerPool {
    provider: Arc<dyn LinesProviderClient>,
    store: Arc<dyn ScoreStore>,
    period: Duration,
}

impl PollerPool {
    pub fn new(provider: Arc<dyn LinesProviderClient>, store: Arc<dyn ScoreStore>, period: Duration) -> Self {
        Self {
            provider,
            store,
            period,
        }
    }

    /// Spawns one long-running task per supported sport and returns
    /// immediately; the pool runs for the process lifetime.
    pub fn spawn(&self) {
        for sport in SUPPORTED_SPORTS {
            let provider = Arc::clone(&self.provider);
            let store = Arc::clone(&self.store);
            let period = self.period;
            tokio::spawn(async move {
                loop {
                    match provider.fetch(sport).await {
                        Ok(line) => {
                            if let Err(err) = store.write_score(&line).await {
                                error!("failed to store {} score: {}", sport, err);
                            } else {
                                info!("updated {} score to {}", sport, line.score);
                            }
                        }
                        Err(err) => {
                            error!("failed to fetch {} score: {}", sport, err);
                        }
                    }
                    tokio::time::sleep(period).await;
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sport;
    use crate::provider::fake::FakeLinesProviderClient;
    use crate::store::fake::FakeScoreStore;

    #[tokio::test]
    async fn worker_keeps_going_after_provider_failure() {
        let provider = Arc::new(FakeLinesProviderClient::new([
            (Sport::Baseball, 0.5),
            (Sport::Football, 0.5),
            (Sport::Soccer, 0.5),
        ]));
        provider.fail_sports.lock().await.push(Sport::Baseball);
        let store: Arc<dyn ScoreStore> = Arc::new(FakeScoreStore::new([
            (Sport::Baseball, 1.0),
            (Sport::Football, 1.0),
            (Sport::Soccer, 1.0),
        ]));

        let pool = PollerPool::new(provider, store.clone(), Duration::from_millis(5));
        pool.spawn();

        tokio::time::sleep(Duration::from_millis(30)).await;

        let lines = store.read_scores(&[Sport::Football]).await.unwrap();
        assert_eq!(lines[0].score, 0.5);
    }
}
