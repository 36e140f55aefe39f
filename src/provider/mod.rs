mod http;

pub use http::HttpLinesProviderClient;

use crate::domain::{Sport, SportLine};
use crate::errors::ProviderError;
use async_trait::async_trait;

/// The lines-provider client's contract (spec §4.2): fetch a fresh score
/// for one sport, with distinct external-failure and internal-decode
/// signals.
#[async_trait]
pub trait LinesProviderClient: Send + Sync {
    async fn fetch(&self, sport: Sport) -> Result<SportLine, ProviderError>;
}
