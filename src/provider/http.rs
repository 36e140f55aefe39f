use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::domain::{parse_score, Sport, SportLine};
use crate::errors::ProviderError;

use super::LinesProviderClient;

/// `GET {base}/api/v1/lines/{sport}` returns `{"lines": {"<SPORT>": "<score>"}}`.
/// The upper-case key always matches the requested sport, so the
/// response is decoded generically into a single-entry map rather than
/// one struct per sport.
#[derive(Debug, Deserialize)]
struct LinesResponse {
    lines: std::collections::HashMap<String, String>,
}

pub struct HttpLinesProviderClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpLinesProviderClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

#[async_trait]
impl LinesProviderClient for HttpLinesProviderClient {
    async fn fetch(&self, sport: Sport) -> Result<SportLine, ProviderError> {
        let url = format!("{}/api/v1/lines/{}", self.base_url, sport);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| ProviderError::External(format!("request to {} failed: {}", url, err)))?;

        if !response.status().is_success() {
            return Err(ProviderError::External(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|err| ProviderError::Internal(format!("failed to read body: {}", err)))?;

        let parsed: LinesResponse = serde_json::from_str(&body).map_err(|err| {
            warn!("failed to decode lines response for {}: {}", sport, err);
            ProviderError::Internal(format!("failed to decode response: {}", err))
        })?;

        let raw_score = parsed.lines.get(sport.as_upper_str()).ok_or_else(|| {
            ProviderError::Internal(format!(
                "response missing key {} for sport {}",
                sport.as_upper_str(),
                sport
            ))
        })?;

        let score = parse_score(raw_score)
            .map_err(|_| ProviderError::Internal(format!("invalid score {:?} for {}", raw_score, sport)))?;

        Ok(SportLine::new(sport, score))
    }
}
