use crate::errors::{FlowError, Result};
use crate::models::snapshot::Snapshot;
use crate::sources::base::SnapshotSource;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use std::time::Duration;

/// 通过 HTTP 获取 JSON 快照
pub struct HttpSnapshotSource {
    client: Client,
    url: String,
}

impl HttpSnapshotSource {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(FlowError::RequestError)?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    fn source_id(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Snapshot> {
        info!("Fetching snapshot from {}", self.url);

        let response = self.client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FlowError::DataError(format!(
                "Snapshot fetch failed: HTTP status {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        debug!("Received {} bytes", bytes.len());

        let snapshot = Snapshot::from_slice(&bytes)?;
        info!("Snapshot {:?} has {} dates", snapshot.as_of_label, snapshot.data.len());
        Ok(snapshot)
    }
}
