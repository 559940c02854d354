use crate::records::MqDataResponse;
use crate::store::RecordStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{debug, error, info};

/// Polls the sensor backend on a fixed interval and feeds the store.
pub struct SensorPoller {
    store: Arc<RecordStore>,
    client: reqwest::Client,
    endpoint: String,
    interval_secs: u64,
}

impl SensorPoller {
    pub fn new(store: Arc<RecordStore>, endpoint: String, interval_secs: u64) -> Self {
        Self {
            store,
            client: reqwest::Client::new(),
            endpoint,
            interval_secs,
        }
    }

    pub async fn start(self) {
        info!(
            endpoint = %self.endpoint,
            interval_secs = self.interval_secs,
            "Starting sensor polling"
        );
        let mut interval = time::interval(Duration::from_secs(self.interval_secs));
        let mut last_count: Option<usize> = None;

        loop {
            interval.tick().await;

            // A failed cycle is logged and skipped; the next tick retries
            // from scratch with no backoff.
            match self.fetch_once().await {
                Ok(count) => {
                    if last_count != Some(count) {
                        info!(records = count, "Sensor record set updated");
                        last_count = Some(count);
                    } else {
                        debug!(records = count, "Sensor record set unchanged");
                    }
                }
                Err(e) => {
                    error!("Failed to fetch sensor data: {e:#}");
                }
            }
        }
    }

    /// One fetch cycle: GET the endpoint, parse the envelope, replace the
    /// store contents.
    pub async fn fetch_once(&self) -> anyhow::Result<usize> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await?
            .error_for_status()?;
        let body: MqDataResponse = response.json().await?;
        let count = body.mq_data.len();
        self.store.replace(body.mq_data);
        Ok(count)
    }
}

/// One-shot fetch used by the export command.
pub async fn fetch_records(endpoint: &str) -> anyhow::Result<MqDataResponse> {
    let response = reqwest::get(endpoint).await?.error_for_status()?;
    Ok(response.json().await?)
}
