use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::batch::{Sink, SinkError};
use crate::domain::DerivedRecord;

#[derive(Debug, Clone)]
pub struct SelectDbConfig {
    pub base_url: String,
    pub database: String,
    pub table: String,
    pub username: String,
    pub password: String,
}

/// Analytical store sink: PUT the batch to the stream-load endpoint as a
/// stripped JSON array. Only [`crate::domain::DerivedRecord::Balance`] rows
/// ever reach this sink; `columns`/`jsonpaths` are fixed to `Balance`'s
/// field shape on the table side.
pub struct SelectDbSink {
    client: Client,
    config: SelectDbConfig,
    name: String,
}

#[derive(Debug, Deserialize)]
struct StreamLoadResponse {
    #[serde(rename = "Status")]
    status: String,
}

impl SelectDbSink {
    pub fn new(client: Client, config: SelectDbConfig, name: impl Into<String>) -> Self {
        Self {
            client,
            config,
            name: name.into(),
        }
    }
}

#[async_trait]
impl Sink<DerivedRecord> for SelectDbSink {
    async fn write(&self, batch: &[DerivedRecord]) -> Result<(), SinkError> {
        let url = format!(
            "{}/api/{}/{}/_stream_load?strip_outer_array=true",
            self.config.base_url, self.config.database, self.config.table
        );
        let body = serde_json::to_vec(batch)?;
        let label = format!("load_{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default());

        let response = self
            .client
            .put(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("Content-Type", "application/json")
            .header("Expect", "100-continue")
            .header("label", label)
            .header(
                "jsonpaths",
                "[\"$.network\",\"$.wallet\",\"$.token_address\",\"$.token_account\",\"$.amount\",\"$.decimals\",\"$.block_number\",\"$.event_time\"]",
            )
            .header("columns", "network,wallet,token_address,token_account,amount,decimals,block_number,event_time")
            .header("format", "json")
            .header("strip_outer_array", "true")
            .body(body)
            .send()
            .await
            .map_err(|e| SinkError::Backend(e.to_string()))?;

        let status = response.status();
        if !(status.as_u16() == 200 || status.as_u16() == 202) {
            return Err(SinkError::Backend(format!("stream-load returned HTTP {status}")));
        }

        let parsed: StreamLoadResponse = response
            .json()
            .await
            .map_err(|e| SinkError::Backend(format!("stream-load response not JSON: {e}")))?;
        if parsed.status != "Success" {
            return Err(SinkError::Backend(format!("stream-load status {}", parsed.status)));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
