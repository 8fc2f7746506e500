// src/fetch/statbank.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::query::{DataRequest, TableQuery};
use super::{FetchOutcome, NoDataReason, TableSource};
use crate::process::{parse_statbank_csv, RawTable};

/// Public Statbank data endpoint.
pub const STATBANK_API: &str = "https://api.statbank.dk/v1/data";

/// HTTP client for the Statbank `/data` endpoint. One POST per table load, no retries.
#[derive(Debug, Clone)]
pub struct StatbankClient {
    client: Client,
    endpoint: Url,
}

impl StatbankClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("parsing API URL {}", endpoint))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn get_csv(&self, query: &TableQuery) -> Result<String> {
        debug!(url = %self.endpoint, table = %query.table, "POST data request");
        self.client
            .post(self.endpoint.clone())
            .json(&DataRequest::from(query))
            .send()
            .await
            .with_context(|| format!("POST {} failed", self.endpoint))?
            .error_for_status()
            .with_context(|| format!("Non-success status for table {}", query.table))?
            .text()
            .await
            .with_context(|| format!("Reading body for table {}", query.table))
    }

    async fn get_table(&self, query: &TableQuery) -> Result<RawTable> {
        let body = self.get_csv(query).await?;
        parse_statbank_csv(&body).with_context(|| format!("parsing CSV for table {}", query.table))
    }
}

impl TableSource for StatbankClient {
    #[instrument(level = "info", skip(self, query), fields(table = %query.table))]
    async fn fetch_rows(&self, query: &TableQuery) -> FetchOutcome {
        match self.get_table(query).await {
            Ok(raw) if raw.is_empty() => {
                warn!("API returned no rows");
                FetchOutcome::NoData(NoDataReason::EmptyResponse)
            }
            Ok(raw) => {
                info!(rows = raw.len(), "fetched");
                FetchOutcome::Rows(raw)
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "API error");
                FetchOutcome::NoData(NoDataReason::Transport(format!("{:#}", e)))
            }
        }
    }
}
