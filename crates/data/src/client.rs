//! HTTP client for the upstream telemetry service.
//!
//! Three read-only endpoints: `/api/Data` (level snapshots over an epoch
//! range), `/api/Information/vessels` (the catalog), and `/api/Tickets`
//! (the transport-ticket ledger). Any failure here is
//! `ReconError::DataFetch` and fatal to the run: without upstream data
//! there is nothing to reconcile.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tank_recon_core::{
    DataProvider, LevelSnapshot, ReconError, TicketLedger, UpstreamConfig, Vessel,
};
use tracing::info;

pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

fn fetch_failed(what: &str, err: reqwest::Error) -> ReconError {
    ReconError::DataFetch {
        source: anyhow::Error::new(err).context(format!("fetching {what}")),
    }
}

impl UpstreamClient {
    /// Builds a client against the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns `ReconError::DataFetch` if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ReconError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| fetch_failed("client setup", e))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DataProvider for UpstreamClient {
    async fn fetch_readings(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LevelSnapshot>, ReconError> {
        let url = format!("{}/api/Data", self.base_url);
        let snapshots: Vec<LevelSnapshot> = self
            .http
            .get(&url)
            .query(&[
                ("start_date", start.timestamp()),
                ("end_date", end.timestamp()),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| fetch_failed("level readings", e))?
            .json()
            .await
            .map_err(|e| fetch_failed("level readings", e))?;

        info!(snapshots = snapshots.len(), "fetched level readings");
        Ok(snapshots)
    }

    async fn fetch_vessels(&self) -> Result<Vec<Vessel>, ReconError> {
        let url = format!("{}/api/Information/vessels", self.base_url);
        let vessels: Vec<Vessel> = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| fetch_failed("vessel catalog", e))?
            .json()
            .await
            .map_err(|e| fetch_failed("vessel catalog", e))?;

        info!(vessels = vessels.len(), "fetched vessel catalog");
        Ok(vessels)
    }

    async fn fetch_tickets(&self) -> Result<TicketLedger, ReconError> {
        let url = format!("{}/api/Tickets", self.base_url);
        let ledger: TicketLedger = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| fetch_failed("ticket ledger", e))?
            .json()
            .await
            .map_err(|e| fetch_failed("ticket ledger", e))?;

        info!(
            tickets = ledger.transport_tickets.len(),
            "fetched ticket ledger"
        );
        Ok(ledger)
    }
}
