use crate::error::ReconError;
use crate::types::{LevelSnapshot, TicketLedger, Vessel};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Seam between the engine and whatever serves readings, the vessel catalog,
/// and the ticket ledger: the upstream HTTP service in production, a local
/// fixture store in tests and offline runs.
#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn fetch_readings(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LevelSnapshot>, ReconError>;

    async fn fetch_vessels(&self) -> Result<Vec<Vessel>, ReconError>;

    async fn fetch_tickets(&self) -> Result<TicketLedger, ReconError>;
}
