//! Local JSON fixture store.
//!
//! Serves the same three datasets as the upstream service from a directory
//! of `readings.json`, `vessels.json`, and `tickets.json`, each in the
//! exact wire shape. Used for offline runs and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tank_recon_core::{DataProvider, LevelSnapshot, ReconError, TicketLedger, Vessel};

pub struct FixtureStore {
    dir: PathBuf,
}

impl FixtureStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn load<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T, ReconError> {
        let path = self.dir.join(name);
        let contents = std::fs::read_to_string(&path).map_err(|e| ReconError::DataFetch {
            source: anyhow::Error::new(e).context(format!("reading {}", path.display())),
        })?;
        serde_json::from_str(&contents).map_err(|e| ReconError::DataFetch {
            source: anyhow::Error::new(e).context(format!("parsing {}", path.display())),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DataProvider for FixtureStore {
    async fn fetch_readings(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LevelSnapshot>, ReconError> {
        let snapshots: Vec<LevelSnapshot> = self.load("readings.json")?;
        Ok(snapshots
            .into_iter()
            .filter(|s| s.timestamp >= start && s.timestamp <= end)
            .collect())
    }

    async fn fetch_vessels(&self) -> Result<Vec<Vessel>, ReconError> {
        self.load("vessels.json")
    }

    async fn fetch_tickets(&self) -> Result<TicketLedger, ReconError> {
        self.load("tickets.json")
    }
}
