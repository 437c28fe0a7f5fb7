pub mod config;
pub mod config_loader;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{AnalysisConfig, AppConfig, TrendConfig, UpstreamConfig};
pub use config_loader::ConfigLoader;
pub use error::ReconError;
pub use traits::DataProvider;
pub use types::{flatten_snapshots, LevelSnapshot, RawTicket, Reading, Ticket, TicketLedger, Vessel};
