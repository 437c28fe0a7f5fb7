//! Trend-segmentation and event-reconciliation engine.
//!
//! The pipeline is a synchronous batch: a vessel's raw level series is
//! simplified to inflection points, segmented into signed slopes, scanned for
//! inflow-compensated drain events per calendar day, and reconciled against
//! the transport-ticket ledger in two phases (exact 1-to-1, then
//! combinatorial many-to-one). Whatever cannot be explained on either side is
//! reported as an anomaly.
//!
//! Data flow:
//!
//! ```text
//! readings ──► simplify ──► segment ──► extract ──┐
//!                                                 ├──► reconcile ──► report
//! tickets  ──► ticket_index ──────────────────────┘
//! ```
//!
//! [`runner::AnalysisEngine`] drives the date×vessel loop; [`fill_rate`] and
//! [`trend`] are standalone per-vessel analyses over the same series.

pub mod extract;
pub mod fill_rate;
pub mod reconcile;
pub mod report;
pub mod runner;
pub mod segment;
pub mod simplify;
pub mod ticket_index;
pub mod trend;

pub use extract::{extract_drain_events, DrainEvent};
pub use reconcile::{reconcile, ReconcileOutcome, SubsetBudget};
pub use report::{Anomaly, MatchKind, MatchRecord, ReconciliationReport, RunMetadata};
pub use runner::{AnalysisEngine, AnalysisInput};
pub use segment::{InflectionPoint, SegmentProfile};
pub use ticket_index::TicketIndex;
