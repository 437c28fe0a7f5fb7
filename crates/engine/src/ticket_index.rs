//! (vessel, date)-keyed index over the transport-ticket ledger.
//!
//! Built once per run from the raw ledger; malformed entries are excluded
//! with a warning and never reach the reconciler. Read-only afterwards.

use chrono::NaiveDate;
use std::collections::HashMap;
use tank_recon_core::{Ticket, TicketLedger};
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct TicketIndex {
    by_vessel_date: HashMap<(String, NaiveDate), Vec<Ticket>>,
    accepted: usize,
    rejected: usize,
}

impl TicketIndex {
    /// Validates the raw ledger and groups the surviving tickets by
    /// (vessel, date), preserving ledger order within each group.
    #[must_use]
    pub fn build(ledger: TicketLedger) -> Self {
        let mut index = Self::default();
        for raw in ledger.transport_tickets {
            match raw.validate() {
                Ok(ticket) => index.insert(ticket),
                Err(err) => {
                    warn!(%err, "excluding ticket from index");
                    index.rejected += 1;
                }
            }
        }
        index
    }

    /// Builds an index from already-validated tickets.
    #[must_use]
    pub fn from_tickets(tickets: Vec<Ticket>) -> Self {
        let mut index = Self::default();
        for ticket in tickets {
            index.insert(ticket);
        }
        index
    }

    fn insert(&mut self, ticket: Ticket) {
        self.accepted += 1;
        self.by_vessel_date
            .entry((ticket.vessel_id.clone(), ticket.date))
            .or_default()
            .push(ticket);
    }

    /// Tickets logged for `vessel_id` on `date`, in ledger order. Empty
    /// slice when there are none.
    #[must_use]
    pub fn get(&self, vessel_id: &str, date: NaiveDate) -> &[Ticket] {
        self.by_vessel_date
            .get(&(vessel_id.to_string(), date))
            .map_or(&[], Vec::as_slice)
    }

    /// Number of tickets that passed validation.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Number of ledger entries dropped as malformed.
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}
