//! Two-phase matching of drain events against transport tickets.
//!
//! Phase 1 walks events chronologically and claims the first unconsumed
//! ticket whose volume lands within tolerance. Phase 2 takes the leftovers
//! largest-first and searches ticket subsets of the remaining pool, smallest
//! subsets first, for a sum within tolerance. Large drains are resolved
//! before small ones because they are less likely to be spuriously explained
//! by an accidental subset sum.
//!
//! Both phases are greedy and order-dependent: results are deterministic
//! given the incoming event and ticket order, but not unique across
//! reorderings when several valid matchings exist. That policy is the
//! contract; a globally optimal assignment would change results.
//!
//! The subset search is exponential in the pool size, so it is bounded by a
//! pool cap and a per-event subset budget. Exceeding either leaves the event
//! unmatched instead of stalling the run.

use crate::extract::DrainEvent;
use crate::report::{MatchKind, MatchRecord};
use chrono::NaiveDate;
use std::cmp::Ordering;
use tank_recon_core::{ReconError, Ticket};
use tracing::{debug, warn};

/// Bounds on the Phase 2 subset search.
#[derive(Debug, Clone, Copy)]
pub struct SubsetBudget {
    /// Largest remaining-ticket pool the search will attempt at all.
    pub max_pool: usize,
    /// Maximum candidate subsets examined per drain event.
    pub max_subsets: usize,
}

impl Default for SubsetBudget {
    fn default() -> Self {
        Self {
            max_pool: 20,
            max_subsets: 200_000,
        }
    }
}

/// Result of reconciling one (vessel, date) pair.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    pub matches: Vec<MatchRecord>,
    pub unmatched_events: Vec<DrainEvent>,
    pub unmatched_tickets: Vec<Ticket>,
}

/// Searches `pool` for the first subset of size >= 2 whose summed volume is
/// within `tolerance` of `target`. Sizes ascend; within a size, combinations
/// follow the pool's natural order. Returns the winning indices.
///
/// # Errors
///
/// Returns `ReconError::CombinatorialExhaustion` when the pool exceeds the
/// cap or the subset budget runs out before a match is found.
fn find_ticket_subset(
    pool: &[Ticket],
    target: f64,
    tolerance: f64,
    budget: &SubsetBudget,
) -> Result<Option<Vec<usize>>, ReconError> {
    let n = pool.len();
    if n < 2 {
        return Ok(None);
    }
    if n > budget.max_pool {
        return Err(ReconError::CombinatorialExhaustion { explored: 0 });
    }

    let mut explored = 0_usize;
    for r in 2..=n {
        let mut indices: Vec<usize> = (0..r).collect();
        loop {
            explored += 1;
            if explored > budget.max_subsets {
                return Err(ReconError::CombinatorialExhaustion { explored });
            }

            let sum: f64 = indices.iter().map(|&i| pool[i].amount_collected).sum();
            if (target - sum).abs() <= tolerance {
                return Ok(Some(indices));
            }

            // Advance to the next combination in lexicographic order.
            let mut i = r;
            let mut advanced = false;
            while i > 0 {
                i -= 1;
                if indices[i] != i + n - r {
                    indices[i] += 1;
                    for j in i + 1..r {
                        indices[j] = indices[j - 1] + 1;
                    }
                    advanced = true;
                    break;
                }
            }
            if !advanced {
                break;
            }
        }
    }

    Ok(None)
}

/// Reconciles the drain events of one (vessel, date) pair against its
/// tickets. Tickets consumed by a match leave the pool immediately; whatever
/// survives both phases comes back in the outcome's unmatched lists.
#[must_use]
pub fn reconcile(
    vessel_id: &str,
    date: NaiveDate,
    events: &[DrainEvent],
    tickets: &[Ticket],
    tolerance: f64,
    budget: &SubsetBudget,
) -> ReconcileOutcome {
    let mut pool: Vec<Ticket> = tickets.to_vec();
    let mut matches = Vec::new();
    let mut deferred: Vec<DrainEvent> = Vec::new();

    // Phase 1: exact 1-to-1, events in chronological order, first ticket
    // within tolerance wins.
    for event in events {
        let position = pool
            .iter()
            .position(|t| (event.drain_volume - t.amount_collected).abs() <= tolerance);
        match position {
            Some(i) => {
                let ticket = pool.remove(i);
                debug!(
                    vessel_id,
                    %date,
                    ticket_id = %ticket.ticket_id,
                    drain_volume = event.drain_volume,
                    "1-to-1 match"
                );
                matches.push(MatchRecord {
                    kind: MatchKind::OneToOne,
                    drain_volume: event.drain_volume,
                    drain_end_time: event.end,
                    ticket_ids: vec![ticket.ticket_id],
                    ticket_sum: ticket.amount_collected,
                    vessel_id: vessel_id.to_string(),
                    date,
                });
            }
            None => deferred.push(event.clone()),
        }
    }

    // Phase 2: combinatorial many-to-one, largest drains first. Stable sort
    // keeps equal volumes in chronological order.
    deferred.sort_by(|a, b| {
        b.drain_volume
            .partial_cmp(&a.drain_volume)
            .unwrap_or(Ordering::Equal)
    });

    let mut unmatched_events = Vec::new();
    for event in deferred {
        if pool.len() < 2 {
            unmatched_events.push(event);
            continue;
        }

        match find_ticket_subset(&pool, event.drain_volume, tolerance, budget) {
            Ok(Some(indices)) => {
                let ticket_ids: Vec<String> = indices
                    .iter()
                    .map(|&i| pool[i].ticket_id.clone())
                    .collect();
                let ticket_sum: f64 = indices.iter().map(|&i| pool[i].amount_collected).sum();
                for &i in indices.iter().rev() {
                    pool.remove(i);
                }
                debug!(
                    vessel_id,
                    %date,
                    tickets = ticket_ids.len(),
                    drain_volume = event.drain_volume,
                    ticket_sum,
                    "many-to-one match"
                );
                matches.push(MatchRecord {
                    kind: MatchKind::ManyToOne,
                    drain_volume: event.drain_volume,
                    drain_end_time: event.end,
                    ticket_ids,
                    ticket_sum,
                    vessel_id: vessel_id.to_string(),
                    date,
                });
            }
            Ok(None) => unmatched_events.push(event),
            Err(err) => {
                warn!(
                    vessel_id,
                    %date,
                    drain_volume = event.drain_volume,
                    pool = pool.len(),
                    %err,
                    "subset search exhausted, leaving drain unmatched"
                );
                unmatched_events.push(event);
            }
        }
    }

    ReconcileOutcome {
        matches,
        unmatched_events,
        unmatched_tickets: pool,
    }
}
