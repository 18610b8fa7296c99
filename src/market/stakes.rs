//! Stake Book - Per-Market Participant Ledger
//!
//! Two sparse participant → amount maps (Yes / No) with running totals.
//! Every mutation updates the map entry and the side total as one unit,
//! so a reader never observes them out of sync.
//!
//! Claims zero a participant's entry WITHOUT touching the totals: the
//! totals stay fixed as the pool denominators that every winner's
//! proportional share is computed against. Decrementing them on claim
//! would grow the fraction paid to whoever claims later.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Side;

/// Stakes and totals for both sides of one market
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StakeBook {
    total_yes: u64,
    total_no: u64,
    yes_stakes: HashMap<String, u64>,
    no_stakes: HashMap<String, u64>,
}

impl StakeBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Running total for a side
    pub fn total(&self, side: Side) -> u64 {
        match side {
            Side::Yes => self.total_yes,
            Side::No => self.total_no,
        }
    }

    /// A participant's active stake on a side (zero if never staked or already claimed)
    pub fn stake_of(&self, side: Side, participant: &str) -> u64 {
        self.map(side).get(participant).copied().unwrap_or(0)
    }

    /// Record a deposit: create or increment the entry, bump the total.
    ///
    /// Checked: returns false and mutates nothing if the side total
    /// would overflow. An entry never exceeds its side total, so the
    /// total check covers the entry sum as well.
    pub fn record(&mut self, side: Side, participant: &str, amount: u64) -> bool {
        let Some(total) = self.total(side).checked_add(amount) else {
            return false;
        };
        *self
            .map_mut(side)
            .entry(participant.to_string())
            .or_insert(0) += amount;
        match side {
            Side::Yes => self.total_yes = total,
            Side::No => self.total_no = total,
        }
        true
    }

    /// Back out a deposit recorded earlier in the same operation
    /// (rollback path when the matching funds transfer is rejected)
    pub fn unrecord(&mut self, side: Side, participant: &str, amount: u64) {
        if let Some(entry) = self.map_mut(side).get_mut(participant) {
            *entry = entry.saturating_sub(amount);
        }
        match side {
            Side::Yes => self.total_yes = self.total_yes.saturating_sub(amount),
            Side::No => self.total_no = self.total_no.saturating_sub(amount),
        }
    }

    /// Zero a participant's stake on a side, returning the previous amount.
    ///
    /// Totals are intentionally left untouched (see module doc).
    pub fn zero_stake(&mut self, side: Side, participant: &str) -> u64 {
        match self.map_mut(side).get_mut(participant) {
            Some(entry) => std::mem::take(entry),
            None => 0,
        }
    }

    /// Put a zeroed stake back (claim rollback path)
    pub fn restore_stake(&mut self, side: Side, participant: &str, amount: u64) {
        if let Some(entry) = self.map_mut(side).get_mut(participant) {
            *entry = amount;
        }
    }

    fn map(&self, side: Side) -> &HashMap<String, u64> {
        match side {
            Side::Yes => &self.yes_stakes,
            Side::No => &self.no_stakes,
        }
    }

    fn map_mut(&mut self, side: Side) -> &mut HashMap<String, u64> {
        match side {
            Side::Yes => &mut self.yes_stakes,
            Side::No => &mut self.no_stakes,
        }
    }
}
