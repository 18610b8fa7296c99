// ============================================================================
// MARKET STORE - Binary-Outcome Market Records
// ============================================================================
//
// Owns the append-only sequence of markets and their lifecycle fields.
// Pure data structure: authorization, time checks, and settlement policy
// live in the venue, not here.
//
// A market id is its position in the sequence. Markets are never deleted
// or reordered, so ids are stable identities.

pub mod stakes;

use serde::{Deserialize, Serialize};

use crate::error::{VenueError, VenueResult};
pub use stakes::StakeBook;

/// Side of a binary-outcome market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Yes,
    No,
}

impl Side {
    /// The side that wins under a given outcome
    pub fn winning(outcome: bool) -> Self {
        if outcome {
            Side::Yes
        } else {
            Side::No
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Yes => write!(f, "yes"),
            Side::No => write!(f, "no"),
        }
    }
}

/// One binary-outcome wagering market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    /// Opaque reference value, interpreted by off-chain observers only
    pub strike_price: u64,

    /// Unix timestamp after which betting closes and resolution is permitted
    pub expiration_time: u64,

    /// Per-participant stakes and side totals
    pub stakes: StakeBook,

    /// Monotonic: set once by resolution, never reverts
    pub resolved: bool,

    /// Meaningful only when `resolved` is true
    pub outcome: bool,
}

impl Market {
    pub fn new(strike_price: u64, expiration_time: u64) -> Self {
        Self {
            strike_price,
            expiration_time,
            stakes: StakeBook::new(),
            resolved: false,
            outcome: false,
        }
    }
}

/// Read-only projection of a market's public fields
///
/// Excludes the raw stake maps; per-participant positions go through
/// `Venue::stake_of`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketView {
    pub id: u64,
    pub strike_price: u64,
    pub expiration_time: u64,
    pub total_yes: u64,
    pub total_no: u64,
    pub resolved: bool,
    pub outcome: Option<bool>,
}

impl MarketView {
    fn project(id: u64, market: &Market) -> Self {
        Self {
            id,
            strike_price: market.strike_price,
            expiration_time: market.expiration_time,
            total_yes: market.stakes.total(Side::Yes),
            total_no: market.stakes.total(Side::No),
            resolved: market.resolved,
            outcome: market.resolved.then_some(market.outcome),
        }
    }
}

/// Append-only ordered sequence of markets
#[derive(Debug, Default)]
pub struct MarketStore {
    markets: Vec<Market>,
}

impl MarketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new market and return its stable index
    pub fn append(&mut self, market: Market) -> u64 {
        let id = self.markets.len() as u64;
        self.markets.push(market);
        id
    }

    pub fn get(&self, id: u64) -> VenueResult<&Market> {
        self.markets
            .get(id as usize)
            .ok_or(VenueError::NotFound(id))
    }

    pub fn get_mut(&mut self, id: u64) -> VenueResult<&mut Market> {
        self.markets
            .get_mut(id as usize)
            .ok_or(VenueError::NotFound(id))
    }

    pub fn view(&self, id: u64) -> VenueResult<MarketView> {
        self.get(id).map(|m| MarketView::project(id, m))
    }

    pub fn views(&self) -> Vec<MarketView> {
        self.markets
            .iter()
            .enumerate()
            .map(|(id, m)| MarketView::project(id as u64, m))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    /// Markets with their ids, in creation order (the settlement scan)
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u64, &mut Market)> {
        self.markets
            .iter_mut()
            .enumerate()
            .map(|(id, m)| (id as u64, m))
    }

    /// Read-only counterpart of `iter_mut` (the preview scan)
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Market)> {
        self.markets
            .iter()
            .enumerate()
            .map(|(id, m)| (id as u64, m))
    }
}
