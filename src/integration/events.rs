//! Event Sink Collaborator
//!
//! Best-effort structured notifications for off-chain observers. Never
//! required for settlement correctness: a sink that drops every event
//! changes no balance.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::market::Side;

/// Structured notification records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VenueEvent {
    MarketCreated {
        id: u64,
        strike_price: u64,
        expiration_time: u64,
    },
    BetPlaced {
        market_id: u64,
        participant: String,
        side: Side,
        amount: u64,
    },
    MarketResolved {
        market_id: u64,
        outcome: bool,
    },
    RewardClaimed {
        market_id: u64,
        participant: String,
        reward: u64,
    },
}

/// Notification sink; emission is fire-and-forget
pub trait EventSink: Send + Sync {
    fn emit(&self, event: VenueEvent);
}

/// Logs every event through `tracing`
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: VenueEvent) {
        match &event {
            VenueEvent::MarketCreated {
                id,
                strike_price,
                expiration_time,
            } => {
                info!(id, strike_price, expiration_time, "Market created");
            }
            VenueEvent::BetPlaced {
                market_id,
                participant,
                side,
                amount,
            } => {
                info!(market_id, participant = %participant, side = %side, amount, "Bet placed");
            }
            VenueEvent::MarketResolved { market_id, outcome } => {
                info!(market_id, outcome, "Market resolved");
            }
            VenueEvent::RewardClaimed {
                market_id,
                participant,
                reward,
            } => {
                info!(market_id, participant = %participant, reward, "Reward claimed");
            }
        }
    }
}

/// Captures events in order, for test assertions
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<VenueEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<VenueEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: VenueEvent) {
        self.events.lock().push(event);
    }
}
