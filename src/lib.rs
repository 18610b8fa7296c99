//! OptionBook - Pooled Binary-Outcome Wagering Venue
//!
//! An operator opens markets with a strike value and an expiration
//! time; participants back the Yes or No side before expiration; the
//! operator resolves each market once after expiry; winners claim a
//! proportional share of pooled funds net of the house fee.
//!
//! ## Architecture
//!
//! - **Market Store**: append-only market records with per-market stake books
//! - **Access Control**: single transferable operator slot
//! - **Settlement Engine**: scan-all-markets proportional payout with
//!   re-entrancy exclusion and all-or-nothing transfer rollback
//! - **Integration**: trait seams for the host's clock, custody ledger,
//!   and event sink
//!
//! Execution model: single logical thread of serialized operations.
//! Every operation completes atomically or fails with no state change.

// Core modules
pub mod access;
pub mod config;
pub mod error;
pub mod market;
pub mod settlement;

// External collaborator seams
pub mod integration;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use access::OperatorSlot;
pub use config::VenueConfig;
pub use error::{VenueError, VenueResult};

pub use market::{Market, MarketStore, MarketView, Side, StakeBook};
pub use settlement::{ClaimLedger, ClaimReceipt, Payout, RewardLine, Venue};

pub use integration::{
    Clock, Custody, CustodyError, EventSink, InMemoryCustody, ManualClock, PaymentId,
    RecordingSink, SystemClock, TracingSink, TransferKind, TransferRecord, VenueEvent,
};

/// Smallest accounting units per whole coin (1 coin = 1,000,000 units)
pub const UNITS_PER_COIN: u64 = 1_000_000;
