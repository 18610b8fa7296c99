//! Settlement Module - Proportional Payouts with Claim Receipts
//!
//! The engine scans every market on claim (no per-participant index is
//! kept), computes each resolved market's proportional reward from the
//! live custody balance, zeroes claimed stakes exactly once, and splits
//! the aggregate against the house fee.
//!
//! ## Flow:
//! 1. Operator creates markets; participants deposit on Yes/No
//! 2. Operator resolves each market once, after expiry
//! 3. A winner calls `claim`: stakes zero, funds move, receipt appended
//! 4. A second claim finds zeroed stakes and nothing to pay
//!
//! ## Safety:
//! - Stake zeroing commits before any outbound transfer is attempted
//! - A failed transfer rolls back every zeroed stake (and voids the
//!   other payment of the pair)
//! - Re-entrant calls from collaborators are rejected outright

pub mod engine;
pub mod receipts;

pub use engine::{Payout, Venue};
pub use receipts::{ClaimLedger, ClaimReceipt, RewardLine};
