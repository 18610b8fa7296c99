//! Venue Error Taxonomy
//!
//! Every public operation fails atomically: an error means no state
//! change happened. Errors are serializable so hosts can relay them to
//! off-chain observers verbatim.

use serde::{Deserialize, Serialize};

/// Result type for venue operations
pub type VenueResult<T> = Result<T, VenueError>;

/// Venue errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum VenueError {
    #[error("caller {0} is not the operator")]
    Unauthorized(String),

    #[error("market {0} not found")]
    NotFound(u64),

    #[error("betting closed for market {market_id} (expired at {expiration_time})")]
    BettingClosed { market_id: u64, expiration_time: u64 },

    #[error("bet amount must be positive")]
    ZeroAmount,

    #[error("market expiration {expiration_time} is not in the future (now {now})")]
    InvalidExpiration { expiration_time: u64, now: u64 },

    #[error("market {0} has not expired yet")]
    NotExpired(u64),

    #[error("market {0} already resolved")]
    AlreadyResolved(u64),

    #[error("nothing to claim")]
    NothingToClaim,

    #[error("transfer failed: {0}")]
    TransferFailed(String),

    #[error("house fee percent {0} exceeds 100")]
    InvalidFeePercent(u8),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("re-entrant call rejected")]
    ReentrantCall,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VenueError::BettingClosed {
            market_id: 3,
            expiration_time: 1_700_000_000,
        };
        assert!(err.to_string().contains("market 3"));

        let err = VenueError::Unauthorized("bb_mallory".to_string());
        assert!(err.to_string().contains("bb_mallory"));
    }

    #[test]
    fn test_error_round_trips_through_json() {
        let err = VenueError::TransferFailed("custody rejected payment".to_string());
        let json = serde_json::to_string(&err).unwrap();
        let back: VenueError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }
}
