//! Venue Configuration
//!
//! Operator identity, house fee, and house payout destination are fixed
//! at construction. Only the operator identity is mutable afterwards,
//! through the explicit transfer operation on the venue.

use serde::{Deserialize, Serialize};

use crate::error::{VenueError, VenueResult};

/// Venue configuration, validated at construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    /// Identity allowed to create and resolve markets
    pub operator: String,

    /// Percentage of every claimed reward diverted to the house (0-100)
    pub house_fee_percent: u8,

    /// Account credited with the house share of every claim
    pub house_account: String,
}

impl VenueConfig {
    pub fn new(operator: &str, house_fee_percent: u8, house_account: &str) -> VenueResult<Self> {
        if house_fee_percent > 100 {
            return Err(VenueError::InvalidFeePercent(house_fee_percent));
        }
        Ok(Self {
            operator: operator.to_string(),
            house_fee_percent,
            house_account: house_account.to_string(),
        })
    }

    /// Load configuration from environment variables
    ///
    /// Reads `OPTIONBOOK_OPERATOR`, `OPTIONBOOK_HOUSE_FEE_PERCENT` and
    /// `OPTIONBOOK_HOUSE_ACCOUNT`. The fee defaults to 5 when unset.
    pub fn from_env() -> VenueResult<Self> {
        let operator = std::env::var("OPTIONBOOK_OPERATOR").map_err(|_| {
            VenueError::InvariantViolation("OPTIONBOOK_OPERATOR not set".to_string())
        })?;

        let house_account = std::env::var("OPTIONBOOK_HOUSE_ACCOUNT").map_err(|_| {
            VenueError::InvariantViolation("OPTIONBOOK_HOUSE_ACCOUNT not set".to_string())
        })?;

        let house_fee_percent = match std::env::var("OPTIONBOOK_HOUSE_FEE_PERCENT") {
            Ok(raw) => raw.parse::<u8>().map_err(|_| {
                VenueError::InvariantViolation(format!(
                    "OPTIONBOOK_HOUSE_FEE_PERCENT is not a number: {}",
                    raw
                ))
            })?,
            Err(_) => 5,
        };

        Self::new(&operator, house_fee_percent, &house_account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validates_fee() {
        assert!(VenueConfig::new("bb_operator", 100, "bb_house").is_ok());
        assert!(VenueConfig::new("bb_operator", 0, "bb_house").is_ok());

        let err = VenueConfig::new("bb_operator", 101, "bb_house").unwrap_err();
        assert_eq!(err, VenueError::InvalidFeePercent(101));
    }

    #[test]
    fn test_config_serializes() {
        let config = VenueConfig::new("bb_operator", 5, "bb_house").unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"house_fee_percent\":5"));
    }
}
