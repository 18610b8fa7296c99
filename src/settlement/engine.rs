// ============================================================================
// SETTLEMENT ENGINE - The Venue
// ============================================================================
//
// Serialized front door for every venue operation: market creation,
// betting, resolution, and settlement. One write lock over the market
// store serializes mutations; an explicit re-entrancy guard rejects a
// collaborator that calls back into `claim` or `place_bet` while either
// is in flight.
//
// Claim discipline: all stake zeroing commits before any outbound
// transfer is attempted, and a transfer failure rolls every zeroed
// stake back, voiding any payment of the pair that already executed.
//
// REWARD FORMULA NOTE: each market's reward is the caller's stake times
// the venue's ENTIRE live custody balance divided by that market's
// winning-side total. The pool is shared across all markets, so
// unrelated deposits and claim ordering change individual payouts. That
// is the contracted behavior, reproduced literally; ring-fencing
// per-market pools would be a different economic design.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::access::OperatorSlot;
use crate::config::VenueConfig;
use crate::error::{VenueError, VenueResult};
use crate::integration::{Clock, Custody, EventSink, PaymentId, VenueEvent};
use crate::market::{Market, MarketStore, MarketView, Side};
use crate::settlement::receipts::{ClaimLedger, ClaimReceipt, RewardLine};

/// Result of a settled (or previewed) claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub user_share: u64,
    pub house_share: u64,
}

impl Payout {
    pub const ZERO: Payout = Payout {
        user_share: 0,
        house_share: 0,
    };

    pub fn total(&self) -> u64 {
        self.user_share + self.house_share
    }
}

/// The wagering venue
pub struct Venue {
    markets: RwLock<MarketStore>,
    operator: OperatorSlot,
    house_fee_percent: u8,
    house_account: String,
    receipts: ClaimLedger,
    custody: Arc<dyn Custody>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
    /// Re-entrancy flag, held across `claim` and `place_bet`
    entered: AtomicBool,
}

impl Venue {
    pub fn new(
        config: VenueConfig,
        custody: Arc<dyn Custody>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        info!(
            operator = %config.operator,
            house_fee_percent = config.house_fee_percent,
            house_account = %config.house_account,
            "Venue initialized"
        );
        Self {
            markets: RwLock::new(MarketStore::new()),
            operator: OperatorSlot::new(&config.operator),
            house_fee_percent: config.house_fee_percent,
            house_account: config.house_account,
            receipts: ClaimLedger::new(),
            custody,
            clock,
            events,
            entered: AtomicBool::new(false),
        }
    }

    // ========================================================================
    // MARKET LIFECYCLE
    // ========================================================================

    /// Open a new market. Operator only; expiration must be in the future.
    pub fn create_market(
        &self,
        caller: &str,
        strike_price: u64,
        expiration_time: u64,
    ) -> VenueResult<u64> {
        self.operator.require_operator(caller)?;

        let now = self.clock.now();
        if expiration_time <= now {
            return Err(VenueError::InvalidExpiration {
                expiration_time,
                now,
            });
        }

        let id = self
            .markets
            .write()
            .append(Market::new(strike_price, expiration_time));

        info!(id, strike_price, expiration_time, "Market created");
        self.events.emit(VenueEvent::MarketCreated {
            id,
            strike_price,
            expiration_time,
        });
        Ok(id)
    }

    /// Record the final outcome of an expired, unresolved market.
    /// Operator only. Irreversible.
    pub fn resolve_market(&self, caller: &str, market_id: u64, outcome: bool) -> VenueResult<()> {
        self.operator.require_operator(caller)?;

        {
            let mut store = self.markets.write();
            let market = store.get_mut(market_id)?;

            if self.clock.now() < market.expiration_time {
                return Err(VenueError::NotExpired(market_id));
            }
            if market.resolved {
                return Err(VenueError::AlreadyResolved(market_id));
            }

            market.resolved = true;
            market.outcome = outcome;
        }

        info!(market_id, outcome, "Market resolved");
        self.events
            .emit(VenueEvent::MarketResolved { market_id, outcome });
        Ok(())
    }

    // ========================================================================
    // BETTING
    // ========================================================================

    /// Deposit `amount` backing one side of an open market.
    ///
    /// The caller's deposit moves into venue custody atomically with the
    /// stake record. Repeat deposits and simultaneous Yes/No positions
    /// are allowed.
    pub fn place_bet(
        &self,
        caller: &str,
        market_id: u64,
        side: Side,
        amount: u64,
    ) -> VenueResult<()> {
        let _entry = self.enter()?;

        let mut store = self.markets.write();
        let market = store.get_mut(market_id)?;

        let now = self.clock.now();
        if now >= market.expiration_time {
            return Err(VenueError::BettingClosed {
                market_id,
                expiration_time: market.expiration_time,
            });
        }
        if amount == 0 {
            return Err(VenueError::ZeroAmount);
        }

        // Stake capacity first; custody never sees an unrecordable deposit
        if !market.stakes.record(side, caller, amount) {
            return Err(VenueError::InvariantViolation(format!(
                "market {} {} total would overflow",
                market_id, side
            )));
        }

        // A rejected deposit backs the stake entry out again
        if let Err(e) = self.custody.accept_deposit(caller, amount) {
            market.stakes.unrecord(side, caller, amount);
            return Err(VenueError::TransferFailed(e.to_string()));
        }
        drop(store);

        info!(market_id, participant = %caller, side = %side, amount, "Bet placed");
        self.events.emit(VenueEvent::BetPlaced {
            market_id,
            participant: caller.to_string(),
            side,
            amount,
        });
        Ok(())
    }

    // ========================================================================
    // SETTLEMENT
    // ========================================================================

    /// Settle every resolved market the caller holds a winning stake in.
    ///
    /// Scans all markets in creation order, zeroes the winning stakes,
    /// splits the aggregate reward against the house fee, and issues the
    /// two outbound transfers. All-or-nothing: any failure restores the
    /// zeroed stakes and moves no funds.
    pub fn claim(&self, caller: &str) -> VenueResult<Payout> {
        let _entry = self.enter()?;

        let mut store = self.markets.write();

        // Phase 1: scan, compute, zero. Undo log carries the rollback.
        // A scan failure is parked and the rollback runs after the loop,
        // once the iterator's borrow of the store has ended.
        let mut undo: Vec<(u64, Side, u64)> = Vec::new();
        let mut lines: Vec<RewardLine> = Vec::new();
        let mut total_reward: u64 = 0;
        let mut scan_err: Option<VenueError> = None;

        for (id, market) in store.iter_mut() {
            if !market.resolved {
                continue;
            }
            let side = Side::winning(market.outcome);
            let stake = market.stakes.stake_of(side, caller);
            if stake == 0 {
                continue;
            }

            let pool_total = market.stakes.total(side);
            if pool_total == 0 {
                // Unreachable while a positive stake exists; defensive.
                scan_err = Some(VenueError::InvariantViolation(format!(
                    "market {} has a winning stake but a zero winning total",
                    id
                )));
                break;
            }

            let reward = match proportional_reward(stake, self.custody.balance(), pool_total) {
                Ok(reward) => reward,
                Err(e) => {
                    scan_err = Some(e);
                    break;
                }
            };

            let prev = market.stakes.zero_stake(side, caller);
            undo.push((id, side, prev));

            total_reward = match total_reward.checked_add(reward) {
                Some(sum) => sum,
                None => {
                    scan_err = Some(VenueError::InvariantViolation(
                        "aggregate reward overflowed".to_string(),
                    ));
                    break;
                }
            };
            if reward > 0 {
                lines.push(RewardLine {
                    market_id: id,
                    reward,
                });
            }
        }

        if let Some(e) = scan_err {
            Self::rollback(&mut store, caller, &undo);
            return Err(e);
        }

        if total_reward == 0 {
            // Stakes may have been zeroed against a drained pool; restore them
            Self::rollback(&mut store, caller, &undo);
            return Err(VenueError::NothingToClaim);
        }

        let payout = split_fee(total_reward, self.house_fee_percent);

        // Phase 2: the two outbound transfers. Either failure reverts
        // everything this call touched.
        let house_payment = match self.pay_house(payout.house_share) {
            Ok(payment) => payment,
            Err(e) => {
                Self::rollback(&mut store, caller, &undo);
                warn!(participant = %caller, error = %e, "House transfer failed, claim rolled back");
                return Err(e);
            }
        };

        if let Err(e) = self.custody.pay(caller, payout.user_share) {
            Self::rollback(&mut store, caller, &undo);
            if let Some(payment) = house_payment {
                self.custody.void(&payment);
            }
            warn!(participant = %caller, error = %e, "Participant transfer failed, claim rolled back");
            return Err(VenueError::TransferFailed(e.to_string()));
        }

        drop(store);

        // Committed: notify and append the receipt
        for line in &lines {
            self.events.emit(VenueEvent::RewardClaimed {
                market_id: line.market_id,
                participant: caller.to_string(),
                reward: line.reward,
            });
        }
        let claim_id = self.receipts.record(
            caller,
            lines,
            total_reward,
            payout.user_share,
            payout.house_share,
        );

        info!(
            participant = %caller,
            claim_id = %claim_id,
            total_reward,
            user_share = payout.user_share,
            house_share = payout.house_share,
            "Claim settled"
        );
        Ok(payout)
    }

    /// Same arithmetic as `claim`, no mutation; zeros instead of
    /// `NothingToClaim`.
    pub fn preview_claim(&self, caller: &str) -> VenueResult<Payout> {
        let store = self.markets.read();

        let mut total_reward: u64 = 0;
        for (id, market) in store.iter() {
            if !market.resolved {
                continue;
            }
            let side = Side::winning(market.outcome);
            let stake = market.stakes.stake_of(side, caller);
            if stake == 0 {
                continue;
            }

            let pool_total = market.stakes.total(side);
            if pool_total == 0 {
                return Err(VenueError::InvariantViolation(format!(
                    "market {} has a winning stake but a zero winning total",
                    id
                )));
            }

            let reward = proportional_reward(stake, self.custody.balance(), pool_total)?;
            total_reward = total_reward.checked_add(reward).ok_or_else(|| {
                VenueError::InvariantViolation("aggregate reward overflowed".to_string())
            })?;
        }

        if total_reward == 0 {
            return Ok(Payout::ZERO);
        }
        Ok(split_fee(total_reward, self.house_fee_percent))
    }

    // ========================================================================
    // READ SURFACE
    // ========================================================================

    /// Public fields of one market
    pub fn get_market(&self, market_id: u64) -> VenueResult<MarketView> {
        self.markets.read().view(market_id)
    }

    /// All markets, in creation order
    pub fn markets(&self) -> Vec<MarketView> {
        self.markets.read().views()
    }

    pub fn market_count(&self) -> usize {
        self.markets.read().len()
    }

    /// A participant's active (yes, no) stakes in one market
    pub fn stake_of(&self, market_id: u64, participant: &str) -> VenueResult<(u64, u64)> {
        let store = self.markets.read();
        let market = store.get(market_id)?;
        Ok((
            market.stakes.stake_of(Side::Yes, participant),
            market.stakes.stake_of(Side::No, participant),
        ))
    }

    /// Current operator identity
    pub fn operator(&self) -> String {
        self.operator.current()
    }

    /// Reassign the operator slot; current holder only
    pub fn transfer_operator(&self, caller: &str, new_operator: &str) -> VenueResult<()> {
        self.operator.transfer(caller, new_operator)
    }

    /// Receipt of a settled claim
    pub fn claim_receipt(&self, claim_id: &str) -> Option<ClaimReceipt> {
        self.receipts.get(claim_id)
    }

    /// All of a participant's claim receipts, oldest first
    pub fn claim_receipts_for(&self, participant: &str) -> Vec<ClaimReceipt> {
        self.receipts.for_participant(participant)
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn enter(&self) -> VenueResult<EntryGuard<'_>> {
        if self.entered.swap(true, Ordering::SeqCst) {
            return Err(VenueError::ReentrantCall);
        }
        Ok(EntryGuard(&self.entered))
    }

    fn pay_house(&self, house_share: u64) -> VenueResult<Option<PaymentId>> {
        if house_share == 0 {
            return Ok(None);
        }
        self.custody
            .pay(&self.house_account, house_share)
            .map(Some)
            .map_err(|e| VenueError::TransferFailed(e.to_string()))
    }

    fn rollback(store: &mut MarketStore, caller: &str, undo: &[(u64, Side, u64)]) {
        for (id, side, prev) in undo {
            if let Ok(market) = store.get_mut(*id) {
                market.stakes.restore_stake(*side, caller, *prev);
            }
        }
    }
}

/// RAII re-entrancy flag release
struct EntryGuard<'a>(&'a AtomicBool);

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// stake * balance / pool_total, floor, widened to u128
fn proportional_reward(stake: u64, balance: u64, pool_total: u64) -> VenueResult<u64> {
    let reward = (stake as u128) * (balance as u128) / (pool_total as u128);
    // stake <= pool_total, so reward <= balance and fits
    u64::try_from(reward)
        .map_err(|_| VenueError::InvariantViolation("reward exceeds u64".to_string()))
}

/// Floor the house share, give the participant the remainder
fn split_fee(total_reward: u64, house_fee_percent: u8) -> Payout {
    let house_share = ((total_reward as u128) * (house_fee_percent as u128) / 100) as u64;
    Payout {
        user_share: total_reward - house_share,
        house_share,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proportional_reward_floor_division() {
        assert_eq!(proportional_reward(100, 400, 100).unwrap(), 400);
        assert_eq!(proportional_reward(1, 100, 3).unwrap(), 33);
        assert_eq!(proportional_reward(0, 100, 3).unwrap(), 0);
    }

    #[test]
    fn test_proportional_reward_survives_large_values() {
        // u64::MAX stake and balance would overflow 64-bit intermediate math
        let reward = proportional_reward(u64::MAX, u64::MAX, u64::MAX).unwrap();
        assert_eq!(reward, u64::MAX);
    }

    #[test]
    fn test_split_fee_exact() {
        let payout = split_fee(1_000, 5);
        assert_eq!(payout.house_share, 50);
        assert_eq!(payout.user_share, 950);
        assert_eq!(payout.total(), 1_000);

        // Floor on the house side, remainder to the participant
        let payout = split_fee(999, 10);
        assert_eq!(payout.house_share, 99);
        assert_eq!(payout.user_share, 900);
        assert_eq!(payout.total(), 999);
    }

    #[test]
    fn test_split_fee_bounds() {
        assert_eq!(split_fee(1_000, 0), Payout { user_share: 1_000, house_share: 0 });
        assert_eq!(split_fee(1_000, 100), Payout { user_share: 0, house_share: 1_000 });
    }
}
