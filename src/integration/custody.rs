// ============================================================================
// CUSTODY COLLABORATOR - Funds Ledger
// ============================================================================
//
// The venue never holds numbers it calls money; it asks the custody
// collaborator to move funds and to report the live balance it has in
// custody. Inbound deposits are atomic with the bet that triggers them;
// outbound payments succeed or fail synchronously, and an executed
// payment can be voided when the other half of a claim pair fails.
//
// `InMemoryCustody` is the in-process implementation: a lock-free
// account map plus a venue pool counter, with a transfer history for
// audits and failure injection for rollback tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Identifier of one executed outbound payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentId(pub String);

/// Custody errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustodyError {
    #[error("insufficient funds: {account} has {available}, needs {required}")]
    InsufficientFunds {
        account: String,
        available: u64,
        required: u64,
    },

    #[error("payment rejected: {0}")]
    Rejected(String),
}

/// Funds-custody collaborator
pub trait Custody: Send + Sync {
    /// Total funds currently held in the venue's custody
    fn balance(&self) -> u64;

    /// Move `amount` from the caller's account into venue custody.
    /// Atomic with the bet that triggers it: failure means no deposit.
    fn accept_deposit(&self, from: &str, amount: u64) -> Result<(), CustodyError>;

    /// Move `amount` out of venue custody to `dest`. Synchronous:
    /// custody decreases only on success.
    fn pay(&self, dest: &str, amount: u64) -> Result<PaymentId, CustodyError>;

    /// Reverse an executed payment (compensation when the second
    /// transfer of a claim pair fails). Best effort; idempotent.
    fn void(&self, payment: &PaymentId);
}

/// One entry in the custody transfer history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    pub payment_id: String,
    pub kind: TransferKind,
    pub account: String,
    pub amount: u64,
    pub timestamp: u64,
    pub voided: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    Deposit,
    Payout,
}

/// In-process custody ledger
///
/// # Thread Safety
/// Account reads are lock-free via DashMap; the pool counter is atomic.
/// The venue serializes mutations, so no cross-account transaction
/// machinery is needed here.
pub struct InMemoryCustody {
    /// External account balances: account → amount
    accounts: DashMap<String, u64>,

    /// Funds currently in venue custody
    pool: AtomicU64,

    /// Transfer history, newest last
    history: Mutex<Vec<TransferRecord>>,

    /// Test hook: payments to this destination fail
    fail_payments_to: Mutex<Option<String>>,
}

impl InMemoryCustody {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            pool: AtomicU64::new(0),
            history: Mutex::new(Vec::new()),
            fail_payments_to: Mutex::new(None),
        }
    }

    /// Seed an external account (test/genesis funding)
    pub fn fund(&self, account: &str, amount: u64) {
        *self.accounts.entry(account.to_string()).or_insert(0) += amount;
    }

    /// An external account's balance
    pub fn account_balance(&self, account: &str) -> u64 {
        self.accounts.get(account).map(|v| *v).unwrap_or(0)
    }

    /// Transfer history snapshot
    pub fn history(&self) -> Vec<TransferRecord> {
        self.history.lock().clone()
    }

    /// Make every payment to `dest` fail until cleared with `None`
    pub fn set_fail_payments_to(&self, dest: Option<&str>) {
        *self.fail_payments_to.lock() = dest.map(|d| d.to_string());
    }

    fn record(&self, kind: TransferKind, account: &str, amount: u64) -> PaymentId {
        let payment_id = uuid::Uuid::new_v4().to_string();
        self.history.lock().push(TransferRecord {
            payment_id: payment_id.clone(),
            kind,
            account: account.to_string(),
            amount,
            timestamp: current_timestamp(),
            voided: false,
        });
        PaymentId(payment_id)
    }
}

impl Default for InMemoryCustody {
    fn default() -> Self {
        Self::new()
    }
}

impl Custody for InMemoryCustody {
    fn balance(&self) -> u64 {
        self.pool.load(Ordering::SeqCst)
    }

    fn accept_deposit(&self, from: &str, amount: u64) -> Result<(), CustodyError> {
        let mut account = self.accounts.entry(from.to_string()).or_insert(0);
        if *account < amount {
            return Err(CustodyError::InsufficientFunds {
                account: from.to_string(),
                available: *account,
                required: amount,
            });
        }
        *account -= amount;
        drop(account);

        self.pool.fetch_add(amount, Ordering::SeqCst);
        self.record(TransferKind::Deposit, from, amount);

        info!(from = %from, amount = amount, pool = self.balance(), "Deposit accepted");
        Ok(())
    }

    fn pay(&self, dest: &str, amount: u64) -> Result<PaymentId, CustodyError> {
        if let Some(blocked) = self.fail_payments_to.lock().as_deref() {
            if blocked == dest {
                return Err(CustodyError::Rejected(format!(
                    "payments to {} are failing",
                    dest
                )));
            }
        }

        let pool = self.pool.load(Ordering::SeqCst);
        if pool < amount {
            return Err(CustodyError::InsufficientFunds {
                account: "venue_pool".to_string(),
                available: pool,
                required: amount,
            });
        }

        self.pool.fetch_sub(amount, Ordering::SeqCst);
        *self.accounts.entry(dest.to_string()).or_insert(0) += amount;
        let payment_id = self.record(TransferKind::Payout, dest, amount);

        info!(dest = %dest, amount = amount, pool = self.balance(), "Payment executed");
        Ok(payment_id)
    }

    fn void(&self, payment: &PaymentId) {
        let mut history = self.history.lock();
        let Some(entry) = history
            .iter_mut()
            .find(|r| r.payment_id == payment.0 && r.kind == TransferKind::Payout && !r.voided)
        else {
            warn!(payment_id = %payment.0, "Void requested for unknown or already-voided payment");
            return;
        };

        entry.voided = true;
        let (account, amount) = (entry.account.clone(), entry.amount);
        drop(history);

        if let Some(mut balance) = self.accounts.get_mut(&account) {
            *balance = balance.saturating_sub(amount);
        }
        self.pool.fetch_add(amount, Ordering::SeqCst);

        warn!(payment_id = %payment.0, account = %account, amount = amount, "Payment voided");
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_moves_funds_into_pool() {
        let custody = InMemoryCustody::new();
        custody.fund("bb_alice", 1_000);

        custody.accept_deposit("bb_alice", 400).unwrap();
        assert_eq!(custody.account_balance("bb_alice"), 600);
        assert_eq!(custody.balance(), 400);
    }

    #[test]
    fn test_deposit_fails_without_funds() {
        let custody = InMemoryCustody::new();
        custody.fund("bb_alice", 100);

        let err = custody.accept_deposit("bb_alice", 400).unwrap_err();
        assert!(matches!(err, CustodyError::InsufficientFunds { .. }));

        // Nothing moved
        assert_eq!(custody.account_balance("bb_alice"), 100);
        assert_eq!(custody.balance(), 0);
    }

    #[test]
    fn test_pay_moves_funds_out_of_pool() {
        let custody = InMemoryCustody::new();
        custody.fund("bb_alice", 500);
        custody.accept_deposit("bb_alice", 500).unwrap();

        custody.pay("bb_bob", 200).unwrap();
        assert_eq!(custody.balance(), 300);
        assert_eq!(custody.account_balance("bb_bob"), 200);
    }

    #[test]
    fn test_pay_rejects_overdraw() {
        let custody = InMemoryCustody::new();
        let err = custody.pay("bb_bob", 1).unwrap_err();
        assert!(matches!(err, CustodyError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_void_reverses_payment_once() {
        let custody = InMemoryCustody::new();
        custody.fund("bb_alice", 500);
        custody.accept_deposit("bb_alice", 500).unwrap();

        let payment = custody.pay("bb_bob", 200).unwrap();
        custody.void(&payment);

        assert_eq!(custody.balance(), 500);
        assert_eq!(custody.account_balance("bb_bob"), 0);

        // Idempotent: voiding again changes nothing
        custody.void(&payment);
        assert_eq!(custody.balance(), 500);
    }

    #[test]
    fn test_failure_injection() {
        let custody = InMemoryCustody::new();
        custody.fund("bb_alice", 500);
        custody.accept_deposit("bb_alice", 500).unwrap();

        custody.set_fail_payments_to(Some("bb_bob"));
        assert!(custody.pay("bb_bob", 100).is_err());
        assert!(custody.pay("bb_carol", 100).is_ok());

        custody.set_fail_payments_to(None);
        assert!(custody.pay("bb_bob", 100).is_ok());
    }

    #[test]
    fn test_history_records_kinds() {
        let custody = InMemoryCustody::new();
        custody.fund("bb_alice", 500);
        custody.accept_deposit("bb_alice", 500).unwrap();
        custody.pay("bb_bob", 100).unwrap();

        let history = custody.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kind, TransferKind::Deposit);
        assert_eq!(history[1].kind, TransferKind::Payout);
        assert!(!history[1].voided);
    }
}
