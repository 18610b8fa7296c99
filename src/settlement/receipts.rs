//! Claim Receipts - Audit Trail of Settled Claims
//!
//! Every successful claim appends a receipt: which markets paid, the
//! aggregate reward, and the user/house split. Receipts are an audit
//! artifact for hosts and observers; the settlement arithmetic never
//! consults them. Double-claim prevention lives in the stake book
//! (zeroed stakes), not here.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// One market's contribution to a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardLine {
    pub market_id: u64,
    pub reward: u64,
}

/// Record of one settled claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimReceipt {
    /// Deterministic id: sha256(participant|sequence|total_reward)
    pub claim_id: String,
    pub participant: String,
    pub lines: Vec<RewardLine>,
    pub total_reward: u64,
    pub user_share: u64,
    pub house_share: u64,
    pub claimed_at: u64,
}

/// Registry of claim receipts
#[derive(Debug, Default)]
pub struct ClaimLedger {
    /// claim_id → receipt
    records: RwLock<HashMap<String, ClaimReceipt>>,
    /// participant → claim_ids, oldest first
    by_participant: RwLock<HashMap<String, Vec<String>>>,
    /// Monotonic claim sequence, feeds the id hash
    sequence: AtomicU64,
}

impl ClaimLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a receipt for a settled claim, returning its id
    pub fn record(
        &self,
        participant: &str,
        lines: Vec<RewardLine>,
        total_reward: u64,
        user_share: u64,
        house_share: u64,
    ) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let claim_id = generate_claim_id(participant, sequence, total_reward);

        let receipt = ClaimReceipt {
            claim_id: claim_id.clone(),
            participant: participant.to_string(),
            lines,
            total_reward,
            user_share,
            house_share,
            claimed_at: current_timestamp(),
        };

        self.records
            .write()
            .insert(claim_id.clone(), receipt);
        self.by_participant
            .write()
            .entry(participant.to_string())
            .or_default()
            .push(claim_id.clone());

        claim_id
    }

    /// Look up one receipt by id
    pub fn get(&self, claim_id: &str) -> Option<ClaimReceipt> {
        self.records.read().get(claim_id).cloned()
    }

    /// All receipts for a participant, oldest first
    pub fn for_participant(&self, participant: &str) -> Vec<ClaimReceipt> {
        let records = self.records.read();
        self.by_participant
            .read()
            .get(participant)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| records.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

/// Generate a deterministic claim id
pub fn generate_claim_id(participant: &str, sequence: u64, total_reward: u64) -> String {
    use sha2::{Digest, Sha256};
    let data = format!("{}|{}|{}", participant, sequence, total_reward);
    let hash = Sha256::digest(data.as_bytes());
    hex::encode(hash)
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
    fn test_record_and_get() {
        let ledger = ClaimLedger::new();

        let claim_id = ledger.record(
            "bb_alice",
            vec![RewardLine {
                market_id: 0,
                reward: 400,
            }],
            400,
            380,
            20,
        );

        let receipt = ledger.get(&claim_id).unwrap();
        assert_eq!(receipt.participant, "bb_alice");
        assert_eq!(receipt.total_reward, 400);
        assert_eq!(receipt.user_share + receipt.house_share, 400);
        assert_eq!(receipt.lines.len(), 1);
    }

    #[test]
    fn test_for_participant_ordered() {
        let ledger = ClaimLedger::new();
        ledger.record("bb_alice", vec![], 100, 95, 5);
        ledger.record("bb_bob", vec![], 50, 48, 2);
        ledger.record("bb_alice", vec![], 200, 190, 10);

        let receipts = ledger.for_participant("bb_alice");
        assert_eq!(receipts.len(), 2);
        assert_eq!(receipts[0].total_reward, 100);
        assert_eq!(receipts[1].total_reward, 200);

        assert!(ledger.for_participant("bb_nobody").is_empty());
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_claim_ids_deterministic_and_distinct() {
        let a = generate_claim_id("bb_alice", 0, 400);
        let b = generate_claim_id("bb_alice", 0, 400);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        // Different sequence, different id
        let c = generate_claim_id("bb_alice", 1, 400);
        assert_ne!(a, c);
    }
}
