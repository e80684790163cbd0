//! In-memory collaborators for tests.
//! **Never use in production.**

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use auctionhouse_types::{AccountId, Amount, CollaboratorError, CollectionId, ItemId, Timestamp};

use crate::clock::Clock;
use crate::collaborator::{FundsGateway, ItemCustodian};

/// Item collections held in memory, with ERC-721-like approvals.
#[derive(Debug, Default)]
pub struct InMemoryCustody {
    owners: HashMap<(CollectionId, ItemId), AccountId>,
    approvals: HashSet<(CollectionId, ItemId, AccountId)>,
    fail_transfers: bool,
    transfers: Vec<(CollectionId, AccountId, AccountId, ItemId)>,
}

impl InMemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or overwrite) `item_id` owned by `owner`.
    pub fn mint(&mut self, collection: CollectionId, item_id: ItemId, owner: AccountId) {
        self.owners.insert((collection, item_id), owner);
    }

    /// Grant `spender` transfer approval for `item_id`.
    pub fn approve(&mut self, collection: CollectionId, item_id: ItemId, spender: AccountId) {
        self.approvals.insert((collection, item_id, spender));
    }

    /// Make every subsequent transfer fail.
    pub fn set_fail_transfers(&mut self, fail: bool) {
        self.fail_transfers = fail;
    }

    /// Successful transfers, oldest first.
    pub fn transfers(&self) -> &[(CollectionId, AccountId, AccountId, ItemId)] {
        &self.transfers
    }
}

impl ItemCustodian for InMemoryCustody {
    fn owner_of(&self, collection: CollectionId, item_id: ItemId) -> Option<AccountId> {
        self.owners.get(&(collection, item_id)).copied()
    }

    fn is_approved_for_transfer(
        &self,
        collection: CollectionId,
        item_id: ItemId,
        spender: AccountId,
    ) -> bool {
        self.approvals.contains(&(collection, item_id, spender))
    }

    fn transfer(
        &mut self,
        collection: CollectionId,
        from: AccountId,
        to: AccountId,
        item_id: ItemId,
    ) -> Result<(), CollaboratorError> {
        if self.fail_transfers {
            return Err(CollaboratorError::new("transfer rejected by collection"));
        }
        let owner = self
            .owners
            .get_mut(&(collection, item_id))
            .ok_or_else(|| CollaboratorError::new(format!("item {item_id} does not exist")))?;
        if *owner != from {
            return Err(CollaboratorError::new(format!(
                "{from} no longer owns item {item_id}"
            )));
        }
        *owner = to;
        // Approvals do not survive a change of owner.
        self.approvals
            .retain(|(c, i, _)| !(*c == collection && *i == item_id));
        self.transfers.push((collection, from, to, item_id));
        Ok(())
    }
}

/// Funds gateway that records payouts.
#[derive(Debug, Default)]
pub struct RecordingFunds {
    payouts: Vec<(AccountId, Amount)>,
    fail: bool,
}

impl RecordingFunds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent payout fail (or succeed again).
    pub fn set_fail(&mut self, fail: bool) {
        self.fail = fail;
    }

    /// Successful payouts, oldest first.
    pub fn payouts(&self) -> &[(AccountId, Amount)] {
        &self.payouts
    }

    /// Total paid to `account` so far.
    pub fn paid_to(&self, account: &AccountId) -> Amount {
        self.payouts
            .iter()
            .filter(|(to, _)| to == account)
            .map(|(_, amount)| amount)
            .sum()
    }
}

impl FundsGateway for RecordingFunds {
    fn pay(&mut self, to: AccountId, amount: Amount) -> Result<(), CollaboratorError> {
        if self.fail {
            return Err(CollaboratorError::new(format!("recipient {to} rejected payment")));
        }
        self.payouts.push((to, amount));
        Ok(())
    }
}

/// A clock the test controls. Clones share the same reading.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self(Arc::new(AtomicU64::new(start)))
    }

    /// Jump to an absolute reading.
    pub fn set(&self, now: Timestamp) {
        self.0.store(now, Ordering::SeqCst);
    }

    /// Move the reading forward by `secs`.
    pub fn advance(&self, secs: u64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.0.load(Ordering::SeqCst)
    }
}
