//! Seams to the systems the engine does not own.
//!
//! The engine validates against and transfers through an [`ItemCustodian`]
//! (the item collections) and releases value through a [`FundsGateway`].
//! Both are called only after the engine has committed its own state.

use auctionhouse_types::{AccountId, Amount, CollaboratorError, CollectionId, ItemId};

/// Ownership and transfer of items in external collections.
pub trait ItemCustodian {
    /// Current owner of `item_id`, or `None` if the item does not exist.
    fn owner_of(&self, collection: CollectionId, item_id: ItemId) -> Option<AccountId>;

    /// Whether `spender` may transfer `item_id` on the owner's behalf.
    fn is_approved_for_transfer(
        &self,
        collection: CollectionId,
        item_id: ItemId,
        spender: AccountId,
    ) -> bool;

    /// Move `item_id` from `from` to `to`. Must either fully succeed or
    /// leave the item untouched.
    fn transfer(
        &mut self,
        collection: CollectionId,
        from: AccountId,
        to: AccountId,
        item_id: ItemId,
    ) -> Result<(), CollaboratorError>;
}

/// Release of value held by the engine.
pub trait FundsGateway {
    /// Send `amount` to `to`. Must either fully succeed or send nothing.
    fn pay(&mut self, to: AccountId, amount: Amount) -> Result<(), CollaboratorError>;
}
