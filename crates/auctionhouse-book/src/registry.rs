//! The set of collections the engine accepts listings from.

use std::collections::HashSet;

use auctionhouse_types::CollectionId;

/// Immutable registry populated once at construction.
///
/// Duplicates in the input are ignored; declaration order of first
/// appearance is kept for [`CollectionRegistry::collections`].
#[derive(Debug, Clone)]
pub struct CollectionRegistry {
    members: HashSet<CollectionId>,
    ordered: Vec<CollectionId>,
}

impl CollectionRegistry {
    #[must_use]
    pub fn new(collections: impl IntoIterator<Item = CollectionId>) -> Self {
        let mut members = HashSet::new();
        let mut ordered = Vec::new();
        for collection in collections {
            if members.insert(collection) {
                ordered.push(collection);
            }
        }
        Self { members, ordered }
    }

    /// Returns `true` if listings from `collection` are accepted.
    #[must_use]
    pub fn is_supported(&self, collection: &CollectionId) -> bool {
        self.members.contains(collection)
    }

    /// Supported collections in declaration order.
    #[must_use]
    pub fn collections(&self) -> &[CollectionId] {
        &self.ordered
    }

    /// Number of distinct supported collections.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Returns `true` if no collection is supported.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
