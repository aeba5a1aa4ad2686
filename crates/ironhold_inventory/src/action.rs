//! # Inventory Actions
//!
//! An [`InventoryAction`] is one requested slot change: "slot S of inventory
//! I goes from `source` to `target`". Actions are built by the packet layer
//! from raw client input and handed to a transaction, which owns them.

use std::fmt;

use crate::error::{TransactionError, TransactionResult};
use crate::inventory::{InventoryId, SlotStore};
use crate::item::Item;

/// Address of one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotRef {
    /// Inventory holding the slot.
    pub inventory: InventoryId,
    /// Slot index within the inventory.
    pub slot: usize,
}

impl SlotRef {
    /// Creates a slot address.
    #[inline]
    #[must_use]
    pub const fn new(inventory: InventoryId, slot: usize) -> Self {
        Self { inventory, slot }
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.inventory, self.slot)
    }
}

/// A single-slot delta.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InventoryAction {
    slot: SlotRef,
    source: Item,
    target: Item,
}

impl InventoryAction {
    /// Creates an action changing `slot` of `inventory` from `source` to `target`.
    #[must_use]
    pub fn new(inventory: InventoryId, slot: usize, source: Item, target: Item) -> Self {
        Self {
            slot: SlotRef::new(inventory, slot),
            source,
            target,
        }
    }

    /// Inventory the action writes to.
    #[inline]
    #[must_use]
    pub const fn inventory(&self) -> InventoryId {
        self.slot.inventory
    }

    /// Slot index the action writes to.
    #[inline]
    #[must_use]
    pub const fn slot(&self) -> usize {
        self.slot.slot
    }

    /// Full slot address.
    #[inline]
    #[must_use]
    pub const fn slot_ref(&self) -> SlotRef {
        self.slot
    }

    /// Slot contents before the action.
    #[inline]
    #[must_use]
    pub const fn source(&self) -> &Item {
        &self.source
    }

    /// Slot contents after the action.
    #[inline]
    #[must_use]
    pub const fn target(&self) -> &Item {
        &self.target
    }

    /// Returns true if the action changes nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.source.equals_exact(&self.target)
    }

    /// Splits the action into its parts.
    #[must_use]
    pub fn into_parts(self) -> (SlotRef, Item, Item) {
        (self.slot, self.source, self.target)
    }

    /// Checks the action against live slot state.
    ///
    /// The slot must exist, currently hold exactly `source`, and be able to
    /// hold `target`.
    ///
    /// # Errors
    ///
    /// `UnknownSlot`, `SlotMismatch` or `StackLimitExceeded`.
    pub fn validate<S: SlotStore + ?Sized>(&self, store: &S) -> TransactionResult<()> {
        let actual = store
            .slot(self.inventory(), self.slot())
            .ok_or(TransactionError::UnknownSlot(self.slot))?;
        if !actual.equals_exact(&self.source) {
            return Err(TransactionError::SlotMismatch {
                slot: self.slot,
                expected: self.source.clone(),
                actual: actual.clone(),
            });
        }
        let max = store
            .max_stack_size(self.inventory())
            .ok_or(TransactionError::UnknownSlot(self.slot))?;
        if self.target.count() > max {
            return Err(TransactionError::StackLimitExceeded {
                slot: self.slot,
                count: self.target.count(),
                max,
            });
        }
        Ok(())
    }
}

impl fmt::Display for InventoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.slot, self.source, self.target)
    }
}
