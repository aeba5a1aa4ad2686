//! # Inventory System
//!
//! Pre-allocated inventory slots for items.
//! All slots are allocated when the inventory is created; slot writes never
//! allocate.
//!
//! Transactions do not talk to [`Inventory`] directly. They read and write
//! through [`SlotStore`], which [`InventorySet`] implements for a group of
//! inventories (player inventory, crafting grid, open chest, ...).

use std::collections::HashMap;
use std::fmt;

use crate::action::SlotRef;
use crate::error::{InventoryError, InventoryResult, TransactionError, TransactionResult};
use crate::item::{Item, ItemId};

/// Identifier of an inventory within a [`SlotStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InventoryId(pub u32);

impl fmt::Display for InventoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inv#{}", self.0)
    }
}

/// Slot-level access used by transactions.
///
/// Reads happen during validation, writes only during commit.
pub trait SlotStore {
    /// Returns the item in a slot, or `None` if the slot does not exist.
    fn slot(&self, inventory: InventoryId, slot: usize) -> Option<&Item>;

    /// Replaces the item in a slot and returns the previous contents.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::UnknownSlot` if the slot does not exist.
    fn set_slot(&mut self, inventory: InventoryId, slot: usize, item: Item) -> TransactionResult<Item>;

    /// Maximum stack size of an inventory, or `None` if it does not exist.
    fn max_stack_size(&self, inventory: InventoryId) -> Option<u32>;
}

/// A fixed-size inventory.
#[derive(Clone, Debug)]
pub struct Inventory {
    id: InventoryId,
    /// Pre-allocated slots.
    slots: Vec<Item>,
    /// Largest stack a single slot may hold.
    max_stack: u32,
}

impl Inventory {
    /// Creates a new empty inventory with pre-allocated slots.
    #[must_use]
    pub fn new(id: InventoryId, size: usize, max_stack: u32) -> Self {
        Self {
            id,
            slots: vec![Item::air(); size],
            max_stack,
        }
    }

    /// Identifier of this inventory.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> InventoryId {
        self.id
    }

    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Largest stack a single slot may hold.
    #[inline]
    #[must_use]
    pub const fn max_stack_size(&self) -> u32 {
        self.max_stack
    }

    /// Gets the item at a specific slot.
    #[inline]
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&Item> {
        self.slots.get(slot)
    }

    /// Replaces the item at a slot, returning the previous contents.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::UnknownSlot` if `slot` is out of range.
    pub fn set(&mut self, slot: usize, item: Item) -> TransactionResult<Item> {
        let id = self.id;
        let current = self
            .slots
            .get_mut(slot)
            .ok_or(TransactionError::UnknownSlot(SlotRef::new(id, slot)))?;
        Ok(std::mem::replace(current, item))
    }

    /// Counts the total number of a specific item type across all slots.
    #[must_use]
    pub fn count_item(&self, item_id: ItemId) -> u32 {
        self.slots
            .iter()
            .filter(|s| s.id() == item_id)
            .fold(0u32, |total, s| total.saturating_add(s.count()))
    }

    /// Finds the first empty slot.
    #[must_use]
    pub fn find_empty_slot(&self) -> Option<usize> {
        self.slots.iter().position(Item::is_null)
    }

    /// Adds items to the inventory.
    ///
    /// First tops up stacks the item can merge with, then uses empty slots.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Full` if there's no space. The inventory is
    /// left unchanged in that case.
    pub fn add(&mut self, item: &Item) -> InventoryResult<()> {
        if item.is_null() {
            return Ok(());
        }
        let snapshot = self.snapshot();
        let mut remaining = item.count();

        // First, try to add to existing stacks
        for slot in &mut self.slots {
            if remaining == 0 {
                break;
            }
            if !slot.is_null() && slot.can_stack_with(item) && slot.count() < self.max_stack {
                let can_add = (self.max_stack - slot.count()).min(remaining);
                *slot = slot.clone().with_count(slot.count() + can_add);
                remaining -= can_add;
            }
        }

        // Then, use empty slots
        while remaining > 0 {
            let Some(slot_idx) = self.find_empty_slot() else {
                self.restore(&snapshot);
                return Err(InventoryError::Full { amount: remaining });
            };
            let add_count = remaining.min(self.max_stack);
            self.slots[slot_idx] = item.clone().with_count(add_count);
            remaining -= add_count;
        }

        Ok(())
    }

    /// Creates a snapshot of the inventory for rollback.
    #[must_use]
    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            slots: self.slots.clone(),
        }
    }

    /// Restores inventory from a snapshot (rollback).
    pub fn restore(&mut self, snapshot: &InventorySnapshot) {
        self.slots.clone_from(&snapshot.slots);
    }
}

/// Snapshot of inventory state for rollback.
#[derive(Clone, Debug)]
pub struct InventorySnapshot {
    slots: Vec<Item>,
}

/// The inventories a transaction may touch, indexed by ID.
#[derive(Clone, Debug, Default)]
pub struct InventorySet {
    inventories: HashMap<InventoryId, Inventory>,
}

impl InventorySet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an inventory, replacing any inventory with the same ID.
    pub fn insert(&mut self, inventory: Inventory) -> Option<Inventory> {
        self.inventories.insert(inventory.id(), inventory)
    }

    /// Gets an inventory.
    #[must_use]
    pub fn get(&self, id: InventoryId) -> Option<&Inventory> {
        self.inventories.get(&id)
    }

    /// Gets a mutable reference to an inventory.
    pub fn get_mut(&mut self, id: InventoryId) -> Option<&mut Inventory> {
        self.inventories.get_mut(&id)
    }

    /// Removes an inventory (e.g. when a container window closes).
    pub fn remove(&mut self, id: InventoryId) -> Option<Inventory> {
        self.inventories.remove(&id)
    }

    /// Number of inventories in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inventories.len()
    }

    /// Returns true if the set holds no inventories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inventories.is_empty()
    }
}

impl SlotStore for InventorySet {
    fn slot(&self, inventory: InventoryId, slot: usize) -> Option<&Item> {
        self.inventories.get(&inventory)?.get(slot)
    }

    fn set_slot(&mut self, inventory: InventoryId, slot: usize, item: Item) -> TransactionResult<Item> {
        self.inventories
            .get_mut(&inventory)
            .ok_or(TransactionError::UnknownSlot(SlotRef::new(inventory, slot)))?
            .set(slot, item)
    }

    fn max_stack_size(&self, inventory: InventoryId) -> Option<u32> {
        self.inventories.get(&inventory).map(Inventory::max_stack_size)
    }
}
