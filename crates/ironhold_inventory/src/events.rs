//! # Inventory Events
//!
//! Post-commit notifications for systems outside the simulation step.
//!
//! ```text
//! ┌──────────────┐  commit  ┌─────────────┐        ┌──────────────┐
//! │ Transaction  │─────────>│  EventBus   │───────>│ Network sync │
//! │   handler    │          │  (bounded)  │───────>│ Statistics   │
//! └──────────────┘          └─────────────┘        └──────────────┘
//! ```
//!
//! Events describe what already happened. Vetoing belongs to the
//! [`CommitGate`](crate::gate::CommitGate), which runs before any write.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::actor::ActorId;
use crate::inventory::InventoryId;
use crate::item::Item;
use crate::recipe::RecipeId;

/// Things that happened to inventories.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InventoryEvent {
    /// A committed transaction wrote a slot.
    SlotChanged {
        /// Actor whose transaction wrote the slot.
        actor: ActorId,
        /// Inventory holding the slot.
        inventory: InventoryId,
        /// Slot index.
        slot: usize,
        /// New slot contents.
        item: Item,
    },

    /// A crafting transaction committed.
    ItemCrafted {
        /// Actor that crafted.
        actor: ActorId,
        /// Recipe that was crafted.
        recipe_id: RecipeId,
        /// How many times.
        repetitions: u32,
    },

    /// A transaction failed validation or commit. The client needs a resync.
    TransactionRejected {
        /// Actor whose transaction failed.
        actor: ActorId,
        /// Rendered error.
        reason: String,
    },
}

/// Bounded multi-producer, multi-consumer channel for [`InventoryEvent`]s.
pub struct EventBus {
    sender: Sender<InventoryEvent>,
    receiver: Receiver<InventoryEvent>,
}

impl EventBus {
    /// Creates a new event bus holding at most `capacity` undelivered events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Creates a sender handle.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Creates a receiver handle.
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }
}

/// Handle for publishing events.
#[derive(Clone, Debug)]
pub struct EventSender {
    sender: Sender<InventoryEvent>,
}

impl EventSender {
    /// Publishes an event without blocking.
    ///
    /// Returns `false` and drops the event if the channel is full or every
    /// receiver is gone.
    #[inline]
    pub fn send(&self, event: InventoryEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Inventory event channel full, dropping event");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Handle for consuming events.
#[derive(Clone, Debug)]
pub struct EventReceiver {
    receiver: Receiver<InventoryEvent>,
}

impl EventReceiver {
    /// Receives all pending events.
    #[inline]
    pub fn drain(&self) -> Vec<InventoryEvent> {
        self.receiver.try_iter().collect()
    }

    /// Receives one event, if any is pending.
    #[inline]
    pub fn try_recv(&self) -> Option<InventoryEvent> {
        self.receiver.try_recv().ok()
    }

    /// Number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}
