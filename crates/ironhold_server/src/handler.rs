//! # Transaction Handler
//!
//! Entry point for client inventory requests.
//!
//! ```text
//! TransactionRequest ──> InventoryTransaction / CraftingTransaction
//!                              │ validate
//!                              │ execute (GateChain)
//!                              ▼
//!                        HandlerOutcome ──> EventBus
//! ```
//!
//! A rejected request leaves every slot as it was; the caller resyncs the
//! client's view of the affected inventories.

use ironhold_inventory::{
    Actor, CommitGate, CraftingTransaction, EventSender, ExecuteOutcome, GateChain,
    InventoryAction, InventoryEvent, InventoryTransaction, RecipeBook, RecipeCatalog, RecipeId,
    SlotStore, TransactionLimits,
};

use crate::error::{ServerError, ServerResult};
use crate::player::Player;

/// One client request.
#[derive(Clone, Debug)]
pub enum TransactionRequest {
    /// Moves, swaps, drops: items must be conserved.
    Normal {
        /// Raw slot changes.
        actions: Vec<InventoryAction>,
    },
    /// A crafting operation.
    Crafting {
        /// Raw slot changes.
        actions: Vec<InventoryAction>,
        /// Recipe the client claims to craft; searched for when absent.
        recipe_id: Option<RecipeId>,
        /// Repetitions the client claims; inferred when absent.
        repetitions: Option<u32>,
    },
}

/// What happened to a request.
#[derive(Debug)]
pub enum HandlerOutcome {
    /// Slots written.
    Committed {
        /// Number of slots written.
        slots_changed: usize,
    },
    /// A gate vetoed; nothing written.
    Cancelled,
    /// Validation or commit failed; nothing written.
    Rejected(ServerError),
}

impl HandlerOutcome {
    /// Returns true if the slots were written.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Validates and commits client requests.
pub struct TransactionHandler {
    catalog: RecipeBook,
    gates: GateChain,
    limits: TransactionLimits,
    events: EventSender,
}

impl TransactionHandler {
    /// Creates a handler with no gates.
    #[must_use]
    pub fn new(catalog: RecipeBook, limits: TransactionLimits, events: EventSender) -> Self {
        Self {
            catalog,
            gates: GateChain::new(),
            limits,
            events,
        }
    }

    /// Registers a commit gate. Gates run in registration order.
    pub fn add_gate(&mut self, gate: impl CommitGate + 'static) {
        self.gates.push(gate);
    }

    /// The recipe catalog.
    #[must_use]
    pub fn catalog(&self) -> &RecipeBook {
        &self.catalog
    }

    /// Handles one request from `player` against `store`.
    pub fn handle<S: SlotStore + ?Sized>(
        &mut self,
        player: &Player,
        store: &mut S,
        request: TransactionRequest,
    ) -> HandlerOutcome {
        let result = match request {
            TransactionRequest::Normal { actions } => self.run_normal(player, store, actions),
            TransactionRequest::Crafting {
                actions,
                recipe_id,
                repetitions,
            } => self.run_crafting(player, store, actions, recipe_id, repetitions),
        };

        match result {
            Ok(ExecuteOutcome::Committed { slots_changed }) => {
                HandlerOutcome::Committed { slots_changed }
            }
            Ok(ExecuteOutcome::Cancelled) => {
                tracing::warn!(actor = player.id(), "Transaction vetoed");
                HandlerOutcome::Cancelled
            }
            Err(err) => {
                tracing::warn!(actor = player.id(), error = %err, "Transaction rejected");
                self.events.send(InventoryEvent::TransactionRejected {
                    actor: player.id(),
                    reason: err.to_string(),
                });
                HandlerOutcome::Rejected(err)
            }
        }
    }

    fn run_normal<S: SlotStore + ?Sized>(
        &mut self,
        player: &Player,
        store: &mut S,
        actions: Vec<InventoryAction>,
    ) -> ServerResult<ExecuteOutcome> {
        let mut tx = InventoryTransaction::new(player, actions).with_limits(self.limits);
        tx.validate(&*store)?;
        let outcome = tx.execute(store, &mut self.gates)?;
        if outcome.is_committed() {
            publish_slots(&self.events, player, tx.actions());
        }
        Ok(outcome)
    }

    fn run_crafting<S: SlotStore + ?Sized>(
        &mut self,
        player: &Player,
        store: &mut S,
        actions: Vec<InventoryAction>,
        recipe_id: Option<RecipeId>,
        repetitions: Option<u32>,
    ) -> ServerResult<ExecuteOutcome> {
        let catalog = &self.catalog;
        let mut tx = CraftingTransaction::new(player, catalog, actions).with_limits(self.limits);
        if let Some(id) = recipe_id {
            let recipe = catalog.recipe(id).ok_or(ServerError::UnknownRecipe(id))?;
            tx = tx.with_recipe(recipe);
        }
        if let Some(repetitions) = repetitions {
            tx = tx.with_repetitions(repetitions);
        }

        tx.validate(&*store)?;
        let outcome = tx.execute(store, &mut self.gates)?;
        if outcome.is_committed() {
            publish_slots(&self.events, player, tx.transaction().actions());
            if let (Some(recipe), Some(repetitions)) = (tx.recipe(), tx.repetitions()) {
                self.events.send(InventoryEvent::ItemCrafted {
                    actor: player.id(),
                    recipe_id: recipe.id(),
                    repetitions,
                });
            }
        }
        Ok(outcome)
    }
}

fn publish_slots(events: &EventSender, player: &Player, actions: &[InventoryAction]) {
    for action in actions {
        events.send(InventoryEvent::SlotChanged {
            actor: player.id(),
            inventory: action.inventory(),
            slot: action.slot(),
            item: action.target().clone(),
        });
    }
}

impl std::fmt::Debug for TransactionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionHandler")
            .field("recipes", &self.catalog.len())
            .field("gates", &self.gates)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}
