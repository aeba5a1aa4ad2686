//! # Commit Gate
//!
//! The single point where the outside world can veto a validated transaction.
//!
//! ```text
//! validate() ──> execute() ──> TransactionEvent ──> CommitGate
//!                                                       │
//!                              cancelled? ──yes──> no slot writes
//!                                  │
//!                                  no
//!                                  ▼
//!                          write every slot
//! ```
//!
//! Gates run synchronously inside the simulation step and must not block.
//! They are passed to `execute` explicitly; there is no global registry.

use crate::action::InventoryAction;
use crate::actor::ActorId;
use crate::item::Item;
use crate::recipe::CraftingRecipe;

/// Pre-commit notification describing what a transaction is about to do.
#[derive(Debug)]
pub struct TransactionEvent<'t> {
    actor: ActorId,
    actions: &'t [InventoryAction],
    recipe: Option<&'t dyn CraftingRecipe>,
    repetitions: Option<u32>,
    inputs: &'t [Item],
    outputs: &'t [Item],
    cancelled: bool,
}

impl<'t> TransactionEvent<'t> {
    pub(crate) fn new(
        actor: ActorId,
        actions: &'t [InventoryAction],
        recipe: Option<&'t dyn CraftingRecipe>,
        repetitions: Option<u32>,
        inputs: &'t [Item],
        outputs: &'t [Item],
    ) -> Self {
        Self {
            actor,
            actions,
            recipe,
            repetitions,
            inputs,
            outputs,
            cancelled: false,
        }
    }

    /// Actor the transaction runs for.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// Squashed actions that will be applied.
    #[must_use]
    pub const fn actions(&self) -> &'t [InventoryAction] {
        self.actions
    }

    /// Recipe bound by a crafting transaction.
    #[must_use]
    pub fn recipe(&self) -> Option<&'t dyn CraftingRecipe> {
        self.recipe
    }

    /// Batch multiplier bound by a crafting transaction.
    #[must_use]
    pub const fn repetitions(&self) -> Option<u32> {
        self.repetitions
    }

    /// Net items removed from slots (crafting ingredients).
    #[must_use]
    pub const fn inputs(&self) -> &'t [Item] {
        self.inputs
    }

    /// Net items placed into slots (crafting results).
    #[must_use]
    pub const fn outputs(&self) -> &'t [Item] {
        self.outputs
    }

    /// Vetoes the commit.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Sets or clears the veto.
    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }

    /// Returns true if some gate vetoed the commit.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Decides whether a validated transaction may commit.
pub trait CommitGate {
    /// Inspects the event and calls [`TransactionEvent::cancel`] to veto.
    fn on_pre_commit(&mut self, event: &mut TransactionEvent<'_>);
}

impl<F> CommitGate for F
where
    F: FnMut(&mut TransactionEvent<'_>),
{
    fn on_pre_commit(&mut self, event: &mut TransactionEvent<'_>) {
        self(event);
    }
}

/// Gate that never vetoes.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl CommitGate for AllowAll {
    fn on_pre_commit(&mut self, _event: &mut TransactionEvent<'_>) {}
}

/// Several gates run in registration order.
///
/// Every gate sees the event, including the veto state left by the gates
/// before it, and may clear it.
#[derive(Default)]
pub struct GateChain {
    gates: Vec<Box<dyn CommitGate>>,
}

impl GateChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a gate.
    pub fn push(&mut self, gate: impl CommitGate + 'static) {
        self.gates.push(Box::new(gate));
    }

    /// Appends a gate, builder style.
    #[must_use]
    pub fn with(mut self, gate: impl CommitGate + 'static) -> Self {
        self.push(gate);
        self
    }

    /// Number of gates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Returns true if the chain has no gates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

impl CommitGate for GateChain {
    fn on_pre_commit(&mut self, event: &mut TransactionEvent<'_>) {
        for gate in &mut self.gates {
            gate.on_pre_commit(event);
        }
    }
}

impl std::fmt::Debug for GateChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateChain").field("gates", &self.gates.len()).finish()
    }
}
