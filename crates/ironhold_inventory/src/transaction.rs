//! # Inventory Transactions
//!
//! **All-or-nothing slot mutation.**
//!
//! A transaction takes the raw actions a client submitted for one player
//! action and decides whether they may be applied together:
//!
//! 1. **Squash**: actions on the same slot collapse to "earliest source,
//!    latest target"; a slot that ends where it started drops out.
//! 2. **Check**: every remaining action must describe the live slot state.
//! 3. **Balance**: items taken out of slots must equal items put in.
//! 4. **Commit**: the commit gate may veto; otherwise every slot is written
//!    in one pass, with rollback if a write fails.
//!
//! [`CraftingTransaction`](crate::crafting::CraftingTransaction) reuses steps
//! 1, 2 and 4 and replaces the balance rule with recipe matching.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use ironhold_shared::EngineConfig;

use crate::action::{InventoryAction, SlotRef};
use crate::actor::Actor;
use crate::error::{TransactionError, TransactionResult};
use crate::gate::{CommitGate, TransactionEvent};
use crate::inventory::SlotStore;
use crate::item::Item;
use crate::recipe::CraftingRecipe;

/// Lifecycle of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionState {
    /// Built, not yet validated. Actions may still be added.
    Pending,
    /// Validation succeeded; ready to execute.
    Valid,
    /// Validation or commit failed. Terminal.
    Invalid,
    /// Slots written. Terminal.
    Committed,
    /// The commit gate vetoed. Terminal.
    Cancelled,
}

/// Outcome of a successful `execute` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// Every action was applied.
    Committed {
        /// Number of slots written.
        slots_changed: usize,
    },
    /// The commit gate vetoed; nothing was written.
    Cancelled,
}

impl ExecuteOutcome {
    /// Returns true if the slots were written.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Per-transaction limits, usually derived from [`EngineConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransactionLimits {
    /// Maximum raw actions.
    pub max_actions: usize,
    /// Maximum crafting batch multiplier.
    pub max_repetitions: u32,
}

impl Default for TransactionLimits {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for TransactionLimits {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_actions: config.max_actions,
            max_repetitions: config.max_repetitions,
        }
    }
}

/// Collapses several changes to the same slot into one.
///
/// Actions are grouped by slot in order of first appearance. Within a group,
/// each action's source must exactly equal the previous action's target;
/// the merged action runs from the first source to the last target. Merged
/// actions whose source equals their target are dropped.
///
/// Squashing an already squashed list returns it unchanged.
///
/// # Errors
///
/// Returns `TransactionError::DiscontinuousSlotHistory` if a slot's history
/// does not chain.
pub fn squash_duplicate_slot_changes(
    actions: Vec<InventoryAction>,
) -> TransactionResult<Vec<InventoryAction>> {
    let mut order: Vec<SlotRef> = Vec::with_capacity(actions.len());
    let mut merged: HashMap<SlotRef, (Item, Item)> = HashMap::with_capacity(actions.len());

    for action in actions {
        let (slot, source, target) = action.into_parts();
        match merged.entry(slot) {
            Entry::Vacant(entry) => {
                order.push(slot);
                entry.insert((source, target));
            }
            Entry::Occupied(mut entry) => {
                let last_target = &mut entry.get_mut().1;
                if !last_target.equals_exact(&source) {
                    return Err(TransactionError::DiscontinuousSlotHistory {
                        slot,
                        expected: last_target.clone(),
                        found: source,
                    });
                }
                *last_target = target;
            }
        }
    }

    Ok(order
        .into_iter()
        .filter_map(|slot| {
            let (source, target) = merged.remove(&slot)?;
            if source.equals_exact(&target) {
                None
            } else {
                Some(InventoryAction::new(slot.inventory, slot.slot, source, target))
            }
        })
        .collect())
}

/// Nets removed items against added items.
///
/// Returns `(inputs, outputs)`: what was taken out of slots and never put
/// back, and what was put into slots without being taken from anywhere.
/// Stack-compatible items cancel count for count.
#[must_use]
pub fn net_item_flow(actions: &[InventoryAction]) -> (Vec<Item>, Vec<Item>) {
    let mut have: Vec<Item> = actions
        .iter()
        .map(InventoryAction::source)
        .filter(|i| !i.is_null())
        .cloned()
        .collect();
    let mut need: Vec<Item> = actions
        .iter()
        .map(InventoryAction::target)
        .filter(|i| !i.is_null())
        .cloned()
        .collect();

    for need_item in &mut need {
        for have_item in &mut have {
            if need_item.is_null() {
                break;
            }
            if have_item.is_null() || !need_item.can_stack_with(have_item) {
                continue;
            }
            let amount = need_item.count().min(have_item.count());
            need_item.shrink(amount);
            have_item.shrink(amount);
        }
    }

    have.retain(|i| !i.is_null());
    need.retain(|i| !i.is_null());
    (have, need)
}

/// A batch of slot changes validated and committed together.
pub struct InventoryTransaction<'a> {
    actor: &'a dyn Actor,
    actions: Vec<InventoryAction>,
    limits: TransactionLimits,
    state: TransactionState,
    /// Net items removed from slots, filled in by validation.
    inputs: Vec<Item>,
    /// Net items placed into slots, filled in by validation.
    outputs: Vec<Item>,
}

impl<'a> InventoryTransaction<'a> {
    /// Creates a transaction for `actor` with default limits.
    #[must_use]
    pub fn new(actor: &'a dyn Actor, actions: Vec<InventoryAction>) -> Self {
        Self {
            actor,
            actions,
            limits: TransactionLimits::default(),
            state: TransactionState::Pending,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Replaces the limits.
    #[must_use]
    pub fn with_limits(mut self, limits: TransactionLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Appends an action.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::InvalidState` once validation has run.
    pub fn add_action(&mut self, action: InventoryAction) -> TransactionResult<()> {
        self.expect_state("add an action to", TransactionState::Pending)?;
        self.actions.push(action);
        Ok(())
    }

    /// Actor the transaction runs for.
    #[must_use]
    pub fn actor(&self) -> &'a dyn Actor {
        self.actor
    }

    /// Actions; squashed once validation has run.
    #[must_use]
    pub fn actions(&self) -> &[InventoryAction] {
        &self.actions
    }

    /// Limits in force.
    #[must_use]
    pub const fn limits(&self) -> TransactionLimits {
        self.limits
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TransactionState {
        self.state
    }

    /// Net items removed from slots.
    #[must_use]
    pub fn inputs(&self) -> &[Item] {
        &self.inputs
    }

    /// Net items placed into slots.
    #[must_use]
    pub fn outputs(&self) -> &[Item] {
        &self.outputs
    }

    /// Validates the transaction against live slot state.
    ///
    /// May be called once. On failure the transaction becomes `Invalid`.
    ///
    /// # Errors
    ///
    /// Any structural error from squashing or action checks, or
    /// `TransactionError::Unbalanced` if items are created or destroyed.
    pub fn validate<S: SlotStore + ?Sized>(&mut self, store: &S) -> TransactionResult<()> {
        self.expect_state("validate", TransactionState::Pending)?;
        let result = self.prepare(store).and_then(|()| {
            if self.inputs.is_empty() && self.outputs.is_empty() {
                Ok(())
            } else {
                Err(TransactionError::Unbalanced {
                    inputs: self.inputs.clone(),
                    outputs: self.outputs.clone(),
                })
            }
        });
        self.finish_validation(result)
    }

    /// Runs the commit gate and, unless vetoed, applies every action.
    ///
    /// # Errors
    ///
    /// `TransactionError::InvalidState` unless the transaction is `Valid`,
    /// or the store error of a failed slot write (after rollback).
    pub fn execute<S, G>(&mut self, store: &mut S, gate: &mut G) -> TransactionResult<ExecuteOutcome>
    where
        S: SlotStore + ?Sized,
        G: CommitGate + ?Sized,
    {
        self.commit(store, gate, None, None)
    }

    // ------------------------------------------------------------------------
    // Shared with CraftingTransaction
    // ------------------------------------------------------------------------

    pub(crate) fn expect_state(
        &self,
        operation: &'static str,
        expected: TransactionState,
    ) -> TransactionResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(TransactionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Squashes, checks every action against the store, and computes the
    /// net item flow. Does not judge the flow.
    pub(crate) fn prepare<S: SlotStore + ?Sized>(&mut self, store: &S) -> TransactionResult<()> {
        if self.actions.len() > self.limits.max_actions {
            return Err(TransactionError::TooManyActions {
                count: self.actions.len(),
                limit: self.limits.max_actions,
            });
        }

        let submitted = self.actions.len();
        self.actions = squash_duplicate_slot_changes(std::mem::take(&mut self.actions))?;
        tracing::debug!(
            actor = self.actor.id(),
            submitted,
            squashed = self.actions.len(),
            "Squashed slot changes"
        );

        if self.actions.is_empty() {
            return Err(TransactionError::EmptyTransaction);
        }
        for action in &self.actions {
            action.validate(store)?;
        }

        let (inputs, outputs) = net_item_flow(&self.actions);
        self.inputs = inputs;
        self.outputs = outputs;
        Ok(())
    }

    pub(crate) fn finish_validation(&mut self, result: TransactionResult<()>) -> TransactionResult<()> {
        self.state = if result.is_ok() {
            TransactionState::Valid
        } else {
            TransactionState::Invalid
        };
        result
    }

    pub(crate) fn commit<S, G>(
        &mut self,
        store: &mut S,
        gate: &mut G,
        recipe: Option<&dyn CraftingRecipe>,
        repetitions: Option<u32>,
    ) -> TransactionResult<ExecuteOutcome>
    where
        S: SlotStore + ?Sized,
        G: CommitGate + ?Sized,
    {
        self.expect_state("execute", TransactionState::Valid)?;

        let mut event = TransactionEvent::new(
            self.actor.id(),
            &self.actions,
            recipe,
            repetitions,
            &self.inputs,
            &self.outputs,
        );
        gate.on_pre_commit(&mut event);
        if event.is_cancelled() {
            tracing::debug!(actor = self.actor.id(), "Transaction vetoed by commit gate");
            self.state = TransactionState::Cancelled;
            return Ok(ExecuteOutcome::Cancelled);
        }

        let mut written: Vec<(SlotRef, Item)> = Vec::with_capacity(self.actions.len());
        for action in &self.actions {
            match store.set_slot(action.inventory(), action.slot(), action.target().clone()) {
                Ok(previous) => written.push((action.slot_ref(), previous)),
                Err(err) => {
                    for (slot, previous) in written.into_iter().rev() {
                        if let Err(restore) = store.set_slot(slot.inventory, slot.slot, previous) {
                            tracing::error!(
                                actor = self.actor.id(),
                                slot = %slot,
                                error = %restore,
                                "Rollback failed; slot left at its new contents"
                            );
                        }
                    }
                    self.state = TransactionState::Invalid;
                    return Err(err);
                }
            }
        }

        self.state = TransactionState::Committed;
        tracing::info!(
            actor = self.actor.id(),
            slots = written.len(),
            "Transaction committed"
        );
        Ok(ExecuteOutcome::Committed {
            slots_changed: written.len(),
        })
    }
}

impl std::fmt::Debug for InventoryTransaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryTransaction")
            .field("actor", &self.actor.id())
            .field("actions", &self.actions)
            .field("state", &self.state)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorId, CraftingGrid};
    use crate::gate::AllowAll;
    use crate::inventory::{Inventory, InventoryId, InventorySet};

    const PLAYER: InventoryId = InventoryId(0);
    const CHEST: InventoryId = InventoryId(1);
    const DIRT: u32 = 3;
    const STONE: u32 = 1;

    struct TestActor(CraftingGrid);

    impl Actor for TestActor {
        fn id(&self) -> ActorId {
            42
        }

        fn crafting_grid(&self) -> &CraftingGrid {
            &self.0
        }
    }

    fn actor() -> TestActor {
        TestActor(CraftingGrid::default())
    }

    fn store() -> InventorySet {
        let mut set = InventorySet::new();
        let mut player = Inventory::new(PLAYER, 9, 64);
        player.set(0, Item::new(DIRT, 10)).unwrap();
        player.set(1, Item::new(STONE, 5)).unwrap();
        set.insert(player);
        set.insert(Inventory::new(CHEST, 9, 64));
        set
    }

    fn act(inv: InventoryId, slot: usize, source: Item, target: Item) -> InventoryAction {
        InventoryAction::new(inv, slot, source, target)
    }

    #[test]
    fn test_balanced_move_commits() {
        let actor = actor();
        let mut store = store();
        let mut tx = InventoryTransaction::new(
            &actor,
            vec![
                act(PLAYER, 0, Item::new(DIRT, 10), Item::new(DIRT, 4)),
                act(CHEST, 0, Item::air(), Item::new(DIRT, 6)),
            ],
        );

        tx.validate(&store).unwrap();
        assert_eq!(tx.state(), TransactionState::Valid);
        assert!(tx.inputs().is_empty());
        assert!(tx.outputs().is_empty());

        let outcome = tx.execute(&mut store, &mut AllowAll).unwrap();
        assert_eq!(outcome, ExecuteOutcome::Committed { slots_changed: 2 });
        assert_eq!(store.slot(PLAYER, 0), Some(&Item::new(DIRT, 4)));
        assert_eq!(store.slot(CHEST, 0), Some(&Item::new(DIRT, 6)));
        assert_eq!(tx.state(), TransactionState::Committed);
    }

    #[test]
    fn test_swap_two_kinds_balanced() {
        let actor = actor();
        let store = store();
        let mut tx = InventoryTransaction::new(
            &actor,
            vec![
                act(PLAYER, 0, Item::new(DIRT, 10), Item::new(STONE, 5)),
                act(PLAYER, 1, Item::new(STONE, 5), Item::new(DIRT, 10)),
            ],
        );
        assert!(tx.validate(&store).is_ok());
    }

    #[test]
    fn test_duplication_rejected() {
        let actor = actor();
        let store = store();
        let mut tx = InventoryTransaction::new(
            &actor,
            vec![
                act(PLAYER, 0, Item::new(DIRT, 10), Item::new(DIRT, 10 - 1)),
                act(CHEST, 0, Item::air(), Item::new(DIRT, 5)),
            ],
        );

        let err = tx.validate(&store).unwrap_err();
        match err {
            TransactionError::Unbalanced { inputs, outputs } => {
                assert!(inputs.is_empty());
                assert_eq!(outputs, vec![Item::new(DIRT, 4)]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(tx.state(), TransactionState::Invalid);
    }

    #[test]
    fn test_empty_after_squash() {
        let actor = actor();
        let store = store();
        let mut tx = InventoryTransaction::new(
            &actor,
            vec![
                act(PLAYER, 0, Item::new(DIRT, 10), Item::new(DIRT, 3)),
                act(PLAYER, 0, Item::new(DIRT, 3), Item::new(DIRT, 10)),
            ],
        );
        assert_eq!(tx.validate(&store), Err(TransactionError::EmptyTransaction));
    }

    #[test]
    fn test_no_actions() {
        let actor = actor();
        let store = store();
        let mut tx = InventoryTransaction::new(&actor, Vec::new());
        assert_eq!(tx.validate(&store), Err(TransactionError::EmptyTransaction));
    }

    #[test]
    fn test_squash_merges_history() {
        let actions = vec![
            act(PLAYER, 0, Item::new(DIRT, 10), Item::new(DIRT, 7)),
            act(CHEST, 0, Item::air(), Item::new(DIRT, 3)),
            act(PLAYER, 0, Item::new(DIRT, 7), Item::new(DIRT, 2)),
        ];
        let squashed = squash_duplicate_slot_changes(actions).unwrap();
        assert_eq!(
            squashed,
            vec![
                act(PLAYER, 0, Item::new(DIRT, 10), Item::new(DIRT, 2)),
                act(CHEST, 0, Item::air(), Item::new(DIRT, 3)),
            ]
        );
    }

    #[test]
    fn test_squash_rejects_broken_chain() {
        let actions = vec![
            act(PLAYER, 0, Item::new(DIRT, 10), Item::new(DIRT, 7)),
            act(PLAYER, 0, Item::new(DIRT, 8), Item::new(DIRT, 2)),
        ];
        assert!(matches!(
            squash_duplicate_slot_changes(actions),
            Err(TransactionError::DiscontinuousSlotHistory { .. })
        ));
    }

    #[test]
    fn test_squash_is_idempotent() {
        let actions = vec![
            act(PLAYER, 0, Item::new(DIRT, 10), Item::new(DIRT, 7)),
            act(PLAYER, 0, Item::new(DIRT, 7), Item::new(DIRT, 1)),
            act(PLAYER, 1, Item::new(STONE, 5), Item::new(STONE, 5)),
        ];
        let once = squash_duplicate_slot_changes(actions).unwrap();
        let twice = squash_duplicate_slot_changes(once.clone()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.len(), 1);
    }

    #[test]
    fn test_stale_source_rejected() {
        let actor = actor();
        let store = store();
        let mut tx = InventoryTransaction::new(
            &actor,
            vec![
                act(PLAYER, 0, Item::new(DIRT, 64), Item::air()),
                act(CHEST, 0, Item::air(), Item::new(DIRT, 64)),
            ],
        );
        assert!(matches!(
            tx.validate(&store),
            Err(TransactionError::SlotMismatch { .. })
        ));
    }

    #[test]
    fn test_too_many_actions() {
        let actor = actor();
        let store = store();
        let actions = (0..5)
            .map(|slot| act(CHEST, slot, Item::air(), Item::air()))
            .collect();
        let mut tx = InventoryTransaction::new(&actor, actions).with_limits(TransactionLimits {
            max_actions: 4,
            max_repetitions: 64,
        });
        assert_eq!(
            tx.validate(&store),
            Err(TransactionError::TooManyActions { count: 5, limit: 4 })
        );
    }

    #[test]
    fn test_lifecycle_guards() {
        let actor = actor();
        let mut store = store();
        let mut tx = InventoryTransaction::new(
            &actor,
            vec![
                act(PLAYER, 0, Item::new(DIRT, 10), Item::air()),
                act(CHEST, 4, Item::air(), Item::new(DIRT, 10)),
            ],
        );

        assert!(matches!(
            tx.execute(&mut store, &mut AllowAll),
            Err(TransactionError::InvalidState { operation: "execute", .. })
        ));
        tx.validate(&store).unwrap();
        assert!(matches!(
            tx.validate(&store),
            Err(TransactionError::InvalidState { operation: "validate", .. })
        ));
        assert!(tx.add_action(act(CHEST, 5, Item::air(), Item::air())).is_err());

        tx.execute(&mut store, &mut AllowAll).unwrap();
        assert!(matches!(
            tx.execute(&mut store, &mut AllowAll),
            Err(TransactionError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_veto_writes_nothing() {
        let actor = actor();
        let mut store = store();
        let before = store.clone();
        let mut tx = InventoryTransaction::new(
            &actor,
            vec![
                act(PLAYER, 1, Item::new(STONE, 5), Item::air()),
                act(CHEST, 2, Item::air(), Item::new(STONE, 5)),
            ],
        );
        tx.validate(&store).unwrap();

        let mut gate = |e: &mut TransactionEvent<'_>| e.cancel();
        let outcome = tx.execute(&mut store, &mut gate).unwrap();

        assert_eq!(outcome, ExecuteOutcome::Cancelled);
        assert_eq!(tx.state(), TransactionState::Cancelled);
        assert_eq!(store.slot(PLAYER, 1), before.slot(PLAYER, 1));
        assert_eq!(store.slot(CHEST, 2), before.slot(CHEST, 2));
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let actor = actor();
        let mut store = store();
        let mut tx = InventoryTransaction::new(
            &actor,
            vec![
                act(PLAYER, 1, Item::new(STONE, 5), Item::air()),
                act(CHEST, 2, Item::air(), Item::new(STONE, 5)),
            ],
        );
        tx.validate(&store).unwrap();

        // Chest window closes between validation and commit
        store.remove(CHEST);
        let err = tx.execute(&mut store, &mut AllowAll).unwrap_err();

        assert!(matches!(err, TransactionError::UnknownSlot(_)));
        assert_eq!(store.slot(PLAYER, 1), Some(&Item::new(STONE, 5)));
        assert_eq!(tx.state(), TransactionState::Invalid);
    }

    /// Accepts a fixed number of writes, then refuses every slot.
    struct FlakyStore {
        inner: InventorySet,
        writes_left: usize,
    }

    impl SlotStore for FlakyStore {
        fn slot(&self, inventory: InventoryId, slot: usize) -> Option<&Item> {
            self.inner.slot(inventory, slot)
        }

        fn set_slot(&mut self, inventory: InventoryId, slot: usize, item: Item) -> TransactionResult<Item> {
            if self.writes_left == 0 {
                return Err(TransactionError::UnknownSlot(SlotRef::new(inventory, slot)));
            }
            self.writes_left -= 1;
            self.inner.set_slot(inventory, slot, item)
        }

        fn max_stack_size(&self, inventory: InventoryId) -> Option<u32> {
            self.inner.max_stack_size(inventory)
        }
    }

    #[test]
    fn test_failed_restore_keeps_original_error() {
        let actor = actor();
        let mut store = FlakyStore {
            inner: store(),
            writes_left: 1,
        };
        let mut tx = InventoryTransaction::new(
            &actor,
            vec![
                act(PLAYER, 1, Item::new(STONE, 5), Item::air()),
                act(CHEST, 2, Item::air(), Item::new(STONE, 5)),
            ],
        );
        tx.validate(&store).unwrap();

        let err = tx.execute(&mut store, &mut AllowAll).unwrap_err();

        assert_eq!(err, TransactionError::UnknownSlot(SlotRef::new(CHEST, 2)));
        assert_eq!(tx.state(), TransactionState::Invalid);
        assert_eq!(store.slot(PLAYER, 1), Some(&Item::air()));
    }

    #[test]
    fn test_net_flow_partial_cancel() {
        let actions = vec![
            act(PLAYER, 0, Item::new(DIRT, 10), Item::air()),
            act(CHEST, 0, Item::air(), Item::new(DIRT, 4)),
            act(CHEST, 1, Item::air(), Item::new(STONE, 2)),
        ];
        let (inputs, outputs) = net_item_flow(&actions);
        assert_eq!(inputs, vec![Item::new(DIRT, 6)]);
        assert_eq!(outputs, vec![Item::new(STONE, 2)]);
    }
}
