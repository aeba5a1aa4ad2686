//! # Crafting Transactions
//!
//! A crafting transaction is an inventory transaction whose net flow is not
//! zero: ingredients disappear and results appear. Instead of the balance
//! rule it must prove that the flow is an exact whole-number multiple of one
//! recipe.
//!
//! ## Repetition inference
//!
//! Clients do not say how many times they crafted. The multiplier `k` is
//! inferred from the results first (wildcards off), then the ingredients are
//! checked against that same `k` (wildcards on):
//!
//! ```text
//! recipe:   1 coal(*) + 1 stick  ->  4 torch
//! observed: 3 coal    + 3 stick  -> 12 torch
//!
//! results:     12 / 4 = 3        k = 3
//! ingredients:  3 / 1 = 3 (coal), 3 / 1 = 3 (stick)   ok
//! ```

use crate::action::InventoryAction;
use crate::actor::{Actor, CraftingGrid};
use crate::catalog::RecipeCatalog;
use crate::error::{TransactionError, TransactionResult};
use crate::gate::CommitGate;
use crate::inventory::SlotStore;
use crate::item::Item;
use crate::recipe::{CraftingRecipe, RecipeId};
use crate::transaction::{
    ExecuteOutcome, InventoryTransaction, TransactionLimits, TransactionState,
};

/// Matches observed items against recipe items and returns the multiplier.
///
/// Recipe items are processed last-first; each one absorbs every earlier
/// stack-compatible recipe item into a single required count. Observed
/// items equal to the recipe item are consumed and counted. With
/// `wildcards`, damage is ignored for recipe items with wildcard damage
/// and tags are ignored for recipe items without one.
///
/// Every group must yield the same multiplier. When `expected` is given it
/// fixes the multiplier up front.
///
/// # Errors
///
/// `EmptyRecipeSet`, `EmptyObservedSet`, `NonExactMultiple`,
/// `ZeroMultiplier`, `RepetitionLimitExceeded`, `InconsistentRepetitions`
/// or `LeftoverItems`.
pub fn match_recipe_items(
    observed: &[Item],
    recipe_items: &[Item],
    wildcards: bool,
    expected: Option<u32>,
    limit: u32,
) -> TransactionResult<u32> {
    if recipe_items.is_empty() {
        return Err(TransactionError::EmptyRecipeSet);
    }
    if observed.is_empty() {
        return Err(TransactionError::EmptyObservedSet);
    }

    let mut grouped = vec![false; recipe_items.len()];
    let mut consumed = vec![false; observed.len()];
    let mut repetitions = expected;

    for index in (0..recipe_items.len()).rev() {
        if grouped[index] {
            continue;
        }
        grouped[index] = true;
        let recipe_item = &recipe_items[index];

        let mut need = u64::from(recipe_item.count());
        for (other, done) in recipe_items[..index].iter().zip(&mut grouped[..index]) {
            if !*done && other.can_stack_with(recipe_item) {
                need += u64::from(other.count());
                *done = true;
            }
        }
        if need == 0 {
            return Err(TransactionError::EmptyRecipeSet);
        }

        let check_damage = !wildcards || !recipe_item.has_any_damage();
        let check_tag = !wildcards || recipe_item.has_named_tag();
        let mut have = 0_u64;
        for (item, used) in observed.iter().zip(&mut consumed) {
            if !*used && item.equals(recipe_item, check_damage, check_tag) {
                have += u64::from(item.count());
                *used = true;
            }
        }

        if have % need != 0 {
            return Err(TransactionError::NonExactMultiple {
                item: recipe_item.clone(),
                have,
                need,
            });
        }
        let multiplier = have / need;
        if multiplier < 1 {
            return Err(TransactionError::ZeroMultiplier {
                item: recipe_item.clone(),
                have,
                need,
            });
        }
        let multiplier = match u32::try_from(multiplier) {
            Ok(m) if m <= limit => m,
            _ => {
                return Err(TransactionError::RepetitionLimitExceeded {
                    item: recipe_item.clone(),
                    found: multiplier,
                    limit,
                })
            }
        };

        match repetitions {
            None => repetitions = Some(multiplier),
            Some(k) if k != multiplier => {
                return Err(TransactionError::InconsistentRepetitions {
                    item: recipe_item.clone(),
                    expected: k,
                    found: multiplier,
                });
            }
            Some(_) => {}
        }
    }

    let leftover = consumed.iter().filter(|used| !**used).count();
    if leftover > 0 {
        return Err(TransactionError::LeftoverItems { count: leftover });
    }
    repetitions.ok_or(TransactionError::EmptyRecipeSet)
}

/// Checks one recipe against the net flow and returns the multiplier.
fn validate_recipe(
    recipe: &dyn CraftingRecipe,
    grid: &CraftingGrid,
    inputs: &[Item],
    outputs: &[Item],
    expected: Option<u32>,
    limit: u32,
) -> TransactionResult<u32> {
    let results = recipe.results_for(grid);
    let repetitions = match_recipe_items(outputs, &results, false, None, limit)?;
    if let Some(expected) = expected {
        if expected != repetitions {
            return Err(TransactionError::ExpectedRepetitionMismatch {
                expected,
                found: repetitions,
            });
        }
    }
    match_recipe_items(inputs, recipe.ingredients(), true, Some(repetitions), limit)?;
    Ok(repetitions)
}

/// A transaction that crafts `k` repetitions of one recipe.
pub struct CraftingTransaction<'a> {
    base: InventoryTransaction<'a>,
    catalog: &'a dyn RecipeCatalog,
    recipe: Option<&'a dyn CraftingRecipe>,
    repetitions: Option<u32>,
    rejected: Vec<(RecipeId, TransactionError)>,
}

impl<'a> CraftingTransaction<'a> {
    /// Creates a crafting transaction that searches `catalog` for a recipe.
    #[must_use]
    pub fn new(
        actor: &'a dyn Actor,
        catalog: &'a dyn RecipeCatalog,
        actions: Vec<InventoryAction>,
    ) -> Self {
        Self {
            base: InventoryTransaction::new(actor, actions),
            catalog,
            recipe: None,
            repetitions: None,
            rejected: Vec::new(),
        }
    }

    /// Validates against this recipe only, skipping the catalog search.
    #[must_use]
    pub fn with_recipe(mut self, recipe: &'a dyn CraftingRecipe) -> Self {
        self.recipe = Some(recipe);
        self
    }

    /// Requires the inferred multiplier to equal `repetitions`.
    #[must_use]
    pub fn with_repetitions(mut self, repetitions: u32) -> Self {
        self.repetitions = Some(repetitions);
        self
    }

    /// Replaces the limits.
    #[must_use]
    pub fn with_limits(mut self, limits: TransactionLimits) -> Self {
        self.base = self.base.with_limits(limits);
        self
    }

    /// Appends an action.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::InvalidState` once validation has run.
    pub fn add_action(&mut self, action: InventoryAction) -> TransactionResult<()> {
        self.base.add_action(action)
    }

    /// The underlying slot transaction.
    #[must_use]
    pub fn transaction(&self) -> &InventoryTransaction<'a> {
        &self.base
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.base.state()
    }

    /// The bound recipe. Set by validation unless given up front.
    #[must_use]
    pub fn recipe(&self) -> Option<&'a dyn CraftingRecipe> {
        self.recipe
    }

    /// The bound multiplier.
    #[must_use]
    pub const fn repetitions(&self) -> Option<u32> {
        self.repetitions
    }

    /// Catalog candidates tried and rejected during validation, in order.
    #[must_use]
    pub fn rejected_candidates(&self) -> &[(RecipeId, TransactionError)] {
        &self.rejected
    }

    /// Validates the actions and binds a recipe and multiplier.
    ///
    /// # Errors
    ///
    /// Structural errors from the slot checks, the matching error of the
    /// explicit recipe, or `TransactionError::NoRecipeMatched` when no
    /// catalog candidate fits.
    pub fn validate<S: SlotStore + ?Sized>(&mut self, store: &S) -> TransactionResult<()> {
        self.base.expect_state("validate", TransactionState::Pending)?;
        let result = self.base.prepare(store).and_then(|()| self.bind_recipe());
        self.base.finish_validation(result)
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
        self.base.commit(store, gate, self.recipe, self.repetitions)
    }

    fn bind_recipe(&mut self) -> TransactionResult<()> {
        let grid = *self.base.actor().crafting_grid();
        let limit = self.base.limits().max_repetitions;
        let inputs = self.base.inputs();
        let outputs = self.base.outputs();

        if let Some(recipe) = self.recipe {
            let repetitions =
                validate_recipe(recipe, &grid, inputs, outputs, self.repetitions, limit)?;
            self.repetitions = Some(repetitions);
            return Ok(());
        }

        let catalog = self.catalog;
        let mut attempted = 0;
        let mut rejected = Vec::new();
        let mut bound = None;
        for candidate in catalog.match_recipe_by_outputs(outputs) {
            attempted += 1;
            match validate_recipe(candidate, &grid, inputs, outputs, self.repetitions, limit) {
                Ok(repetitions) => {
                    bound = Some((candidate, repetitions));
                    break;
                }
                Err(err) => {
                    tracing::debug!(
                        actor = self.base.actor().id(),
                        recipe = candidate.id(),
                        error = %err,
                        "Recipe candidate rejected"
                    );
                    rejected.push((candidate.id(), err));
                }
            }
        }

        let failures = rejected.iter().map(|(_, err)| err.clone()).collect();
        self.rejected = rejected;
        match bound {
            Some((recipe, repetitions)) => {
                self.recipe = Some(recipe);
                self.repetitions = Some(repetitions);
                Ok(())
            }
            None => Err(TransactionError::NoRecipeMatched {
                attempted,
                failures,
            }),
        }
    }
}

impl std::fmt::Debug for CraftingTransaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CraftingTransaction")
            .field("base", &self.base)
            .field("recipe", &self.recipe.map(|r| r.id()))
            .field("repetitions", &self.repetitions)
            .field("rejected", &self.rejected.len())
            .finish_non_exhaustive()
    }
}
