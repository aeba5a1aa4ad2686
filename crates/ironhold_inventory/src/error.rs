//! # Transaction Error Types
//!
//! Every way a transaction can be rejected. A validation failure is always
//! terminal for the transaction: the caller rejects the player's action and
//! resyncs the client. Nothing in this crate retries.

use thiserror::Error;

use crate::action::SlotRef;
use crate::item::Item;
use crate::transaction::TransactionState;

/// Errors raised while validating or executing a transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// No actions remained after squashing.
    #[error("transaction must have at least one action to be executable")]
    EmptyTransaction,

    /// The request carried more raw actions than the engine accepts.
    #[error("too many actions: {count} submitted, limit is {limit}")]
    TooManyActions {
        /// Actions submitted.
        count: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Two actions on one slot do not chain: the later source is not the
    /// earlier target.
    #[error("discontinuous history for {slot}: expected source {expected}, found {found}")]
    DiscontinuousSlotHistory {
        /// Slot the actions address.
        slot: SlotRef,
        /// Target of the previous action on this slot.
        expected: Item,
        /// Source of the offending action.
        found: Item,
    },

    /// An action addresses an inventory or slot that does not exist.
    #[error("unknown slot {0}")]
    UnknownSlot(SlotRef),

    /// The action's source does not match what the slot actually holds.
    #[error("slot {slot} holds {actual}, action expected {expected}")]
    SlotMismatch {
        /// Slot the action addresses.
        slot: SlotRef,
        /// Source item claimed by the action.
        expected: Item,
        /// Item actually in the slot.
        actual: Item,
    },

    /// The action would place more items in a slot than it can hold.
    #[error("slot {slot} cannot hold {count} items (max {max})")]
    StackLimitExceeded {
        /// Slot the action addresses.
        slot: SlotRef,
        /// Requested stack size.
        count: u32,
        /// Inventory stack limit.
        max: u32,
    },

    /// A plain transaction created or destroyed items.
    #[error("unbalanced transaction: {} unmatched inputs, {} unmatched outputs", .inputs.len(), .outputs.len())]
    Unbalanced {
        /// Items removed from slots with no counterpart.
        inputs: Vec<Item>,
        /// Items placed into slots with no counterpart.
        outputs: Vec<Item>,
    },

    /// Matching was attempted against an empty recipe side.
    #[error("no recipe items given")]
    EmptyRecipeSet,

    /// Matching was attempted against an empty set of transaction items.
    #[error("no transaction items given")]
    EmptyObservedSet,

    /// Observed count is not an exact multiple of the recipe requirement.
    #[error("expected an exact multiple of required {item} (given: {have}, needed: {need})")]
    NonExactMultiple {
        /// Recipe item being matched.
        item: Item,
        /// Observed count.
        have: u64,
        /// Count required by one repetition.
        need: u64,
    },

    /// Fewer items than one full repetition requires.
    #[error("expected more than zero items matching {item} (given: {have}, needed: {need})")]
    ZeroMultiplier {
        /// Recipe item being matched.
        item: Item,
        /// Observed count.
        have: u64,
        /// Count required by one repetition.
        need: u64,
    },

    /// The batch is larger than the configured ceiling.
    #[error("{item} implies {found} repetitions, limit is {limit}")]
    RepetitionLimitExceeded {
        /// Recipe item being matched.
        item: Item,
        /// Inferred multiplier.
        found: u64,
        /// Configured limit.
        limit: u32,
    },

    /// Two item groups imply different batch multipliers.
    #[error("expected {item} x{expected}, but found x{found}")]
    InconsistentRepetitions {
        /// Recipe item being matched.
        item: Item,
        /// Multiplier established earlier.
        expected: u32,
        /// Multiplier implied by this group.
        found: u32,
    },

    /// Result matching inferred a different count than the caller asked for.
    #[error("expected {expected} repetitions, got {found}")]
    ExpectedRepetitionMismatch {
        /// Caller-supplied repetitions.
        expected: u32,
        /// Repetitions inferred from the results.
        found: u32,
    },

    /// Observed items remained after every recipe group was consumed.
    #[error("expected 0 items left over, have {count}")]
    LeftoverItems {
        /// Number of unconsumed observed entries.
        count: usize,
    },

    /// No candidate recipe satisfied both matching passes.
    #[error("unable to match a recipe to transaction (tried to match against {attempted} recipes)")]
    NoRecipeMatched {
        /// Number of candidates tried.
        attempted: usize,
        /// Why each candidate was rejected, in catalog order.
        failures: Vec<TransactionError>,
    },

    /// The operation is not legal in the transaction's current state.
    #[error("cannot {operation} a transaction in state {state:?}")]
    InvalidState {
        /// Operation attempted.
        operation: &'static str,
        /// State the transaction was in.
        state: TransactionState,
    },
}

/// Result type for transaction operations.
pub type TransactionResult<T> = Result<T, TransactionError>;

/// Errors raised by direct inventory manipulation outside a transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// Inventory is full, cannot add more items.
    #[error("inventory full: tried to add {amount} more items")]
    Full {
        /// Items that did not fit.
        amount: u32,
    },
}

/// Result type for direct inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Errors raised while building the recipe catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The recipe file could not be read.
    #[error("failed to read recipe file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The recipe file is not valid TOML for the recipe schema.
    #[error("failed to parse recipe file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A recipe definition is structurally invalid.
    #[error("invalid recipe {id}: {reason}")]
    InvalidRecipe {
        /// Recipe identifier.
        id: u32,
        /// What is wrong with it.
        reason: String,
    },

    /// Two recipes share an identifier.
    #[error("recipe ID {0} already exists")]
    DuplicateRecipe(u32),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
