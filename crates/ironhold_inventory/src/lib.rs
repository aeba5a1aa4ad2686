//! # IRONHOLD Inventory
//!
//! Server-authoritative inventory and crafting transactions.
//!
//! ## Design Principles
//!
//! 1. **Client input is a claim** - every action is checked against live slots
//! 2. **Conservation** - plain transactions neither create nor destroy items
//! 3. **Exact crafting** - a crafting flow is a whole multiple of one recipe
//! 4. **All-or-nothing** - a veto or a failed write leaves every slot untouched
//!
//! ## Example
//!
//! ```rust,ignore
//! use ironhold_inventory::{AllowAll, CraftingTransaction, RecipeBook};
//!
//! let book = RecipeBook::load("data/recipes.toml")?;
//! let mut tx = CraftingTransaction::new(&player, &book, actions);
//! tx.validate(&inventories)?;
//! tx.execute(&mut inventories, &mut AllowAll)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod action;
pub mod actor;
pub mod catalog;
pub mod crafting;
pub mod error;
pub mod events;
pub mod gate;
pub mod inventory;
pub mod item;
pub mod recipe;
pub mod transaction;

pub use action::{InventoryAction, SlotRef};
pub use actor::{Actor, ActorId, CraftingGrid, GridSize};
pub use catalog::{OutputKey, RecipeBook, RecipeCatalog};
pub use crafting::{match_recipe_items, CraftingTransaction};
pub use error::{
    CatalogError, CatalogResult, InventoryError, InventoryResult, TransactionError,
    TransactionResult,
};
pub use events::{EventBus, EventReceiver, EventSender, InventoryEvent};
pub use gate::{AllowAll, CommitGate, GateChain, TransactionEvent};
pub use inventory::{Inventory, InventoryId, InventorySet, InventorySnapshot, SlotStore};
pub use item::{Damage, Item, ItemId, ItemKey, NamedTag, AIR};
pub use recipe::{CraftingRecipe, Recipe, RecipeId, ShapedRecipe, ShapelessRecipe};
pub use transaction::{
    net_item_flow, squash_duplicate_slot_changes, ExecuteOutcome, InventoryTransaction,
    TransactionLimits, TransactionState,
};
