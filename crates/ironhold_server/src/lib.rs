//! # IRONHOLD Server
//!
//! Headless host around the transaction engine: players, request handling,
//! and the `/status` command.
//!
//! ## Request flow
//!
//! ```text
//! client ──> TransactionRequest ──> TransactionHandler ──> InventorySet
//!                                          │
//!                                          └──> EventBus ──> resync / stats
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod chunk_loader;
pub mod command;
pub mod config;
pub mod error;
pub mod handler;
pub mod player;
pub mod status;

pub use chunk_loader::PlayerChunkLoader;
pub use command::{CommandSender, PERMISSION_DENIED};
pub use config::{ServerConfig, DEFAULT_STATUS_PERMISSION};
pub use error::{ServerError, ServerResult};
pub use handler::{HandlerOutcome, TransactionHandler, TransactionRequest};
pub use player::Player;
pub use status::{MemoryUsage, ServerStatus, StatusCommand, StatusSnapshot, WorldStatus};

/// Recipes used when no recipe file is configured.
pub const DEFAULT_RECIPES: &str = r####"
[[shaped]]
id = 1
name = "Crafting Table"
shape = ["##", "##"]
key = { "#" = { id = 5, any_damage = true } }
results = [{ id = 58 }]

[[shaped]]
id = 2
name = "Chest"
shape = ["###", "# #", "###"]
key = { "#" = { id = 5, any_damage = true } }
results = [{ id = 54 }]

[[shaped]]
id = 3
name = "Stick"
shape = ["#", "#"]
key = { "#" = { id = 5, any_damage = true } }
results = [{ id = 280, count = 4 }]

[[shapeless]]
id = 4
name = "Torch"
ingredients = [{ id = 263, any_damage = true }, { id = 280 }]
results = [{ id = 50, count = 4 }]

[[shapeless]]
id = 5
name = "Oak Planks"
ingredients = [{ id = 17 }]
results = [{ id = 5, count = 4 }]
"####;

/// Loads the configured recipe file, or [`DEFAULT_RECIPES`].
///
/// # Errors
///
/// `ServerError::Catalog` if the recipes cannot be read or parsed.
pub fn load_recipes(config: &ServerConfig) -> ServerResult<ironhold_inventory::RecipeBook> {
    let book = match &config.recipe_path {
        Some(path) => ironhold_inventory::RecipeBook::load(path)?,
        None => ironhold_inventory::RecipeBook::from_toml_str(DEFAULT_RECIPES)?,
    };
    tracing::info!(recipes = book.len(), "Recipe catalog ready");
    Ok(book)
}
