//! Error types for the server host.

use ironhold_inventory::{CatalogError, InventoryError, RecipeId, TransactionError};
use ironhold_shared::ConfigError;
use thiserror::Error;

/// Errors raised by the server host.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Server or engine configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The recipe file is unusable.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Seeding an inventory failed.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// A client transaction failed validation or commit.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// A crafting request named a recipe the catalog does not have.
    #[error("unknown recipe {0}")]
    UnknownRecipe(RecipeId),
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
