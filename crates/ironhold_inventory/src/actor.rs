//! # Actors
//!
//! The entity on whose behalf a transaction runs. The engine only needs two
//! things from it: an identifier for logging and events, and the crafting
//! grid used to resolve recipe results.

/// Identifier of an actor (player entity).
pub type ActorId = u64;

/// Dimensions of a crafting grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GridSize {
    /// 2x2 grid carried by every player.
    #[default]
    Small,
    /// 3x3 grid of a crafting table.
    Big,
}

impl GridSize {
    /// Width (and height) of the grid.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Small => 2,
            Self::Big => 3,
        }
    }

    /// Number of slots in the grid.
    #[must_use]
    pub const fn slot_count(self) -> usize {
        self.width() * self.width()
    }
}

/// Crafting context passed through to recipe result resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CraftingGrid {
    size: GridSize,
}

impl CraftingGrid {
    /// Creates a grid of the given size.
    #[must_use]
    pub const fn new(size: GridSize) -> Self {
        Self { size }
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Returns true if a `width` x `height` pattern fits in the grid.
    #[must_use]
    pub const fn fits(&self, width: usize, height: usize) -> bool {
        width <= self.size.width() && height <= self.size.width()
    }
}

/// The entity a transaction runs for.
pub trait Actor {
    /// Identifier used in logs and events.
    fn id(&self) -> ActorId;

    /// The grid the actor is currently crafting in.
    fn crafting_grid(&self) -> &CraftingGrid;
}
