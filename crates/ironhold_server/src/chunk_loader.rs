//! Chunk loader that follows a player.

use ironhold_shared::Vec3;

/// Keeps the chunks around a player loaded.
///
/// Worlds ask for the block column the loader stands in; the position is
/// floored on X and Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerChunkLoader {
    location: Vec3,
}

impl PlayerChunkLoader {
    /// Creates a loader at `location`.
    #[must_use]
    pub const fn new(location: Vec3) -> Self {
        Self { location }
    }

    /// Moves the loader.
    pub fn set_current_location(&mut self, location: Vec3) {
        self.location = location;
    }

    /// Current position.
    #[must_use]
    pub const fn location(&self) -> Vec3 {
        self.location
    }

    /// Block X coordinate.
    #[must_use]
    pub fn x(&self) -> i64 {
        self.location.floor_x()
    }

    /// Block Z coordinate.
    #[must_use]
    pub fn z(&self) -> i64 {
        self.location.floor_z()
    }
}
