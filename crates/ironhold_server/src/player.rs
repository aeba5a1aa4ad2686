//! # Player
//!
//! The connected player as seen by the inventory engine: an [`Actor`] with a
//! crafting grid, a chunk loader and a permission set.

use std::collections::BTreeSet;

use ironhold_inventory::{Actor, ActorId, CraftingGrid, GridSize};
use ironhold_shared::Vec3;

use crate::chunk_loader::PlayerChunkLoader;
use crate::command::CommandSender;

/// A connected player.
#[derive(Debug)]
pub struct Player {
    id: ActorId,
    name: String,
    grid: CraftingGrid,
    permissions: BTreeSet<String>,
    chunk_loader: PlayerChunkLoader,
    /// Output not yet flushed to the client.
    outbox: Vec<String>,
}

impl Player {
    /// Creates a player standing at `location` with the 2x2 crafting grid.
    #[must_use]
    pub fn new(id: ActorId, name: impl Into<String>, location: Vec3) -> Self {
        Self {
            id,
            name: name.into(),
            grid: CraftingGrid::new(GridSize::Small),
            permissions: BTreeSet::new(),
            chunk_loader: PlayerChunkLoader::new(location),
            outbox: Vec::new(),
        }
    }

    /// Grants a permission node.
    pub fn grant_permission(&mut self, permission: impl Into<String>) {
        self.permissions.insert(permission.into());
    }

    /// Revokes a permission node.
    pub fn revoke_permission(&mut self, permission: &str) {
        self.permissions.remove(permission);
    }

    /// Switches to the 3x3 grid.
    pub fn open_crafting_table(&mut self) {
        self.grid = CraftingGrid::new(GridSize::Big);
    }

    /// Back to the 2x2 grid.
    pub fn close_crafting_table(&mut self) {
        self.grid = CraftingGrid::new(GridSize::Small);
    }

    /// Moves the player and its chunk loader.
    pub fn teleport(&mut self, location: Vec3) {
        self.chunk_loader.set_current_location(location);
    }

    /// Current position.
    #[must_use]
    pub const fn location(&self) -> Vec3 {
        self.chunk_loader.location()
    }

    /// The player's chunk loader.
    #[must_use]
    pub const fn chunk_loader(&self) -> &PlayerChunkLoader {
        &self.chunk_loader
    }

    /// Messages waiting to be sent.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.outbox
    }

    /// Takes every waiting message.
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outbox)
    }
}

impl Actor for Player {
    fn id(&self) -> ActorId {
        self.id
    }

    fn crafting_grid(&self) -> &CraftingGrid {
        &self.grid
    }
}

impl CommandSender for Player {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    fn send_message(&mut self, message: String) {
        self.outbox.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crafting_table_grid() {
        let mut player = Player::new(1, "Steve", Vec3::ZERO);
        assert_eq!(player.crafting_grid().size(), GridSize::Small);
        player.open_crafting_table();
        assert_eq!(player.crafting_grid().size(), GridSize::Big);
        player.close_crafting_table();
        assert_eq!(player.crafting_grid().size(), GridSize::Small);
    }

    #[test]
    fn test_permissions_and_messages() {
        let mut player = Player::new(2, "Alex", Vec3::ZERO);
        assert!(!player.has_permission("ironhold.command.status"));
        player.grant_permission("ironhold.command.status");
        assert!(player.has_permission("ironhold.command.status"));
        player.revoke_permission("ironhold.command.status");
        assert!(!player.has_permission("ironhold.command.status"));

        player.send_message("hello".to_string());
        assert_eq!(player.take_messages(), vec!["hello".to_string()]);
        assert!(player.messages().is_empty());
    }

    #[test]
    fn test_teleport_moves_loader() {
        let mut player = Player::new(3, "Sam", Vec3::new(0.5, 64.0, 0.5));
        player.teleport(Vec3::new(-16.5, 64.0, 32.1));
        assert_eq!(player.chunk_loader().x(), -17);
        assert_eq!(player.chunk_loader().z(), 32);
    }
}
