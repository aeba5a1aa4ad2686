//! Command plumbing shared by every server command.

/// Something that can run commands and read their output.
pub trait CommandSender {
    /// Display name.
    fn name(&self) -> &str;

    /// Returns true if the sender holds `permission`.
    fn has_permission(&self, permission: &str) -> bool;

    /// Delivers one line of output.
    fn send_message(&mut self, message: String);
}

/// Message sent when a permission check fails.
pub const PERMISSION_DENIED: &str = "§cYou do not have permission to use this command.";

/// Checks `permission` and tells the sender when it is missing.
pub fn test_permission(sender: &mut dyn CommandSender, permission: &str) -> bool {
    if sender.has_permission(permission) {
        return true;
    }
    tracing::debug!(sender = sender.name(), permission, "Command denied");
    sender.send_message(PERMISSION_DENIED.to_string());
    false
}
