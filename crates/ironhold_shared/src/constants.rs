//! # Engine Constants
//!
//! Default limits for the inventory transaction engine.
//!
//! **NOTE:** Every value here can be overridden from `EngineConfig`.
//! These are only the fallbacks used when a config file omits a field.

// =============================================================================
// STACKS
// =============================================================================

/// Maximum number of items a single slot may hold.
pub const DEFAULT_MAX_STACK: u32 = 64;

// =============================================================================
// TRANSACTION LIMITS
// =============================================================================

/// Maximum raw actions accepted in one transaction request.
///
/// A full double chest plus the player inventory and the crafting grid is
/// well below this. Anything larger is a malformed or hostile packet.
pub const DEFAULT_MAX_ACTIONS: usize = 512;

/// Ceiling on the batch multiplier inferred for a crafting transaction.
///
/// Every repetition consumes at least one item from each occupied grid slot,
/// and a grid slot never holds more than one full stack.
pub const DEFAULT_MAX_REPETITIONS: u32 = DEFAULT_MAX_STACK;

// =============================================================================
// EVENTS
// =============================================================================

/// Capacity of the post-commit event channel.
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 1024;
