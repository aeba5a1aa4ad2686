//! # Items
//!
//! An [`Item`] is a stack of one item type with optional metadata: a damage
//! value and a named tag. Items are values; every mutation produces a new one.
//!
//! ## Equality
//!
//! Three levels of comparison are used by the transaction engine:
//!
//! | Method | Type | Damage | Tag | Count |
//! |---|---|---|---|---|
//! | [`Item::equals`] | yes | optional | optional | no |
//! | [`Item::can_stack_with`] | yes | yes | yes | no |
//! | [`Item::equals_exact`] | yes | yes | yes | yes |
//!
//! Recipe items may carry [`Damage::Any`], which only matches a concrete
//! damage value when the caller asks `equals` to skip the damage check.

use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for an item type.
pub type ItemId = u32;

/// The empty item type. A slot holding air is empty.
pub const AIR: ItemId = 0;

/// Damage value (metadata) of an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Damage {
    /// A concrete damage value.
    Value(u16),
    /// Wildcard: matches any damage value in wildcard comparisons.
    Any,
}

impl Default for Damage {
    fn default() -> Self {
        Self::Value(0)
    }
}

impl fmt::Display for Damage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::Any => f.write_str("*"),
        }
    }
}

/// Auxiliary tag data attached to an item (custom name, enchantments, ...).
///
/// Keys are ordered so that two tags with the same entries compare and hash
/// identically regardless of insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamedTag(BTreeMap<String, String>);

impl NamedTag {
    /// Creates an empty tag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tag with one more entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Looks up an entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the tag has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, String>> for NamedTag {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self(entries)
    }
}

/// Count-agnostic identity of an item: everything `can_stack_with` compares.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    /// Item type.
    pub id: ItemId,
    /// Damage value.
    pub damage: Damage,
    /// Tag data, if any.
    pub tag: Option<NamedTag>,
}

/// A stack of items.
///
/// The null item ([`Item::air`]) stands for an empty slot. Any item built
/// with a zero count or the [`AIR`] type is normalized to it, so derived
/// equality agrees with [`Item::equals_exact`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Item {
    id: ItemId,
    count: u32,
    damage: Damage,
    tag: Option<NamedTag>,
}

impl Item {
    /// Creates a stack of `count` items with damage 0 and no tag.
    #[must_use]
    pub fn new(id: ItemId, count: u32) -> Self {
        if id == AIR || count == 0 {
            return Self::air();
        }
        Self {
            id,
            count,
            damage: Damage::Value(0),
            tag: None,
        }
    }

    /// The empty item.
    #[inline]
    #[must_use]
    pub const fn air() -> Self {
        Self {
            id: AIR,
            count: 0,
            damage: Damage::Value(0),
            tag: None,
        }
    }

    /// Sets a concrete damage value.
    #[must_use]
    pub fn with_damage(self, damage: u16) -> Self {
        self.with_damage_spec(Damage::Value(damage))
    }

    /// Marks the damage value as a wildcard.
    #[must_use]
    pub fn with_any_damage(self) -> Self {
        self.with_damage_spec(Damage::Any)
    }

    /// Sets the damage value.
    #[must_use]
    pub fn with_damage_spec(mut self, damage: Damage) -> Self {
        if !self.is_null() {
            self.damage = damage;
        }
        self
    }

    /// Attaches tag data. An empty tag is the same as no tag.
    #[must_use]
    pub fn with_tag(mut self, tag: NamedTag) -> Self {
        if !self.is_null() {
            self.tag = if tag.is_empty() { None } else { Some(tag) };
        }
        self
    }

    /// Returns a copy with a different count.
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        if count == 0 {
            return Self::air();
        }
        self.count = count;
        self
    }

    /// Item type.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// Stack size.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Damage value.
    #[inline]
    #[must_use]
    pub const fn damage(&self) -> Damage {
        self.damage
    }

    /// Tag data, if any.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> Option<&NamedTag> {
        self.tag.as_ref()
    }

    /// Returns true for the empty item.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.count == 0 || self.id == AIR
    }

    /// Returns true if the damage value is a wildcard.
    #[inline]
    #[must_use]
    pub const fn has_any_damage(&self) -> bool {
        matches!(self.damage, Damage::Any)
    }

    /// Returns true if the item carries tag data.
    #[inline]
    #[must_use]
    pub const fn has_named_tag(&self) -> bool {
        self.tag.is_some()
    }

    /// Compares type, and optionally damage and tag. Counts are ignored.
    #[must_use]
    pub fn equals(&self, other: &Self, check_damage: bool, check_tag: bool) -> bool {
        self.id == other.id
            && (!check_damage || self.damage == other.damage)
            && (!check_tag || self.tag == other.tag)
    }

    /// Returns true if the two stacks could be merged into one slot.
    #[must_use]
    pub fn can_stack_with(&self, other: &Self) -> bool {
        self.equals(other, true, true)
    }

    /// Compares everything, count included.
    #[must_use]
    pub fn equals_exact(&self, other: &Self) -> bool {
        self.can_stack_with(other) && self.count == other.count
    }

    /// Count-agnostic identity of this item.
    #[must_use]
    pub fn key(&self) -> ItemKey {
        ItemKey {
            id: self.id,
            damage: self.damage,
            tag: self.tag.clone(),
        }
    }

    /// Removes up to `amount` items from the stack, returning how many were
    /// removed. The stack becomes air when it runs out.
    pub(crate) fn shrink(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.count);
        self.count -= removed;
        if self.count == 0 {
            *self = Self::air();
        }
        removed
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("Air");
        }
        write!(f, "Item({}:{})x{}", self.id, self.damage, self.count)?;
        if let Some(tag) = &self.tag {
            write!(f, " +{} tags", tag.len())?;
        }
        Ok(())
    }
}
