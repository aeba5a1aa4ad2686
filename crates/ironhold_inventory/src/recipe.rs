//! # Crafting Recipes
//!
//! A recipe is an ingredient list plus a result list. Ingredients may use
//! wildcard damage ([`Damage::Any`](crate::item::Damage::Any)) or omit tag
//! data to accept any tag; results are always concrete.
//!
//! Two kinds exist:
//!
//! - [`ShapelessRecipe`]: ingredients in any arrangement.
//! - [`ShapedRecipe`]: ingredients laid out in a pattern up to 3x3. Its
//!   results resolve to nothing when the pattern does not fit the grid.

use std::collections::BTreeMap;
use std::fmt;

use crate::actor::CraftingGrid;
use crate::error::{CatalogError, CatalogResult};
use crate::item::Item;

/// Unique identifier for a recipe.
pub type RecipeId = u32;

/// Widest (and tallest) pattern a shaped recipe may use.
pub const MAX_PATTERN_SIZE: usize = 3;

/// Most ingredient items a shapeless recipe may list.
pub const MAX_SHAPELESS_INGREDIENTS: u32 = 9;

/// A recipe as seen by the transaction engine.
pub trait CraftingRecipe: fmt::Debug {
    /// Recipe identifier.
    fn id(&self) -> RecipeId;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Items consumed by one repetition.
    fn ingredients(&self) -> &[Item];

    /// Items produced by one repetition.
    fn results(&self) -> &[Item];

    /// Items produced by one repetition in the given grid.
    ///
    /// Empty when the recipe cannot be crafted there.
    fn results_for(&self, grid: &CraftingGrid) -> Vec<Item>;
}

fn check_items(id: RecipeId, what: &str, items: &[Item]) -> CatalogResult<()> {
    if items.is_empty() {
        return Err(CatalogError::InvalidRecipe {
            id,
            reason: format!("recipe must have at least one {what}"),
        });
    }
    if items.iter().any(Item::is_null) {
        return Err(CatalogError::InvalidRecipe {
            id,
            reason: format!("{what} list contains an empty item"),
        });
    }
    Ok(())
}

fn check_results(id: RecipeId, results: &[Item]) -> CatalogResult<()> {
    check_items(id, "result", results)?;
    if results.iter().any(Item::has_any_damage) {
        return Err(CatalogError::InvalidRecipe {
            id,
            reason: "results cannot use wildcard damage".to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// Shapeless
// ============================================================================

/// Ingredients in any arrangement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapelessRecipe {
    id: RecipeId,
    name: String,
    ingredients: Vec<Item>,
    results: Vec<Item>,
}

impl ShapelessRecipe {
    /// Creates a new shapeless recipe.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidRecipe` if either list is empty, holds
    /// an empty item, the ingredients would not fit a 3x3 grid, or a result
    /// uses wildcard damage.
    pub fn new(
        id: RecipeId,
        name: impl Into<String>,
        ingredients: Vec<Item>,
        results: Vec<Item>,
    ) -> CatalogResult<Self> {
        check_items(id, "ingredient", &ingredients)?;
        check_results(id, &results)?;
        let total: u64 = ingredients.iter().map(|i| u64::from(i.count())).sum();
        if total > u64::from(MAX_SHAPELESS_INGREDIENTS) {
            return Err(CatalogError::InvalidRecipe {
                id,
                reason: format!(
                    "shapeless recipes take at most {MAX_SHAPELESS_INGREDIENTS} ingredients, got {total}"
                ),
            });
        }
        Ok(Self {
            id,
            name: name.into(),
            ingredients,
            results,
        })
    }

    fn ingredient_total(&self) -> usize {
        self.ingredients.iter().map(|i| i.count() as usize).sum()
    }
}

impl CraftingRecipe for ShapelessRecipe {
    fn id(&self) -> RecipeId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn ingredients(&self) -> &[Item] {
        &self.ingredients
    }

    fn results(&self) -> &[Item] {
        &self.results
    }

    fn results_for(&self, grid: &CraftingGrid) -> Vec<Item> {
        if self.ingredient_total() > grid.size().slot_count() {
            return Vec::new();
        }
        self.results.clone()
    }
}

// ============================================================================
// Shaped
// ============================================================================

/// Ingredients laid out in a fixed pattern.
///
/// The pattern is a list of rows; each character is a key into the
/// ingredient map, and a space is an empty cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapedRecipe {
    id: RecipeId,
    name: String,
    shape: Vec<String>,
    width: usize,
    /// One entry per occupied cell, row-major, each with count 1.
    ingredients: Vec<Item>,
    results: Vec<Item>,
}

impl ShapedRecipe {
    /// Creates a new shaped recipe.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidRecipe` if the pattern is empty, larger
    /// than 3x3, ragged, references a missing key, or the results are invalid.
    pub fn new(
        id: RecipeId,
        name: impl Into<String>,
        shape: Vec<String>,
        key: &BTreeMap<char, Item>,
        results: Vec<Item>,
    ) -> CatalogResult<Self> {
        let invalid = |reason: String| CatalogError::InvalidRecipe { id, reason };

        if shape.is_empty() || shape.len() > MAX_PATTERN_SIZE {
            return Err(invalid(format!(
                "shaped recipes need 1 to {MAX_PATTERN_SIZE} rows, got {}",
                shape.len()
            )));
        }
        let width = shape[0].chars().count();
        if width == 0 || width > MAX_PATTERN_SIZE {
            return Err(invalid(format!(
                "shaped recipes need 1 to {MAX_PATTERN_SIZE} columns, got {width}"
            )));
        }

        let mut ingredients = Vec::new();
        for row in &shape {
            if row.chars().count() != width {
                return Err(invalid("pattern rows must all be the same width".to_string()));
            }
            for cell in row.chars().filter(|c| *c != ' ') {
                let item = key
                    .get(&cell)
                    .ok_or_else(|| invalid(format!("no ingredient for key '{cell}'")))?;
                if item.is_null() {
                    return Err(invalid(format!("key '{cell}' maps to an empty item")));
                }
                ingredients.push(item.clone().with_count(1));
            }
        }
        if ingredients.is_empty() {
            return Err(invalid("pattern has no ingredients".to_string()));
        }
        check_results(id, &results)?;

        Ok(Self {
            id,
            name: name.into(),
            shape,
            width,
            ingredients,
            results,
        })
    }

    /// Pattern width.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Pattern height.
    #[must_use]
    pub fn height(&self) -> usize {
        self.shape.len()
    }

    /// Pattern rows.
    #[must_use]
    pub fn shape(&self) -> &[String] {
        &self.shape
    }
}

impl CraftingRecipe for ShapedRecipe {
    fn id(&self) -> RecipeId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn ingredients(&self) -> &[Item] {
        &self.ingredients
    }

    fn results(&self) -> &[Item] {
        &self.results
    }

    fn results_for(&self, grid: &CraftingGrid) -> Vec<Item> {
        if !grid.fits(self.width, self.height()) {
            return Vec::new();
        }
        self.results.clone()
    }
}

// ============================================================================
// Either kind
// ============================================================================

/// A recipe of either kind, as stored in the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recipe {
    /// Pattern-based recipe.
    Shaped(ShapedRecipe),
    /// Arrangement-free recipe.
    Shapeless(ShapelessRecipe),
}

impl Recipe {
    fn inner(&self) -> &dyn CraftingRecipe {
        match self {
            Self::Shaped(r) => r,
            Self::Shapeless(r) => r,
        }
    }
}

impl CraftingRecipe for Recipe {
    fn id(&self) -> RecipeId {
        self.inner().id()
    }

    fn name(&self) -> &str {
        self.inner().name()
    }

    fn ingredients(&self) -> &[Item] {
        self.inner().ingredients()
    }

    fn results(&self) -> &[Item] {
        self.inner().results()
    }

    fn results_for(&self, grid: &CraftingGrid) -> Vec<Item> {
        self.inner().results_for(grid)
    }
}

impl From<ShapedRecipe> for Recipe {
    fn from(recipe: ShapedRecipe) -> Self {
        Self::Shaped(recipe)
    }
}

impl From<ShapelessRecipe> for Recipe {
    fn from(recipe: ShapelessRecipe) -> Self {
        Self::Shapeless(recipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::GridSize;

    const PLANKS: u32 = 5;
    const STICK: u32 = 280;
    const COBBLE: u32 = 4;
    const TORCH: u32 = 50;
    const PICKAXE: u32 = 274;

    fn pickaxe() -> ShapedRecipe {
        let key = BTreeMap::from([('#', Item::new(COBBLE, 1)), ('|', Item::new(STICK, 1))]);
        ShapedRecipe::new(
            10,
            "Stone Pickaxe",
            vec!["###".into(), " | ".into(), " | ".into()],
            &key,
            vec![Item::new(PICKAXE, 1)],
        )
        .unwrap()
    }

    #[test]
    fn test_shaped_ingredients_flattened() {
        let recipe = pickaxe();
        assert_eq!(recipe.width(), 3);
        assert_eq!(recipe.height(), 3);
        assert_eq!(recipe.ingredients().len(), 5);
        assert!(recipe.ingredients().iter().all(|i| i.count() == 1));
    }

    #[test]
    fn test_shaped_needs_big_grid() {
        let recipe = pickaxe();
        assert!(recipe.results_for(&CraftingGrid::new(GridSize::Small)).is_empty());
        assert_eq!(
            recipe.results_for(&CraftingGrid::new(GridSize::Big)),
            vec![Item::new(PICKAXE, 1)]
        );
    }

    #[test]
    fn test_shaped_missing_key() {
        let key = BTreeMap::from([('#', Item::new(PLANKS, 1))]);
        let result = ShapedRecipe::new(1, "Bad", vec!["#X".into()], &key, vec![Item::new(STICK, 4)]);
        assert!(matches!(result, Err(CatalogError::InvalidRecipe { id: 1, .. })));
    }

    #[test]
    fn test_shaped_ragged_rows() {
        let key = BTreeMap::from([('#', Item::new(PLANKS, 1))]);
        let result = ShapedRecipe::new(2, "Bad", vec!["##".into(), "#".into()], &key, vec![Item::new(STICK, 4)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_shapeless_validation() {
        assert!(ShapelessRecipe::new(1, "Empty", vec![], vec![Item::new(TORCH, 1)]).is_err());
        assert!(ShapelessRecipe::new(2, "Nothing", vec![Item::new(STICK, 1)], vec![]).is_err());
        assert!(ShapelessRecipe::new(3, "Huge", vec![Item::new(STICK, 10)], vec![Item::new(TORCH, 1)]).is_err());
        assert!(ShapelessRecipe::new(
            4,
            "Wild result",
            vec![Item::new(STICK, 1)],
            vec![Item::new(TORCH, 1).with_any_damage()]
        )
        .is_err());
    }

    #[test]
    fn test_shapeless_grid_capacity() {
        let recipe = ShapelessRecipe::new(
            5,
            "Five sticks",
            vec![Item::new(STICK, 5)],
            vec![Item::new(TORCH, 1)],
        )
        .unwrap();
        assert!(recipe.results_for(&CraftingGrid::new(GridSize::Small)).is_empty());
        assert_eq!(recipe.results_for(&CraftingGrid::new(GridSize::Big)).len(), 1);
    }

    #[test]
    fn test_shapeless_count_overflow() {
        let result = ShapelessRecipe::new(
            6,
            "Overflow",
            vec![Item::new(STICK, u32::MAX), Item::new(COBBLE, 2)],
            vec![Item::new(TORCH, 1)],
        );
        assert!(matches!(result, Err(CatalogError::InvalidRecipe { id: 6, .. })));
    }

    #[test]
    fn test_recipe_enum_delegates() {
        let recipe: Recipe = pickaxe().into();
        assert_eq!(recipe.id(), 10);
        assert_eq!(recipe.name(), "Stone Pickaxe");
        assert_eq!(recipe.results(), &[Item::new(PICKAXE, 1)]);
    }
}
