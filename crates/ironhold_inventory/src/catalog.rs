//! # Recipe Catalog
//!
//! Indexed registry of crafting recipes.
//!
//! Recipes are indexed by an [`OutputKey`]: the sorted set of distinct result
//! identities with counts stripped. Counts are left out because the observed
//! outputs of a transaction may be several repetitions of one recipe. The
//! key is therefore only a coarse filter; the crafting transaction still
//! matches every candidate exactly.
//!
//! ## Recipe files
//!
//! ```toml
//! [[shapeless]]
//! id = 1
//! name = "Torch"
//! ingredients = [{ id = 263, any_damage = true }, { id = 280 }]
//! results = [{ id = 50, count = 4 }]
//!
//! [[shaped]]
//! id = 2
//! name = "Crafting Table"
//! shape = ["##", "##"]
//! key = { "#" = { id = 5, any_damage = true } }
//! results = [{ id = 58 }]
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::error::{CatalogError, CatalogResult};
use crate::item::{Damage, Item, ItemId, ItemKey, NamedTag};
use crate::recipe::{CraftingRecipe, Recipe, RecipeId, ShapedRecipe, ShapelessRecipe};

/// Query interface the crafting transaction uses to find candidate recipes.
pub trait RecipeCatalog {
    /// Returns the recipes whose results could match `outputs`, lazily and in
    /// a deterministic order.
    fn match_recipe_by_outputs<'a>(
        &'a self,
        outputs: &[Item],
    ) -> Box<dyn Iterator<Item = &'a dyn CraftingRecipe> + 'a>;

    /// Looks a recipe up by identifier.
    fn recipe(&self, id: RecipeId) -> Option<&dyn CraftingRecipe>;
}

/// Count-agnostic index key for a set of result items.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OutputKey(Vec<ItemKey>);

impl OutputKey {
    /// Builds the key for a list of items. Null items are ignored.
    #[must_use]
    pub fn from_items(items: &[Item]) -> Self {
        let keys: BTreeSet<ItemKey> = items
            .iter()
            .filter(|i| !i.is_null())
            .map(Item::key)
            .collect();
        Self(keys.into_iter().collect())
    }
}

/// The recipe registry.
#[derive(Debug, Default)]
pub struct RecipeBook {
    /// All recipes, in registration order.
    recipes: Vec<Recipe>,
    /// Recipe index by ID.
    by_id: HashMap<RecipeId, usize>,
    /// Shaped recipes by output key.
    shaped: HashMap<OutputKey, Vec<usize>>,
    /// Shapeless recipes by output key.
    shapeless: HashMap<OutputKey, Vec<usize>>,
}

impl RecipeBook {
    /// Creates a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a recipe.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateRecipe` if the ID is taken.
    pub fn register(&mut self, recipe: impl Into<Recipe>) -> CatalogResult<()> {
        let recipe = recipe.into();
        let id = recipe.id();
        if self.by_id.contains_key(&id) {
            return Err(CatalogError::DuplicateRecipe(id));
        }

        let index = self.recipes.len();
        let key = OutputKey::from_items(recipe.results());
        let bucket = match recipe {
            Recipe::Shaped(_) => &mut self.shaped,
            Recipe::Shapeless(_) => &mut self.shapeless,
        };
        bucket.entry(key).or_default().push(index);

        self.by_id.insert(id, index);
        self.recipes.push(recipe);
        Ok(())
    }

    /// Returns the number of recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Returns true if no recipes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Returns all recipes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    /// Parses a recipe file.
    ///
    /// # Errors
    ///
    /// `CatalogError::Parse` for malformed TOML, `InvalidRecipe` or
    /// `DuplicateRecipe` for bad definitions.
    pub fn from_toml_str(source: &str) -> CatalogResult<Self> {
        let file: RecipeFile = toml::from_str(source)?;
        let mut book = Self::new();

        for def in file.shaped {
            let key: BTreeMap<char, Item> = def
                .key
                .into_iter()
                .map(|(c, entry)| (c, entry.into_item()))
                .collect();
            let results = def.results.into_iter().map(ItemEntry::into_item).collect();
            book.register(ShapedRecipe::new(def.id, def.name, def.shape, &key, results)?)?;
        }
        for def in file.shapeless {
            let ingredients = def.ingredients.into_iter().map(ItemEntry::into_item).collect();
            let results = def.results.into_iter().map(ItemEntry::into_item).collect();
            book.register(ShapelessRecipe::new(def.id, def.name, ingredients, results)?)?;
        }

        tracing::debug!("Loaded {} recipes", book.len());
        Ok(book)
    }

    /// Loads a recipe file from disk.
    ///
    /// # Errors
    ///
    /// `CatalogError::Io` if the file cannot be read, otherwise the errors
    /// of [`RecipeBook::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

impl RecipeCatalog for RecipeBook {
    fn match_recipe_by_outputs<'a>(
        &'a self,
        outputs: &[Item],
    ) -> Box<dyn Iterator<Item = &'a dyn CraftingRecipe> + 'a> {
        let key = OutputKey::from_items(outputs);
        let shaped = self.shaped.get(&key).map_or(&[][..], Vec::as_slice);
        let shapeless = self.shapeless.get(&key).map_or(&[][..], Vec::as_slice);

        Box::new(
            shaped
                .iter()
                .chain(shapeless)
                .map(move |&index| &self.recipes[index] as &dyn CraftingRecipe),
        )
    }

    fn recipe(&self, id: RecipeId) -> Option<&dyn CraftingRecipe> {
        self.by_id
            .get(&id)
            .map(|&index| &self.recipes[index] as &dyn CraftingRecipe)
    }
}

// ============================================================================
// File schema
// ============================================================================

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RecipeFile {
    #[serde(default)]
    shaped: Vec<ShapedDef>,
    #[serde(default)]
    shapeless: Vec<ShapelessDef>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ShapedDef {
    id: RecipeId,
    name: String,
    shape: Vec<String>,
    key: BTreeMap<char, ItemEntry>,
    results: Vec<ItemEntry>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ShapelessDef {
    id: RecipeId,
    name: String,
    ingredients: Vec<ItemEntry>,
    results: Vec<ItemEntry>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ItemEntry {
    id: ItemId,
    #[serde(default = "default_count")]
    count: u32,
    #[serde(default)]
    damage: u16,
    #[serde(default)]
    any_damage: bool,
    #[serde(default)]
    tag: BTreeMap<String, String>,
}

const fn default_count() -> u32 {
    1
}

impl ItemEntry {
    fn into_item(self) -> Item {
        let damage = if self.any_damage {
            Damage::Any
        } else {
            Damage::Value(self.damage)
        };
        Item::new(self.id, self.count)
            .with_damage_spec(damage)
            .with_tag(NamedTag::from(self.tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STICK: ItemId = 280;
    const COAL: ItemId = 263;
    const TORCH: ItemId = 50;
    const PLANKS: ItemId = 5;
    const TABLE: ItemId = 58;

    const RECIPES: &str = r###"
        [[shapeless]]
        id = 1
        name = "Torch"
        ingredients = [{ id = 263, any_damage = true }, { id = 280 }]
        results = [{ id = 50, count = 4 }]

        [[shapeless]]
        id = 3
        name = "Torch (alt)"
        ingredients = [{ id = 280, count = 2 }]
        results = [{ id = 50, count = 1 }]

        [[shaped]]
        id = 2
        name = "Crafting Table"
        shape = ["##", "##"]
        key = { "#" = { id = 5, any_damage = true } }
        results = [{ id = 58 }]
    "###;

    #[test]
    fn test_load_from_toml() {
        let book = RecipeBook::from_toml_str(RECIPES).unwrap();
        assert_eq!(book.len(), 3);

        let torch = book.recipe(1).unwrap();
        assert_eq!(torch.name(), "Torch");
        assert!(torch.ingredients()[0].has_any_damage());
        assert_eq!(torch.results(), &[Item::new(TORCH, 4)]);

        let table = book.recipe(2).unwrap();
        assert_eq!(table.ingredients().len(), 4);
    }

    #[test]
    fn test_lookup_ignores_counts() {
        let book = RecipeBook::from_toml_str(RECIPES).unwrap();
        let found: Vec<RecipeId> = book
            .match_recipe_by_outputs(&[Item::new(TORCH, 12)])
            .map(|r| r.id())
            .collect();
        assert_eq!(found, vec![1, 3]);
    }

    #[test]
    fn test_shaped_before_shapeless() {
        let mut book = RecipeBook::new();
        book.register(
            ShapelessRecipe::new(7, "Table (loose)", vec![Item::new(PLANKS, 4)], vec![Item::new(TABLE, 1)])
                .unwrap(),
        )
        .unwrap();
        let key = BTreeMap::from([('#', Item::new(PLANKS, 1))]);
        book.register(
            ShapedRecipe::new(8, "Table", vec!["##".into(), "##".into()], &key, vec![Item::new(TABLE, 1)])
                .unwrap(),
        )
        .unwrap();

        let found: Vec<RecipeId> = book
            .match_recipe_by_outputs(&[Item::new(TABLE, 1)])
            .map(|r| r.id())
            .collect();
        assert_eq!(found, vec![8, 7]);
    }

    #[test]
    fn test_no_candidates() {
        let book = RecipeBook::from_toml_str(RECIPES).unwrap();
        assert_eq!(book.match_recipe_by_outputs(&[Item::new(COAL, 1)]).count(), 0);
        assert_eq!(
            book.match_recipe_by_outputs(&[Item::new(TORCH, 1), Item::new(STICK, 1)]).count(),
            0
        );
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let source = r#"
            [[shapeless]]
            id = 1
            name = "A"
            ingredients = [{ id = 1 }]
            results = [{ id = 2 }]

            [[shapeless]]
            id = 1
            name = "B"
            ingredients = [{ id = 3 }]
            results = [{ id = 4 }]
        "#;
        assert!(matches!(
            RecipeBook::from_toml_str(source),
            Err(CatalogError::DuplicateRecipe(1))
        ));
    }

    #[test]
    fn test_malformed_file() {
        assert!(matches!(
            RecipeBook::from_toml_str("[[shapeless]]\nid = \"x\""),
            Err(CatalogError::Parse(_))
        ));
    }
}
