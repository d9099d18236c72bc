//! Recipe sets
//!
//! A `RecipeSet` is the unit of file storage: one set, one file. Recipes keep
//! their insertion order for display, and a name index is kept in step with
//! that order after every mutation.

use std::time::SystemTime;

use fxrecipe_types::Recipe;
use hashbrown::{HashMap, HashSet};

/// Named, ordered collection of recipes with unique names
#[derive(Debug, Clone, Default)]
pub struct RecipeSet {
    name: String,
    recipes: Vec<Recipe>,
    /// Recipe name -> position in `recipes`
    index: HashMap<String, usize>,

    // ─── Store bookkeeping ──────────────────────────────────────────────────
    /// Modification time of the backing file when last read or written
    pub(crate) last_write: Option<SystemTime>,
    /// Cleared before a reload pass; still false afterwards = file vanished
    pub(crate) loaded: bool,
}

impl RecipeSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build a set from freshly decoded recipes and run the dedup pass.
    pub fn from_decoded(name: impl Into<String>, recipes: Vec<Recipe>) -> Self {
        let mut set = Self {
            name: name.into(),
            recipes,
            ..Self::default()
        };
        set.synch();
        set
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the set and re-point every recipe's owner
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        for recipe in &mut self.recipes {
            recipe.set_owner(Some(self.name.clone()));
        }
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.recipes.iter().map(|r| r.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Recipe> {
        self.index.get(name).map(|&i| &self.recipes[i])
    }

    /// Mutable access for runtime state. Renaming through this reference
    /// would desync the index; use [`RecipeSet::upsert`] instead.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Recipe> {
        let i = *self.index.get(name)?;
        Some(&mut self.recipes[i])
    }

    pub fn last_write(&self) -> Option<SystemTime> {
        self.last_write
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Insert a recipe, replacing any recipe with the same name in place.
    ///
    /// The replaced recipe's selection flag carries over to the new one. The
    /// replaced recipe is returned detached so its playback handle can be
    /// released.
    pub fn upsert(&mut self, mut recipe: Recipe) -> Option<Recipe> {
        recipe.set_owner(Some(self.name.clone()));

        match self.index.get(&recipe.name) {
            Some(&i) => {
                recipe.set_selected(self.recipes[i].is_selected());
                let mut old = std::mem::replace(&mut self.recipes[i], recipe);
                old.set_owner(None);
                Some(old)
            }
            None => {
                self.index.insert(recipe.name.clone(), self.recipes.len());
                self.recipes.push(recipe);
                None
            }
        }
    }

    /// Remove a recipe by name, returning it detached
    pub fn remove(&mut self, name: &str) -> Option<Recipe> {
        let i = self.index.remove(name)?;
        let mut recipe = self.recipes.remove(i);
        for pos in self.index.values_mut() {
            if *pos > i {
                *pos -= 1;
            }
        }
        recipe.set_owner(None);
        Some(recipe)
    }

    /// Detach and yield every recipe, leaving the set empty
    pub fn into_recipes(mut self) -> Vec<Recipe> {
        self.index.clear();
        let mut recipes = std::mem::take(&mut self.recipes);
        for recipe in &mut recipes {
            recipe.set_owner(None);
        }
        recipes
    }

    /// Drop duplicate names after a decode. Walks from the back, so the last
    /// occurrence in file order wins and earlier duplicates are discarded.
    /// Returns the number of recipes dropped.
    pub fn synch(&mut self) -> usize {
        let before = self.recipes.len();
        let mut seen: HashSet<String> = HashSet::with_capacity(before);
        let mut kept = Vec::with_capacity(before);

        for mut recipe in std::mem::take(&mut self.recipes).into_iter().rev() {
            if !seen.insert(recipe.name.clone()) {
                tracing::debug!(set = %self.name, recipe = %recipe.name, "Dropping duplicate recipe");
                continue;
            }
            recipe.set_owner(Some(self.name.clone()));
            kept.push(recipe);
        }
        kept.reverse();

        self.recipes = kept;
        self.rebuild_index();
        before - self.recipes.len()
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, recipe) in self.recipes.iter().enumerate() {
            self.index.insert(recipe.name.clone(), i);
        }
    }

    /// Check that the name index mirrors the recipe sequence exactly
    pub fn index_is_consistent(&self) -> bool {
        self.index.len() == self.recipes.len()
            && self
                .recipes
                .iter()
                .enumerate()
                .all(|(i, r)| self.index.get(&r.name) == Some(&i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(name: &str, effect: &str) -> Recipe {
        Recipe::new(name, effect)
    }

    #[test]
    fn test_synch_last_occurrence_wins() {
        let set = RecipeSet::from_decoded(
            "combo",
            vec![recipe("x", "A"), recipe("y", "B"), recipe("x", "C")],
        );

        let effects: Vec<_> = set.iter().map(|r| r.effect_name.as_str()).collect();
        assert_eq!(effects, vec!["B", "C"]);
        assert_eq!(set.get("x").unwrap().effect_name, "C");
        assert!(set.index_is_consistent());
    }

    #[test]
    fn test_synch_sets_owner() {
        let set = RecipeSet::from_decoded("combo", vec![recipe("a", ""), recipe("b", "")]);
        assert_eq!(set.get("a").unwrap().recipe_id(), Some("combo:a"));
        assert_eq!(set.get("b").unwrap().recipe_id(), Some("combo:b"));
    }

    #[test]
    fn test_synch_reports_dropped() {
        let mut set = RecipeSet::new("s");
        set.recipes = vec![recipe("a", "1"), recipe("a", "2"), recipe("a", "3")];
        assert_eq!(set.synch(), 2);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a").unwrap().effect_name, "3");
        assert_eq!(set.synch(), 0);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut set = RecipeSet::new("combo");
        assert!(set.upsert(recipe("a", "1")).is_none());
        assert!(set.upsert(recipe("b", "1")).is_none());
        set.get_mut("a").unwrap().set_selected(true);

        let old = set.upsert(recipe("a", "2")).expect("replaced");
        assert_eq!(old.effect_name, "1");
        assert_eq!(old.owner(), None);

        let names: Vec<_> = set.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        let a = set.get("a").unwrap();
        assert_eq!(a.effect_name, "2");
        assert!(a.is_selected());
        assert_eq!(a.recipe_id(), Some("combo:a"));
        assert!(set.index_is_consistent());
    }

    #[test]
    fn test_remove_keeps_index_consistent() {
        let mut set = RecipeSet::new("combo");
        for name in ["a", "b", "c", "d"] {
            set.upsert(recipe(name, ""));
        }

        let removed = set.remove("b").expect("removed");
        assert_eq!(removed.recipe_id(), None);
        assert!(set.remove("b").is_none());
        assert!(set.index_is_consistent());
        assert_eq!(set.get("d").unwrap().name, "d");

        let names: Vec<_> = set.names().collect();
        assert_eq!(names, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_set_name_repoints_recipes() {
        let mut set = RecipeSet::new("old");
        set.upsert(recipe("a", ""));
        assert_eq!(set.get("a").unwrap().recipe_id(), Some("old:a"));

        set.set_name("new");
        assert_eq!(set.get("a").unwrap().recipe_id(), Some("new:a"));
    }

    #[test]
    fn test_into_recipes_detaches() {
        let mut set = RecipeSet::new("combo");
        set.upsert(recipe("a", ""));
        set.upsert(recipe("b", ""));

        let recipes = set.into_recipes();
        assert_eq!(recipes.len(), 2);
        assert!(recipes.iter().all(|r| r.owner().is_none()));
    }
}
