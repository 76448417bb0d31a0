use crate::domain::recipe::{Recipe, RecipeFields, RecipeId};
use crate::domain::repository::RecipeRepository;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

struct RecipeTable {
    next_id: RecipeId,
    rows: BTreeMap<RecipeId, Recipe>,
}

/// Recipes keyed by id; ids come from a counter starting at 1 and are never reused.
#[derive(Clone)]
pub struct InMemoryRecipeRepository {
    storage: Arc<RwLock<RecipeTable>>,
}

impl InMemoryRecipeRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(RecipeTable {
                next_id: 1,
                rows: BTreeMap::new(),
            })),
        }
    }
}

impl Default for InMemoryRecipeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    #[instrument(skip(self, data), fields(owner_id = owner_id, recipe_id))]
    async fn insert(&self, owner_id: &str, data: RecipeFields) -> Result<Recipe> {
        let mut table = self.storage.write().await;
        let id = table.next_id;
        table.next_id += 1;
        tracing::Span::current().record("recipe_id", id);

        let recipe = Recipe {
            id,
            owner_id: owner_id.to_string(),
            fields: data,
        };
        table.rows.insert(id, recipe.clone());
        debug!(recipe_id = id, "Recipe inserted into memory storage");
        Ok(recipe)
    }

    #[instrument(skip(self), fields(owner_id = owner_id))]
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Recipe>> {
        let table = self.storage.read().await;
        let recipes: Vec<Recipe> = table
            .rows
            .values()
            .rev()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        trace!(count = recipes.len(), "Listed recipes for owner");
        Ok(recipes)
    }

    #[instrument(skip(self), fields(owner_id = owner_id, recipe_id = id))]
    async fn find_for_owner(&self, owner_id: &str, id: RecipeId) -> Result<Option<Recipe>> {
        let table = self.storage.read().await;
        Ok(table
            .rows
            .get(&id)
            .filter(|r| r.owner_id == owner_id)
            .cloned())
    }

    #[instrument(skip(self, data), fields(owner_id = owner_id, recipe_id = id))]
    async fn update_for_owner(
        &self,
        owner_id: &str,
        id: RecipeId,
        data: RecipeFields,
    ) -> Result<Option<Recipe>> {
        let mut table = self.storage.write().await;
        match table.rows.get_mut(&id).filter(|r| r.owner_id == owner_id) {
            Some(recipe) => {
                recipe.fields = data;
                debug!(recipe_id = id, "Recipe updated in memory storage");
                Ok(Some(recipe.clone()))
            }
            None => {
                trace!(recipe_id = id, "No recipe to update for owner");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self), fields(owner_id = owner_id, recipe_id = id))]
    async fn delete_for_owner(&self, owner_id: &str, id: RecipeId) -> Result<bool> {
        let mut table = self.storage.write().await;
        let owned = table
            .rows
            .get(&id)
            .is_some_and(|r| r.owner_id == owner_id);
        if owned {
            table.rows.remove(&id);
            debug!(recipe_id = id, "Recipe removed from memory storage");
        }
        Ok(owned)
    }
}
