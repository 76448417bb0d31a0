use crate::domain::error::DomainError;
use crate::domain::recipe::{Recipe, RecipeId, RecipePayload};
use crate::domain::repository::RecipeRepository;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Owner-scoped recipe operations.
///
/// Every method takes the authenticated account id explicitly. A record owned
/// by someone else is reported as `NotFound`, never `PermissionDenied`, so the
/// API does not reveal that another account's recipe exists.
pub struct RecipeService<R: RecipeRepository> {
    repository: Arc<R>,
}

impl<R: RecipeRepository> RecipeService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, owner_id: &str) -> Result<Vec<Recipe>> {
        let recipes = self.repository.list_for_owner(owner_id).await?;
        debug!(count = recipes.len(), "Recipes listed");
        Ok(recipes)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, owner_id: &str, id: RecipeId) -> Result<Recipe> {
        self.repository
            .find_for_owner(owner_id, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// The owner is always `owner_id`; the payload cannot name one.
    #[instrument(skip(self, payload))]
    pub async fn create(&self, owner_id: &str, payload: RecipePayload) -> Result<Recipe> {
        let fields = payload.into_fields()?;
        let recipe = self.repository.insert(owner_id, fields).await?;
        info!(recipe_id = recipe.id, title = %recipe, "Recipe created");
        Ok(recipe)
    }

    /// `partial` merges the supplied fields; otherwise the payload replaces
    /// every field and unsupplied optional ones reset to their defaults.
    #[instrument(skip(self, payload))]
    pub async fn update(
        &self,
        owner_id: &str,
        id: RecipeId,
        payload: RecipePayload,
        partial: bool,
    ) -> Result<Recipe> {
        let current = self.get(owner_id, id).await?;
        let fields = if partial {
            payload.merge_into(&current.fields)?
        } else {
            payload.into_fields()?
        };

        let recipe = self
            .repository
            .update_for_owner(owner_id, id, fields)
            .await?
            .ok_or_else(|| not_found(id))?;
        info!(recipe_id = recipe.id, partial, "Recipe updated");
        Ok(recipe)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, owner_id: &str, id: RecipeId) -> Result<()> {
        if !self.repository.delete_for_owner(owner_id, id).await? {
            return Err(not_found(id));
        }
        info!(recipe_id = id, "Recipe deleted");
        Ok(())
    }
}

fn not_found(id: RecipeId) -> anyhow::Error {
    warn!(recipe_id = id, "Recipe not found for owner");
    DomainError::NotFound("No Recipe matches the given query.".to_string()).into()
}
