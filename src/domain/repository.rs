use crate::domain::recipe::{Recipe, RecipeFields, RecipeId};
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;

/// Recipe persistence. Every lookup is scoped by owner before the id is
/// considered, so a record held by another account behaves as absent.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn insert(&self, owner_id: &str, fields: RecipeFields) -> Result<Recipe>;
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Recipe>>;
    async fn find_for_owner(&self, owner_id: &str, id: RecipeId) -> Result<Option<Recipe>>;
    async fn update_for_owner(
        &self,
        owner_id: &str,
        id: RecipeId,
        fields: RecipeFields,
    ) -> Result<Option<Recipe>>;
    async fn delete_for_owner(&self, owner_id: &str, id: RecipeId) -> Result<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores `user` unless another account already holds its email.
    /// Returns `false` without writing when the email is taken.
    async fn save_user(&self, user: User) -> Result<bool>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;
}
