use crate::domain::recipe::{RecipeDetail, RecipeId, RecipePayload, RecipeSummary};
use crate::presentation::handlers::{ApiError, AppState};
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::{HttpResponse, web};
use tracing::{debug, info, instrument};

#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_recipes(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let recipes = state.recipe_service.list(&user.user_id).await?;
    let body: Vec<RecipeSummary> = recipes.iter().map(RecipeSummary::from).collect();
    info!(count = body.len(), "Recipes listed");
    Ok(HttpResponse::Ok().json(body))
}

#[instrument(skip(state, user, req), fields(user_id = %user.user_id, recipe_id))]
pub async fn create_recipe(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<RecipePayload>,
) -> Result<HttpResponse, ApiError> {
    let recipe = state
        .recipe_service
        .create(&user.user_id, req.into_inner())
        .await
        .map_err(|e| {
            debug!(error = %e, "Failed to create recipe");
            e
        })?;
    tracing::Span::current().record("recipe_id", recipe.id);
    Ok(HttpResponse::Created().json(RecipeDetail::from(&recipe)))
}

#[instrument(skip(state, user), fields(user_id = %user.user_id, recipe_id = %*path))]
pub async fn get_recipe(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<RecipeId>,
) -> Result<HttpResponse, ApiError> {
    let recipe = state
        .recipe_service
        .get(&user.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(RecipeDetail::from(&recipe)))
}

#[instrument(skip(state, user, req), fields(user_id = %user.user_id, recipe_id = %*path))]
pub async fn partial_update_recipe(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<RecipeId>,
    req: web::Json<RecipePayload>,
) -> Result<HttpResponse, ApiError> {
    update(state, user, path.into_inner(), req.into_inner(), true).await
}

#[instrument(skip(state, user, req), fields(user_id = %user.user_id, recipe_id = %*path))]
pub async fn update_recipe(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<RecipeId>,
    req: web::Json<RecipePayload>,
) -> Result<HttpResponse, ApiError> {
    update(state, user, path.into_inner(), req.into_inner(), false).await
}

async fn update(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    id: RecipeId,
    payload: RecipePayload,
    partial: bool,
) -> Result<HttpResponse, ApiError> {
    let recipe = state
        .recipe_service
        .update(&user.user_id, id, payload, partial)
        .await
        .map_err(|e| {
            debug!(recipe_id = id, partial, error = %e, "Failed to update recipe");
            e
        })?;
    Ok(HttpResponse::Ok().json(RecipeDetail::from(&recipe)))
}

#[instrument(skip(state, user), fields(user_id = %user.user_id, recipe_id = %*path))]
pub async fn delete_recipe(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<RecipeId>,
) -> Result<HttpResponse, ApiError> {
    state
        .recipe_service
        .delete(&user.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
