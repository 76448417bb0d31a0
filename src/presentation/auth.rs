use crate::domain::user::{CreateUser, LoginRequest, UpdateUser};
use crate::presentation::handlers::{ApiError, AppState};
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::{debug, info, instrument};

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn create_user(
    state: web::Data<AppState>,
    req: web::Json<CreateUser>,
) -> Result<HttpResponse, ApiError> {
    info!("Registration request received");

    let user = state
        .auth_service
        .register_user(req.into_inner())
        .await
        .map_err(|e| {
            debug!(error = %e, "Failed to register user");
            e
        })?;

    info!(user_id = %user.id, email = %user.email, "User registered successfully");
    Ok(HttpResponse::Created().json(user))
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn create_token(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Token request received");

    let access_token = state.auth_service.login(req.into_inner()).await?;

    Ok(HttpResponse::Ok().json(TokenResponse { access_token }))
}

#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_me(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let account = state.auth_service.get_user(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(account))
}

#[instrument(skip(state, user, req), fields(user_id = %user.user_id))]
pub async fn update_me(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<UpdateUser>,
) -> Result<HttpResponse, ApiError> {
    let account = state
        .auth_service
        .update_user(&user.user_id, req.into_inner())
        .await
        .map_err(|e| {
            debug!(error = %e, "Failed to update user");
            e
        })?;

    info!(user_id = %account.id, "User updated successfully");
    Ok(HttpResponse::Ok().json(account))
}
