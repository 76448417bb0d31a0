use crate::presentation::auth::{create_token, create_user, get_me, update_me};
use crate::presentation::handlers::{health_check, json_error_handler, path_error_handler};
use crate::presentation::recipes::{
    create_recipe, delete_recipe, get_recipe, list_recipes, partial_update_recipe, update_recipe,
};
use actix_web::web;

/// Registers the `/api` scope. Shared by the server and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health_check))
                .route("/user/create/", web::post().to(create_user))
                .route("/user/token/", web::post().to(create_token))
                .route("/user/me/", web::get().to(get_me))
                .route("/user/me/", web::patch().to(update_me))
                .route("/recipes/", web::get().to(list_recipes))
                .route("/recipes/", web::post().to(create_recipe))
                .route("/recipes/{id}/", web::get().to(get_recipe))
                .route("/recipes/{id}/", web::patch().to(partial_update_recipe))
                .route("/recipes/{id}/", web::put().to(update_recipe))
                .route("/recipes/{id}/", web::delete().to(delete_recipe)),
        );
}
