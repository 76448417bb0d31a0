use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use recipe_api::application::auth_service::AuthService;
use recipe_api::application::recipe_service::RecipeService;
use recipe_api::data::recipe_repository::InMemoryRecipeRepository;
use recipe_api::data::user_repository::InMemoryUserRepository;
use recipe_api::infrastructure::config::AppConfig;
use recipe_api::infrastructure::logging::init_logging;
use recipe_api::presentation::handlers::AppState;
use recipe_api::presentation::middleware::{JwtAuthMiddleware, RequestIdMiddleware, TimingMiddleware};
use recipe_api::presentation::routes::configure;
use std::sync::Arc;
use tracing::{info, warn};

fn cors(config: &AppConfig) -> Cors {
    match &config.cors_allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allow_any_method()
            .allow_any_header()
            .max_age(3600),
        None => Cors::permissive(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env()?;
    info!(
        host = %config.host,
        port = config.port,
        token_ttl_seconds = config.token_ttl_seconds,
        "Configuration loaded"
    );
    if config.cors_allowed_origin.is_none() {
        warn!("CORS_ALLOWED_ORIGIN is not set; allowing any origin");
    }

    let auth_service = AuthService::new(
        Arc::new(InMemoryUserRepository::new()),
        config.jwt_secret.clone(),
        config.token_ttl_seconds,
    );
    let recipe_service = RecipeService::new(Arc::new(InMemoryRecipeRepository::new()));
    let state = web::Data::new(AppState {
        recipe_service,
        auth_service,
    });
    info!("Application state initialized");

    let server_config = config.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(JwtAuthMiddleware::new(server_config.jwt_secret.clone()))
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(cors(&server_config))
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?;

    info!(host = %config.host, port = config.port, "Starting HTTP server");
    server.run().await?;
    Ok(())
}
