use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use recipe_api::application::auth_service::AuthService;
use recipe_api::application::recipe_service::RecipeService;
use recipe_api::data::recipe_repository::InMemoryRecipeRepository;
use recipe_api::data::user_repository::InMemoryUserRepository;
use recipe_api::domain::recipe::{FieldInput, Recipe, RecipeDetail, RecipePayload, RecipeSummary};
use recipe_api::domain::user::{LoginRequest, UserFlags};
use recipe_api::presentation::handlers::AppState;
use recipe_api::presentation::middleware::JwtAuthMiddleware;
use recipe_api::presentation::routes::configure;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

const JWT_SECRET: &str = "test-secret-key-for-recipe-tests";
const RECIPES_URL: &str = "/api/recipes/";

struct TestUser {
    id: String,
    token: String,
}

impl TestUser {
    fn bearer(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token))
    }
}

async fn register(
    auth_service: &AuthService<InMemoryUserRepository>,
    email: &str,
    password: &str,
) -> TestUser {
    let user = auth_service
        .create_user(email, password, UserFlags::default())
        .await
        .unwrap();
    let token = auth_service
        .login(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await
        .unwrap();
    TestUser { id: user.id, token }
}

macro_rules! setup_test {
    () => {{
        let auth_service = AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            JWT_SECRET.to_string(),
            3600,
        );
        let me = register(&auth_service, "test@example.com", "passtest123").await;
        let other = register(&auth_service, "other@example.com", "otherpass123").await;

        let state = web::Data::new(AppState {
            recipe_service: RecipeService::new(Arc::new(InMemoryRecipeRepository::new())),
            auth_service,
        });

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .wrap(JwtAuthMiddleware::new(JWT_SECRET))
                .configure(configure),
        )
        .await;

        (app, state, me, other)
    }};
}

fn detail_url(recipe_id: u64) -> String {
    format!("{}{}/", RECIPES_URL, recipe_id)
}

fn sample_payload() -> RecipePayload {
    RecipePayload {
        title: Some("Sample Recipe Title".into()),
        description: Some("Sample Recipe Description".into()),
        time_minutes: Some(22_i64.into()),
        price: Some(FieldInput::from("5.25")),
        link: Some("https://example.com/recipe.pdf".into()),
    }
}

async fn create_recipe(state: &web::Data<AppState>, owner: &TestUser) -> Recipe {
    state
        .recipe_service
        .create(&owner.id, sample_payload())
        .await
        .unwrap()
}

#[actix_web::test]
async fn test_auth_required() {
    let (app, _state, _me, _other) = setup_test!();

    let req = test::TestRequest::get().uri(RECIPES_URL).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri(RECIPES_URL)
        .set_json(sample_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_token_signed_with_other_secret_rejected() {
    let (app, _state, _me, _other) = setup_test!();
    let forged =
        recipe_api::infrastructure::security::generate_token("anyone", "not-the-secret", 3600)
            .unwrap();

    let req = test::TestRequest::get()
        .uri(RECIPES_URL)
        .insert_header(("Authorization", format!("Bearer {}", forged)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_retrieve_recipes() {
    let (app, state, me, _other) = setup_test!();
    create_recipe(&state, &me).await;
    create_recipe(&state, &me).await;

    let req = test::TestRequest::get()
        .uri(RECIPES_URL)
        .insert_header(me.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Vec<RecipeSummary> = test::read_body_json(resp).await;

    let expected: Vec<RecipeSummary> = state
        .recipe_service
        .list(&me.id)
        .await
        .unwrap()
        .iter()
        .map(RecipeSummary::from)
        .collect();
    assert_eq!(body, expected);
    assert_eq!(body.len(), 2);
    assert!(body[0].id > body[1].id);
}

#[actix_web::test]
async fn test_list_uses_summary_shape() {
    let (app, state, me, _other) = setup_test!();
    create_recipe(&state, &me).await;

    let req = test::TestRequest::get()
        .uri(RECIPES_URL)
        .insert_header(me.bearer())
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    let item = &body[0];
    assert_eq!(item["title"], "Sample Recipe Title");
    assert_eq!(item["price"], "5.25");
    assert!(item.get("description").is_none());
}

#[actix_web::test]
async fn test_recipe_list_limited_to_user() {
    let (app, state, me, other) = setup_test!();
    create_recipe(&state, &other).await;
    let mine = create_recipe(&state, &me).await;

    let req = test::TestRequest::get()
        .uri(RECIPES_URL)
        .insert_header(me.bearer())
        .to_request();
    let body: Vec<RecipeSummary> = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, vec![RecipeSummary::from(&mine)]);
}

#[actix_web::test]
async fn test_get_recipe_detail() {
    let (app, state, me, _other) = setup_test!();
    let recipe = create_recipe(&state, &me).await;

    let req = test::TestRequest::get()
        .uri(&detail_url(recipe.id))
        .insert_header(me.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: RecipeDetail = test::read_body_json(resp).await;

    assert_eq!(body, RecipeDetail::from(&recipe));
    assert_eq!(body.description, "Sample Recipe Description");
}

#[actix_web::test]
async fn test_get_other_users_recipe_not_found() {
    let (app, state, me, other) = setup_test!();
    let recipe = create_recipe(&state, &other).await;

    let req = test::TestRequest::get()
        .uri(&detail_url(recipe.id))
        .insert_header(me.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let other_body: serde_json::Value = test::read_body_json(resp).await;

    // Same answer as for an id that never existed
    let req = test::TestRequest::get()
        .uri(&detail_url(recipe.id + 1000))
        .insert_header(me.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let missing_body: serde_json::Value = test::read_body_json(resp).await;

    assert_eq!(other_body, missing_body);
}

#[actix_web::test]
async fn test_create_recipe() {
    let (app, state, me, _other) = setup_test!();

    let req = test::TestRequest::post()
        .uri(RECIPES_URL)
        .insert_header(me.bearer())
        .set_json(serde_json::json!({
            "title": "Sample Title",
            "time_minutes": 30,
            "price": 5.5,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: RecipeDetail = test::read_body_json(resp).await;

    let recipe = state.recipe_service.get(&me.id, body.id).await.unwrap();
    assert_eq!(recipe.fields.title, "Sample Title");
    assert_eq!(recipe.fields.time_minutes, 30);
    assert_eq!(recipe.fields.price, Decimal::from_str("5.5").unwrap());
    assert_eq!(recipe.fields.description, "");
    assert_eq!(recipe.fields.link, "");
    assert_eq!(recipe.owner_id, me.id);
}

#[actix_web::test]
async fn test_create_recipe_ignores_owner_and_id_in_payload() {
    let (app, state, me, other) = setup_test!();

    let req = test::TestRequest::post()
        .uri(RECIPES_URL)
        .insert_header(me.bearer())
        .set_json(serde_json::json!({
            "id": 777,
            "owner": other.id,
            "user": other.id,
            "title": "T",
            "time_minutes": 5,
            "price": "5.5",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: RecipeDetail = test::read_body_json(resp).await;

    assert_ne!(body.id, 777);
    let recipe = state.recipe_service.get(&me.id, body.id).await.unwrap();
    assert_eq!(recipe.owner_id, me.id);
    assert!(state.recipe_service.list(&other.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_create_recipe_validation_error() {
    let (app, state, me, _other) = setup_test!();

    let req = test::TestRequest::post()
        .uri(RECIPES_URL)
        .insert_header(me.bearer())
        .set_json(serde_json::json!({
            "title": "",
            "time_minutes": -5,
            "price": "cheap",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;

    assert!(body["details"]["title"].is_array());
    assert!(body["details"]["time_minutes"].is_array());
    assert_eq!(body["details"]["price"][0], "A valid number is required.");
    assert!(state.recipe_service.list(&me.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_wrong_field_types_are_reported_per_field() {
    let (app, state, me, _other) = setup_test!();

    let req = test::TestRequest::post()
        .uri(RECIPES_URL)
        .insert_header(me.bearer())
        .set_json(serde_json::json!({
            "title": false,
            "time_minutes": "twenty",
            "price": "5.00",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;

    assert_eq!(body["details"]["title"][0], "Not a valid string.");
    assert_eq!(body["details"]["time_minutes"][0], "A valid integer is required.");
    assert!(body["details"]["non_field_errors"].is_null());
    assert!(state.recipe_service.list(&me.id).await.unwrap().is_empty());

    let req = test::TestRequest::post()
        .uri(RECIPES_URL)
        .insert_header(me.bearer())
        .set_json(serde_json::json!({
            "title": "Numeric strings",
            "time_minutes": "22",
            "price": 5,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: RecipeDetail = test::read_body_json(resp).await;
    assert_eq!(body.time_minutes, 22);
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _state, me, _other) = setup_test!();

    let req = test::TestRequest::post()
        .uri(RECIPES_URL)
        .insert_header(me.bearer())
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"title\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_partial_update() {
    let (app, state, me, _other) = setup_test!();
    let original_link = "https://example.com/recipe.pdf";
    let recipe = create_recipe(&state, &me).await;

    let req = test::TestRequest::patch()
        .uri(&detail_url(recipe.id))
        .insert_header(me.bearer())
        .set_json(serde_json::json!({ "title": "Recipe New Title" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let stored = state.recipe_service.get(&me.id, recipe.id).await.unwrap();
    assert_eq!(stored.fields.title, "Recipe New Title");
    assert_eq!(stored.fields.link, original_link);
    assert_eq!(stored.fields.description, recipe.fields.description);
    assert_eq!(stored.owner_id, me.id);
}

#[actix_web::test]
async fn test_full_update() {
    let (app, state, me, _other) = setup_test!();
    let recipe = create_recipe(&state, &me).await;

    let req = test::TestRequest::put()
        .uri(&detail_url(recipe.id))
        .insert_header(me.bearer())
        .set_json(serde_json::json!({
            "title": "New Sample title",
            "link": "https://example.com/new_recipe.pdf",
            "description": "New Sample Description",
            "time_minutes": 10,
            "price": "2.5",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: RecipeDetail = test::read_body_json(resp).await;

    let stored = state.recipe_service.get(&me.id, recipe.id).await.unwrap();
    assert_eq!(body, RecipeDetail::from(&stored));
    assert_eq!(stored.fields.title, "New Sample title");
    assert_eq!(stored.fields.link, "https://example.com/new_recipe.pdf");
    assert_eq!(stored.fields.description, "New Sample Description");
    assert_eq!(stored.fields.time_minutes, 10);
    assert_eq!(stored.fields.price, Decimal::from_str("2.5").unwrap());
    assert_eq!(stored.owner_id, me.id);
}

#[actix_web::test]
async fn test_full_update_missing_required_field() {
    let (app, state, me, _other) = setup_test!();
    let recipe = create_recipe(&state, &me).await;

    let req = test::TestRequest::put()
        .uri(&detail_url(recipe.id))
        .insert_header(me.bearer())
        .set_json(serde_json::json!({ "title": "Only a title" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let stored = state.recipe_service.get(&me.id, recipe.id).await.unwrap();
    assert_eq!(stored, recipe);
}

#[actix_web::test]
async fn test_update_user_is_ignored() {
    let (app, state, me, other) = setup_test!();
    let recipe = create_recipe(&state, &me).await;

    let req = test::TestRequest::patch()
        .uri(&detail_url(recipe.id))
        .insert_header(me.bearer())
        .set_json(serde_json::json!({ "user": other.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let stored = state.recipe_service.get(&me.id, recipe.id).await.unwrap();
    assert_eq!(stored.owner_id, me.id);
    assert_eq!(stored.fields, recipe.fields);
}

#[actix_web::test]
async fn test_update_other_users_recipe_not_found() {
    let (app, state, me, other) = setup_test!();
    let recipe = create_recipe(&state, &other).await;

    let req = test::TestRequest::patch()
        .uri(&detail_url(recipe.id))
        .insert_header(me.bearer())
        .set_json(serde_json::json!({ "title": "Stolen" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let stored = state.recipe_service.get(&other.id, recipe.id).await.unwrap();
    assert_eq!(stored.fields.title, "Sample Recipe Title");
}

#[actix_web::test]
async fn test_delete_recipe() {
    let (app, state, me, _other) = setup_test!();
    let recipe = create_recipe(&state, &me).await;

    let req = test::TestRequest::delete()
        .uri(&detail_url(recipe.id))
        .insert_header(me.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let body = test::read_body(resp).await;
    assert!(body.is_empty());

    assert!(state.recipe_service.get(&me.id, recipe.id).await.is_err());
    assert!(state.recipe_service.list(&me.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_delete_other_users_recipe_error() {
    let (app, state, me, other) = setup_test!();
    let recipe = create_recipe(&state, &other).await;

    let req = test::TestRequest::delete()
        .uri(&detail_url(recipe.id))
        .insert_header(me.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert!(state.recipe_service.get(&other.id, recipe.id).await.is_ok());
}

#[actix_web::test]
async fn test_non_numeric_id_not_found() {
    let (app, _state, me, _other) = setup_test!();

    let req = test::TestRequest::get()
        .uri("/api/recipes/abc/")
        .insert_header(me.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_signup_to_recipe_scenario() {
    let (app, _state, _me, other) = setup_test!();

    let req = test::TestRequest::post()
        .uri("/api/user/create/")
        .set_json(serde_json::json!({ "email": "a@EXAMPLE.com", "password": "pw123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let account: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(account["email"], "a@example.com");

    let req = test::TestRequest::post()
        .uri("/api/user/token/")
        .set_json(serde_json::json!({ "email": "a@example.com", "password": "pw123" }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let token = body["access_token"].as_str().unwrap().to_string();
    let auth = ("Authorization", format!("Bearer {}", token));

    let req = test::TestRequest::post()
        .uri(RECIPES_URL)
        .insert_header(auth.clone())
        .set_json(serde_json::json!({ "title": "T", "time_minutes": 22, "price": 5.25 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: RecipeDetail = test::read_body_json(resp).await;
    assert_eq!(created.price.to_string(), "5.25");

    let req = test::TestRequest::get()
        .uri(RECIPES_URL)
        .insert_header(auth)
        .to_request();
    let mine: Vec<RecipeSummary> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, created.id);

    let req = test::TestRequest::get()
        .uri(RECIPES_URL)
        .insert_header(other.bearer())
        .to_request();
    let theirs: Vec<RecipeSummary> = test::call_and_read_body_json(&app, req).await;
    assert!(theirs.is_empty());
}
