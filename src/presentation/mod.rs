pub mod auth;
pub mod handlers;
pub mod middleware;
pub mod recipes;
pub mod routes;
