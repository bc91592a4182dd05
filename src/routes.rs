use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    handler::{
        applications::application_handler, auth::auth_handler, chat::chat_handler,
        leases::lease_handler, properties::property_handler, rent::rent_handler,
        reviews::review_handler, users::users_handler, ws::ws_handler,
    },
    middleware::auth,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Properties and reviews mix public browsing with protected writes, so
    // they wire their own auth layers internally.
    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest("/users", users_handler().layer(middleware::from_fn(auth)))
        .nest("/properties", property_handler())
        .nest(
            "/applications",
            application_handler().layer(middleware::from_fn(auth)),
        )
        .nest("/leases", lease_handler().layer(middleware::from_fn(auth)))
        .nest("/rent", rent_handler().layer(middleware::from_fn(auth)))
        .nest("/chat", chat_handler().layer(middleware::from_fn(auth)))
        .nest("/reviews", review_handler())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state.clone()));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
        .nest("/ws", ws_handler().layer(Extension(app_state.clone())))
        .nest_service(
            "/uploads",
            ServeDir::new(app_state.env.upload_dir.clone()),
        )
}
