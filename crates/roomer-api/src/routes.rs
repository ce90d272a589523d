//! API route definitions

use crate::error::ErrorBody;
use crate::handlers::{health, rooms, users};
use crate::openapi::ApiDoc;
use crate::state::AppState;
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Account and listing routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/sign_up", post(users::sign_up))
        .route("/user/log_in", post(users::log_in))
        .route("/user/rooms/:id", get(users::user_rooms))
        .route("/user/update/:id", put(users::update_user))
        .route("/user/update_password", put(users::update_password))
        .route("/user/recover_password", post(users::recover_password))
        .route("/user/upload_picture/:id", put(users::upload_user_picture))
        .route("/user/delete_picture/:id", delete(users::delete_user_picture))
        .route("/user/delete/:id", delete(users::delete_user))
        .route("/user/:id", get(users::get_user))
        .route("/room/publish", post(rooms::publish))
        .route("/rooms", get(rooms::list_rooms))
        .route("/rooms/around", get(rooms::around))
        .route("/room/update/:id", put(rooms::update_room))
        .route("/room/upload_picture/:id", put(rooms::upload_room_picture))
        .route("/room/delete_picture/:id", delete(rooms::delete_room_picture))
        .route("/room/delete/:id", delete(rooms::delete_room))
        .route("/room/:id", get(rooms::get_room))
}

/// JSON 404 for every unmatched path
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Page not found".to_string(),
        }),
    )
}

/// Assemble the full application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(api_routes())
        .route("/health", get(health::health_check))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
