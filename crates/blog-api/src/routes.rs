use async_graphql::http::GraphiQLSource;
use axum::{
    Json, Router,
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
};
use tracing::debug;

use crate::schema::BlogSchema;

pub const GRAPHQL_PATH: &str = "/graphql";

pub fn router(schema: BlogSchema) -> Router {
    Router::new()
        .route(GRAPHQL_PATH, get(playground).post(graphql))
        .route("/health", get(health))
        .with_state(schema)
}

/// Executes one GraphQL document. Field errors travel inside the response
/// body, so this always answers 200 once the request parsed.
pub async fn graphql(
    State(schema): State<BlogSchema>,
    Json(req): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    debug!(
        "GraphQL request (operation: {})",
        req.operation_name.as_deref().unwrap_or("<anonymous>")
    );
    Json(schema.execute(req).await)
}

pub async fn playground() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

pub async fn health() -> &'static str {
    "ok"
}
