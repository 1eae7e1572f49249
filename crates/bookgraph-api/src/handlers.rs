use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse},
    Json,
};
use serde::Serialize;

use crate::auth::bearer_token;
use crate::routes::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Runs one GraphQL request. The identity verifier sees the
/// `Authorization` header first; a resolved principal rides along as request
/// data, an unresolved one leaves the request anonymous.
pub async fn graphql_handler(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(principal) = ctx.state.identity.resolve(bearer_token(&headers)).await {
        request = request.data(principal);
    }
    ctx.schema.execute(request).await.into()
}

pub async fn graphiql() -> impl IntoResponse {
    Html(
        GraphiQLSource::build()
            .endpoint("/graphql")
            .subscription_endpoint("/graphql/ws")
            .finish(),
    )
}
