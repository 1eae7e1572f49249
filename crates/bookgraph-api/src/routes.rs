use crate::{create_schema, handlers, AppState, BookGraphSchema};
use async_graphql_axum::GraphQLSubscription;
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Router state: the shared handles plus the schema built over them.
#[derive(Clone)]
pub struct ApiContext {
    pub state: AppState,
    pub schema: BookGraphSchema,
}

pub fn create_router(state: AppState) -> Router {
    let schema = create_schema(state.clone());

    Router::new()
        // Health check
        .route("/health", get(handlers::health))

        // GraphQL: POST runs operations, GET serves GraphiQL
        .route(
            "/graphql",
            get(handlers::graphiql).post(handlers::graphql_handler),
        )
        .route("/graphiql", get(handlers::graphiql))
        .route_service("/graphql/ws", GraphQLSubscription::new(schema.clone()))

        .with_state(ApiContext { state, schema })

        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(TraceLayer::new_for_http())
}
