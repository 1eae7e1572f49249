pub mod auth;
pub mod event_bus;
pub mod graphql;
pub mod handlers;
pub mod mutations;
pub mod queries;
pub mod routes;
pub mod schema;
pub mod server;
pub mod service;
pub mod state;
pub mod subscriptions;

pub use auth::{bearer_token, IdentityVerifier, Principal};
pub use handlers::*;
pub use routes::*;
pub use schema::*;
pub use server::*;
pub use state::*;
