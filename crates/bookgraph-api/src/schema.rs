use async_graphql::Schema;

use crate::graphql::loaders::book_count_loader;
use crate::mutations::Mutation;
use crate::queries::Query;
use crate::state::AppState;
use crate::subscriptions::SubscriptionRoot;

pub type BookGraphSchema = Schema<Query, Mutation, SubscriptionRoot>;

pub fn create_schema(state: AppState) -> BookGraphSchema {
    let books_by_author = book_count_loader(&state);

    Schema::build(Query, Mutation, SubscriptionRoot)
        .data(state)
        .data(books_by_author)
        // Basic safety limits against pathological nesting
        .limit_depth(16)
        .limit_complexity(20_000)
        .finish()
}
