use async_graphql::futures_util::Stream;
use async_graphql::{SimpleBroker, Subscription};

use crate::graphql::{GraphQLBook, GraphQLPerson};

#[derive(Default)]
pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Persons added after the subscription starts.
    async fn person_added(&self) -> impl Stream<Item = GraphQLPerson> {
        SimpleBroker::<GraphQLPerson>::subscribe()
    }

    /// Books added after the subscription starts.
    async fn book_added(&self) -> impl Stream<Item = GraphQLBook> {
        SimpleBroker::<GraphQLBook>::subscribe()
    }
}
