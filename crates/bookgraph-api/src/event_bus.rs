use async_graphql::SimpleBroker;
use tracing::debug;

use crate::graphql::{GraphQLBook, GraphQLPerson};

/// Broadcasts a newly added person to `personAdded` subscribers.
pub fn publish_person_added(person: GraphQLPerson) {
    debug!(name = %person.name, "publishing personAdded");
    SimpleBroker::publish(person);
}

/// Broadcasts a newly added book, author joined, to `bookAdded` subscribers.
pub fn publish_book_added(book: GraphQLBook) {
    debug!(title = %book.title, "publishing bookAdded");
    SimpleBroker::publish(book);
}
