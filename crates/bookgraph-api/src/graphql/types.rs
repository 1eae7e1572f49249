use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, ErrorExtensions, Result, SimpleObject, ID};
use bookgraph_core::{Account, AuthorId, CatalogAuthor, Contact};
use serde::{Deserialize, Serialize};

use crate::graphql::loaders::BookCountLoader;
use crate::service::{BookWithAuthor, ServiceError};
use crate::state::AppState;

#[derive(SimpleObject, Clone, Debug, Serialize, Deserialize)]
#[graphql(name = "Address")]
pub struct GraphQLAddress {
    pub street: String,
    pub city: String,
}

#[derive(SimpleObject, Clone, Debug, Serialize, Deserialize)]
#[graphql(name = "Person")]
pub struct GraphQLPerson {
    pub id: ID,
    pub name: String,
    pub phone: Option<String>,
    pub address: GraphQLAddress,
}

impl From<Contact> for GraphQLPerson {
    fn from(contact: Contact) -> Self {
        Self {
            id: ID(contact.id.to_string()),
            name: contact.name,
            phone: contact.phone,
            address: GraphQLAddress {
                street: contact.street,
                city: contact.city,
            },
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(name = "Author", complex)]
pub struct GraphQLAuthor {
    pub id: ID,
    pub name: String,
    pub born: Option<i32>,
    #[graphql(skip)]
    pub author_id: AuthorId,
}

#[ComplexObject]
impl GraphQLAuthor {
    /// Number of books referencing this author, counted when the field is
    /// selected.
    async fn books_by_author(&self, ctx: &Context<'_>) -> Result<i32> {
        let loader = ctx.data_unchecked::<DataLoader<BookCountLoader>>();
        let count = loader.load_one(self.author_id).await?.unwrap_or_default();
        count_to_int(count)
    }
}

impl From<CatalogAuthor> for GraphQLAuthor {
    fn from(author: CatalogAuthor) -> Self {
        Self {
            id: ID(author.id.to_string()),
            name: author.name,
            born: author.born,
            author_id: author.id,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(name = "Book")]
pub struct GraphQLBook {
    pub id: ID,
    pub title: String,
    pub published: i32,
    pub genres: Vec<String>,
    pub author: GraphQLAuthor,
}

impl From<BookWithAuthor> for GraphQLBook {
    fn from(joined: BookWithAuthor) -> Self {
        let BookWithAuthor { book, author } = joined;
        Self {
            id: ID(book.id.to_string()),
            title: book.title,
            published: book.published,
            genres: book.genres.into_iter().collect(),
            author: author.into(),
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(name = "User", complex)]
pub struct GraphQLUser {
    pub id: ID,
    pub username: String,
    pub favorite_genre: String,
    #[graphql(skip)]
    pub account: Account,
}

#[ComplexObject]
impl GraphQLUser {
    async fn friends(&self, ctx: &Context<'_>) -> Result<Vec<GraphQLPerson>> {
        let state = ctx.data_unchecked::<AppState>();
        let friends = state
            .router
            .friends_of(&self.account)
            .await
            .map_err(service_error)?;
        Ok(friends.into_iter().map(Into::into).collect())
    }
}

impl From<Account> for GraphQLUser {
    fn from(account: Account) -> Self {
        Self {
            id: ID(account.id.to_string()),
            username: account.username.clone(),
            favorite_genre: account.favorite_genre.clone(),
            account,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(name = "Token")]
pub struct GraphQLToken {
    pub value: String,
}

/// Turns a service failure into a GraphQL error with its extensions set.
pub(crate) fn service_error(err: ServiceError) -> async_graphql::Error {
    err.extend()
}

/// Counts travel as GraphQL `Int`. A count past `i32::MAX` is an error rather
/// than a wrapped value.
pub(crate) fn count_to_int(count: usize) -> Result<i32> {
    i32::try_from(count)
        .map_err(|_| async_graphql::Error::new(format!("count {count} exceeds the Int range")))
}
