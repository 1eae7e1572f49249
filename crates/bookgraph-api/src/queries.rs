use async_graphql::{Context, Object, Result};

use crate::auth::Principal;
use crate::graphql::{
    count_to_int, service_error, GraphQLAuthor, GraphQLBook, GraphQLPerson, GraphQLUser,
};
use crate::service::{AllBooksArgs, AllPersonsArgs, FilteredBooksArgs, FindPersonArgs, YesNo};
use crate::state::AppState;

pub struct Query;

#[Object]
impl Query {
    async fn person_count(&self, ctx: &Context<'_>) -> Result<i32> {
        let state = ctx.data_unchecked::<AppState>();
        let count = state.router.person_count().await.map_err(service_error)?;
        count_to_int(count)
    }

    async fn book_count(&self, ctx: &Context<'_>) -> Result<i32> {
        let state = ctx.data_unchecked::<AppState>();
        let count = state.router.book_count().await.map_err(service_error)?;
        count_to_int(count)
    }

    async fn author_count(&self, ctx: &Context<'_>) -> Result<i32> {
        let state = ctx.data_unchecked::<AppState>();
        let count = state.router.author_count().await.map_err(service_error)?;
        count_to_int(count)
    }

    /// All books. `author` matches the exact author name, `genre` a member
    /// of the book's genres; both together must hold.
    async fn all_books(
        &self,
        ctx: &Context<'_>,
        author: Option<String>,
        genre: Option<String>,
    ) -> Result<Vec<GraphQLBook>> {
        let state = ctx.data_unchecked::<AppState>();
        let books = state
            .router
            .all_books(AllBooksArgs { author, genre })
            .await
            .map_err(service_error)?;
        Ok(books.into_iter().map(Into::into).collect())
    }

    async fn filtered_books(&self, ctx: &Context<'_>, genre: String) -> Result<Vec<GraphQLBook>> {
        let state = ctx.data_unchecked::<AppState>();
        let books = state
            .router
            .filtered_books(FilteredBooksArgs { genre })
            .await
            .map_err(service_error)?;
        Ok(books.into_iter().map(Into::into).collect())
    }

    async fn all_authors(&self, ctx: &Context<'_>) -> Result<Vec<GraphQLAuthor>> {
        let state = ctx.data_unchecked::<AppState>();
        let authors = state.router.all_authors().await.map_err(service_error)?;
        Ok(authors.into_iter().map(Into::into).collect())
    }

    async fn all_persons(
        &self,
        ctx: &Context<'_>,
        phone: Option<YesNo>,
    ) -> Result<Vec<GraphQLPerson>> {
        let state = ctx.data_unchecked::<AppState>();
        let persons = state
            .router
            .all_persons(AllPersonsArgs { phone })
            .await
            .map_err(service_error)?;
        Ok(persons.into_iter().map(Into::into).collect())
    }

    async fn find_person(&self, ctx: &Context<'_>, name: String) -> Result<Option<GraphQLPerson>> {
        let state = ctx.data_unchecked::<AppState>();
        let person = state
            .router
            .find_person(FindPersonArgs { name })
            .await
            .map_err(service_error)?;
        Ok(person.map(Into::into))
    }

    /// The account behind the bearer token, or null for anonymous callers.
    async fn me(&self, ctx: &Context<'_>) -> Option<GraphQLUser> {
        let state = ctx.data_unchecked::<AppState>();
        state
            .router
            .me(ctx.data_opt::<Principal>())
            .map(Into::into)
    }
}
