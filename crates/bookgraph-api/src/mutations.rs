use async_graphql::{Context, Object, Result};

use crate::auth::Principal;
use crate::event_bus;
use crate::graphql::{
    service_error, GraphQLAuthor, GraphQLBook, GraphQLPerson, GraphQLToken, GraphQLUser,
};
use crate::service::{
    AddAsFriendArgs, AddBookArgs, AddPersonArgs, CreateUserArgs, EditAuthorArgs, EditNumberArgs,
    LoginArgs,
};
use crate::state::AppState;

pub struct Mutation;

#[Object]
impl Mutation {
    /// Requires a principal. The new person joins the caller's friends.
    async fn add_person(
        &self,
        ctx: &Context<'_>,
        name: String,
        phone: Option<String>,
        street: String,
        city: String,
    ) -> Result<GraphQLPerson> {
        let state = ctx.data_unchecked::<AppState>();
        let contact = state
            .router
            .add_person(
                ctx.data_opt::<Principal>(),
                AddPersonArgs {
                    name,
                    phone,
                    street,
                    city,
                },
            )
            .await
            .map_err(service_error)?;

        let person = GraphQLPerson::from(contact);
        event_bus::publish_person_added(person.clone());
        Ok(person)
    }

    async fn edit_number(
        &self,
        ctx: &Context<'_>,
        name: String,
        phone: String,
    ) -> Result<GraphQLPerson> {
        let state = ctx.data_unchecked::<AppState>();
        let contact = state
            .router
            .edit_number(EditNumberArgs { name, phone })
            .await
            .map_err(service_error)?;
        Ok(contact.into())
    }

    /// Requires a principal. An author unknown by name is created.
    async fn add_book(
        &self,
        ctx: &Context<'_>,
        title: String,
        author: String,
        published: i32,
        genres: Vec<String>,
    ) -> Result<GraphQLBook> {
        let state = ctx.data_unchecked::<AppState>();
        let joined = state
            .router
            .add_book(
                ctx.data_opt::<Principal>(),
                AddBookArgs {
                    title,
                    author,
                    published,
                    genres,
                },
            )
            .await
            .map_err(service_error)?;

        let book = GraphQLBook::from(joined);
        event_bus::publish_book_added(book.clone());
        Ok(book)
    }

    /// Requires a principal. Null when no author has the given name.
    async fn edit_author(
        &self,
        ctx: &Context<'_>,
        name: String,
        born: i32,
    ) -> Result<Option<GraphQLAuthor>> {
        let state = ctx.data_unchecked::<AppState>();
        let author = state
            .router
            .edit_author(
                ctx.data_opt::<Principal>(),
                EditAuthorArgs { name, born },
            )
            .await
            .map_err(service_error)?;
        Ok(author.map(Into::into))
    }

    async fn create_user(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
        favorite_genre: String,
    ) -> Result<GraphQLUser> {
        let state = ctx.data_unchecked::<AppState>();
        let account = state
            .router
            .create_user(CreateUserArgs {
                username,
                password,
                favorite_genre,
            })
            .await
            .map_err(service_error)?;
        Ok(account.into())
    }

    async fn login(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> Result<GraphQLToken> {
        let state = ctx.data_unchecked::<AppState>();
        let value = state
            .router
            .login(LoginArgs { username, password })
            .await
            .map_err(service_error)?;
        Ok(GraphQLToken { value })
    }

    /// Requires a principal. Adding an existing friend again is a no-op.
    async fn add_as_friend(&self, ctx: &Context<'_>, name: String) -> Result<GraphQLUser> {
        let state = ctx.data_unchecked::<AppState>();
        let account = state
            .router
            .add_as_friend(ctx.data_opt::<Principal>(), AddAsFriendArgs { name })
            .await
            .map_err(service_error)?;
        Ok(account.into())
    }
}
