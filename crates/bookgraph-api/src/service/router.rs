use bookgraph_core::{
    Account, AuthorId, BookFilter, CatalogAuthor, CatalogBook, Contact, ContactFilter,
    CredentialHasher, JwtManager, NewAccount, NewBook, NewContact, StoreError, Stores,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    AddAsFriendArgs, AddBookArgs, AddPersonArgs, AllBooksArgs, AllPersonsArgs, AuthorResolver,
    BookCountProjection, BookWithAuthor, CreateUserArgs, EditAuthorArgs, EditNumberArgs,
    FilteredBooksArgs, FindPersonArgs, FriendSet, LoginArgs, Operation, OperationOutput,
    ServiceError, YesNo,
};
use crate::auth::Principal;

type ServiceResult<T> = Result<T, ServiceError>;

/// Gate shared by every mutation that needs a caller. Runs before any store
/// access.
fn require_principal(principal: Option<&Principal>) -> ServiceResult<&Principal> {
    principal.ok_or_else(ServiceError::not_authenticated)
}

/// Stateless dispatch from an operation and the caller's principal to its
/// handler.
///
/// GraphQL resolvers call the typed handlers directly. `dispatch` serves
/// callers that hold an already decoded [`Operation`], such as a request
/// decoded with [`Operation::parse`].
pub struct OperationRouter {
    stores: Stores,
    authors: AuthorResolver,
    friends: FriendSet,
    projection: Arc<BookCountProjection>,
    jwt: Arc<JwtManager>,
    hasher: CredentialHasher,
}

impl OperationRouter {
    pub fn new(stores: Stores, jwt: Arc<JwtManager>) -> Self {
        Self {
            authors: AuthorResolver::new(stores.authors.clone()),
            friends: FriendSet::new(stores.accounts.clone()),
            projection: Arc::new(BookCountProjection::new(stores.books.clone())),
            stores,
            jwt,
            hasher: CredentialHasher::new(),
        }
    }

    pub fn projection(&self) -> Arc<BookCountProjection> {
        self.projection.clone()
    }

    #[instrument(skip(self, op, principal), fields(operation = op.name()))]
    pub async fn dispatch(
        &self,
        op: Operation,
        principal: Option<&Principal>,
    ) -> ServiceResult<OperationOutput> {
        let output = match op {
            Operation::PersonCount => OperationOutput::Count(self.person_count().await?),
            Operation::BookCount => OperationOutput::Count(self.book_count().await?),
            Operation::AuthorCount => OperationOutput::Count(self.author_count().await?),
            Operation::AllBooks(args) => OperationOutput::Books(self.all_books(args).await?),
            Operation::FilteredBooks(args) => {
                OperationOutput::Books(self.filtered_books(args).await?)
            }
            Operation::AllAuthors => OperationOutput::Authors(self.all_authors().await?),
            Operation::AllPersons(args) => OperationOutput::Persons(self.all_persons(args).await?),
            Operation::FindPerson(args) => OperationOutput::Person(self.find_person(args).await?),
            Operation::Me => OperationOutput::Account(self.me(principal)),
            Operation::AddPerson(args) => {
                OperationOutput::Person(Some(self.add_person(principal, args).await?))
            }
            Operation::EditNumber(args) => {
                OperationOutput::Person(Some(self.edit_number(args).await?))
            }
            Operation::AddBook(args) => OperationOutput::Book(self.add_book(principal, args).await?),
            Operation::EditAuthor(args) => {
                OperationOutput::Author(self.edit_author(principal, args).await?)
            }
            Operation::CreateUser(args) => {
                OperationOutput::Account(Some(self.create_user(args).await?))
            }
            Operation::Login(args) => OperationOutput::Token(self.login(args).await?),
            Operation::AddAsFriend(args) => {
                OperationOutput::Account(Some(self.add_as_friend(principal, args).await?))
            }
        };
        Ok(output)
    }

    pub async fn person_count(&self) -> ServiceResult<usize> {
        self.stores
            .contacts
            .count()
            .await
            .map_err(ServiceError::persistence("Counting persons failed", "personCount"))
    }

    pub async fn book_count(&self) -> ServiceResult<usize> {
        self.stores
            .books
            .count(&BookFilter::default())
            .await
            .map_err(ServiceError::persistence("Counting books failed", "bookCount"))
    }

    pub async fn author_count(&self) -> ServiceResult<usize> {
        self.stores
            .authors
            .count()
            .await
            .map_err(ServiceError::persistence("Counting authors failed", "authorCount"))
    }

    /// General listing. An author filter naming nobody matches no books.
    #[instrument(skip(self))]
    pub async fn all_books(&self, args: AllBooksArgs) -> ServiceResult<Vec<BookWithAuthor>> {
        let mut filter = BookFilter {
            author: None,
            genre: args.genre,
        };

        if let Some(name) = args.author {
            let author = self
                .stores
                .authors
                .find_by_name(&name)
                .await
                .map_err(ServiceError::persistence("Finding author failed", name.as_str()))?;
            match author {
                Some(author) => filter.author = Some(author.id),
                None => {
                    debug!(author = %name, "author filter names no author");
                    return Ok(Vec::new());
                }
            }
        }

        self.find_books(&filter, "allBooks").await
    }

    #[instrument(skip(self))]
    pub async fn filtered_books(
        &self,
        args: FilteredBooksArgs,
    ) -> ServiceResult<Vec<BookWithAuthor>> {
        self.find_books(&BookFilter::by_genre(args.genre), "genre")
            .await
    }

    pub async fn all_authors(&self) -> ServiceResult<Vec<CatalogAuthor>> {
        self.stores
            .authors
            .find_all()
            .await
            .map_err(ServiceError::persistence("Listing authors failed", "allAuthors"))
    }

    pub async fn book_count_for(&self, author: AuthorId) -> ServiceResult<usize> {
        self.projection
            .count_for(author)
            .await
            .map_err(ServiceError::persistence("Counting books failed", author.to_string()))
    }

    pub async fn all_persons(&self, args: AllPersonsArgs) -> ServiceResult<Vec<Contact>> {
        let filter = ContactFilter {
            has_phone: args.phone.map(|p| p == YesNo::Yes),
        };
        self.stores
            .contacts
            .find(&filter)
            .await
            .map_err(ServiceError::persistence("Listing persons failed", "phone"))
    }

    pub async fn find_person(&self, args: FindPersonArgs) -> ServiceResult<Option<Contact>> {
        self.stores
            .contacts
            .find_by_name(&args.name)
            .await
            .map_err(ServiceError::persistence("Finding person failed", args.name.as_str()))
    }

    pub fn me(&self, principal: Option<&Principal>) -> Option<Account> {
        principal.map(|p| p.account.clone())
    }

    /// Contacts in an account's friend set, in friend-set order.
    pub async fn friends_of(&self, account: &Account) -> ServiceResult<Vec<Contact>> {
        let mut contacts: HashMap<_, _> = self
            .stores
            .contacts
            .find_by_ids(&account.friends)
            .await
            .map_err(ServiceError::persistence("Loading friends failed", account.username.as_str()))?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        Ok(account
            .friends
            .iter()
            .filter_map(|id| contacts.remove(id))
            .collect())
    }

    #[instrument(skip(self, principal), fields(name = %args.name))]
    pub async fn add_person(
        &self,
        principal: Option<&Principal>,
        args: AddPersonArgs,
    ) -> ServiceResult<Contact> {
        let principal = require_principal(principal)?;
        let name = args.name.clone();

        let contact = self
            .stores
            .contacts
            .insert(NewContact {
                name: args.name,
                phone: args.phone,
                street: args.street,
                city: args.city,
            })
            .await
            .map_err(ServiceError::persistence("Saving person failed", name.as_str()))?;

        self.friends
            .attach_new(principal.account.clone(), &contact)
            .await?;

        info!(contact_id = %contact.id, "person added");
        Ok(contact)
    }

    /// Not gated: any caller may change a phone number.
    #[instrument(skip(self), fields(name = %args.name))]
    pub async fn edit_number(&self, args: EditNumberArgs) -> ServiceResult<Contact> {
        let mut contact = self
            .stores
            .contacts
            .find_by_name(&args.name)
            .await
            .map_err(ServiceError::persistence("Saving number failed", args.name.as_str()))?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "Person",
                name: args.name.clone(),
            })?;

        contact.phone = Some(args.phone);
        self.stores
            .contacts
            .save(&contact)
            .await
            .map_err(ServiceError::persistence("Saving number failed", args.name.as_str()))?;

        info!(contact_id = %contact.id, "phone number updated");
        Ok(contact)
    }

    #[instrument(skip(self, principal), fields(title = %args.title, author = %args.author))]
    pub async fn add_book(
        &self,
        principal: Option<&Principal>,
        args: AddBookArgs,
    ) -> ServiceResult<BookWithAuthor> {
        require_principal(principal)?;

        let author = self.authors.resolve_or_create(&args.author).await?;
        let title = args.title.clone();
        let book = self
            .stores
            .books
            .insert(NewBook {
                title: args.title,
                published: args.published,
                genres: args.genres,
                author: author.id,
            })
            .await
            .map_err(ServiceError::persistence("Saving book failed", title.as_str()))?;

        info!(book_id = %book.id, author_id = %author.id, "book added");
        Ok(BookWithAuthor { book, author })
    }

    /// Returns `None` when no author has the given name.
    #[instrument(skip(self, principal), fields(name = %args.name))]
    pub async fn edit_author(
        &self,
        principal: Option<&Principal>,
        args: EditAuthorArgs,
    ) -> ServiceResult<Option<CatalogAuthor>> {
        require_principal(principal)?;

        let author = self
            .stores
            .authors
            .find_by_name(&args.name)
            .await
            .map_err(ServiceError::persistence("editing author failed", args.name.as_str()))?;
        let Some(mut author) = author else {
            debug!("no author with that name");
            return Ok(None);
        };

        author.born = Some(args.born);
        self.stores
            .authors
            .save(&author)
            .await
            .map_err(ServiceError::persistence("editing author failed", args.name.as_str()))?;

        info!(author_id = %author.id, born = args.born, "author edited");
        Ok(Some(author))
    }

    #[instrument(skip(self, args), fields(username = %args.username))]
    pub async fn create_user(&self, args: CreateUserArgs) -> ServiceResult<Account> {
        let password_hash = self.hasher.hash(&args.password)?;
        let account = self
            .stores
            .accounts
            .insert(NewAccount {
                username: args.username.clone(),
                password_hash,
                favorite_genre: args.favorite_genre,
            })
            .await
            .map_err(ServiceError::persistence(
                "Creating the user failed",
                args.username.as_str(),
            ))?;

        info!(account_id = %account.id, "account registered");
        Ok(account)
    }

    #[instrument(skip(self, args), fields(username = %args.username))]
    pub async fn login(&self, args: LoginArgs) -> ServiceResult<String> {
        let account = self
            .stores
            .accounts
            .find_by_username(&args.username)
            .await
            .map_err(ServiceError::persistence("Login failed", args.username.as_str()))?;

        let Some(account) = account else {
            warn!("login for unknown username");
            return Err(ServiceError::wrong_credentials());
        };

        if self
            .hasher
            .verify(&args.password, &account.password_hash)
            .is_err()
        {
            warn!("login with wrong password");
            return Err(ServiceError::wrong_credentials());
        }

        Ok(self.jwt.create_token(&account)?)
    }

    #[instrument(skip(self, principal), fields(name = %args.name))]
    pub async fn add_as_friend(
        &self,
        principal: Option<&Principal>,
        args: AddAsFriendArgs,
    ) -> ServiceResult<Account> {
        let principal = require_principal(principal)?;

        let contact = self
            .stores
            .contacts
            .find_by_name(&args.name)
            .await
            .map_err(ServiceError::persistence("Finding person failed", args.name.as_str()))?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "Person",
                name: args.name.clone(),
            })?;

        self.friends
            .befriend(principal.account.clone(), &contact)
            .await
    }

    /// Joins each book with its author. A book whose author is missing is a
    /// store inconsistency and fails the whole read.
    async fn find_books(
        &self,
        filter: &BookFilter,
        invalid_args: &str,
    ) -> ServiceResult<Vec<BookWithAuthor>> {
        let books = self
            .stores
            .books
            .find(filter)
            .await
            .map_err(ServiceError::persistence("Listing books failed", invalid_args))?;
        self.join_authors(books, invalid_args).await
    }

    async fn join_authors(
        &self,
        books: Vec<CatalogBook>,
        invalid_args: &str,
    ) -> ServiceResult<Vec<BookWithAuthor>> {
        let mut ids: Vec<AuthorId> = books.iter().map(|b| b.author).collect();
        ids.sort_unstable();
        ids.dedup();

        let authors: HashMap<AuthorId, CatalogAuthor> = self
            .stores
            .authors
            .find_by_ids(&ids)
            .await
            .map_err(ServiceError::persistence("Loading authors failed", invalid_args))?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        books
            .into_iter()
            .map(|book| {
                let author = authors.get(&book.author).cloned().ok_or_else(|| {
                    let dangling = StoreError::NotFound {
                        collection: "authors",
                        id: book.author,
                    };
                    ServiceError::persistence("Loading authors failed", book.title.as_str())(dangling)
                })?;
                Ok(BookWithAuthor { book, author })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookgraph_core::AuthConfig;
    use secrecy::SecretString;
    use serde_json::json;

    fn router() -> (OperationRouter, Stores) {
        let config = AuthConfig {
            jwt_secret: Some(SecretString::from(
                "router-test-secret-0123456789abcdef".to_string(),
            )),
            token_ttl_hours: 1,
        };
        let stores = Stores::in_memory();
        let jwt = Arc::new(JwtManager::new(&config).unwrap());
        (OperationRouter::new(stores.clone(), jwt), stores)
    }

    async fn principal(router: &OperationRouter, stores: &Stores, username: &str) -> Principal {
        let account = match stores.accounts.find_by_username(username).await.unwrap() {
            Some(account) => account,
            None => router
                .create_user(CreateUserArgs {
                    username: username.into(),
                    password: "s3cret-pass".into(),
                    favorite_genre: "crime".into(),
                })
                .await
                .unwrap(),
        };
        Principal { account }
    }

    fn book(title: &str, author: &str, genres: &[&str]) -> AddBookArgs {
        AddBookArgs {
            title: title.into(),
            author: author.into(),
            published: 2001,
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn person(name: &str) -> AddPersonArgs {
        AddPersonArgs {
            name: name.into(),
            phone: None,
            street: "Tapiolankatu 5 A".into(),
            city: "Espoo".into(),
        }
    }

    #[tokio::test]
    async fn new_author_is_created_once_with_unset_birth_year() {
        let (router, stores) = router();
        let alice = principal(&router, &stores, "alice").await;

        let added = router
            .add_book(Some(&alice), book("T1", "A. Author", &["x"]))
            .await
            .unwrap();
        assert_eq!(added.author.name, "A. Author");
        assert_eq!(added.author.born, None);

        let authors = router.all_authors().await.unwrap();
        assert_eq!(authors.len(), 1);

        let x = router
            .filtered_books(FilteredBooksArgs { genre: "x".into() })
            .await
            .unwrap();
        assert_eq!(x.len(), 1);
        assert_eq!(x[0].book.title, "T1");
        assert_eq!(x[0].author.name, "A. Author");

        let y = router
            .filtered_books(FilteredBooksArgs { genre: "y".into() })
            .await
            .unwrap();
        assert!(y.is_empty());
    }

    #[tokio::test]
    async fn known_author_is_reused() {
        let (router, stores) = router();
        let alice = principal(&router, &stores, "alice").await;

        let first = router
            .add_book(Some(&alice), book("Clean Code", "Robert Martin", &["refactoring"]))
            .await
            .unwrap();
        let second = router
            .add_book(Some(&alice), book("Agile software development", "Robert Martin", &["agile"]))
            .await
            .unwrap();

        assert_eq!(first.author.id, second.author.id);
        assert_eq!(router.author_count().await.unwrap(), 1);
        assert_eq!(router.book_count_for(first.author.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn gated_mutations_without_principal_have_no_side_effects() {
        let (router, _stores) = router();

        let ops = vec![
            Operation::AddPerson(person("Arto Hellas")),
            Operation::AddBook(book("T1", "A. Author", &["x"])),
            Operation::EditAuthor(EditAuthorArgs {
                name: "A. Author".into(),
                born: 1950,
            }),
            Operation::AddAsFriend(AddAsFriendArgs {
                name: "Arto Hellas".into(),
            }),
        ];
        for op in ops {
            let err = router.dispatch(op, None).await.unwrap_err();
            assert_eq!(err.kind(), "AUTHORIZATION_REQUIRED");
            assert_eq!(err.code(), "BAD_USER_INPUT");
        }

        assert_eq!(router.person_count().await.unwrap(), 0);
        assert_eq!(router.book_count().await.unwrap(), 0);
        assert_eq!(router.author_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn add_as_friend_twice_keeps_single_entry() {
        let (router, stores) = router();
        let alice = principal(&router, &stores, "alice").await;
        let bob = principal(&router, &stores, "bob").await;
        let contact = router.add_person(Some(&bob), person("Arto Hellas")).await.unwrap();

        let alice = Principal {
            account: router
                .add_as_friend(Some(&alice), AddAsFriendArgs { name: "Arto Hellas".into() })
                .await
                .unwrap(),
        };
        let account = router
            .add_as_friend(Some(&alice), AddAsFriendArgs { name: "Arto Hellas".into() })
            .await
            .unwrap();

        assert_eq!(account.friends, vec![contact.id]);
        let friends = router.friends_of(&account).await.unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].name, "Arto Hellas");
    }

    #[tokio::test]
    async fn add_as_friend_with_unknown_name_is_not_found() {
        let (router, stores) = router();
        let alice = principal(&router, &stores, "alice").await;

        let err = router
            .add_as_friend(Some(&alice), AddAsFriendArgs { name: "Nobody".into() })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "NOT_FOUND");
        let stored = stores.accounts.find_by_username("alice").await.unwrap().unwrap();
        assert!(stored.friends.is_empty());
    }

    #[tokio::test]
    async fn add_person_joins_friend_set() {
        let (router, stores) = router();
        let alice = principal(&router, &stores, "alice").await;

        let contact = router.add_person(Some(&alice), person("Arto Hellas")).await.unwrap();

        let stored = stores.accounts.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(stored.friends, vec![contact.id]);
    }

    #[tokio::test]
    async fn duplicate_person_is_a_persistence_failure() {
        let (router, stores) = router();
        let alice = principal(&router, &stores, "alice").await;
        router.add_person(Some(&alice), person("Arto Hellas")).await.unwrap();

        let err = router
            .add_person(Some(&alice), person("Arto Hellas"))
            .await
            .unwrap_err();
        match err {
            ServiceError::ValidationOrPersistenceFailure { invalid_args, .. } => {
                assert_eq!(invalid_args, "Arto Hellas")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn edit_number_is_ungated_and_reports_unknown_names() {
        let (router, stores) = router();
        let alice = principal(&router, &stores, "alice").await;
        router.add_person(Some(&alice), person("Arto Hellas")).await.unwrap();

        let edited = router
            .edit_number(EditNumberArgs {
                name: "Arto Hellas".into(),
                phone: "040-123456".into(),
            })
            .await
            .unwrap();
        assert_eq!(edited.phone.as_deref(), Some("040-123456"));

        let err = router
            .edit_number(EditNumberArgs {
                name: "Nobody".into(),
                phone: "040-1".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn edit_author_sets_birth_year_or_returns_none() {
        let (router, stores) = router();
        let alice = principal(&router, &stores, "alice").await;
        router
            .add_book(Some(&alice), book("The Demon", "Fyodor Dostoevsky", &["classic"]))
            .await
            .unwrap();

        let edited = router
            .edit_author(
                Some(&alice),
                EditAuthorArgs {
                    name: "Fyodor Dostoevsky".into(),
                    born: 1821,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(edited.born, Some(1821));

        let missing = router
            .edit_author(
                Some(&alice),
                EditAuthorArgs {
                    name: "Nobody".into(),
                    born: 1900,
                },
            )
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn login_checks_the_registered_password() {
        let (router, _stores) = router();
        router
            .create_user(CreateUserArgs {
                username: "alice".into(),
                password: "correct horse".into(),
                favorite_genre: "crime".into(),
            })
            .await
            .unwrap();

        let token = router
            .login(LoginArgs {
                username: "alice".into(),
                password: "correct horse".into(),
            })
            .await
            .unwrap();
        assert!(!token.is_empty());

        for (username, password) in [("alice", "secret"), ("mallory", "correct horse")] {
            let err = router
                .login(LoginArgs {
                    username: username.into(),
                    password: password.into(),
                })
                .await
                .unwrap_err();
            assert_eq!(err.kind(), "AUTHORIZATION_REQUIRED");
        }
    }

    #[tokio::test]
    async fn all_books_applies_author_and_genre_filters() {
        let (router, stores) = router();
        let alice = principal(&router, &stores, "alice").await;
        for (title, author, genres) in [
            ("Clean Code", "Robert Martin", vec!["refactoring"]),
            ("Agile software development", "Robert Martin", vec!["agile", "patterns"]),
            ("Refactoring", "Martin Fowler", vec!["refactoring"]),
        ] {
            router
                .add_book(Some(&alice), book(title, author, &genres))
                .await
                .unwrap();
        }

        let all = router.all_books(AllBooksArgs::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let martin = router
            .all_books(AllBooksArgs {
                author: Some("Robert Martin".into()),
                genre: None,
            })
            .await
            .unwrap();
        assert_eq!(martin.len(), 2);

        let martin_refactoring = router
            .all_books(AllBooksArgs {
                author: Some("Robert Martin".into()),
                genre: Some("refactoring".into()),
            })
            .await
            .unwrap();
        assert_eq!(martin_refactoring.len(), 1);
        assert_eq!(martin_refactoring[0].book.title, "Clean Code");

        let nobody = router
            .all_books(AllBooksArgs {
                author: Some("Nobody".into()),
                genre: None,
            })
            .await
            .unwrap();
        assert!(nobody.is_empty());
    }

    #[tokio::test]
    async fn all_persons_filters_on_phone() {
        let (router, stores) = router();
        let alice = principal(&router, &stores, "alice").await;
        router.add_person(Some(&alice), person("Arto Hellas")).await.unwrap();
        router
            .add_person(
                Some(&alice),
                AddPersonArgs {
                    phone: Some("040-123543".into()),
                    ..person("Matti Luukkainen")
                },
            )
            .await
            .unwrap();

        let with = router
            .all_persons(AllPersonsArgs { phone: Some(YesNo::Yes) })
            .await
            .unwrap();
        let without = router
            .all_persons(AllPersonsArgs { phone: Some(YesNo::No) })
            .await
            .unwrap();
        let all = router.all_persons(AllPersonsArgs::default()).await.unwrap();

        assert_eq!(with.len(), 1);
        assert_eq!(with[0].name, "Matti Luukkainen");
        assert_eq!(without.len(), 1);
        assert_eq!(all.len(), 2);
        assert_eq!(router.person_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn dispatch_routes_queries_without_principal() {
        let (router, _stores) = router();

        match router.dispatch(Operation::BookCount, None).await.unwrap() {
            OperationOutput::Count(n) => assert_eq!(n, 0),
            other => panic!("unexpected output: {other:?}"),
        }
        match router.dispatch(Operation::Me, None).await.unwrap() {
            OperationOutput::Account(account) => assert!(account.is_none()),
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[tokio::test]
    async fn book_with_dangling_author_fails_the_read() {
        let (router, stores) = router();
        let missing_author = CatalogAuthor::named("Never Stored").id;
        stores
            .books
            .insert(NewBook {
                title: "Orphaned".into(),
                published: 1990,
                genres: vec!["x".into()],
                author: missing_author,
            })
            .await
            .unwrap();

        let err = router.all_books(AllBooksArgs::default()).await.unwrap_err();
        assert_eq!(err.kind(), "VALIDATION_OR_PERSISTENCE_FAILURE");
        match err {
            ServiceError::ValidationOrPersistenceFailure {
                message,
                invalid_args,
                source,
            } => {
                assert_eq!(message, "Loading authors failed");
                assert_eq!(invalid_args, "Orphaned");
                assert!(matches!(source, StoreError::NotFound { id, .. } if id == missing_author));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = router
            .filtered_books(FilteredBooksArgs { genre: "x".into() })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "VALIDATION_OR_PERSISTENCE_FAILURE");
    }

    #[tokio::test]
    async fn dispatch_gates_every_operation_that_requires_a_principal() {
        let (router, _stores) = router();
        let decoded = [
            ("addPerson", json!({ "name": "Arto Hellas", "street": "Tapiolankatu 5 A", "city": "Espoo" })),
            ("editNumber", json!({ "name": "Arto Hellas", "phone": "040-1" })),
            ("addBook", json!({ "title": "T1", "author": "A. Author", "published": 2001, "genres": ["x"] })),
            ("editAuthor", json!({ "name": "A. Author", "born": 1950 })),
            ("addAsFriend", json!({ "name": "Arto Hellas" })),
            ("bookCount", json!({})),
        ];

        for (name, arguments) in decoded {
            let op = Operation::parse(name, arguments).unwrap();
            let gated = op.requires_principal();
            let result = router.dispatch(op, None).await;
            match result {
                Err(err) if gated => assert_eq!(err.kind(), "AUTHORIZATION_REQUIRED", "{name}"),
                Err(err) => assert_ne!(err.kind(), "AUTHORIZATION_REQUIRED", "{name}"),
                Ok(_) => assert!(!gated, "{name} ran without a principal"),
            }
        }

        assert_eq!(router.book_count().await.unwrap(), 0);
        assert_eq!(router.person_count().await.unwrap(), 0);
    }
}
