//! Typed operation names and their argument shapes.
//!
//! Transports decode an incoming request into an [`Operation`] before it
//! reaches the router, so handlers never see an untyped argument bag.

use async_graphql::Enum;
use bookgraph_core::{Account, CatalogAuthor, CatalogBook, Contact};
use serde::{Deserialize, Serialize};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum YesNo {
    Yes,
    No,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllBooksArgs {
    pub author: Option<String>,
    pub genre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilteredBooksArgs {
    pub genre: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AllPersonsArgs {
    pub phone: Option<YesNo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FindPersonArgs {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddPersonArgs {
    pub name: String,
    pub phone: Option<String>,
    pub street: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EditNumberArgs {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddBookArgs {
    pub title: String,
    pub author: String,
    pub published: i32,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EditAuthorArgs {
    pub name: String,
    pub born: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserArgs {
    pub username: String,
    pub password: String,
    pub favorite_genre: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginArgs {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddAsFriendArgs {
    pub name: String,
}

/// Every operation the service understands, keyed by its wire name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "operation", content = "arguments", rename_all = "camelCase")]
pub enum Operation {
    PersonCount,
    BookCount,
    AuthorCount,
    AllBooks(AllBooksArgs),
    FilteredBooks(FilteredBooksArgs),
    AllAuthors,
    AllPersons(AllPersonsArgs),
    FindPerson(FindPersonArgs),
    Me,
    AddPerson(AddPersonArgs),
    EditNumber(EditNumberArgs),
    AddBook(AddBookArgs),
    EditAuthor(EditAuthorArgs),
    CreateUser(CreateUserArgs),
    Login(LoginArgs),
    AddAsFriend(AddAsFriendArgs),
}

impl Operation {
    /// Decodes an operation from its name and a JSON argument object.
    pub fn parse(name: &str, arguments: serde_json::Value) -> Result<Self, serde_json::Error> {
        let arguments = match arguments {
            serde_json::Value::Null => serde_json::json!({}),
            other => other,
        };
        let without_arguments = arguments.as_object().is_some_and(|map| map.is_empty());

        match serde_json::from_value(serde_json::json!({ "operation": name, "arguments": arguments })) {
            Ok(op) => Ok(op),
            // Operations without arguments carry no content at all.
            Err(err) if without_arguments => {
                serde_json::from_value(serde_json::json!({ "operation": name })).map_err(|_| err)
            }
            Err(err) => Err(err),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::PersonCount => "personCount",
            Operation::BookCount => "bookCount",
            Operation::AuthorCount => "authorCount",
            Operation::AllBooks(_) => "allBooks",
            Operation::FilteredBooks(_) => "filteredBooks",
            Operation::AllAuthors => "allAuthors",
            Operation::AllPersons(_) => "allPersons",
            Operation::FindPerson(_) => "findPerson",
            Operation::Me => "me",
            Operation::AddPerson(_) => "addPerson",
            Operation::EditNumber(_) => "editNumber",
            Operation::AddBook(_) => "addBook",
            Operation::EditAuthor(_) => "editAuthor",
            Operation::CreateUser(_) => "createUser",
            Operation::Login(_) => "login",
            Operation::AddAsFriend(_) => "addAsFriend",
        }
    }

    /// Whether the handler refuses to run without a principal.
    pub fn requires_principal(&self) -> bool {
        matches!(
            self,
            Operation::AddPerson(_)
                | Operation::AddBook(_)
                | Operation::EditAuthor(_)
                | Operation::AddAsFriend(_)
        )
    }
}

/// A book joined with the author it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookWithAuthor {
    pub book: CatalogBook,
    pub author: CatalogAuthor,
}

#[derive(Debug, Clone)]
pub enum OperationOutput {
    Count(usize),
    Books(Vec<BookWithAuthor>),
    Book(BookWithAuthor),
    Authors(Vec<CatalogAuthor>),
    Author(Option<CatalogAuthor>),
    Persons(Vec<Contact>),
    Person(Option<Contact>),
    Account(Option<Account>),
    Token(String),
}
