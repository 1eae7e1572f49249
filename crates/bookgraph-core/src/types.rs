use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub type ContactId = Uuid;
pub type AuthorId = Uuid;
pub type BookId = Uuid;
pub type AccountId = Uuid;

/// A person in the address book. Accounts reference contacts through their
/// friend sets but never own them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub phone: Option<String>,
    pub street: String,
    pub city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub phone: Option<String>,
    pub street: String,
    pub city: String,
}

impl NewContact {
    pub fn into_contact(self) -> Contact {
        Contact {
            id: Uuid::new_v4(),
            name: self.name,
            phone: self.phone,
            street: self.street,
            city: self.city,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogAuthor {
    pub id: AuthorId,
    pub name: String,
    pub born: Option<i32>,
}

impl CatalogAuthor {
    /// An author created implicitly from a book reference; the birth year is
    /// left unset until someone edits it.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            born: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogBook {
    pub id: BookId,
    pub title: String,
    pub published: i32,
    pub genres: BTreeSet<String>,
    pub author: AuthorId,
}

impl CatalogBook {
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.contains(genre)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub published: i32,
    pub genres: Vec<String>,
    pub author: AuthorId,
}

impl NewBook {
    pub fn into_book(self) -> CatalogBook {
        CatalogBook {
            id: Uuid::new_v4(),
            title: self.title,
            published: self.published,
            genres: self.genres.into_iter().collect(),
            author: self.author,
        }
    }
}

/// A registered account. `friends` keeps insertion order and holds each
/// contact id at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub favorite_genre: String,
    pub friends: Vec<ContactId>,
}

impl Account {
    pub fn has_friend(&self, contact: ContactId) -> bool {
        self.friends.contains(&contact)
    }

    /// Appends `contact` unless it is already a friend. Returns whether the
    /// set changed.
    pub fn befriend(&mut self, contact: ContactId) -> bool {
        if self.has_friend(contact) {
            return false;
        }
        self.friends.push(contact);
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub favorite_genre: String,
}

impl NewAccount {
    pub fn into_account(self) -> Account {
        Account {
            id: Uuid::new_v4(),
            username: self.username,
            password_hash: self.password_hash,
            favorite_genre: self.favorite_genre,
            friends: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFilter {
    /// `Some(true)` keeps contacts with a phone, `Some(false)` those without.
    pub has_phone: Option<bool>,
}

impl ContactFilter {
    pub fn matches(&self, contact: &Contact) -> bool {
        self.has_phone
            .map_or(true, |wanted| contact.phone.is_some() == wanted)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub author: Option<AuthorId>,
    pub genre: Option<String>,
}

impl BookFilter {
    pub fn by_author(author: AuthorId) -> Self {
        Self {
            author: Some(author),
            genre: None,
        }
    }

    pub fn by_genre(genre: impl Into<String>) -> Self {
        Self {
            author: None,
            genre: Some(genre.into()),
        }
    }

    pub fn matches(&self, book: &CatalogBook) -> bool {
        self.author.map_or(true, |author| book.author == author)
            && self
                .genre
                .as_deref()
                .map_or(true, |genre| book.has_genre(genre))
    }
}
