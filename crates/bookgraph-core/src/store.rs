//! In-memory document store.
//!
//! Each collection sits behind its own lock, so a single insert or save is
//! atomic. Nothing spans collections or calls; callers that read, modify and
//! save can interleave with each other.

use crate::{
    Account, AccountId, AccountStore, AuthorId, AuthorStore, BookFilter, BookStore,
    CatalogAuthor, CatalogBook, Contact, ContactFilter, ContactId, ContactStore, NewAccount,
    NewBook, NewContact, StoreError, StoreResult,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// A document with an id and one uniquely indexed field.
pub trait Document: Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;
    const UNIQUE_FIELD: &'static str;

    fn id(&self) -> Uuid;
    fn unique_key(&self) -> &str;
}

impl Document for Contact {
    const COLLECTION: &'static str = "contacts";
    const UNIQUE_FIELD: &'static str = "name";

    fn id(&self) -> Uuid {
        self.id
    }

    fn unique_key(&self) -> &str {
        &self.name
    }
}

impl Document for CatalogAuthor {
    const COLLECTION: &'static str = "authors";
    const UNIQUE_FIELD: &'static str = "name";

    fn id(&self) -> Uuid {
        self.id
    }

    fn unique_key(&self) -> &str {
        &self.name
    }
}

impl Document for CatalogBook {
    const COLLECTION: &'static str = "books";
    const UNIQUE_FIELD: &'static str = "title";

    fn id(&self) -> Uuid {
        self.id
    }

    fn unique_key(&self) -> &str {
        &self.title
    }
}

impl Document for Account {
    const COLLECTION: &'static str = "accounts";
    const UNIQUE_FIELD: &'static str = "username";

    fn id(&self) -> Uuid {
        self.id
    }

    fn unique_key(&self) -> &str {
        &self.username
    }
}

pub struct MemoryCollection<T> {
    docs: RwLock<Vec<T>>,
}

impl<T: Document> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Document> MemoryCollection<T> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
        }
    }

    fn duplicate(doc: &T) -> StoreError {
        StoreError::Duplicate {
            collection: T::COLLECTION,
            field: T::UNIQUE_FIELD,
            value: doc.unique_key().to_string(),
        }
    }

    fn insert_doc(&self, doc: T) -> StoreResult<T> {
        let mut docs = self.docs.write();
        if docs.iter().any(|d| d.unique_key() == doc.unique_key()) {
            return Err(Self::duplicate(&doc));
        }
        debug!(collection = T::COLLECTION, id = %doc.id(), "inserted document");
        docs.push(doc.clone());
        Ok(doc)
    }

    fn replace_doc(&self, doc: &T) -> StoreResult<()> {
        let mut docs = self.docs.write();
        if docs
            .iter()
            .any(|d| d.id() != doc.id() && d.unique_key() == doc.unique_key())
        {
            return Err(Self::duplicate(doc));
        }
        let slot = docs
            .iter_mut()
            .find(|d| d.id() == doc.id())
            .ok_or(StoreError::NotFound {
                collection: T::COLLECTION,
                id: doc.id(),
            })?;
        *slot = doc.clone();
        Ok(())
    }

    fn find_where(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.docs.read().iter().filter(|d| pred(d)).cloned().collect()
    }

    fn find_one_where(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.docs.read().iter().find(|d| pred(d)).cloned()
    }

    fn count_where(&self, pred: impl Fn(&T) -> bool) -> usize {
        self.docs.read().iter().filter(|d| pred(d)).count()
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ContactStore for MemoryCollection<Contact> {
    async fn insert(&self, contact: NewContact) -> StoreResult<Contact> {
        self.insert_doc(contact.into_contact())
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Contact>> {
        Ok(self.find_one_where(|c| c.name == name))
    }

    async fn find_by_ids(&self, ids: &[ContactId]) -> StoreResult<Vec<Contact>> {
        Ok(self.find_where(|c| ids.contains(&c.id)))
    }

    async fn find(&self, filter: &ContactFilter) -> StoreResult<Vec<Contact>> {
        Ok(self.find_where(|c| filter.matches(c)))
    }

    async fn save(&self, contact: &Contact) -> StoreResult<()> {
        self.replace_doc(contact)
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.len())
    }
}

#[async_trait]
impl AuthorStore for MemoryCollection<CatalogAuthor> {
    async fn insert(&self, author: CatalogAuthor) -> StoreResult<CatalogAuthor> {
        self.insert_doc(author)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<CatalogAuthor>> {
        Ok(self.find_one_where(|a| a.name == name))
    }

    async fn find_by_ids(&self, ids: &[AuthorId]) -> StoreResult<Vec<CatalogAuthor>> {
        Ok(self.find_where(|a| ids.contains(&a.id)))
    }

    async fn find_all(&self) -> StoreResult<Vec<CatalogAuthor>> {
        Ok(self.find_where(|_| true))
    }

    async fn save(&self, author: &CatalogAuthor) -> StoreResult<()> {
        self.replace_doc(author)
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.len())
    }
}

#[async_trait]
impl BookStore for MemoryCollection<CatalogBook> {
    async fn insert(&self, book: NewBook) -> StoreResult<CatalogBook> {
        self.insert_doc(book.into_book())
    }

    async fn find(&self, filter: &BookFilter) -> StoreResult<Vec<CatalogBook>> {
        Ok(self.find_where(|b| filter.matches(b)))
    }

    async fn count(&self, filter: &BookFilter) -> StoreResult<usize> {
        Ok(self.count_where(|b| filter.matches(b)))
    }
}

#[async_trait]
impl AccountStore for MemoryCollection<Account> {
    async fn insert(&self, account: NewAccount) -> StoreResult<Account> {
        self.insert_doc(account.into_account())
    }

    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>> {
        Ok(self.find_one_where(|a| a.id == id))
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        Ok(self.find_one_where(|a| a.username == username))
    }

    async fn save(&self, account: &Account) -> StoreResult<()> {
        self.replace_doc(account)
    }
}

/// Handles to the four collections, constructed once at startup and shared
/// by every request.
#[derive(Clone)]
pub struct Stores {
    pub contacts: Arc<dyn ContactStore>,
    pub authors: Arc<dyn AuthorStore>,
    pub books: Arc<dyn BookStore>,
    pub accounts: Arc<dyn AccountStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            contacts: Arc::new(MemoryCollection::<Contact>::new()),
            authors: Arc::new(MemoryCollection::<CatalogAuthor>::new()),
            books: Arc::new(MemoryCollection::<CatalogBook>::new()),
            accounts: Arc::new(MemoryCollection::<Account>::new()),
        }
    }
}
