use crate::{
    Account, AccountId, AuthorId, BookFilter, CatalogAuthor, CatalogBook, Contact, ContactFilter,
    ContactId, NewAccount, NewBook, NewContact, StoreResult,
};
use async_trait::async_trait;

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert(&self, contact: NewContact) -> StoreResult<Contact>;
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Contact>>;
    async fn find_by_ids(&self, ids: &[ContactId]) -> StoreResult<Vec<Contact>>;
    async fn find(&self, filter: &ContactFilter) -> StoreResult<Vec<Contact>>;
    /// Replaces the stored document with the same id.
    async fn save(&self, contact: &Contact) -> StoreResult<()>;
    async fn count(&self) -> StoreResult<usize>;
}

#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn insert(&self, author: CatalogAuthor) -> StoreResult<CatalogAuthor>;
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<CatalogAuthor>>;
    async fn find_by_ids(&self, ids: &[AuthorId]) -> StoreResult<Vec<CatalogAuthor>>;
    async fn find_all(&self) -> StoreResult<Vec<CatalogAuthor>>;
    async fn save(&self, author: &CatalogAuthor) -> StoreResult<()>;
    async fn count(&self) -> StoreResult<usize>;
}

#[async_trait]
pub trait BookStore: Send + Sync {
    async fn insert(&self, book: NewBook) -> StoreResult<CatalogBook>;
    async fn find(&self, filter: &BookFilter) -> StoreResult<Vec<CatalogBook>>;
    async fn count(&self, filter: &BookFilter) -> StoreResult<usize>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert(&self, account: NewAccount) -> StoreResult<Account>;
    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>>;
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>>;
    /// Overwrites the whole account document, friend set included.
    async fn save(&self, account: &Account) -> StoreResult<()>;
}
