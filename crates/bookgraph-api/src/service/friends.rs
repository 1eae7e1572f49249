use bookgraph_core::{Account, AccountStore, Contact};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::ServiceError;

/// Keeps an account's friend set free of duplicate contacts.
///
/// The account passed in is the caller's snapshot; saving writes the whole
/// friend set back, so concurrent appends to the same account overwrite each
/// other.
pub struct FriendSet {
    accounts: Arc<dyn AccountStore>,
}

impl FriendSet {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    /// Adds an existing contact, unless the account already lists it.
    #[instrument(skip_all, fields(account = %account.username, contact = %contact.name))]
    pub async fn befriend(
        &self,
        mut account: Account,
        contact: &Contact,
    ) -> Result<Account, ServiceError> {
        if !account.befriend(contact.id) {
            debug!("contact already a friend");
        }
        self.persist(account, &contact.name).await
    }

    /// Adds a contact that was created on the account's behalf. A fresh
    /// contact cannot already be a member, so no check is made.
    #[instrument(skip_all, fields(account = %account.username, contact = %contact.name))]
    pub async fn attach_new(
        &self,
        mut account: Account,
        contact: &Contact,
    ) -> Result<Account, ServiceError> {
        account.friends.push(contact.id);
        self.persist(account, &contact.name).await
    }

    async fn persist(&self, account: Account, contact_name: &str) -> Result<Account, ServiceError> {
        self.accounts
            .save(&account)
            .await
            .map_err(ServiceError::persistence("Saving friends failed", contact_name))?;
        Ok(account)
    }
}
