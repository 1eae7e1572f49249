use axum::http::{header, HeaderMap};
use bookgraph_core::{Account, AccountStore, JwtManager};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const BEARER_PREFIX: &str = "bearer ";

/// The authenticated account behind a request. Attached to the GraphQL
/// request data; its absence means the caller is anonymous.
#[derive(Debug, Clone)]
pub struct Principal {
    pub account: Account,
}

/// Extracts the token from an `Authorization: Bearer <token>` header. The
/// scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let prefix = value.get(..BEARER_PREFIX.len())?;
    if prefix.eq_ignore_ascii_case(BEARER_PREFIX) {
        Some(value[BEARER_PREFIX.len()..].trim())
    } else {
        None
    }
}

/// Maps an optional bearer token to a principal.
///
/// Never fails: a bad signature, an expired token or an account that no
/// longer exists all resolve to an anonymous caller. Rejection happens later,
/// at the gated mutation. A failing account store also yields an anonymous
/// caller, so a gated mutation reports `AuthorizationRequired` rather than
/// the store error.
pub struct IdentityVerifier {
    jwt: Arc<JwtManager>,
    accounts: Arc<dyn AccountStore>,
}

impl IdentityVerifier {
    pub fn new(jwt: Arc<JwtManager>, accounts: Arc<dyn AccountStore>) -> Self {
        Self { jwt, accounts }
    }

    #[instrument(skip_all)]
    pub async fn resolve(&self, token: Option<&str>) -> Option<Principal> {
        let token = token?;

        let claims = match self.jwt.validate_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(reason = %e, "ignoring invalid bearer token");
                return None;
            }
        };
        let account_id = match claims.account_id() {
            Ok(id) => id,
            Err(e) => {
                warn!(reason = %e, "ignoring token with malformed subject");
                return None;
            }
        };

        match self.accounts.find_by_id(account_id).await {
            Ok(Some(account)) => {
                debug!(username = %account.username, "request authenticated");
                Some(Principal { account })
            }
            Ok(None) => {
                warn!(%account_id, "ignoring token for unknown account");
                None
            }
            Err(e) => {
                warn!(reason = %e, "account lookup failed, treating caller as anonymous");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use bookgraph_core::{
        AccountId, AuthConfig, MemoryCollection, NewAccount, StoreError, StoreResult,
    };
    use secrecy::SecretString;

    struct UnavailableAccounts;

    #[async_trait]
    impl AccountStore for UnavailableAccounts {
        async fn insert(&self, _account: NewAccount) -> StoreResult<Account> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn find_by_id(&self, _id: AccountId) -> StoreResult<Option<Account>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn find_by_username(&self, _username: &str) -> StoreResult<Option<Account>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn save(&self, _account: &Account) -> StoreResult<()> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    fn jwt(secret: &str) -> Arc<JwtManager> {
        let config = AuthConfig {
            jwt_secret: Some(SecretString::from(secret.to_string())),
            token_ttl_hours: 1,
        };
        Arc::new(JwtManager::new(&config).unwrap())
    }

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn extracts_bearer_token_case_insensitively() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("Bear")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn resolves_valid_token_to_its_account() {
        let accounts = Arc::new(MemoryCollection::<Account>::new());
        let account = accounts
            .insert(NewAccount {
                username: "mluukkai".into(),
                password_hash: String::new(),
                favorite_genre: "refactoring".into(),
            })
            .await
            .unwrap();
        let jwt = jwt("identity-test-secret-0123456789abcdef");
        let token = jwt.create_token(&account).unwrap();
        let verifier = IdentityVerifier::new(jwt, accounts);

        let principal = verifier.resolve(Some(&token)).await.unwrap();
        assert_eq!(principal.account.id, account.id);
        assert!(verifier.resolve(None).await.is_none());
    }

    #[tokio::test]
    async fn invalid_tokens_resolve_to_anonymous() {
        let accounts = Arc::new(MemoryCollection::<Account>::new());
        let account = NewAccount {
            username: "ghost".into(),
            password_hash: String::new(),
            favorite_genre: "horror".into(),
        }
        .into_account();

        let forged = jwt("another-secret-entirely-0123456789abcdef")
            .create_token(&account)
            .unwrap();
        let jwt = jwt("identity-test-secret-0123456789abcdef");
        let unknown_account = jwt.create_token(&account).unwrap();
        let verifier = IdentityVerifier::new(jwt, accounts);

        assert!(verifier.resolve(Some("not-a-jwt")).await.is_none());
        assert!(verifier.resolve(Some(&forged)).await.is_none());
        assert!(verifier.resolve(Some(&unknown_account)).await.is_none());
    }

    #[tokio::test]
    async fn account_store_failure_resolves_to_anonymous() {
        let account = NewAccount {
            username: "mluukkai".into(),
            password_hash: String::new(),
            favorite_genre: "refactoring".into(),
        }
        .into_account();
        let jwt = jwt("identity-test-secret-0123456789abcdef");
        let token = jwt.create_token(&account).unwrap();
        let verifier = IdentityVerifier::new(jwt, Arc::new(UnavailableAccounts));

        assert!(verifier.resolve(Some(&token)).await.is_none());
    }
}
