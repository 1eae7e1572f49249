use bookgraph_core::{AuthorStore, CatalogAuthor};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::ServiceError;

/// Create-if-missing-else-reuse for authors referenced by name from a book.
///
/// Lookup and insert are two separate store calls. Two first uses of the
/// same name can both miss the lookup; the store's unique index on the
/// author name then rejects the later insert.
pub struct AuthorResolver {
    authors: Arc<dyn AuthorStore>,
}

impl AuthorResolver {
    pub fn new(authors: Arc<dyn AuthorStore>) -> Self {
        Self { authors }
    }

    #[instrument(skip(self))]
    pub async fn resolve_or_create(&self, name: &str) -> Result<CatalogAuthor, ServiceError> {
        let existing = self
            .authors
            .find_by_name(name)
            .await
            .map_err(ServiceError::persistence("Finding author failed", name))?;

        if let Some(author) = existing {
            debug!(author_id = %author.id, "reusing existing author");
            return Ok(author);
        }

        let author = self
            .authors
            .insert(CatalogAuthor::named(name))
            .await
            .map_err(ServiceError::persistence("Saving author failed", name))?;
        info!(author_id = %author.id, "created author from book reference");
        Ok(author)
    }
}
