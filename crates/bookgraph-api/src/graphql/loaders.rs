use async_graphql::dataloader::{DataLoader, Loader};
use bookgraph_core::AuthorId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

use crate::graphql::types::service_error;
use crate::service::{BookCountProjection, ServiceError};
use crate::state::AppState;

/// Batches `Author.booksByAuthor` lookups so a page of authors costs one scan
/// of the book collection instead of one per author.
pub struct BookCountLoader {
    projection: Arc<BookCountProjection>,
}

impl BookCountLoader {
    pub fn new(projection: Arc<BookCountProjection>) -> Self {
        Self { projection }
    }
}

impl Loader<AuthorId> for BookCountLoader {
    type Value = usize;
    type Error = async_graphql::Error;

    #[instrument(skip(self, keys), fields(batch_size = keys.len()))]
    async fn load(&self, keys: &[AuthorId]) -> Result<HashMap<AuthorId, usize>, Self::Error> {
        let start_time = Instant::now();

        let counts = self.projection.counts_for(keys).await.map_err(|e| {
            service_error(ServiceError::persistence("Counting books failed", "booksByAuthor")(e))
        })?;

        let elapsed = start_time.elapsed();
        debug!("Counted books for {} authors in {}ms", counts.len(), elapsed.as_millis());
        if elapsed.as_millis() > 50 {
            warn!("Book count batch took {}ms (>50ms threshold)", elapsed.as_millis());
        }

        Ok(counts)
    }
}

/// Uncached: counts are recomputed for every batch, so a book added between
/// two requests shows up in the next read.
pub fn book_count_loader(state: &AppState) -> DataLoader<BookCountLoader> {
    DataLoader::new(BookCountLoader::new(state.router.projection()), tokio::spawn)
}
