use bookgraph_core::{AuthorId, BookFilter, BookStore, StoreResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Book count per author, computed from the book collection on every call.
/// Nothing is stored; a count reflects the books present when the scan ran.
pub struct BookCountProjection {
    books: Arc<dyn BookStore>,
}

impl BookCountProjection {
    pub fn new(books: Arc<dyn BookStore>) -> Self {
        Self { books }
    }

    pub async fn count_for(&self, author: AuthorId) -> StoreResult<usize> {
        self.books.count(&BookFilter::by_author(author)).await
    }

    /// Counts for several authors from a single scan. Every requested author
    /// gets an entry, zero included.
    pub async fn counts_for(&self, authors: &[AuthorId]) -> StoreResult<HashMap<AuthorId, usize>> {
        let mut counts: HashMap<AuthorId, usize> = authors.iter().map(|id| (*id, 0)).collect();
        for book in self.books.find(&BookFilter::default()).await? {
            if let Some(count) = counts.get_mut(&book.author) {
                *count += 1;
            }
        }
        Ok(counts)
    }
}
