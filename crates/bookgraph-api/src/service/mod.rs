//! Transport-neutral service layer: typed operations, their handlers and the
//! consistency rules shared between them.

pub mod authors;
pub mod error;
pub mod friends;
pub mod operations;
pub mod projection;
pub mod router;

pub use authors::AuthorResolver;
pub use error::{ServiceError, BAD_USER_INPUT};
pub use friends::FriendSet;
pub use operations::*;
pub use projection::BookCountProjection;
pub use router::OperationRouter;
