use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{CreatePostInput, Post, User};

/// Persistence capability consumed by the GraphQL resolvers.
///
/// All ids crossing this boundary are the opaque string form (see
/// [`crate::id`]). Implementations must reject a malformed id with
/// [`StoreError::InvalidIdentifier`] before touching the backend, and must be
/// callable concurrently from independent tasks.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_user(&self, id: &str) -> Result<User, StoreError>;

    /// The returned author reference carries the id only.
    async fn get_post(&self, id: &str) -> Result<Post, StoreError>;

    /// Posts written by `author_id`. An author with no posts yields an empty
    /// vec, not `NotFound`.
    async fn get_posts(&self, author_id: &str) -> Result<Vec<Post>, StoreError>;

    /// Every post, newest id first, with the author's name filled in from a
    /// single join.
    async fn all_posts(&self) -> Result<Vec<Post>, StoreError>;

    /// Inserts a post and reads back its assigned id and column defaults in
    /// the same statement. The author reference echoes `input.user_id`.
    async fn create_post(&self, input: CreatePostInput) -> Result<Post, StoreError>;

    /// `Ok(true)` whenever the delete ran, whether or not a row matched.
    async fn delete_post(&self, id: &str) -> Result<bool, StoreError>;
}
