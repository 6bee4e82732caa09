pub mod error;
pub mod id;
pub mod models;
pub mod store;

pub use error::StoreError;
pub use models::{AuthorRef, CreatePostInput, Post, User};
pub use store::Store;
