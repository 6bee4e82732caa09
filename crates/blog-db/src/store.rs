use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use async_trait::async_trait;
use rusqlite::Connection;
use tracing::{debug, error, warn};

use blog_types::{CreatePostInput, Post, Store, StoreError, User, id};

use crate::queries;
use crate::{Access, Database};

const PENDING: u8 = 0;
const RUNNING: u8 = 1;
const DONE: u8 = 2;
const CANCELLED: u8 = 3;

/// VM instructions between cancellation checks while a statement runs.
const PROGRESS_OPS: i32 = 1_000;

/// `Store` backed by the SQLite pool in [`Database`].
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Database>,
}

impl SqliteStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Runs blocking SQLite work off the async runtime, tied to the calling
    /// future: dropping the future before the query starts skips it, and
    /// dropping it mid-query aborts the statement at the next progress check.
    async fn run<T, F>(&self, access: Access, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let state = Arc::new(AtomicU8::new(PENDING));
        let mut guard = CancelOnDrop {
            state: state.clone(),
            armed: true,
        };

        let db = self.db.clone();
        let joined = tokio::task::spawn_blocking(move || {
            db.with_access(access, |conn| gated(&state, conn, f))
        })
        .await;
        guard.armed = false;

        joined.map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StoreError::Backend(e.to_string())
        })?
    }
}

fn cancelled(msg: &str) -> rusqlite::Error {
    rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_INTERRUPT),
        Some(msg.to_string()),
    )
}

/// Runs `f` unless the caller already gave up on it, watching for the caller
/// giving up while it runs.
fn gated<T, F>(state: &Arc<AtomicU8>, conn: &Connection, f: F) -> rusqlite::Result<T>
where
    F: FnOnce(&Connection) -> rusqlite::Result<T>,
{
    if state
        .compare_exchange(PENDING, RUNNING, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return Err(cancelled("query cancelled before it started"));
    }

    let watch = state.clone();
    conn.progress_handler(
        PROGRESS_OPS,
        Some(move || watch.load(Ordering::Acquire) == CANCELLED),
    );
    let out = f(conn);
    conn.progress_handler(PROGRESS_OPS, None::<fn() -> bool>);

    if state.swap(DONE, Ordering::AcqRel) == CANCELLED {
        debug!("Store call finished after its caller went away");
    }
    out
}

struct CancelOnDrop {
    state: Arc<AtomicU8>,
    armed: bool,
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let prev = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| {
                (s == PENDING || s == RUNNING).then_some(CANCELLED)
            });
        match prev {
            Ok(PENDING) => debug!("Store call dropped before its query started"),
            Ok(_) => debug!("Store call dropped mid-query, aborting statement"),
            Err(_) => {}
        }
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_user(&self, user_id: &str) -> Result<User, StoreError> {
        let key = id::decode(user_id)?;
        debug!("get_user {}", key);
        self.run(Access::Read, move |conn| queries::query_user(conn, key))
            .await?
            .map(User::from)
            .ok_or_else(|| StoreError::not_found("user", user_id))
    }

    async fn get_post(&self, post_id: &str) -> Result<Post, StoreError> {
        let key = id::decode(post_id)?;
        debug!("get_post {}", key);
        self.run(Access::Read, move |conn| queries::query_post(conn, key))
            .await?
            .map(Post::from)
            .ok_or_else(|| StoreError::not_found("post", post_id))
    }

    async fn get_posts(&self, author_id: &str) -> Result<Vec<Post>, StoreError> {
        let key = id::decode(author_id)?;
        debug!("get_posts author={}", key);
        let rows = self
            .run(Access::Read, move |conn| queries::query_posts_by_author(conn, key))
            .await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn all_posts(&self) -> Result<Vec<Post>, StoreError> {
        debug!("all_posts");
        let rows = self.run(Access::Read, queries::query_all_posts).await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn create_post(&self, input: CreatePostInput) -> Result<Post, StoreError> {
        let author_key = id::decode(&input.user_id)?;
        debug!("create_post author={}", author_key);

        let CreatePostInput {
            title,
            content,
            user_id,
        } = input;
        let row = self
            .run(Access::Write, move |conn| {
                queries::insert_post(conn, &title, &content, author_key)
            })
            .await
            .inspect_err(|e| {
                if matches!(e, StoreError::ForeignKeyViolation(_)) {
                    warn!("create_post rejected: author {} does not exist", user_id);
                }
            })?;

        let mut post = Post::from(row);
        // Echo the caller's id verbatim rather than re-encoding the stored key.
        post.author.id = user_id;
        Ok(post)
    }

    async fn delete_post(&self, post_id: &str) -> Result<bool, StoreError> {
        let key = id::decode(post_id)?;
        let removed = self
            .run(Access::Write, move |conn| queries::delete_post(conn, key))
            .await?;
        debug!("delete_post {} removed {} row(s)", key, removed);
        Ok(true)
    }
}
