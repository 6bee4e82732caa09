//! In-memory `Store` that counts calls, for asserting how many store round
//! trips a query costs.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use blog_types::{AuthorRef, CreatePostInput, Post, Store, StoreError, User, id};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Calls {
    pub get_user: usize,
    pub get_post: usize,
    pub get_posts: usize,
    pub all_posts: usize,
    pub create_post: usize,
    pub delete_post: usize,
}

#[derive(Default)]
struct Counters {
    get_user: AtomicUsize,
    get_post: AtomicUsize,
    get_posts: AtomicUsize,
    all_posts: AtomicUsize,
    create_post: AtomicUsize,
    delete_post: AtomicUsize,
}

struct StoredPost {
    title: String,
    content: String,
    published: bool,
    author_id: i64,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, (String, String)>,
    posts: BTreeMap<i64, StoredPost>,
    next_post_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    counters: Counters,
    failure: Mutex<Option<StoreError>>,
}

impl MemoryStore {
    /// Users 1 (Ada), 2 (Grace), 3 (Linus, no posts); posts 1 and 3 by Ada,
    /// post 2 by Grace.
    pub fn seeded() -> Self {
        let store = Self::default();
        {
            let mut t = store.tables.lock().unwrap();
            t.users.insert(1, ("Ada".into(), "ada@example.com".into()));
            t.users.insert(2, ("Grace".into(), "grace@example.com".into()));
            t.users.insert(3, ("Linus".into(), "linus@example.com".into()));
            for (title, author_id) in [("First", 1), ("Second", 2), ("Third", 1)] {
                t.next_post_id += 1;
                let pid = t.next_post_id;
                t.posts.insert(
                    pid,
                    StoredPost {
                        title: title.into(),
                        content: format!("{} content", title),
                        published: false,
                        author_id,
                    },
                );
            }
        }
        store
    }

    /// Every subsequent call fails with `err`.
    pub fn fail_with(&self, err: StoreError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> Calls {
        let c = &self.counters;
        Calls {
            get_user: c.get_user.load(Ordering::SeqCst),
            get_post: c.get_post.load(Ordering::SeqCst),
            get_posts: c.get_posts.load(Ordering::SeqCst),
            all_posts: c.all_posts.load(Ordering::SeqCst),
            create_post: c.create_post.load(Ordering::SeqCst),
            delete_post: c.delete_post.load(Ordering::SeqCst),
        }
    }

    fn enter(&self, counter: &AtomicUsize) -> Result<(), StoreError> {
        counter.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn to_post(pid: i64, p: &StoredPost) -> Post {
        Post {
            id: id::encode(pid),
            title: p.title.clone(),
            content: p.content.clone(),
            published: p.published,
            author: AuthorRef::id_only(id::encode(p.author_id)),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<User, StoreError> {
        let key = id::decode(user_id)?;
        self.enter(&self.counters.get_user)?;
        let t = self.tables.lock().unwrap();
        t.users
            .get(&key)
            .map(|(name, email)| User {
                id: id::encode(key),
                name: name.clone(),
                email: email.clone(),
            })
            .ok_or_else(|| StoreError::not_found("user", user_id))
    }

    async fn get_post(&self, post_id: &str) -> Result<Post, StoreError> {
        let key = id::decode(post_id)?;
        self.enter(&self.counters.get_post)?;
        let t = self.tables.lock().unwrap();
        t.posts
            .get(&key)
            .map(|p| Self::to_post(key, p))
            .ok_or_else(|| StoreError::not_found("post", post_id))
    }

    async fn get_posts(&self, author_id: &str) -> Result<Vec<Post>, StoreError> {
        let key = id::decode(author_id)?;
        self.enter(&self.counters.get_posts)?;
        let t = self.tables.lock().unwrap();
        Ok(t.posts
            .iter()
            .filter(|(_, p)| p.author_id == key)
            .map(|(pid, p)| Self::to_post(*pid, p))
            .collect())
    }

    async fn all_posts(&self) -> Result<Vec<Post>, StoreError> {
        self.enter(&self.counters.all_posts)?;
        let t = self.tables.lock().unwrap();
        Ok(t.posts
            .iter()
            .rev()
            .filter_map(|(pid, p)| {
                let (name, _) = t.users.get(&p.author_id)?;
                let mut post = Self::to_post(*pid, p);
                post.author = AuthorRef::named(id::encode(p.author_id), name.clone());
                Some(post)
            })
            .collect())
    }

    async fn create_post(&self, input: CreatePostInput) -> Result<Post, StoreError> {
        let author_id = id::decode(&input.user_id)?;
        self.enter(&self.counters.create_post)?;
        let mut t = self.tables.lock().unwrap();
        if !t.users.contains_key(&author_id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "no user {}",
                author_id
            )));
        }
        t.next_post_id += 1;
        let pid = t.next_post_id;
        let stored = StoredPost {
            title: input.title,
            content: input.content,
            published: false,
            author_id,
        };
        let mut post = Self::to_post(pid, &stored);
        post.author = AuthorRef::id_only(input.user_id);
        t.posts.insert(pid, stored);
        Ok(post)
    }

    async fn delete_post(&self, post_id: &str) -> Result<bool, StoreError> {
        let key = id::decode(post_id)?;
        self.enter(&self.counters.delete_post)?;
        self.tables.lock().unwrap().posts.remove(&key);
        Ok(true)
    }
}
