/// Users are provisioned outside the write surface of this service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Back-reference from a post to its author.
///
/// `name` is only filled in when the read path already joined `users`
/// (see `Store::all_posts`). Everything else carries the id alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRef {
    pub id: String,
    pub name: Option<String>,
}

impl AuthorRef {
    pub fn id_only(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub author: AuthorRef,
}

/// Arguments for `Store::create_post`. `published` is left to the store's
/// column default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub user_id: String,
}
