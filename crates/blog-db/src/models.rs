//! Database row types. These map directly to SQLite rows and keep native
//! integer keys; conversion into the blog-types entities is where ids get
//! encoded.

use blog_types::id;
use blog_types::{AuthorRef, Post, User};

pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
}

pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub author_id: i64,
}

/// A post joined with its author's name.
pub struct PostWithAuthorRow {
    pub post: PostRow,
    pub author_name: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: id::encode(row.id),
            name: row.name,
            email: row.email,
        }
    }
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: id::encode(row.id),
            title: row.title,
            content: row.content,
            published: row.published,
            author: AuthorRef::id_only(id::encode(row.author_id)),
        }
    }
}

impl From<PostWithAuthorRow> for Post {
    fn from(row: PostWithAuthorRow) -> Self {
        let mut post = Post::from(row.post);
        post.author.name = Some(row.author_name);
        post
    }
}
