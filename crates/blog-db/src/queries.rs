use crate::Database;
use crate::models::{PostRow, PostWithAuthorRow, UserRow};
use blog_types::{StoreError, id};
use rusqlite::{Connection, OptionalExtension, Row};

const POST_COLUMNS: &str = "id, title, content, published, author_id";

impl Database {
    /// Provisions a user. Users have no write path through the API; this is
    /// for seeding and tests.
    pub fn insert_user(&self, name: &str, email: &str) -> Result<String, StoreError> {
        self.with_conn_mut(|conn| {
            conn.query_row(
                "INSERT INTO users (name, email) VALUES (?1, ?2) RETURNING id",
                (name, email),
                |row| row.get::<_, i64>(0),
            )
        })
        .map(id::encode)
    }
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        published: row.get(3)?,
        author_id: row.get(4)?,
    })
}

pub fn query_user(conn: &Connection, id: i64) -> rusqlite::Result<Option<UserRow>> {
    let mut stmt = conn.prepare_cached("SELECT id, name, email FROM users WHERE id = ?1")?;

    stmt.query_row([id], |row| {
        Ok(UserRow {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
        })
    })
    .optional()
}

pub fn query_post(conn: &Connection, id: i64) -> rusqlite::Result<Option<PostRow>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {} FROM posts WHERE id = ?1", POST_COLUMNS))?;

    stmt.query_row([id], post_from_row).optional()
}

/// Oldest first. Callers must not rely on this order.
pub fn query_posts_by_author(conn: &Connection, author_id: i64) -> rusqlite::Result<Vec<PostRow>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM posts WHERE author_id = ?1 ORDER BY id",
        POST_COLUMNS
    ))?;

    let rows = stmt
        .query_map([author_id], post_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn query_all_posts(conn: &Connection) -> rusqlite::Result<Vec<PostWithAuthorRow>> {
    // JOIN users so the author name comes back with the post (no per-post lookup)
    let mut stmt = conn.prepare_cached(
        "SELECT p.id, p.title, p.content, p.published, p.author_id, u.name
         FROM posts p
         INNER JOIN users u ON p.author_id = u.id
         ORDER BY p.id DESC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(PostWithAuthorRow {
                post: post_from_row(row)?,
                author_name: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Inserts and reads back the canonical row in one statement, so the
/// returned id and `published` default are exactly what was stored.
pub fn insert_post(
    conn: &Connection,
    title: &str,
    content: &str,
    author_id: i64,
) -> rusqlite::Result<PostRow> {
    let mut stmt = conn.prepare_cached(&format!(
        "INSERT INTO posts (title, content, author_id) VALUES (?1, ?2, ?3) RETURNING {}",
        POST_COLUMNS
    ))?;

    stmt.query_row((title, content, author_id), post_from_row)
}

/// Returns the number of rows removed.
pub fn delete_post(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM posts WHERE id = ?1", [id])
}
