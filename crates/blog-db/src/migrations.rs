use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Brings the schema up to the latest version. Safe to call on every open.
///
/// `posts.published` gets its initial value from the column default; nothing
/// above this layer sets it on insert.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| {
            r.get(0)
        })?;

    if version < 1 {
        info!("Running migration v1 (users, posts)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id      INTEGER PRIMARY KEY,
                name    TEXT NOT NULL,
                email   TEXT NOT NULL UNIQUE
            );

            CREATE TABLE posts (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT NOT NULL,
                content     TEXT NOT NULL,
                published   BOOLEAN NOT NULL DEFAULT 0,
                author_id   INTEGER NOT NULL REFERENCES users(id)
            );

            CREATE INDEX idx_posts_author ON posts(author_id);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }

    #[test]
    fn published_defaults_to_false() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        conn.execute(
            "INSERT INTO users (name, email) VALUES ('Ada', 'ada@example.com')",
            [],
        )
        .unwrap();
        let published: bool = conn
            .query_row(
                "INSERT INTO posts (title, content, author_id) VALUES ('t', 'c', 1) RETURNING published",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert!(!published);
    }
}
