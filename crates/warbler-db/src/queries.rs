use crate::models::{NewUser, UserRow, UserStats, UserUpdate};
use crate::{Database, DbError, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use warbler_types::models::{Like, Message};

const USER_COLUMNS: &str = "u.id, u.username, u.email, u.image_url, u.header_image_url, \
     u.bio, u.location, u.password, u.created_at";

// Messages are always read with their author's name and avatar.
const MESSAGE_COLUMNS: &str = "m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url";

fn user_from_row(row: &Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        image_url: row.get(3)?,
        header_image_url: row.get(4)?,
        bio: row.get(5)?,
        location: row.get(6)?,
        password: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn message_from_row(row: &Row) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        text: row.get(1)?,
        timestamp: row.get(2)?,
        user_id: row.get(3)?,
        author_username: row.get(4)?,
        author_image_url: row.get(5)?,
    })
}

fn like_from_row(row: &Row) -> rusqlite::Result<Like> {
    Ok(Like {
        id: row.get(0)?,
        user_id: row.get(1)?,
        message_id: row.get(2)?,
    })
}

impl Database {
    // -- Users --

    pub fn create_user(&self, new: &NewUser<'_>) -> Result<UserRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, email, password, image_url, header_image_url)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    new.username,
                    new.email,
                    new.password_hash,
                    new.image_url,
                    new.header_image_url
                ],
            )?;
            let id = conn.last_insert_rowid();
            query_user(conn, "u.id = ?1", params![id])?.ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
        })
    }

    pub fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "u.id = ?1", params![id]))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "u.username = ?1", params![username]))
    }

    /// All users, or only those whose username contains `search`.
    /// Matching is literal and case-sensitive.
    pub fn list_users(&self, search: Option<&str>) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| match search {
            Some(term) if !term.is_empty() => query_users(
                conn,
                &format!(
                    "SELECT {USER_COLUMNS} FROM users u
                     WHERE instr(u.username, ?1) > 0
                     ORDER BY u.id"
                ),
                params![term],
            ),
            _ => query_users(
                conn,
                &format!("SELECT {USER_COLUMNS} FROM users u ORDER BY u.id"),
                [],
            ),
        })
    }

    /// Returns false when no such user exists.
    pub fn update_user(&self, id: i64, update: &UserUpdate) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users
                 SET username = ?1, email = ?2, image_url = ?3, header_image_url = ?4,
                     bio = ?5, location = ?6
                 WHERE id = ?7",
                params![
                    update.username,
                    update.email,
                    update.image_url,
                    update.header_image_url,
                    update.bio,
                    update.location,
                    id
                ],
            )?;
            Ok(changed > 0)
        })
    }

    /// Deletes the user; messages, follows and likes go with it.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM users WHERE id = ?1", [id])? > 0))
    }

    pub fn user_stats(&self, id: i64) -> Result<UserStats> {
        self.with_conn(|conn| {
            let stats = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM messages WHERE user_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE user_following_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE user_being_followed_id = ?1),
                    (SELECT COUNT(*) FROM likes WHERE user_id = ?1)",
                [id],
                |row| {
                    Ok(UserStats {
                        messages: row.get(0)?,
                        following: row.get(1)?,
                        followers: row.get(2)?,
                        likes: row.get(3)?,
                    })
                },
            )?;
            Ok(stats)
        })
    }

    // -- Messages --

    pub fn create_message(&self, user_id: i64, text: &str) -> Result<Message> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (text, user_id) VALUES (?1, ?2)",
                params![text, user_id],
            )?;
            let id = conn.last_insert_rowid();
            query_message(conn, id)?.ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<Message>> {
        self.with_conn(|conn| query_message(conn, id))
    }

    pub fn delete_message(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM messages WHERE id = ?1", [id])? > 0))
    }

    /// A user's own messages, newest first.
    pub fn user_messages(&self, user_id: i64, limit: u32) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages m
                     JOIN users u ON u.id = m.user_id
                     WHERE m.user_id = ?1
                     ORDER BY m.timestamp DESC, m.id DESC
                     LIMIT ?2"
                ),
                params![user_id, limit],
            )
        })
    }

    /// Newest messages across all users.
    pub fn recent_messages(&self, limit: u32) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages m
                     JOIN users u ON u.id = m.user_id
                     ORDER BY m.timestamp DESC, m.id DESC
                     LIMIT ?1"
                ),
                params![limit],
            )
        })
    }

    /// Home feed: messages by everyone `user_id` follows, plus their own,
    /// newest first.
    pub fn following_feed(&self, user_id: i64, limit: u32) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages m
                     JOIN follows f ON f.user_being_followed_id = m.user_id
                     JOIN users u ON u.id = m.user_id
                     WHERE f.user_following_id = ?1
                     UNION
                     SELECT {MESSAGE_COLUMNS} FROM messages m
                     JOIN users u ON u.id = m.user_id
                     WHERE m.user_id = ?1
                     ORDER BY 3 DESC, 1 DESC
                     LIMIT ?2"
                ),
                params![user_id, limit],
            )
        })
    }

    // -- Follows --

    /// `follower` starts following `followed`. Following twice is a no-op.
    pub fn follow(&self, follower: i64, followed: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO follows (user_being_followed_id, user_following_id)
                 VALUES (?1, ?2)",
                params![followed, follower],
            )?;
            Ok(())
        })
    }

    /// Returns false when `follower` was not following `followed`.
    pub fn stop_following(&self, follower: i64, followed: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM follows WHERE user_being_followed_id = ?1 AND user_following_id = ?2",
                params![followed, follower],
            )?;
            Ok(removed > 0)
        })
    }

    pub fn is_following(&self, follower: i64, followed: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM follows WHERE user_being_followed_id = ?1 AND user_following_id = ?2",
                    params![followed, follower],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// True when `user` is followed by `other`.
    pub fn is_followed_by(&self, user: i64, other: i64) -> Result<bool> {
        self.is_following(other, user)
    }

    /// Users that `user_id` follows.
    pub fn following(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            query_users(
                conn,
                &format!(
                    "SELECT {USER_COLUMNS} FROM users u
                     JOIN follows f ON f.user_being_followed_id = u.id
                     WHERE f.user_following_id = ?1
                     ORDER BY u.id"
                ),
                params![user_id],
            )
        })
    }

    /// Users following `user_id`.
    pub fn followers(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            query_users(
                conn,
                &format!(
                    "SELECT {USER_COLUMNS} FROM users u
                     JOIN follows f ON f.user_following_id = u.id
                     WHERE f.user_being_followed_id = ?1
                     ORDER BY u.id"
                ),
                params![user_id],
            )
        })
    }

    // -- Likes --

    /// Fails with `Conflict` when the pair already exists or either side is missing.
    pub fn create_like(&self, user_id: i64, message_id: i64) -> Result<Like> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO likes (user_id, message_id) VALUES (?1, ?2)",
                params![user_id, message_id],
            )?;
            Ok(Like {
                id: conn.last_insert_rowid(),
                user_id,
                message_id,
            })
        })
    }

    pub fn get_like(&self, id: i64) -> Result<Option<Like>> {
        self.with_conn(|conn| {
            let like = conn
                .query_row(
                    "SELECT id, user_id, message_id FROM likes WHERE id = ?1",
                    [id],
                    like_from_row,
                )
                .optional()?;
            Ok(like)
        })
    }

    pub fn delete_like(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM likes WHERE id = ?1", [id])? > 0))
    }

    /// Every like edge owned by `user_id`.
    pub fn likes_by_user(&self, user_id: i64) -> Result<Vec<Like>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, user_id, message_id FROM likes WHERE user_id = ?1")?;
            let rows = stmt
                .query_map([user_id], like_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Messages `user_id` has liked, most recently liked first.
    pub fn liked_messages(&self, user_id: i64) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM likes l
                     JOIN messages m ON m.id = l.message_id
                     JOIN users u ON u.id = m.user_id
                     WHERE l.user_id = ?1
                     ORDER BY l.id DESC"
                ),
                params![user_id],
            )
        })
    }
}

fn query_user<P: rusqlite::Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users u WHERE {filter}"))?;
    let row = stmt.query_row(params, user_from_row).optional()?;
    Ok(row)
}

fn query_users<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, user_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_message(conn: &Connection, id: i64) -> Result<Option<Message>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages m
         JOIN users u ON u.id = m.user_id
         WHERE m.id = ?1"
    ))?;
    let row = stmt.query_row([id], message_from_row).optional()?;
    Ok(row)
}

fn query_messages<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Message>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, message_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
