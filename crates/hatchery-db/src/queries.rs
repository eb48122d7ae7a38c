use crate::Database;
use crate::models::{DetectionRow, MessageRow, MessageWithAuthorRow, UserRow};
use anyhow::Result;
use rusqlite::Connection;

/// Image reference stored for a history row when the caller supplies none.
pub const PLACEHOLDER_IMAGE: &str = "placeholder.png";

impl Database {
    // -- Users --

    /// Inserts a user and returns the new row id. A duplicate email
    /// trips the UNIQUE constraint and surfaces as a rusqlite error.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO user (username, email, password, role) VALUES (?1, ?2, ?3, ?4)",
                (username, email, password_hash, role),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email = ?1", (email,)))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", (id,)))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, email, password, role, profile_image FROM user ORDER BY id",
            )?;
            let rows = stmt
                .query_map([], map_user_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Partial update: role and profile image keep their previous value
    /// when no replacement is supplied. Returns the affected row count
    /// so the caller can answer 404 for an unknown id.
    pub fn update_user(
        &self,
        id: i64,
        username: &str,
        email: &str,
        role: Option<&str>,
        profile_image: Option<&str>,
    ) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE user SET
                    username = ?1,
                    email = ?2,
                    role = COALESCE(?3, role),
                    profile_image = COALESCE(?4, profile_image)
                 WHERE id = ?5",
                rusqlite::params![username, email, role, profile_image, id],
            )?;
            Ok(n)
        })
    }

    pub fn delete_user(&self, id: i64) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM user WHERE id = ?1", [id])?;
            Ok(n)
        })
    }

    // -- Concern messages --

    pub fn insert_message(&self, user_id: i64, subject: &str, message: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO concern_messages (user_id, subject, message) VALUES (?1, ?2, ?3)",
                rusqlite::params![user_id, subject, message],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Admin view: every message with its author, newest first.
    pub fn list_messages_with_authors(&self) -> Result<Vec<MessageWithAuthorRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.user_id, u.username, u.email,
                        m.subject, m.message, m.response, m.created_at
                 FROM concern_messages m
                 JOIN user u ON m.user_id = u.id
                 ORDER BY m.created_at DESC, m.id DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(MessageWithAuthorRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        username: row.get(2)?,
                        email: row.get(3)?,
                        subject: row.get(4)?,
                        message: row.get(5)?,
                        response: row.get(6)?,
                        created_at: row.get(7)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_messages_for_user(&self, user_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, subject, message, response, created_at
                 FROM concern_messages
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        subject: row.get(2)?,
                        message: row.get(3)?,
                        response: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Sets the admin response. Zero affected rows means the id is unknown.
    pub fn respond_to_message(&self, id: i64, response: &str) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE concern_messages SET response = ?1 WHERE id = ?2",
                rusqlite::params![response, id],
            )?;
            Ok(n)
        })
    }

    // -- Detection --

    pub fn insert_detection(
        &self,
        total_eggs: i64,
        fertile: i64,
        infertile: i64,
        timestamp: &str,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO detection (total_eggs, fertile, infertile, timestamp)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![total_eggs, fertile, infertile, timestamp],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// The snapshot with the maximum timestamp, if any exist.
    pub fn latest_detection(&self) -> Result<Option<DetectionRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT total_eggs, fertile, infertile, timestamp
                     FROM detection
                     ORDER BY timestamp DESC, id DESC
                     LIMIT 1",
                    [],
                    |row| {
                        Ok(DetectionRow {
                            total_eggs: row.get(0)?,
                            fertile: row.get(1)?,
                            infertile: row.get(2)?,
                            timestamp: row.get(3)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Egg history --

    pub fn insert_history(&self, batch: &str, status: &str, image: Option<&str>) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO egg_history (batch, status, image) VALUES (?1, ?2, ?3)",
                rusqlite::params![batch, status, image.unwrap_or(PLACEHOLDER_IMAGE)],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }
}

fn query_user<P: rusqlite::Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, username, email, password, role, profile_image FROM user WHERE {filter}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row(params, map_user_row).optional()?;
    Ok(row)
}

fn map_user_row(row: &rusqlite::Row<'_>) -> std::result::Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        role: row.get(4)?,
        profile_image: row.get(5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn seed_user(db: &Database, email: &str) -> i64 {
        db.create_user("maria", email, "hash", "user").unwrap()
    }

    #[test]
    fn create_then_lookup_by_email_returns_same_id() {
        let db = db();
        let id = seed_user(&db, "maria@example.com");
        let user = db.get_user_by_email("maria@example.com").unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "maria");
        assert_eq!(user.role, "user");
        assert!(user.profile_image.is_none());
    }

    #[test]
    fn duplicate_email_is_a_constraint_error() {
        let db = db();
        seed_user(&db, "dup@example.com");
        let err = db
            .create_user("other", "dup@example.com", "hash2", "user")
            .unwrap_err();
        let sqlite = err.downcast_ref::<rusqlite::Error>().unwrap();
        assert!(matches!(
            sqlite.sqlite_error_code(),
            Some(rusqlite::ErrorCode::ConstraintViolation)
        ));
    }

    #[test]
    fn update_keeps_image_and_role_when_not_supplied() {
        let db = db();
        let id = seed_user(&db, "a@example.com");
        db.update_user(id, "maria", "a@example.com", Some("admin"), Some("1.jpg"))
            .unwrap();

        let n = db
            .update_user(id, "marie", "b@example.com", None, None)
            .unwrap();
        assert_eq!(n, 1);

        let user = db.get_user_by_id(id).unwrap().unwrap();
        assert_eq!(user.username, "marie");
        assert_eq!(user.email, "b@example.com");
        assert_eq!(user.role, "admin");
        assert_eq!(user.profile_image.as_deref(), Some("1.jpg"));
    }

    #[test]
    fn update_unknown_user_affects_no_rows() {
        let db = db();
        let n = db.update_user(99, "x", "x@example.com", None, None).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn respond_to_missing_message_affects_no_rows() {
        let db = db();
        assert_eq!(db.respond_to_message(42, "hello").unwrap(), 0);
    }

    #[test]
    fn messages_list_newest_first() {
        let db = db();
        let uid = seed_user(&db, "m@example.com");
        // Same created_at second; id breaks the tie.
        let first = db.insert_message(uid, "s1", "b1").unwrap();
        let second = db.insert_message(uid, "s2", "b2").unwrap();

        let mine = db.list_messages_for_user(uid).unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, second);
        assert_eq!(mine[1].id, first);

        let all = db.list_messages_with_authors().unwrap();
        assert_eq!(all[0].id, second);
        assert_eq!(all[0].username, "maria");
        assert_eq!(all[0].email, "m@example.com");
        assert!(all[0].response.is_none());
    }

    #[test]
    fn respond_sets_the_response_column() {
        let db = db();
        let uid = seed_user(&db, "r@example.com");
        let mid = db.insert_message(uid, "s", "b").unwrap();
        assert_eq!(db.respond_to_message(mid, "fixed").unwrap(), 1);

        let mine = db.list_messages_for_user(uid).unwrap();
        assert_eq!(mine[0].response.as_deref(), Some("fixed"));
    }

    #[test]
    fn latest_detection_empty_table_is_none() {
        let db = db();
        assert!(db.latest_detection().unwrap().is_none());
    }

    #[test]
    fn latest_detection_picks_max_timestamp() {
        let db = db();
        db.insert_detection(10, 6, 4, "2026-01-02 08:00:00").unwrap();
        db.insert_detection(12, 7, 5, "2026-01-03 08:00:00").unwrap();
        db.insert_detection(8, 3, 5, "2026-01-01 08:00:00").unwrap();

        let latest = db.latest_detection().unwrap().unwrap();
        assert_eq!(latest.total_eggs, 12);
        assert_eq!(latest.timestamp, "2026-01-03 08:00:00");
    }

    #[test]
    fn history_image_defaults_to_placeholder() {
        let db = db();
        db.insert_history("B-7", "incubating", None).unwrap();
        let image: String = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT image FROM egg_history", [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(image, PLACEHOLDER_IMAGE);
    }

    #[test]
    fn deleting_a_user_reports_affected_rows() {
        let db = db();
        let id = seed_user(&db, "d@example.com");
        assert_eq!(db.delete_user(id).unwrap(), 1);
        assert_eq!(db.delete_user(id).unwrap(), 0);
        assert!(db.get_user_by_id(id).unwrap().is_none());
    }
}
