use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS user (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            username        TEXT NOT NULL,
            email           TEXT NOT NULL UNIQUE,
            password        TEXT NOT NULL,
            role            TEXT NOT NULL DEFAULT 'user',
            profile_image   TEXT
        );

        CREATE TABLE IF NOT EXISTS concern_messages (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL REFERENCES user(id),
            subject     TEXT NOT NULL,
            message     TEXT NOT NULL,
            response    TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_concern_messages_user
            ON concern_messages(user_id, created_at);

        CREATE TABLE IF NOT EXISTS detection (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            total_eggs  INTEGER NOT NULL,
            fertile     INTEGER NOT NULL,
            infertile   INTEGER NOT NULL,
            timestamp   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_detection_timestamp
            ON detection(timestamp);

        CREATE TABLE IF NOT EXISTS egg_history (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            batch       TEXT NOT NULL,
            status      TEXT NOT NULL,
            image       TEXT NOT NULL DEFAULT 'placeholder.png',
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
