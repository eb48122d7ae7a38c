/// Database row types — these map directly to SQLite rows.
/// Distinct from the hatchery-types API models to keep the DB layer
/// independent; the password hash only ever appears here.

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub profile_image: Option<String>,
}

pub struct MessageRow {
    pub id: i64,
    pub user_id: i64,
    pub subject: String,
    pub message: String,
    pub response: Option<String>,
    pub created_at: String,
}

/// Admin listing row: message joined with its author.
pub struct MessageWithAuthorRow {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub response: Option<String>,
    pub created_at: String,
}

pub struct DetectionRow {
    pub total_eggs: i64,
    pub fertile: i64,
    pub infertile: i64,
    pub timestamp: String,
}
