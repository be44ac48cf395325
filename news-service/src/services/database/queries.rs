//! Statement text shared by both backends. sqlx binds `$N` placeholders on
//! SQLite as well as PostgreSQL, and both engines support `RETURNING`, so only
//! the schema differs per backend.

pub(super) const SELECT_NEWS: &str =
    "SELECT id, title, subtitle, image_url, url, occurrence FROM news ORDER BY id DESC";

pub(super) const SELECT_NEWS_BY_ID: &str =
    "SELECT id, title, subtitle, image_url, url, occurrence FROM news WHERE id = $1";

pub(super) const INSERT_NEWS: &str = r#"
    INSERT INTO news (title, subtitle, image_url, url, occurrence)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING id
"#;

pub(super) const COUNT_NEWS_BY_ID: &str = "SELECT COUNT(*) FROM news WHERE id = $1";

pub(super) const UPDATE_NEWS: &str = r#"
    UPDATE news
    SET title = $1, subtitle = $2, image_url = $3, url = $4, occurrence = $5
    WHERE id = $6
"#;

pub(super) const SELECT_FEEDBACK: &str =
    "SELECT DISTINCT news_id, rating, comment_text, suggestions_text FROM feedback";

pub(super) const INSERT_FEEDBACK: &str = r#"
    INSERT INTO feedback (news_id, rating, comment_text, suggestions_text)
    VALUES ($1, $2, $3, $4)
"#;

pub(super) const SELECT_TOKENS: &str = "SELECT token, type AS token_type FROM tokens";

pub(super) const INSERT_TOKEN: &str = "INSERT INTO tokens (token, type) VALUES ($1, $2)";

pub(super) const SELECT_SUBSCRIPTIONS: &str =
    r#"SELECT email, "key", creation_time FROM subscriptions"#;

pub(super) const INSERT_SUBSCRIPTION: &str =
    r#"INSERT INTO subscriptions (email, "key", creation_time) VALUES ($1, $2, $3)"#;

pub(super) const DELETE_SUBSCRIPTION: &str = r#"DELETE FROM subscriptions WHERE "key" = $1"#;

pub(super) const PING: &str = "SELECT 1";
