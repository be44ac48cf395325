use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A published news item. `id` is assigned by storage on insert; a payload
/// carrying an `id` is an update of that row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct News {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub subtitle: String,
    pub image_url: String,
    pub url: String,
    #[serde(with = "super::date_format")]
    pub occurrence: NaiveDateTime,
}

/// Response envelope for `GET /news`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsData {
    pub news: Vec<News>,
}
