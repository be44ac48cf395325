use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// An email subscription. `key` is handed to the subscriber and is the only
/// way to unsubscribe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub email: String,
    pub key: String,
    #[serde(with = "super::date_format")]
    pub creation_time: NaiveDateTime,
}
