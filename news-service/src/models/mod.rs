pub mod feedback;
pub mod news;
pub mod subscription;
pub mod token;

pub use feedback::{Feedback, FeedbackData};
pub use news::{News, NewsData};
pub use subscription::Subscription;
pub use token::{FirebaseTokenData, FirebaseTokenType};

use chrono::NaiveDateTime;

/// Timestamps are stored and exchanged as `2018-03-01T14:05:00`.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn format_date(date: &NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, DATE_FORMAT)
}

/// Serde adapter for `NaiveDateTime` fields using [`DATE_FORMAT`].
pub mod date_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_date(date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(serde::de::Error::custom)
    }
}
