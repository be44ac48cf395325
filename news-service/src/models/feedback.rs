use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub news_id: i32,
    pub rating: i32,
    pub comment: String,
    pub suggestions: String,
}

/// Response envelope for `GET /feedback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackData {
    pub feedback: Vec<Feedback>,
}
