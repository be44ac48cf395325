use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirebaseTokenType {
    Web,
    Android,
}

impl FirebaseTokenType {
    /// Value persisted in the `tokens.type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            FirebaseTokenType::Web => "web",
            FirebaseTokenType::Android => "android",
        }
    }
}

impl fmt::Display for FirebaseTokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FirebaseTokenType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web" => Ok(FirebaseTokenType::Web),
            "android" => Ok(FirebaseTokenType::Android),
            other => Err(anyhow::anyhow!(
                "Illegal type {} set as firebase token type",
                other
            )),
        }
    }
}

/// A device or browser registered for push notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirebaseTokenData {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: FirebaseTokenType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_names_round_trip() {
        for ty in [FirebaseTokenType::Web, FirebaseTokenType::Android] {
            assert_eq!(ty.as_str().parse::<FirebaseTokenType>().expect("known"), ty);
        }
    }

    #[test]
    fn unknown_stored_name_is_rejected() {
        assert!("ios".parse::<FirebaseTokenType>().is_err());
    }

    #[test]
    fn json_uses_type_field() {
        let data: FirebaseTokenData =
            serde_json::from_str(r#"{"token":"abc","type":"Android"}"#).expect("valid json");
        assert_eq!(data.token_type, FirebaseTokenType::Android);
    }
}
