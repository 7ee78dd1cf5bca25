use serde::{Deserialize, Serialize};

use super::flex;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "flex::string_or_number")]
    pub id: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub email: String,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub first_name: Option<String>,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub last_name: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");

        if !full.trim().is_empty() {
            full
        } else if !self.username.is_empty() {
            self.username.clone()
        } else {
            self.email.clone()
        }
    }
}

/// Session injected into request extensions by the auth middleware.
/// The token is opaque: the wallet API issued it at login.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub token: String,
}
