use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the wallet API or the price feed.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401: the session token is missing, expired or revoked.
    #[error("session expired")]
    Unauthorized,

    /// 403: on the balance endpoint this means the wallet is not ready yet.
    #[error("forbidden")]
    Forbidden,

    #[error("wallet API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Message safe to show inline next to a retry button.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            ApiError::Forbidden => "You are not allowed to do that yet.".to_string(),
            ApiError::Status { status, body } => {
                let detail = server_detail(body);
                match detail {
                    Some(d) => d,
                    None => format!("The wallet service answered {status}."),
                }
            }
            ApiError::Network(_) => "Could not reach the wallet service.".to_string(),
            ApiError::Decode(_) => "The wallet service sent an unexpected response.".to_string(),
        }
    }
}

/// Pulls `{"detail": "..."}` / `{"error": "..."}` out of an error body.
fn server_detail(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "error", "message"]
        .iter()
        .find_map(|k| v.get(*k).and_then(|x| x.as_str()))
        .map(|s| s.to_string())
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_server_detail() {
        let e = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"detail":"Amount below provider minimum"}"#.to_string(),
        };
        assert_eq!(e.user_message(), "Amount below provider minimum");

        let e = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: "<html>oops</html>".to_string(),
        };
        assert!(e.user_message().contains("502"));
    }
}
