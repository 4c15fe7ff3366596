use thiserror::Error;

/// Failure of a single API call.
///
/// Cloneable so it can be kept inside fetch-state snapshots; transport and
/// decode causes are flattened to their messages for that reason.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// 401 / 403: the session is missing or expired.
    #[error("not authorised (HTTP {status})")]
    Unauthorized { status: u16 },

    /// The server answered with a redirect; the login flow wants to take over.
    #[error("redirected to {}", location.as_deref().unwrap_or("<unknown>"))]
    Redirected { location: Option<String> },

    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// True for the failures that must send the user through the login flow
    /// instead of being shown as an ordinary fetch error.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::Redirected { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_classification() {
        assert!(ApiError::Unauthorized { status: 401 }.is_auth());
        assert!(ApiError::Redirected { location: None }.is_auth());
        assert!(!ApiError::Transport("reset".into()).is_auth());
        let server = ApiError::Status {
            status: 503,
            message: "Service Unavailable".into(),
            body: None,
        };
        assert!(!server.is_auth());
        assert_eq!(server.status(), Some(503));
    }
}
