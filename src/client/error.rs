use reqwest::StatusCode;

/// Message shown when the server gives no usable error text
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong";

/// Where the caller should send the user after a forced logout
pub const LOGIN_PATH: &str = "/login";

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Failure of a single API call, rendered as a one-line message
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server rejected the token; the session has already been cleared
    #[error("Session expired, please sign in again")]
    Unauthorized { redirect_to: &'static str },

    #[error("{message}")]
    Api {
        status: StatusCode,
        message: String,
        errors: Vec<String>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Local state error: {0}")]
    State(String),
}

impl ClientError {
    pub fn unauthorized() -> Self {
        ClientError::Unauthorized {
            redirect_to: LOGIN_PATH,
        }
    }

    /// Build an API error from the server's message, falling back to a generic one
    pub fn api(status: StatusCode, message: Option<String>, errors: Option<Vec<String>>) -> Self {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
        ClientError::Api {
            status,
            message,
            errors: errors.unwrap_or_default(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }

    /// Per-field validation messages, when the server sent any
    pub fn validation_errors(&self) -> &[String] {
        match self {
            ClientError::Api { errors, .. } => errors,
            _ => &[],
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_uses_server_message() {
        let err = ClientError::api(
            StatusCode::CONFLICT,
            Some("Dentist already has an appointment at this time".to_string()),
            None,
        );
        assert_eq!(
            err.to_string(),
            "Dentist already has an appointment at this time"
        );
    }

    #[test]
    fn test_api_error_falls_back() {
        let err = ClientError::api(StatusCode::BAD_GATEWAY, Some("  ".to_string()), None);
        assert_eq!(err.to_string(), FALLBACK_ERROR_MESSAGE);

        let err = ClientError::api(StatusCode::INTERNAL_SERVER_ERROR, None, None);
        assert_eq!(err.to_string(), FALLBACK_ERROR_MESSAGE);
    }

    #[test]
    fn test_unauthorized_points_to_login() {
        match ClientError::unauthorized() {
            ClientError::Unauthorized { redirect_to } => assert_eq!(redirect_to, "/login"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
