//! Error taxonomy for backend calls.
//!
//! Every failure collapses to a single human-readable line at the UI
//! boundary via `Display`; the variants exist so the transport layer can
//! capture non-JSON error bodies as text instead of crashing on them.

use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// Non-2xx HTTP status; the response body is kept as raw text
    Transport {
        status: reqwest::StatusCode,
        body: String,
    },
    /// Success status but the body was not the expected JSON
    UnexpectedContentType { detail: String },
    /// The response envelope carried `success: false`
    Application { message: String },
    /// Connection-level failure from the HTTP client
    Connection(reqwest::Error),
    /// Local file problem while preparing an import upload
    Io(std::io::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport { status, body } => {
                let body = body.trim();
                if body.is_empty() {
                    write!(f, "server returned {status}")
                } else {
                    write!(f, "server returned {status}: {}", truncated(body, 200))
                }
            }
            ApiError::UnexpectedContentType { detail } => {
                write!(f, "response was not valid JSON: {detail}")
            }
            ApiError::Application { message } => write!(f, "{message}"),
            ApiError::Connection(err) => {
                if err.is_timeout() {
                    write!(f, "request timed out")
                } else if err.is_connect() {
                    write!(f, "connection failed: {err}")
                } else {
                    write!(f, "request failed: {err}")
                }
            }
            ApiError::Io(err) => write!(f, "could not read file: {err}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Connection(err) => Some(err),
            ApiError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Connection(err)
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Io(err)
    }
}

/// Clip long error bodies on a char boundary so messages stay one line
fn truncated(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_carry_the_raw_body() {
        let err = ApiError::Transport {
            status: reqwest::StatusCode::NOT_FOUND,
            body: "<html>missing</html>".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("<html>missing</html>"));
    }

    #[test]
    fn long_bodies_are_clipped() {
        let err = ApiError::Transport {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "x".repeat(5000),
        };
        assert!(err.to_string().len() < 300);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "é".repeat(300);
        let clipped = truncated(&text, 201);
        assert!(clipped.len() <= 201);
        assert!(text.starts_with(clipped));
    }
}
