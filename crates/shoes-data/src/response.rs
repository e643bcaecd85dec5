//! HTTP response handling.

use crate::FetchError;
use serde::de::DeserializeOwned;

/// An HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// The URL that produced this response.
    pub url: String,
    /// The HTTP status code.
    pub status: u16,
    /// The response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Create a new response.
    pub fn new(url: impl Into<String>, status: u16, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            status,
            body,
        }
    }

    /// Check if the response was successful (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String, FetchError> {
        String::from_utf8(self.body.clone()).map_err(|e| FetchError::ParseError {
            url: self.url.clone(),
            message: format!("Invalid UTF-8: {}", e),
        })
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body).map_err(|e| FetchError::ParseError {
            url: self.url.clone(),
            message: e.to_string(),
        })
    }

    /// Convert to a Result, returning an error for non-2xx status codes.
    pub fn error_for_status(self) -> Result<Self, FetchError> {
        if self.is_success() {
            Ok(self)
        } else {
            let message = self.text().unwrap_or_else(|_| "Unknown error".to_string());
            Err(FetchError::HttpError {
                status: self.status,
                url: self.url,
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(status: u16, body: &[u8]) -> Response {
        Response::new("http://localhost:3333/stock", status, body.to_vec())
    }

    #[test]
    fn test_response_is_success() {
        assert!(make_response(200, b"").is_success());
        assert!(make_response(204, b"").is_success());
        assert!(!make_response(304, b"").is_success());
        assert!(!make_response(404, b"").is_success());
    }

    #[test]
    fn test_response_json() {
        use serde::Deserialize;

        #[derive(Deserialize, Debug, PartialEq)]
        struct Entry {
            id: u64,
            amount: i64,
        }

        let resp = make_response(200, br#"[{"id": 1, "amount": 3}]"#);
        let data: Vec<Entry> = resp.json().unwrap();
        assert_eq!(data, vec![Entry { id: 1, amount: 3 }]);
    }

    #[test]
    fn test_response_json_invalid_names_url() {
        let resp = make_response(200, b"<html>");
        let err = resp.json::<Vec<u64>>().unwrap_err();
        match err {
            FetchError::ParseError { url, .. } => {
                assert_eq!(url, "http://localhost:3333/stock");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_response_text_invalid_utf8() {
        let resp = make_response(200, &[0xff, 0xfe]);
        assert!(resp.text().is_err());
    }

    #[test]
    fn test_response_error_for_status() {
        assert!(make_response(200, b"OK").error_for_status().is_ok());

        let err = make_response(503, b"Service Unavailable")
            .error_for_status()
            .unwrap_err();
        match err {
            FetchError::HttpError { status, message, .. } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Service Unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
