//! Response body handling shared by the client operations.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Text describing an HTTP status, such as `Service Unavailable`.
///
/// reqwest does not expose the reason phrase sent by the server, so this is
/// the canonical reason for the code. A status without one (such as `599`)
/// yields the numeric code, even when the server sent a custom phrase.
pub fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}

/// Decode a response body into `T`.
///
/// Failures carry the response status and the first [`PREVIEW_LIMIT`]
/// characters of the body, whitespace collapsed.
pub fn parse_response_json_strict<T>(text: &str, status: Option<StatusCode>) -> Result<T, JsonParseError>
where
    T: DeserializeOwned,
{
    serde_json::from_str::<T>(text).map_err(|source| JsonParseError {
        status: status.map(|code| code.to_string()).unwrap_or_else(|| "no status".to_string()),
        source,
        body_preview: body_preview(text, PREVIEW_LIMIT),
    })
}

/// Body characters kept in a [`JsonParseError`].
pub const PREVIEW_LIMIT: usize = 200;

fn body_preview(text: &str, limit: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return "<empty>".to_string();
    }
    match collapsed.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &collapsed[..cut]),
        None => collapsed,
    }
}

/// A response body that is not the JSON the operation expects.
#[derive(Debug, Error)]
#[error("undecodable response body ({status}): {source}; body: {body_preview}")]
pub struct JsonParseError {
    status: String,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

impl JsonParseError {
    /// Collapsed, truncated response body.
    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }

    pub fn source_error(&self) -> &serde_json::Error {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn status_text_uses_canonical_reason() {
        assert_eq!(status_text(StatusCode::SERVICE_UNAVAILABLE), "Service Unavailable");
        assert_eq!(status_text(StatusCode::NOT_FOUND), "Not Found");
        assert_eq!(status_text(StatusCode::from_u16(599).unwrap()), "599");
    }

    #[test]
    fn strict_parse_reports_status_and_preview() {
        let body = "<html>\n\t<body>oops</body>\n</html>";
        let error = parse_response_json_strict::<Value>(body, Some(StatusCode::OK)).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("(200 OK)"));
        assert_eq!(error.body_preview(), "<html> <body>oops</body> </html>");
        assert!(error.source_error().is_syntax());
    }

    #[test]
    fn strict_parse_marks_empty_bodies() {
        let error = parse_response_json_strict::<Value>("  ", None).unwrap_err();
        assert!(error.to_string().contains("(no status)"));
        assert_eq!(error.body_preview(), "<empty>");
    }

    #[test]
    fn long_previews_are_truncated() {
        let body = "x".repeat(500);
        let error = parse_response_json_strict::<Value>(&body, None).unwrap_err();
        assert_eq!(error.body_preview().len(), 203);
        assert!(error.body_preview().ends_with("..."));
    }
}
