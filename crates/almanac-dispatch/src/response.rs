//! Wire responses for asynchronous view requests.
//!
//! An ajax view request always ends the request: whatever body is produced is
//! emitted and nothing else follows. [`Response`] carries that body together
//! with its content type.

use std::io::Write;

/// Content type of a successful ajax payload.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A terminal response for an ajax view request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Value for the `Content-Type` header; `None` leaves the host default.
    pub content_type: Option<&'static str>,
    /// Response body. Empty when no view could serve the request.
    pub body: String,
}

impl Response {
    /// A JSON response.
    pub fn json(body: String) -> Self {
        Self {
            content_type: Some(JSON_CONTENT_TYPE),
            body,
        }
    }

    /// The empty response sent when no view was selected.
    pub fn empty() -> Self {
        Self {
            content_type: None,
            body: String::new(),
        }
    }

    /// Returns true if the body is empty.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Writes the header line (if any), a blank line and the body.
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        if let Some(content_type) = self.content_type {
            write!(out, "Content-Type: {}\r\n", content_type)?;
        }
        out.write_all(b"\r\n")?;
        out.write_all(self.body.as_bytes())?;
        out.flush()
    }
}
