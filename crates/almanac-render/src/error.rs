//! Error types for view rendering.
//!
//! Resolution itself never fails: a template that cannot be found is an
//! ordinary `None`. [`RenderError`] covers what can go wrong once a file has
//! been chosen and has to be read and rendered.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for view rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No template resolved for the logical name.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Template syntax error or evaluation failure.
    #[error("template error in {name}: {message}")]
    Template {
        /// Logical name or path of the failing template
        name: String,
        /// Engine message
        message: String,
    },

    /// Reading a resolved template from disk failed.
    #[error("failed to read template \"{}\": {source}", path.display())]
    Read {
        /// Path that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        match err.kind() {
            ErrorKind::TemplateNotFound => RenderError::TemplateNotFound(err.to_string()),
            _ => RenderError::Template {
                name: err.name().unwrap_or("<string>").to_string(),
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RenderError::TemplateNotFound("month.php".to_string());
        assert!(err.to_string().contains("template not found"));
        assert!(err.to_string().contains("month.php"));
    }

    #[test]
    fn test_read_error_display() {
        let err = RenderError::Read {
            path: PathBuf::from("/themes/x/tribe-events/list.php"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("tribe-events/list.php"));
    }

    #[test]
    fn test_from_minijinja_template_not_found() {
        let mj_err = minijinja::Error::new(
            minijinja::ErrorKind::TemplateNotFound,
            "template 'foo' not found",
        );
        let err: RenderError = mj_err.into();
        assert!(matches!(err, RenderError::TemplateNotFound(_)));
    }

    #[test]
    fn test_from_minijinja_syntax_error() {
        let mj_err = minijinja::Error::new(minijinja::ErrorKind::SyntaxError, "unexpected }");
        let err: RenderError = mj_err.into();
        assert!(matches!(err, RenderError::Template { .. }));
    }
}
