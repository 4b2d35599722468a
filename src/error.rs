use crate::transport::TransportError;
use thiserror::Error;

/// Unified error type for plugins, transport and dispatch.
///
/// Body plugins only ever produce [`Error::Json`] or [`Error::Xml`]; every other
/// plugin in this crate is infallible.
#[derive(Debug, Error)]
pub enum Error {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML serialization error: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Error::Runtime(msg.into())
    }

    /// True for the encoder failures raised by the JSON and XML body plugins.
    pub fn is_serialization(&self) -> bool {
        matches!(self, Error::Json(_) | Error::Xml(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_errors_are_classified() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(Error::from(json_err).is_serialization());
        assert!(!Error::configuration("missing url").is_serialization());
        assert!(!Error::runtime("join failed").is_serialization());
    }

    #[test]
    fn display_carries_category() {
        let err = Error::configuration("request url is not set");
        assert_eq!(
            err.to_string(),
            "Configuration error: request url is not set"
        );
    }
}
