use thiserror::Error;

/// Failures the client can observe. Only `AssetLoad` and `Config` are fatal, and
/// only during startup; the others are logged and absorbed by the component
/// that hit them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// Websocket connect/read/write failure. The live source retries.
    #[error("transport error: {0}")]
    Transport(String),
    /// A snapshot failed validation and was dropped.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
    #[error("failed to load asset '{path}': {reason}")]
    AssetLoad { path: String, reason: String },
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AssetLoad { .. } | Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_startup_errors_are_fatal() {
        assert!(!ClientError::Transport("reset".into()).is_fatal());
        assert!(!ClientError::MalformedSnapshot("nan".into()).is_fatal());
        assert!(ClientError::Config("fps".into()).is_fatal());
        assert!(ClientError::AssetLoad {
            path: "a.png".into(),
            reason: "missing".into()
        }
        .is_fatal());
    }

    #[test]
    fn display_names_the_asset_path() {
        let err = ClientError::AssetLoad {
            path: "assets/hq/snoopy_hq.png".into(),
            reason: "not found".into(),
        };
        let text = err.to_string();
        assert!(text.contains("assets/hq/snoopy_hq.png"));
        assert!(text.contains("not found"));
    }

    #[test]
    fn display_prefixes_each_kind() {
        assert_eq!(
            ClientError::Transport("connection reset".into()).to_string(),
            "transport error: connection reset"
        );
        assert_eq!(
            ClientError::MalformedSnapshot("duplicate player id 'a'".into()).to_string(),
            "malformed snapshot: duplicate player id 'a'"
        );
        assert_eq!(
            ClientError::Config("fps must be > 0".into()).to_string(),
            "invalid configuration: fps must be > 0"
        );
        let boxed: Box<dyn std::error::Error> = Box::new(ClientError::Transport("x".into()));
        assert_eq!(boxed.to_string(), "transport error: x");
    }
}
