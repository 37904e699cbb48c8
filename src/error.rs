//! Errors raised while resolving catalog queries.

use async_graphql::ErrorExtensions;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// A client-supplied argument is outside the values the upstream accepts.
    #[error("invalid {name} '{value}': expected one of {expected}")]
    InvalidArgument {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    /// The upstream answered with a non-success status.
    #[error("upstream returned {status} for {path}: {message}")]
    UpstreamStatus {
        status: u16,
        path: String,
        message: String,
    },

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode upstream response for {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A list endpoint answered without its `results` envelope.
    #[error("upstream response for {path} has no results field")]
    MissingResults { path: String },
}

impl CatalogError {
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::InvalidArgument { .. } => "BAD_USER_INPUT",
            CatalogError::UpstreamStatus { status: 404, .. } => "UPSTREAM_NOT_FOUND",
            CatalogError::UpstreamStatus { .. } => "UPSTREAM_ERROR",
            CatalogError::Transport(_) => "UPSTREAM_UNAVAILABLE",
            CatalogError::Decode { .. } | CatalogError::MissingResults { .. } => {
                "UPSTREAM_DECODE_ERROR"
            }
        }
    }
}

impl ErrorExtensions for CatalogError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, ext| {
            ext.set("code", self.code());
            if let CatalogError::UpstreamStatus { status, .. } = self {
                ext.set("status", *status);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_gets_its_own_code() {
        let err = CatalogError::UpstreamStatus {
            status: 404,
            path: "movie/0".to_string(),
            message: "The resource you requested could not be found.".to_string(),
        };
        assert_eq!(err.code(), "UPSTREAM_NOT_FOUND");

        let err = CatalogError::UpstreamStatus {
            status: 500,
            path: "movie/0".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(err.code(), "UPSTREAM_ERROR");
    }

    #[test]
    fn extensions_carry_code_and_status() {
        let err = CatalogError::UpstreamStatus {
            status: 401,
            path: "movie/550".to_string(),
            message: "Invalid API key".to_string(),
        }
        .extend();
        let ext = err.extensions.expect("extensions set");
        assert_eq!(
            ext.get("code"),
            Some(&async_graphql::Value::from("UPSTREAM_ERROR"))
        );
        assert_eq!(ext.get("status"), Some(&async_graphql::Value::from(401u16)));
        assert!(err.message.contains("Invalid API key"));
    }
}
