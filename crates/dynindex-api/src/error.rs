//! Errors surfaced by the listener that hosts `/index` and `/truncate`.
//!
//! Request-level failures never reach this type; handlers answer them with a
//! status code and a plain-text body.

use std::io;

use thiserror::Error;

/// Result alias for API server operations.
pub type ApiServerResult<T> = std::result::Result<T, ApiServerError>;

/// Failures of the control listener itself.
#[derive(Debug, Error)]
pub enum ApiServerError {
    /// The listen address could not be bound.
    #[error("cannot listen on {addr}")]
    Bind {
        /// Address from `--listen`, normalised to `host:port`.
        addr: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The accept loop stopped with an IO error.
    #[error("control listener on {addr} stopped")]
    Serve {
        /// Address the listener was bound to.
        addr: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn errors_name_the_listen_address() {
        let bind = ApiServerError::Bind {
            addr: "0.0.0.0:6060".to_string(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        };
        assert_eq!(bind.to_string(), "cannot listen on 0.0.0.0:6060");
        assert!(bind.source().is_some());

        let serve = ApiServerError::Serve {
            addr: "127.0.0.1:7070".to_string(),
            source: io::Error::other("reset"),
        };
        assert_eq!(serve.to_string(), "control listener on 127.0.0.1:7070 stopped");
        assert!(serve.source().is_some());
    }
}
