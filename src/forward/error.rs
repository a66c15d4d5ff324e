//! Transport failure taxonomy.
//!
//! Only failures to complete the exchange live here. An upstream that answers
//! 500 is a completed exchange and never becomes a `TransportError`.

use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::outcome::ErrorCode;

/// Resolver phrases observed across platforms (hyper-util, glibc, macOS, Windows).
const DNS_MARKERS: [&str; 5] = [
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "nodename nor servname",
    "no such host",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Unable to connect to the target server: {0}")]
    ConnectionRefused(String),

    #[error("The hostname could not be resolved: {0}")]
    HostNotFound(String),

    #[error("The request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TransportError::ConnectionRefused(_) => ErrorCode::ConnectionRefused,
            TransportError::HostNotFound(_) => ErrorCode::HostNotFound,
            TransportError::Timeout(_) => ErrorCode::Timeout,
            TransportError::Other(_) => ErrorCode::Unknown,
        }
    }

    /// Classify a reqwest failure. `deadline` is reported if reqwest itself timed out.
    pub fn from_reqwest(err: &reqwest::Error, deadline: Duration) -> Self {
        if err.is_timeout() {
            return TransportError::Timeout(deadline);
        }
        classify(err)
    }
}

/// Walk the source chain and pick the most specific failure class.
pub fn classify(err: &(dyn StdError + 'static)) -> TransportError {
    let detail = describe_chain(err);

    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::ConnectionRefused {
                return TransportError::ConnectionRefused(detail);
            }
        }
        let text = e.to_string().to_ascii_lowercase();
        if DNS_MARKERS.iter().any(|marker| text.contains(marker)) {
            return TransportError::HostNotFound(detail);
        }
        current = e.source();
    }

    TransportError::Other(detail)
}

/// "outer: inner: root" with adjacent duplicates removed.
pub fn describe_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current = Some(err);
    while let Some(e) = current {
        let text = e.to_string();
        if parts.last() != Some(&text) {
            parts.push(text);
        }
        current = e.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Wrapped {
        label: &'static str,
        source: Box<dyn StdError + Send + Sync + 'static>,
    }

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.label)
        }
    }

    impl StdError for Wrapped {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(self.source.as_ref())
        }
    }

    fn wrap(label: &'static str, source: impl StdError + Send + Sync + 'static) -> Wrapped {
        Wrapped { label, source: Box::new(source) }
    }

    #[test]
    fn test_refused_found_deep_in_chain() {
        let err = wrap(
            "error sending request",
            wrap("client error (Connect)", io::Error::from(io::ErrorKind::ConnectionRefused)),
        );
        let classified = classify(&err);
        assert_eq!(classified.code(), ErrorCode::ConnectionRefused);
        assert!(classified.to_string().contains("client error (Connect)"));
    }

    #[test]
    fn test_dns_failure() {
        let err = wrap(
            "error sending request",
            wrap(
                "dns error",
                io::Error::new(io::ErrorKind::Other, "failed to lookup address information"),
            ),
        );
        assert_eq!(classify(&err).code(), ErrorCode::HostNotFound);
    }

    #[test]
    fn test_everything_else_is_unknown() {
        let err = wrap("tls handshake", io::Error::new(io::ErrorKind::InvalidData, "bad certificate"));
        let classified = classify(&err);
        assert_eq!(classified.code(), ErrorCode::Unknown);
        assert_eq!(classified.to_string(), "tls handshake: bad certificate");
    }
}
