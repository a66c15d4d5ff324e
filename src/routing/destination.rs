//! Destination classification.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use serde::Serialize;
use url::{Host, Url};

/// Host names treated as the caller's own machine.
pub const LOOPBACK_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// Reachable directly from the caller.
    Local,
    /// Must be relayed.
    Remote,
}

impl Destination {
    pub fn for_url(url: &Url) -> Self {
        let local = match url.host() {
            Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case(LOOPBACK_HOSTS[0]),
            Some(Host::Ipv4(ip)) => ip == Ipv4Addr::LOCALHOST,
            Some(Host::Ipv6(ip)) => ip == Ipv6Addr::LOCALHOST,
            None => false,
        };
        if local {
            Destination::Local
        } else {
            Destination::Remote
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Destination::Local)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Local => "local",
            Destination::Remote => "remote",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a raw URL string. Anything that fails to parse is `Remote`.
pub fn classify(url: &str) -> Destination {
    Url::parse(url.trim())
        .map(|parsed| Destination::for_url(&parsed))
        .unwrap_or(Destination::Remote)
}

pub fn is_local(url: &str) -> bool {
    classify(url).is_local()
}
