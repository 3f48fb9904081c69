//! Engine endpoint addressing.

use std::fmt;

/// Where a running engine listens for clients.
///
/// # Examples
///
/// ```
/// use veer_engine::Endpoint;
///
/// let ep = Endpoint::default();
/// assert_eq!(ep.to_string(), "localhost:2000");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Endpoint {
    /// Build an endpoint from a host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for Endpoint {
    /// The conventional local engine endpoint, `localhost:2000`.
    fn default() -> Self {
        Self::new("localhost", 2000)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
