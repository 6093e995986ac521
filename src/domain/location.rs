// Location of a request: the transport-level parts the router cares about

use serde::Serialize;
use std::fmt;
use url::Url;

const DEFAULT_PORT_HTTP: u16 = 80;
const DEFAULT_PORT_HTTPS: u16 = 443;

/// Scheme, host, port, path and query of a request URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub query: String,
}

impl Location {
    /// Parses an absolute URL.
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(input)?;
        Ok(Self {
            scheme: url.scheme().to_string(),
            host: url.host_str().unwrap_or_default().to_string(),
            port: url.port_or_known_default().unwrap_or_default(),
            path: url.path().to_string(),
            query: url.query().unwrap_or_default().to_string(),
        })
    }

    /// `scheme://host[:port]`, the port omitted when it is the scheme's default.
    pub fn base(&self) -> String {
        if is_default_port(&self.scheme, self.port) {
            format!("{}://{}", self.scheme, self.host)
        } else {
            format!("{}://{}:{}", self.scheme, self.host, self.port)
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base(), self.path)?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        Ok(())
    }
}

fn is_default_port(scheme: &str, port: u16) -> bool {
    match scheme {
        "http" => port == DEFAULT_PORT_HTTP,
        "https" => port == DEFAULT_PORT_HTTPS,
        _ => false,
    }
}

/// The path to route for a CLI or test input: the still-encoded path of an
/// absolute URL, otherwise the input itself.
pub fn path_of(input: &str) -> String {
    match Location::parse(input) {
        Ok(location) if !location.host.is_empty() => location.path,
        _ => input.to_string(),
    }
}
