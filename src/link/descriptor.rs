//! Connection descriptors and address resolution.
//!
//! A [`ConnectionDescriptor`] is derived exactly once from the target
//! address and never recomputed. Scheme normalization maps secure-HTTP-like
//! inputs to the secure socket scheme and everything else to the plain one:
//!
//! ```text
//! https://host/path?x=1  ─►  wss://host/path?x=1
//! http://host/p          ─►  ws://host/p
//! tcp://host:4000/feed   ─►  ws://host:4000/feed
//! ```
//!
//! Splitting the raw string is delegated to the [`UrlParser`] seam;
//! [`StdUrlParser`] (backed by the `url` crate) is the default.

use std::fmt;

use crate::error::AddressError;

/// Socket scheme of a resolved address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// TLS-backed channel (`wss`).
    Secure,
    /// Plaintext channel (`ws`).
    Plain,
}

impl Scheme {
    /// The wire scheme string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Secure => "wss",
            Scheme::Plain => "ws",
        }
    }

    /// Normalizes an input scheme: secure-HTTP-like inputs map to the
    /// secure socket scheme, everything else to the plain one.
    fn normalize(input: &str) -> Self {
        match input {
            "https" | "wss" => Scheme::Secure,
            _ => Scheme::Plain,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw split of a connection string, as produced by a [`UrlParser`].
#[derive(Debug, Clone)]
pub struct RawTarget {
    /// Scheme exactly as written in the input.
    pub scheme: String,
    /// Host, including an explicit port when one was given.
    pub host: String,
    /// Path component, leading separator included.
    pub path: String,
    /// Query string without the `?`, when present.
    pub query: Option<String>,
}

/// Splits a connection string into scheme/host/path/query.
pub trait UrlParser: Send {
    /// Parses `input` into its raw components.
    fn parse(&self, input: &str) -> Result<RawTarget, AddressError>;
}

/// Default parser backed by the `url` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdUrlParser;

impl UrlParser for StdUrlParser {
    fn parse(&self, input: &str) -> Result<RawTarget, AddressError> {
        let parsed = url::Url::parse(input).map_err(|e| AddressError::Invalid {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        let host = parsed.host_str().ok_or_else(|| AddressError::MissingHost {
            input: input.to_string(),
        })?;
        let host = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(RawTarget {
            scheme: parsed.scheme().to_string(),
            host,
            path: parsed.path().to_string(),
            query: parsed.query().map(str::to_string),
        })
    }
}

/// Immutable connection descriptor, derived once from the target address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    scheme: Scheme,
    host: String,
    path: String,
    query: Option<String>,
}

impl ConnectionDescriptor {
    /// Resolves `target` through `parser` and normalizes the scheme.
    pub fn resolve(target: &str, parser: &dyn UrlParser) -> Result<Self, AddressError> {
        let raw = parser.parse(target)?;
        let path = raw.path.strip_prefix('/').unwrap_or(&raw.path).to_string();
        Ok(Self {
            scheme: Scheme::normalize(&raw.scheme),
            host: raw.host,
            path,
            query: raw.query,
        })
    }

    /// Normalized socket scheme.
    #[inline]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Host (with explicit port when one was given).
    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Path with the leading separator stripped.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query string, when present.
    #[inline]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Resolved address in `scheme://host/path[?query]` form.
    #[must_use]
    pub fn uri(&self) -> String {
        match &self.query {
            Some(query) => format!("{}://{}/{}?{}", self.scheme, self.host, self.path, query),
            None => format!("{}://{}/{}", self.scheme, self.host, self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(target: &str) -> ConnectionDescriptor {
        ConnectionDescriptor::resolve(target, &StdUrlParser).unwrap()
    }

    #[test]
    fn secure_http_maps_to_secure_socket() {
        let d = resolve("https://host/path?x=1");
        assert_eq!(d.scheme(), Scheme::Secure);
        assert_eq!(d.uri(), "wss://host/path?x=1");
    }

    #[test]
    fn plain_http_maps_to_plain_socket_without_query() {
        let d = resolve("http://host/p");
        assert_eq!(d.scheme(), Scheme::Plain);
        assert_eq!(d.query(), None);
        assert_eq!(d.uri(), "ws://host/p");
    }

    #[test]
    fn socket_schemes_pass_through() {
        assert_eq!(resolve("wss://host/live").uri(), "wss://host/live");
        assert_eq!(resolve("ws://host/live").uri(), "ws://host/live");
    }

    #[test]
    fn unknown_schemes_fall_back_to_plain() {
        assert_eq!(resolve("tcp://host:4000/feed").uri(), "ws://host:4000/feed");
    }

    #[test]
    fn explicit_port_is_preserved() {
        let d = resolve("https://example.com:8443/stream?token=abc");
        assert_eq!(d.host(), "example.com:8443");
        assert_eq!(d.uri(), "wss://example.com:8443/stream?token=abc");
    }

    #[test]
    fn invalid_input_is_rejected() {
        let err = ConnectionDescriptor::resolve("not a url", &StdUrlParser).unwrap_err();
        assert_eq!(err.as_label(), "address_invalid");
    }

    #[test]
    fn hostless_input_is_rejected() {
        let err = ConnectionDescriptor::resolve("data:text/plain,hi", &StdUrlParser).unwrap_err();
        assert_eq!(err.as_label(), "address_missing_host");
    }
}
