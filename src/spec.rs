use std::collections::HashMap;
use std::time::Duration;

use once_cell::sync::Lazy;

use crate::duration::parse_duration;
use crate::error::ParseError;

/// Well-known TCP-backed protocol names mapped to their default ports.
static SCHEME_PORTS: Lazy<HashMap<&'static str, u16>> = Lazy::new(|| {
    HashMap::from([
        ("amqp", 5672),
        ("amqps", 5671),
        ("http", 80),
        ("https", 443),
        ("imap", 143),
        ("mysql", 3306),
        ("ldap", 389),
        ("ldaps", 636),
        ("postgresql", 5432),
        ("smtp", 25),
    ])
});

/// The input specification of a single TCP wait operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    /// Hostname or IP address being waited on.
    pub host: String,
    /// Port number for the connection.
    pub port: u16,
    /// How often a connection is attempted; also the per-attempt timeout.
    /// Must be nonzero ([`parse`] enforces this).
    pub poll_interval: Duration,
}

impl TargetSpec {
    /// Host and port joined by ':', with IPv6 hosts bracketed.
    pub fn addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Parses a raw address into a [`TargetSpec`].
///
/// Accepted forms: `<host>:<port>`, `<scheme>://<host>` and
/// `<scheme>://<host>:<port>`. With no explicit port, a known scheme supplies
/// its default port (e.g. 80 for http, 443 for https); with an explicit port
/// the scheme is ignored. A `#<duration>` suffix overrides `default_poll` for
/// this target only.
pub fn parse(raw: &str, default_poll: Duration) -> Result<TargetSpec, ParseError> {
    let (scheme, rest) = split_scheme(raw);

    let (host_part, frag) = match rest.split_once('#') {
        Some((h, f)) => (h, Some(f)),
        None => (rest, None),
    };

    let (host, port) = if host_part.contains(':') {
        split_host_port(host_part)?
    } else if let Some(scheme) = scheme {
        match SCHEME_PORTS.get(scheme.to_ascii_lowercase().as_str()) {
            Some(port) => (host_part.to_string(), *port),
            None => return Err(ParseError::UnknownScheme(scheme.to_string())),
        }
    } else {
        return Err(ParseError::MissingPort);
    };

    let poll_interval = match frag {
        Some(raw_freq) if !raw_freq.is_empty() => parse_duration(raw_freq)?,
        _ => default_poll,
    };
    // a zero interval cannot drive the poll ticker
    if poll_interval.is_zero() {
        let raw_freq = frag.filter(|f| !f.is_empty()).unwrap_or("0");
        return Err(ParseError::InvalidPollInterval(raw_freq.to_string()));
    }

    Ok(TargetSpec {
        host,
        port,
        poll_interval,
    })
}

/// Parses every raw address, short-circuiting on the first failure and
/// reporting its position in the input list.
pub fn parse_all<S: AsRef<str>>(
    raws: &[S],
    default_poll: Duration,
) -> Result<Vec<TargetSpec>, ParseError> {
    raws.iter()
        .enumerate()
        .map(|(index, raw)| {
            parse(raw.as_ref(), default_poll).map_err(|source| ParseError::InvalidAddress {
                index,
                addr: raw.as_ref().to_string(),
                source: Box::new(source),
            })
        })
        .collect()
}

/// Splits a leading `<scheme>://` off, if present. The scheme must be purely
/// alphabetic; anything else is treated as part of the host.
fn split_scheme(raw: &str) -> (Option<&str>, &str) {
    if let Some(idx) = raw.find("://") {
        let scheme = &raw[..idx];
        if !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return (Some(scheme), &raw[idx + 3..]);
        }
    }
    (None, raw)
}

/// Splits `host:port`, accepting bracketed IPv6 hosts (`[::1]:80`).
fn split_host_port(s: &str) -> Result<(String, u16), ParseError> {
    let malformed = || ParseError::MalformedHostPort(s.to_string());

    let (host, port) = if let Some(inner) = s.strip_prefix('[') {
        let (host, rest) = inner.split_once(']').ok_or_else(malformed)?;
        let port = rest.strip_prefix(':').ok_or_else(malformed)?;
        (host, port)
    } else {
        let (host, port) = s.rsplit_once(':').ok_or_else(malformed)?;
        // unbracketed hosts may not contain further colons
        if host.contains(':') {
            return Err(malformed());
        }
        (host, port)
    };

    let port: u16 = port.parse().map_err(|_| malformed())?;
    Ok((host.to_string(), port))
}
