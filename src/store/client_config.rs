use std::fmt;

use crate::store::error::{StoreError, StoreResult};

/// Default controller port
pub const DEFAULT_CONTROLLER_PORT: u16 = 9090;

/// One controller address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Connection settings for a store client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Controller addresses, in the order given
    pub endpoints: Vec<Endpoint>,

    /// Connect over TLS
    pub tls: bool,
}

impl ClientConfig {
    /// Parse a controller URI
    ///
    /// Format: `[tcp|tls|pravega]://host[:port][,host[:port]...]`. The scheme
    /// may be omitted so a plain Kafka `bootstrap.servers` list also works;
    /// ports default to 9090. IPv6 hosts must be bracketed (`[::1]:9090`) and
    /// are stored without the brackets.
    ///
    /// # Example
    ///
    /// ```
    /// use pravega_kafka_adapter::store::ClientConfig;
    ///
    /// let config = ClientConfig::from_controller_uri("tls://a:9091,b").unwrap();
    /// assert!(config.tls);
    /// assert_eq!(config.endpoints.len(), 2);
    /// assert_eq!(config.endpoints[1].port, 9090);
    /// ```
    pub fn from_controller_uri(uri: &str) -> StoreResult<Self> {
        let uri = uri.trim();
        let invalid = |reason: &str| StoreError::InvalidControllerUri(format!("{} ({})", uri, reason));

        let (tls, rest) = match uri.split_once("://") {
            Some(("tcp", rest)) | Some(("pravega", rest)) => (false, rest),
            Some(("tls", rest)) | Some(("ssl", rest)) => (true, rest),
            Some((scheme, _)) => return Err(invalid(&format!("unsupported scheme '{}'", scheme))),
            None => (false, uri),
        };

        // Tolerate a trailing slash on the last address
        let rest = rest.trim_end_matches('/');

        let mut endpoints = Vec::new();
        for address in rest.split(',') {
            let address = address.trim();
            if address.is_empty() {
                return Err(invalid("empty address"));
            }

            let parse_port = |port: &str| {
                port.parse::<u16>()
                    .map_err(|_| invalid(&format!("invalid port '{}'", port)))
            };

            let (host, port) = if let Some(bracketed) = address.strip_prefix('[') {
                let (host, after) = bracketed
                    .split_once(']')
                    .ok_or_else(|| invalid(&format!("unclosed '[' in '{}'", address)))?;
                let port = match after {
                    "" => DEFAULT_CONTROLLER_PORT,
                    _ => match after.strip_prefix(':') {
                        Some(port) => parse_port(port)?,
                        None => return Err(invalid(&format!("unexpected '{}' after host", after))),
                    },
                };
                (host, port)
            } else {
                match address.rsplit_once(':') {
                    Some((host, _)) if host.contains(':') => {
                        return Err(invalid(&format!("IPv6 host '{}' must be bracketed", address)))
                    }
                    Some((host, port)) => (host, parse_port(port)?),
                    None => (address, DEFAULT_CONTROLLER_PORT),
                }
            };

            if host.is_empty() || host.contains('/') {
                return Err(invalid(&format!("invalid host '{}'", host)));
            }

            endpoints.push(Endpoint {
                host: host.to_string(),
                port,
            });
        }

        Ok(Self { endpoints, tls })
    }
}
