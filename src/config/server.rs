//! Transport selection for the MCP server.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use super::env::env_opt;
use super::{ConfigError, EnvSource, ProcessEnv};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PATH: &str = "/mcp";

/// How the server talks to its client. Chosen once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transport {
    /// JSON-RPC over stdin/stdout, one request at a time.
    Stdio,
    /// Streamable HTTP (event-stream responses) on a single endpoint path.
    Http { addr: SocketAddr, path: String },
}

impl Transport {
    pub fn name(&self) -> &'static str {
        match self {
            Transport::Stdio => "stdio",
            Transport::Http { .. } => "streamable-http",
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Transport::Http {
            addr: SocketAddr::new(
                DEFAULT_HOST.parse().unwrap_or(IpAddr::from([0, 0, 0, 0])),
                DEFAULT_PORT,
            ),
            path: DEFAULT_PATH.to_string(),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Stdio => write!(f, "stdio"),
            Transport::Http { addr, path } => write!(f, "http://{addr}{path}"),
        }
    }
}

/// Operational settings that all have defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerConfig {
    pub transport: Transport,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let mode = env_opt(env, "MCP_TRANSPORT").map(|m| m.to_ascii_lowercase());

        let transport = match mode.as_deref() {
            Some("stdio") => Transport::Stdio,
            None | Some("sse" | "http" | "streamable-http" | "streamable_http") => {
                Transport::Http {
                    addr: listen_addr(env)?,
                    path: listen_path(env),
                }
            }
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "MCP_TRANSPORT".to_string(),
                    message: format!("expected 'stdio' or 'sse', got '{other}'"),
                });
            }
        };

        Ok(Self { transport })
    }
}

fn listen_addr(env: &dyn EnvSource) -> Result<SocketAddr, ConfigError> {
    let host = env_opt(env, "MCP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
    let ip: IpAddr = match host.as_str() {
        "localhost" => IpAddr::from([127, 0, 0, 1]),
        other => other.parse().map_err(|_| ConfigError::InvalidValue {
            key: "MCP_HOST".to_string(),
            message: format!("'{other}' is not an IP address"),
        })?,
    };

    let port = match env_opt(env, "MCP_PORT") {
        Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
            key: "MCP_PORT".to_string(),
            message: format!("'{raw}' is not a valid port"),
        })?,
        None => DEFAULT_PORT,
    };

    Ok(SocketAddr::new(ip, port))
}

fn listen_path(env: &dyn EnvSource) -> String {
    let path = env_opt(env, "MCP_PATH").unwrap_or_else(|| DEFAULT_PATH.to_string());
    if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_to_network_on_all_interfaces() {
        let env: HashMap<&str, &str> = HashMap::new();
        let config = ServerConfig::from_source(&env).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.transport.to_string(), "http://0.0.0.0:8080/mcp");
        assert_eq!(config.transport.name(), "streamable-http");
    }

    #[test]
    fn test_stdio_selection() {
        let env = HashMap::from([("MCP_TRANSPORT", "STDIO")]);
        let config = ServerConfig::from_source(&env).unwrap();
        assert_eq!(config.transport, Transport::Stdio);
    }

    #[test]
    fn test_custom_host_port_path() {
        let env = HashMap::from([
            ("MCP_TRANSPORT", "sse"),
            ("MCP_HOST", "127.0.0.1"),
            ("MCP_PORT", "9191"),
            ("MCP_PATH", "search"),
        ]);
        let config = ServerConfig::from_source(&env).unwrap();
        assert_eq!(
            config.transport,
            Transport::Http {
                addr: "127.0.0.1:9191".parse().unwrap(),
                path: "/search".to_string(),
            }
        );
    }

    #[test]
    fn test_localhost_alias() {
        let env = HashMap::from([("MCP_HOST", "localhost")]);
        let config = ServerConfig::from_source(&env).unwrap();
        match config.transport {
            Transport::Http { addr, .. } => assert!(addr.ip().is_loopback()),
            Transport::Stdio => panic!("expected http transport"),
        }
    }

    #[test]
    fn test_invalid_values() {
        let bad_port = HashMap::from([("MCP_PORT", "eighty")]);
        assert!(ServerConfig::from_source(&bad_port).is_err());

        let bad_mode = HashMap::from([("MCP_TRANSPORT", "carrier-pigeon")]);
        let err = ServerConfig::from_source(&bad_mode).unwrap_err();
        assert!(err.to_string().contains("MCP_TRANSPORT"));
    }
}
