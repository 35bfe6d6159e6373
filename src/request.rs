use crate::{config::Config, error::AliasError, network::NetworkContext};
use anyhow::Result;
use std::net::IpAddr;

/// The port served by the primary deployment, aliases on it need no proxy
pub const DEFAULT_PORT: u16 = 80;

/// Longest name kubernetes accepts for a DNS label
const MAX_LABEL: usize = 63;

/// Longest name kubernetes accepts for a DNS subdomain
const MAX_SUBDOMAIN: usize = 253;

/// Returns true for a lowercase RFC 1123 label like `devel` or `my-user`
fn is_dns_label(value: &str) -> bool {
    let bytes = value.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            bytes.len() <= MAX_LABEL
                && first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        }
        _ => false,
    }
}

/// Returns true for a dotted sequence of RFC 1123 labels
fn is_dns_subdomain(value: &str) -> bool {
    value.len() <= MAX_SUBDOMAIN && value.split('.').all(is_dns_label)
}

/// A fully defaulted alias request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasRequest {
    /// Owner of the source ingresses
    pub user: String,
    /// Host name routed by the alias
    pub host: String,
    /// Port the alias listens on
    pub port: u16,
    /// IP the alias is bound to
    pub ip: String,
    /// Remove instead of create
    pub delete: bool,
}

impl AliasRequest {
    /// Apply the defaults to the command line input. This happens the same
    /// way for creation and deletion, so both address identical artifacts.
    pub fn resolve(config: &Config, network: &NetworkContext) -> Result<Self> {
        let user = config.user().trim();
        if user.is_empty() {
            return Err(AliasError::Input("USER must not be empty".into()).into());
        }
        if !is_dns_label(user) {
            return Err(AliasError::Input(format!(
                "invalid USER '{}', expected a lowercase DNS label",
                user
            ))
            .into());
        }

        let ip = match config.ip() {
            "" => network.current_ip.clone(),
            ip => {
                ip.parse::<IpAddr>()
                    .map_err(|e| AliasError::Input(format!("invalid IP '{}': {}", ip, e)))?;
                ip.to_owned()
            }
        };

        let host = match config.host() {
            "" => ip.clone(),
            host if is_dns_subdomain(host) || host.parse::<IpAddr>().is_ok() => host.to_owned(),
            host => {
                return Err(AliasError::Input(format!(
                    "invalid HOST '{}', expected a lowercase host name or IP",
                    host
                ))
                .into());
            }
        };

        let port = match config.port() {
            "" => DEFAULT_PORT,
            port => match port.parse::<u16>() {
                Ok(p) if p > 0 => p,
                _ => {
                    return Err(AliasError::Input(format!(
                        "invalid PORT '{}', expected 1-65535",
                        port
                    ))
                    .into());
                }
            },
        };

        Ok(Self {
            user: user.into(),
            host,
            port,
            ip,
            delete: config.delete(),
        })
    }
}
