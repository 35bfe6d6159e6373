//! Discovery of the current host network identity
use crate::{error::AliasError, shell::Shell};
use anyhow::Result;
use log::{debug, info, warn};
use serde::Deserialize;

/// Placeholders used in dry-run mode if discovery fails
const MOCK_IP: &str = "192.168.1.100";
const MOCK_INTERFACE: &str = "eth0";
const DEFAULT_PREFIX: u8 = 24;

/// Snapshot of the current primary address and its interface
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkContext {
    /// The first address reported by `hostname -I`
    pub current_ip: String,

    /// The interface carrying `current_ip`
    pub current_interface: String,

    /// The prefix length of `current_ip` on its interface
    pub current_prefix: u8,
}

#[derive(Deserialize)]
struct Interface {
    ifname: String,
    #[serde(default)]
    addr_info: Vec<AddrInfo>,
}

#[derive(Deserialize)]
struct AddrInfo {
    local: Option<String>,
    prefixlen: Option<u8>,
}

impl NetworkContext {
    /// Discover the current network identity of the host
    pub fn discover(shell: &Shell) -> Result<Self> {
        let current_ip = Self::current_ip(shell)?;
        let (current_interface, current_prefix) = Self::network_info(shell, &current_ip)?;
        info!(
            "Using current IP {} on {}/{}",
            current_ip, current_interface, current_prefix
        );
        Ok(Self {
            current_ip,
            current_interface,
            current_prefix,
        })
    }

    /// Retrieve the first IP reported by `hostname -I`
    pub fn current_ip(shell: &Shell) -> Result<String> {
        let output = shell.run("hostname -I")?;
        match Self::parse_first_ip(&output.stdout) {
            Some(ip) => Ok(ip),
            None if shell.mode().is_dry() => {
                warn!("Unable to determine current IP, using mock IP {}", MOCK_IP);
                Ok(MOCK_IP.into())
            }
            None => Err(AliasError::Discovery("the current IP address".into()).into()),
        }
    }

    /// Retrieve the interface name and prefix length owning `ip`
    pub fn network_info(shell: &Shell, ip: &str) -> Result<(String, u8)> {
        let output = shell.run("ip -j addr show")?;
        match Self::parse_network_info(&output.stdout, ip) {
            Ok(info) => Ok(info),
            Err(e) if shell.mode().is_dry() => {
                warn!(
                    "{}, using mock network info: {}, {}",
                    e, MOCK_INTERFACE, DEFAULT_PREFIX
                );
                Ok((MOCK_INTERFACE.into(), DEFAULT_PREFIX))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn parse_first_ip(output: &str) -> Option<String> {
        output
            .lines()
            .next()
            .and_then(|l| l.split_whitespace().next())
            .map(ToOwned::to_owned)
    }

    fn parse_network_info(output: &str, ip: &str) -> Result<(String, u8), AliasError> {
        let interfaces: Vec<Interface> = serde_json::from_str(output).map_err(|e| {
            debug!("Unable to parse `ip` output: {}", e);
            AliasError::Discovery("the network interfaces".into())
        })?;
        interfaces
            .into_iter()
            .find_map(|i| {
                i.addr_info
                    .iter()
                    .find(|a| a.local.as_deref() == Some(ip))
                    .map(|a| (i.ifname.clone(), a.prefixlen.unwrap_or(DEFAULT_PREFIX)))
            })
            .ok_or_else(|| AliasError::Discovery(format!("the interface for IP {}", ip)))
    }
}
