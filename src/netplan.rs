//! Netplan fragments binding an additional IP to the current interface
use crate::{network::NetworkContext, shell::Shell, writer::FileWriter};
use anyhow::{Context, Result};
use ipnetwork::IpNetwork;
use log::info;
use std::{
    net::IpAddr,
    path::{Path, PathBuf},
};

const NETPLAN_APPLY: &str = "sudo netplan apply";

/// The netplan fragment of an aliased IP, present only if the alias exists
pub struct NetplanAlias {
    ip: String,
    path: PathBuf,
}

impl NetplanAlias {
    pub fn new(netplan_dir: &Path, ip: &str) -> Self {
        Self {
            ip: ip.into(),
            path: netplan_dir.join(format!("50-{}.yaml", ip)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render the fragment adding the IP with the prefix of the current network
    pub fn content(&self, network: &NetworkContext) -> Result<String> {
        let ip: IpAddr = self
            .ip
            .parse()
            .with_context(|| format!("Unable to parse IP '{}'", self.ip))?;
        let address = IpNetwork::new(ip, network.current_prefix).with_context(|| {
            format!(
                "Invalid prefix length {} for IP {}",
                network.current_prefix, ip
            )
        })?;
        Ok(format!(
            include_str!("assets/netplan.yaml"),
            interface = network.current_interface,
            address = address,
        ))
    }

    /// Write the fragment and apply the netplan configuration
    pub fn create(
        &self,
        shell: &Shell,
        writer: &FileWriter<'_>,
        network: &NetworkContext,
    ) -> Result<()> {
        writer.write(&self.path, &self.content(network)?, true)?;
        shell.run_checked(NETPLAN_APPLY)?;
        info!("Applied network alias for IP {}", self.ip);
        Ok(())
    }

    /// Remove the fragment if existing, returns false if there was nothing to remove
    pub fn remove(&self, shell: &Shell) -> Result<bool> {
        if !shell.mode().is_dry() && !self.path.exists() {
            info!("Network alias file not found: {}", self.path.display());
            return Ok(false);
        }
        shell.run_checked(&format!("sudo rm {}", self.path.display()))?;
        shell.run_checked(NETPLAN_APPLY)?;
        info!("Removed network alias: {}", self.path.display());
        Ok(true)
    }
}
