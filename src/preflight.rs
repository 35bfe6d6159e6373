//! Checks run before any alias gets created
use crate::{
    config::Layout, error::AliasError, ingress::IngressKind, kubectl::Kubectl, shell::Shell,
};
use anyhow::Result;
use log::info;

const NGINX_INSTALL: &str = "sudo apt-get update && sudo apt-get install -y nginx";

pub struct Preflight<'a> {
    shell: &'a Shell,
    layout: &'a Layout,
}

impl<'a> Preflight<'a> {
    pub fn new(shell: &'a Shell, layout: &'a Layout) -> Self {
        Self { shell, layout }
    }

    /// Run all checks, aborting on the first failing one
    pub fn run(&self, user: &str) -> Result<()> {
        if self.shell.mode().is_dry() {
            info!("Skipping preflight checks in dry-run mode");
            return Ok(());
        }

        info!("Running preflight checks");
        self.check_os()?;
        info!("OS check: OK");
        self.check_netplan()?;
        info!("netplan check: OK");
        self.check_nginx()?;
        info!("nginx check: OK");
        self.check_ingresses(user)?;
        info!("Ingress check: OK");
        Ok(())
    }

    fn check_os(&self) -> Result<()> {
        if !self.layout.os_marker.exists() {
            return Err(AliasError::Preflight(format!(
                "Debian/Ubuntu Linux required, '{}' not found",
                self.layout.os_marker.display()
            ))
            .into());
        }
        Ok(())
    }

    fn check_netplan(&self) -> Result<()> {
        if !self.available("netplan")? {
            return Err(AliasError::Preflight("netplan is not installed".into()).into());
        }
        Ok(())
    }

    fn check_nginx(&self) -> Result<()> {
        if self.available("nginx")? {
            return Ok(());
        }
        info!("nginx not found, attempting to install it");
        if !self.shell.run(NGINX_INSTALL)?.success() {
            return Err(AliasError::Preflight("failed to install nginx".into()).into());
        }
        info!("nginx installed");
        Ok(())
    }

    fn check_ingresses(&self, user: &str) -> Result<()> {
        let kubectl = Kubectl::new(self.shell);
        for kind in IngressKind::ALL {
            let name = kind.source_name(user);
            if !kubectl.ingress_exists(&name)? {
                return Err(AliasError::Preflight(format!(
                    "required ingress {} not found in namespace {}",
                    name,
                    Kubectl::NAMESPACE
                ))
                .into());
            }
        }
        Ok(())
    }

    fn available(&self, binary: &str) -> Result<bool> {
        Ok(self.shell.run(&format!("which {}", binary))?.success())
    }
}
