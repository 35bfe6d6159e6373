//! nginx sites forwarding an extra port to the primary deployment
use crate::{shell::Shell, writer::FileWriter};
use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

const RELOAD: &str = "sudo systemctl reload nginx";

/// An nginx site for `host:port`, made of the available config and its
/// enabled symlink
pub struct NginxSite {
    host: String,
    port: u16,
    available: PathBuf,
    enabled: PathBuf,
}

impl NginxSite {
    pub fn new(nginx_dir: &Path, host: &str, port: u16) -> Self {
        let name = format!("{}-{}", host, port);
        Self {
            host: host.into(),
            port,
            available: nginx_dir.join("sites-available").join(&name),
            enabled: nginx_dir.join("sites-enabled").join(&name),
        }
    }

    pub fn available(&self) -> &Path {
        &self.available
    }

    pub fn enabled(&self) -> &Path {
        &self.enabled
    }

    /// Render the site proxying to the local port 80 with `apihost` as `Host`
    pub fn content(&self, apihost: &str) -> String {
        format!(
            include_str!("assets/nginx.conf"),
            port = self.port,
            host = self.host,
            apihost = apihost,
        )
    }

    /// Write and enable the site, then make sure nginx runs with it
    pub fn create(&self, shell: &Shell, writer: &FileWriter<'_>, apihost: &str) -> Result<()> {
        writer.write(&self.available, &self.content(apihost), true)?;
        info!("Wrote nginx config: {}", self.available.display());

        if shell.mode().is_dry() || !Self::link_exists(self.enabled()) {
            shell.run_checked(&format!(
                "sudo ln -s {} {}",
                self.available.display(),
                self.enabled.display()
            ))?;
            info!("Enabled nginx site: {}", self.enabled.display());
        }

        shell.run("sudo systemctl enable nginx")?;
        shell.run("sudo systemctl start nginx")?;
        shell.run_checked(RELOAD)?;
        info!("nginx reloaded");
        Ok(())
    }

    /// Remove the site, returns false if the config was not present
    pub fn remove(&self, shell: &Shell) -> Result<bool> {
        let dry = shell.mode().is_dry();

        if dry || Self::link_exists(&self.enabled) {
            shell.run_checked(&format!("sudo rm {}", self.enabled.display()))?;
            info!("Removed nginx enabled site: {}", self.enabled.display());
        }

        if !dry && !self.available.exists() {
            info!("nginx config not found: {}", self.available.display());
            return Ok(false);
        }
        shell.run_checked(&format!("sudo rm {}", self.available.display()))?;
        shell.run(RELOAD)?;
        info!("Removed nginx config: {}", self.available.display());
        Ok(true)
    }

    /// Symlinks are checked without following them, a dangling link still counts
    fn link_exists(path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }
}
