use crate::{ingress::Ingress, shell::Shell};
use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

/// Thin kubectl client operating in a single namespace
pub struct Kubectl<'a> {
    shell: &'a Shell,
}

impl<'a> Kubectl<'a> {
    /// The namespace all resources live in
    pub const NAMESPACE: &'static str = "nuvolaris";

    /// The config map carrying the apihost annotation
    pub const CONFIG_MAP: &'static str = "config";

    pub fn new(shell: &'a Shell) -> Self {
        Self { shell }
    }

    /// Read the `apihost` annotation of the config map, `None` if unreadable or empty
    pub fn apihost(&self) -> Result<Option<String>> {
        let output = self.shell.run(&format!(
            "kubectl get cm {} -n {} -o jsonpath='{{.metadata.annotations.apihost}}'",
            Self::CONFIG_MAP,
            Self::NAMESPACE
        ))?;
        let apihost = output.stdout.trim();
        if !output.success() || apihost.is_empty() {
            return Ok(None);
        }
        Ok(Some(apihost.into()))
    }

    /// Returns true if the ingress can be read
    pub fn ingress_exists(&self, name: &str) -> Result<bool> {
        let output = self.shell.run(&format!(
            "kubectl get ingress {} -n {}",
            name,
            Self::NAMESPACE
        ))?;
        Ok(output.success())
    }

    /// Fetch an ingress manifest, `None` if it cannot be read
    pub fn get_ingress(&self, name: &str) -> Result<Option<Ingress>> {
        let output = self.shell.run(&format!(
            "kubectl get ingress {} -n {} -o yaml",
            name,
            Self::NAMESPACE
        ))?;
        if !output.success() || output.stdout.trim().is_empty() {
            debug!("Ingress {} not readable: {}", name, output.stderr.trim());
            return Ok(None);
        }
        let ingress = Ingress::from_yaml(&output.stdout)
            .with_context(|| format!("Unable to parse ingress {}", name))?;
        Ok(Some(ingress))
    }

    /// Run kubectl apply
    pub fn apply(&self, file: &Path) -> Result<()> {
        self.shell.run_checked(&format!(
            "kubectl apply -f {} -n {}",
            file.display(),
            Self::NAMESPACE
        ))?;
        Ok(())
    }

    /// Delete an ingress, returning false if it did not exist
    pub fn delete_ingress(&self, name: &str) -> Result<bool> {
        let output = self.shell.run(&format!(
            "kubectl delete ingress {} -n {}",
            name,
            Self::NAMESPACE
        ))?;
        Ok(output.success())
    }
}
