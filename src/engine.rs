//! Ordered, idempotent application and removal of an alias
use crate::{
    apihost::ApihostContext,
    config::Layout,
    error::AliasError,
    ingress::{Ingress, IngressKind},
    kubectl::Kubectl,
    netplan::NetplanAlias,
    network::NetworkContext,
    nginx::NginxSite,
    request::{AliasRequest, DEFAULT_PORT},
    shell::Shell,
    writer::FileWriter,
};
use anyhow::{Context, Result};
use log::{info, warn};
use std::{fs, path::PathBuf};

/// What an apply run created
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Applied {
    /// The netplan fragment, if an alias IP was needed
    pub alias: Option<PathBuf>,
    /// The available nginx site, if a proxy was needed
    pub site: Option<PathBuf>,
    /// The names of the duplicated ingresses
    pub ingresses: Vec<String>,
}

/// What a reverse run removed
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reversed {
    /// The netplan fragment was removed
    pub alias: bool,
    /// The nginx site was removed
    pub site: bool,
    /// The names of the ingresses which were deleted
    pub ingresses: Vec<String>,
}

/// Reconciles the netplan alias, nginx site and duplicated ingresses of a request
pub struct Engine<'a> {
    shell: &'a Shell,
    layout: &'a Layout,
    network: &'a NetworkContext,
    apihost: &'a ApihostContext,
    writer: FileWriter<'a>,
}

impl<'a> Engine<'a> {
    /// Create a new engine for the discovered network and apihost
    pub fn new(
        shell: &'a Shell,
        layout: &'a Layout,
        network: &'a NetworkContext,
        apihost: &'a ApihostContext,
    ) -> Self {
        Self {
            shell,
            layout,
            network,
            apihost,
            writer: FileWriter::new(shell, &layout.scratch_dir),
        }
    }

    /// Create everything the request needs: alias IP, then proxy, then ingresses
    pub fn apply(&self, request: &AliasRequest) -> Result<Applied> {
        info!("Creating configuration");
        let alias = self.create_alias(request)?;
        let site = self.create_site(request)?;
        let ingresses = IngressKind::ALL
            .iter()
            .map(|kind| self.duplicate(request, *kind))
            .collect::<Result<Vec<_>>>()?;
        Ok(Applied {
            alias,
            site,
            ingresses,
        })
    }

    /// Remove everything the request could have created: proxy, then alias
    /// IP, then ingresses
    pub fn reverse(&self, request: &AliasRequest) -> Result<Reversed> {
        info!("Deleting configuration");
        let site = NginxSite::new(&self.layout.nginx_dir, &request.host, request.port)
            .remove(self.shell)?;
        let alias = NetplanAlias::new(&self.layout.netplan_dir, &request.ip).remove(self.shell)?;
        let mut ingresses = vec![];
        for kind in IngressKind::ALL {
            if let Some(name) = self.remove(request, kind)? {
                ingresses.push(name);
            }
        }
        Ok(Reversed {
            alias,
            site,
            ingresses,
        })
    }

    fn create_alias(&self, request: &AliasRequest) -> Result<Option<PathBuf>> {
        if request.ip == self.network.current_ip {
            info!("IP {} matches current IP, no alias needed", request.ip);
            return Ok(None);
        }
        let alias = NetplanAlias::new(&self.layout.netplan_dir, &request.ip);
        alias.create(self.shell, &self.writer, self.network)?;
        Ok(Some(alias.path().into()))
    }

    fn create_site(&self, request: &AliasRequest) -> Result<Option<PathBuf>> {
        if request.port == DEFAULT_PORT {
            info!("Port is {}, no nginx proxy needed", DEFAULT_PORT);
            return Ok(None);
        }
        let site = NginxSite::new(&self.layout.nginx_dir, &request.host, request.port);
        site.create(self.shell, &self.writer, &self.apihost.user)?;
        Ok(Some(site.available().into()))
    }

    /// Copy the source ingress of `kind` as alias for the requested host and port
    fn duplicate(&self, request: &AliasRequest, kind: IngressKind) -> Result<String> {
        let kubectl = Kubectl::new(self.shell);
        let source = kind.source_name(&request.user);
        let name = kind.alias_name(&request.user, &request.host, request.port);

        let ingress = match kubectl.get_ingress(&source)? {
            Some(ingress) => ingress,
            None if self.shell.mode().is_dry() => {
                warn!("Unable to fetch ingress {}, using mock data", source);
                Ingress::synthetic(&source, Kubectl::NAMESPACE)?
            }
            None => {
                return Err(AliasError::ClusterRead(format!(
                    "ingress {} in namespace {}",
                    source,
                    Kubectl::NAMESPACE
                ))
                .into());
            }
        };

        let manifest = ingress.into_alias(&name, &request.host).to_yaml()?;
        let file = self.layout.scratch_dir.join(format!("{}.yaml", name));
        self.writer.write(&file, &manifest, false)?;
        let applied = kubectl.apply(&file);

        if self.shell.mode().is_dry() {
            applied?;
            println!("[DRY RUN] Temp file kept for inspection: {}\n", file.display());
        } else {
            // The manifest goes away whether or not the cluster accepted it
            let removed = fs::remove_file(&file);
            applied?;
            removed.with_context(|| format!("Unable to remove '{}'", file.display()))?;
            info!("Created ingress: {}", name);
        }
        Ok(name)
    }

    /// Delete the alias ingress of `kind`, returns its name if it existed
    fn remove(&self, request: &AliasRequest, kind: IngressKind) -> Result<Option<String>> {
        let name = kind.alias_name(&request.user, &request.host, request.port);
        if Kubectl::new(self.shell).delete_ingress(&name)? {
            info!("Deleted ingress: {}", name);
            Ok(Some(name))
        } else {
            info!("Ingress not found: {}", name);
            Ok(None)
        }
    }
}
