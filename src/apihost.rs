//! Cluster apihost resolution
use crate::{error::AliasError, kubectl::Kubectl, shell::Shell};
use anyhow::Result;
use log::{info, warn};

const MOCK_APIHOST: &str = "http://miniops.me";

/// The cluster wide apihost and its user scoped variant
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApihostContext {
    /// The apihost annotation of the cluster config
    pub current: String,

    /// The apihost with the user inserted as subdomain
    pub user: String,
}

impl ApihostContext {
    /// Read the cluster apihost and derive the one for `user`
    pub fn resolve(shell: &Shell, user: &str) -> Result<Self> {
        let current = Self::current_apihost(shell)?;
        let user = Self::user_apihost(&current, user);
        info!("Using apihost {} (user apihost {})", current, user);
        Ok(Self { current, user })
    }

    /// Read the apihost annotation from the cluster config map
    pub fn current_apihost(shell: &Shell) -> Result<String> {
        match Kubectl::new(shell).apihost()? {
            Some(apihost) => Ok(apihost),
            None if shell.mode().is_dry() => {
                warn!(
                    "Unable to read apihost from cm/{}, using mock {}",
                    Kubectl::CONFIG_MAP,
                    MOCK_APIHOST
                );
                Ok(MOCK_APIHOST.into())
            }
            None => Err(AliasError::ClusterRead(format!(
                "apihost from cm/{} in namespace {}",
                Kubectl::CONFIG_MAP,
                Kubectl::NAMESPACE
            ))
            .into()),
        }
    }

    /// Insert `user` as subdomain in front of the domain, keeping the scheme
    /// and dropping any path
    pub fn user_apihost(base: &str, user: &str) -> String {
        match base.split_once("://") {
            Some((scheme, rest)) => format!("{}://{}.{}", scheme, user, Self::domain(rest)),
            None => format!("{}.{}", user, Self::domain(base)),
        }
    }

    fn domain(s: &str) -> &str {
        s.split('/').next().unwrap_or(s)
    }
}
