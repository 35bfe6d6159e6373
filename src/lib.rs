//! # extra-aliases
//!
//! Provision or tear down a secondary `host:port` endpoint for a user
//! deployment: an additional IP bound via netplan, an nginx site forwarding
//! the port and copies of the user ingresses routing the new host.
#![deny(missing_docs)]

mod apihost;
mod config;
mod engine;
mod error;
mod ingress;
mod kubectl;
mod logger;
mod netplan;
mod network;
mod nginx;
mod preflight;
mod request;
mod shell;
mod writer;

pub use apihost::ApihostContext;
pub use config::{Config, Layout, is_truthy};
pub use engine::{Applied, Engine, Reversed};
pub use error::AliasError;
pub use ingress::{Ingress, IngressKind, alias_name};
pub use logger::Logger;
pub use network::NetworkContext;
pub use request::AliasRequest;
pub use shell::{Mode, Output, Runner, Shell, SystemRunner};

use anyhow::Result;
use log::info;
use preflight::Preflight;

/// The main entry point for the application
pub struct ExtraAliases;

impl ExtraAliases {
    /// Run by consuming the provided configuration
    pub fn start(config: Config) -> Result<()> {
        Logger::init(config.log_level())?;
        let layout = config.layout()?;
        let shell = Shell::new(config.mode());
        Self::run(&config, &layout, &shell)
    }

    /// Resolve the request against the live state and create or remove the alias
    pub fn run(config: &Config, layout: &Layout, shell: &Shell) -> Result<()> {
        if shell.mode().is_dry() {
            println!("{}", "=".repeat(60));
            println!("DRY RUN MODE ENABLED - No actual changes will be made");
            println!("{}\n", "=".repeat(60));
        }

        // Discovery happens for deletion too, so defaults resolve identically
        let network = NetworkContext::discover(shell)?;
        let request = AliasRequest::resolve(config, &network)?;
        let apihost = ApihostContext::resolve(shell, &request.user)?;
        Self::log_request(&request, &network, &apihost);

        let engine = Engine::new(shell, layout, &network, &apihost);
        if request.delete {
            let reversed = engine.reverse(&request)?;
            info!(
                "Deletion complete (site: {}, alias: {}, ingresses: {})",
                reversed.site,
                reversed.alias,
                reversed.ingresses.len()
            );
        } else {
            Preflight::new(shell, layout).run(&request.user)?;
            let applied = engine.apply(&request)?;
            info!(
                "Configuration complete (ingresses: {})",
                applied.ingresses.join(", ")
            );
            info!(
                "Your application should now be accessible at {}:{}",
                request.host, request.port
            );
        }
        Ok(())
    }

    fn log_request(request: &AliasRequest, network: &NetworkContext, apihost: &ApihostContext) {
        info!("USER: {}", request.user);
        info!("HOST: {}", request.host);
        info!("PORT: {}", request.port);
        info!("IP: {}", request.ip);
        info!("DELETE: {}", request.delete);
        info!("CURRENT_IP: {}", network.current_ip);
        info!("CURRENT_INTERFACE: {}", network.current_interface);
        info!("CURRENT_NETMASK: {}", network.current_prefix);
        info!("CURRENT_APIHOST: {}", apihost.current);
        info!("USER_APIHOST: {}", apihost.user);
    }
}
