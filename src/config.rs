//! Configuration related structures
use crate::shell::Mode;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, fs::read_to_string, path::PathBuf};

/// Tokens accepted as `true` by `DRY` and the `DELETE` argument
const TRUTHY: &[&str] = &["1", "true", "yes"];

/// Returns true if the value is one of the accepted truthy tokens
pub fn is_truthy(value: &str) -> bool {
    TRUTHY.iter().any(|t| value.eq_ignore_ascii_case(t))
}

fn parse_truthy(value: &str) -> Result<bool, Infallible> {
    Ok(is_truthy(value))
}

#[derive(Parser)]
#[command(
    after_help = "Set DRY=1 to print every state changing command and file instead of applying it",
    version
)]
/// Add or remove an extra IP/port alias for a user deployment
pub struct Config {
    /// The user owning the ingresses to be aliased
    #[arg(value_name = "USER")]
    user: String,

    /// The host name of the alias, defaults to the IP
    #[arg(value_name = "HOST", default_value = "")]
    host: String,

    /// The port of the alias, defaults to 80
    #[arg(value_name = "PORT", default_value = "")]
    port: String,

    /// The IP of the alias, defaults to the current IP
    #[arg(value_name = "IP", default_value = "")]
    ip: String,

    /// Remove the alias instead of creating it (1, true or yes)
    #[arg(value_name = "DELETE", default_value = "")]
    delete: String,

    /// Only print state changing commands and files
    #[arg(
        long = "dry",
        env = "DRY",
        action = ArgAction::Set,
        value_parser = parse_truthy,
        default_value = "false",
        default_missing_value = "true",
        num_args = 0..=1,
        require_equals = true,
        hide_env_values = true
    )]
    dry: bool,

    /// The logging level of the application
    #[arg(
        long = "log-level",
        short = 'l',
        env = "EXTRA_ALIASES_LOG_LEVEL",
        default_value = "info",
        value_name = "LEVEL"
    )]
    log_level: LevelFilter,

    /// TOML file overriding the filesystem layout
    #[arg(long = "layout", env = "EXTRA_ALIASES_LAYOUT", value_name = "PATH")]
    layout: Option<PathBuf>,
}

impl Config {
    /// The user argument
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The raw host argument, empty if unset
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The raw port argument, empty if unset
    pub fn port(&self) -> &str {
        &self.port
    }

    /// The raw IP argument, empty if unset
    pub fn ip(&self) -> &str {
        &self.ip
    }

    /// Returns true if the alias should be removed
    pub fn delete(&self) -> bool {
        is_truthy(&self.delete)
    }

    /// The execution mode selected by `DRY`
    pub fn mode(&self) -> Mode {
        if self.dry { Mode::DryRun } else { Mode::Live }
    }

    /// The configured log level
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    /// Load the filesystem layout, falling back to the defaults
    pub fn layout(&self) -> Result<Layout> {
        match &self.layout {
            Some(file) => toml::from_str(&read_to_string(file).with_context(|| {
                format!("Unable to read layout file '{}'", file.display())
            })?)
            .with_context(|| format!("Unable to load layout file '{}'", file.display())),
            None => Ok(Layout::default()),
        }
    }
}

/// Where the host artifacts are placed
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Layout {
    /// Directory holding the netplan fragments
    pub netplan_dir: PathBuf,

    /// Directory holding `sites-available` and `sites-enabled`
    pub nginx_dir: PathBuf,

    /// Directory for temporary files, which are written even in dry-run mode
    pub scratch_dir: PathBuf,

    /// File whose existence marks a Debian based system
    pub os_marker: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            netplan_dir: PathBuf::from("/etc/netplan"),
            nginx_dir: PathBuf::from("/etc/nginx"),
            scratch_dir: PathBuf::from("/tmp"),
            os_marker: PathBuf::from("/etc/debian_version"),
        }
    }
}
