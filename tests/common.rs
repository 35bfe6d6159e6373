#![allow(dead_code)]
use anyhow::Result;
use clap::Parser;
use extra_aliases::{Config, Layout, Mode, Output, Runner, Shell};
use std::{cell::RefCell, fs, rc::Rc};
use tempfile::{TempDir, tempdir};

pub const CURRENT_IP: &str = "10.0.0.5";

pub const IP_JSON: &str = r#"[
    {"ifname":"lo","addr_info":[{"local":"127.0.0.1","prefixlen":8}]},
    {"ifname":"ens3","addr_info":[{"local":"10.0.0.5","prefixlen":24}]}
]"#;

pub const INGRESS: &str = r#"apiVersion: networking.k8s.io/v1
kind: Ingress
metadata:
  annotations:
    kubectl.kubernetes.io/last-applied-configuration: "{}"
  creationTimestamp: "2025-03-01T10:00:00Z"
  generation: 1
  name: devel-static-ingress
  namespace: nuvolaris
  resourceVersion: "42"
  uid: 0b5c7d1e-0000-4000-8000-000000000000
spec:
  ingressClassName: nginx
  rules:
  - host: devel.miniops.me
    http:
      paths:
      - backend:
          service:
            name: nuvolaris-static-svc
            port:
              number: 8080
        path: /
        pathType: Prefix
status:
  loadBalancer: {}
"#;

/// A runner serving a healthy host and cluster, recording every command
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Rc<RefCell<Vec<String>>>,
    failing: Vec<String>,
}

impl Recorder {
    pub fn failing(prefix: &str) -> Self {
        Self {
            failing: vec![prefix.into()],
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn shell(&self, mode: Mode) -> Shell {
        Shell::with_runner(mode, Box::new(self.clone()))
    }
}

impl Runner for Recorder {
    fn execute(&self, command: &str) -> Result<Output> {
        self.calls.borrow_mut().push(command.into());
        if self.failing.iter().any(|p| command.starts_with(p.as_str())) {
            return Ok(Output {
                code: 1,
                stderr: "failed".into(),
                ..Default::default()
            });
        }
        let stdout = if command == "hostname -I" {
            format!("{} 172.17.0.1\n", CURRENT_IP)
        } else if command == "ip -j addr show" {
            IP_JSON.into()
        } else if command.starts_with("kubectl get cm config") {
            "http://miniops.me".into()
        } else if command.starts_with("kubectl get ingress") && command.ends_with("-o yaml") {
            INGRESS.into()
        } else {
            String::new()
        };
        Ok(Output {
            stdout,
            ..Default::default()
        })
    }
}

pub fn config(args: &[&str]) -> Result<Config> {
    let mut full = vec!["extra-aliases"];
    full.extend(args);
    Ok(Config::try_parse_from(full)?)
}

/// A layout rooted in a temporary directory, marked as Debian system
pub fn layout() -> Result<(TempDir, Layout)> {
    let dir = tempdir()?;
    let layout = Layout {
        netplan_dir: dir.path().join("netplan"),
        nginx_dir: dir.path().join("nginx"),
        scratch_dir: dir.path().join("tmp"),
        os_marker: dir.path().join("debian_version"),
    };
    fs::create_dir_all(&layout.netplan_dir)?;
    fs::create_dir_all(layout.nginx_dir.join("sites-available"))?;
    fs::create_dir_all(layout.nginx_dir.join("sites-enabled"))?;
    fs::create_dir_all(&layout.scratch_dir)?;
    fs::write(&layout.os_marker, "12.0\n")?;
    Ok((dir, layout))
}
