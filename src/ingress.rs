//! Ingress manifests and their transformation into aliases
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_yml::Value;
use std::collections::BTreeMap;

/// Annotation added by `kubectl apply`, meaningless on a copy
const LAST_APPLIED: &str = "kubectl.kubernetes.io/last-applied-configuration";

/// The ingresses of a user deployment which get duplicated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngressKind {
    /// `<user>-apihost-api-ingress`
    ApihostApi,
    /// `<user>-apihost-my-api-ingress`
    ApihostMyApi,
    /// `<user>-static-ingress`
    Static,
}

impl IngressKind {
    /// All kinds in the order they are processed
    pub const ALL: [IngressKind; 3] = [
        IngressKind::ApihostApi,
        IngressKind::ApihostMyApi,
        IngressKind::Static,
    ];

    /// The suffix following the user name in the source ingress name
    pub fn suffix(self) -> &'static str {
        match self {
            IngressKind::ApihostApi => "apihost-api-ingress",
            IngressKind::ApihostMyApi => "apihost-my-api-ingress",
            IngressKind::Static => "static-ingress",
        }
    }

    /// The name of the source ingress for `user`
    pub fn source_name(self, user: &str) -> String {
        format!("{}-{}", user, self.suffix())
    }

    /// The name of the duplicated ingress for the alias `host:port`
    pub fn alias_name(self, user: &str, host: &str, port: u16) -> String {
        alias_name(user, host, port, self.suffix())
    }
}

/// Derive the name of a duplicated ingress. Creation and deletion both rely
/// on it, no mapping to the source ingress is stored anywhere.
pub fn alias_name(user: &str, host: &str, port: u16, suffix: &str) -> String {
    format!("alias-{}-{}-{}-{}", host, port, user, suffix).replace('.', "-")
}

/// An ingress manifest, typed where it gets rewritten and opaque elsewhere
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Ingress {
    /// Object metadata
    pub metadata: Metadata,

    /// Routing specification
    #[serde(default)]
    pub spec: Spec,

    /// Status assigned by the cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,

    /// Every other top level field, like `apiVersion` and `kind`
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// The metadata fields touched when copying an ingress
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// The object name
    pub name: String,

    /// Unique id assigned by the cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    /// Version used for optimistic concurrency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,

    /// Generation of the desired state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,

    /// Time the object was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,

    /// Annotations, dropped if nothing is left after stripping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    /// Labels, namespace and everything else
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// The ingress spec, only the rules are typed
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Spec {
    /// Host rules, the first one gets rewritten
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,

    /// Ingress class, TLS, default backend and the like
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// A single host rule
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Rule {
    /// The host the rule matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// The HTTP paths of the rule
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl Ingress {
    /// Parse a manifest as returned by `kubectl get -o yaml`
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yml::from_str(yaml).context("Unable to deserialize ingress manifest")
    }

    /// Serialize the manifest for `kubectl apply`
    pub fn to_yaml(&self) -> Result<String> {
        serde_yml::to_string(self).context("Unable to serialize ingress manifest")
    }

    /// A structurally valid stand-in used when the source cannot be read in
    /// dry-run mode
    pub fn synthetic(name: &str, namespace: &str) -> Result<Self> {
        Self::from_yaml(&format!(
            include_str!("assets/ingress.yaml"),
            name = name,
            namespace = namespace
        ))
    }

    /// Drop every field assigned by the cluster
    pub fn strip(&mut self) {
        let m = &mut self.metadata;
        m.uid = None;
        m.resource_version = None;
        m.generation = None;
        m.creation_timestamp = None;
        if let Some(annotations) = &mut m.annotations {
            annotations.remove(LAST_APPLIED);
            if annotations.is_empty() {
                m.annotations = None;
            }
        }
        self.status = None;
    }

    /// Turn a source ingress into its alias named `name` routing `host`
    pub fn into_alias(mut self, name: &str, host: &str) -> Self {
        self.strip();
        self.metadata.name = name.into();
        if let Some(rule) = self.spec.rules.first_mut() {
            rule.host = Some(host.into());
        }
        self
    }
}
