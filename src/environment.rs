//! Kubernetes and container introspection for the info endpoint.
//!
//! Everything here is best effort: missing files, unset variables and failed
//! interface enumeration all degrade to absent fields rather than errors.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;

use serde::Serialize;

/// Environment variables reported by the info endpoint when set.
pub const KUBERNETES_ENV_KEYS: [&str; 9] = [
    "HOSTNAME",
    "POD_NAME",
    "POD_NAMESPACE",
    "NODE_NAME",
    "SERVICE_NAME",
    "CLUSTER_NAME",
    "KUBERNETES_SERVICE_HOST",
    "KUBERNETES_PORT_443_TCP_ADDR",
    "KUBERNETES_PORT",
];

/// Read the pod namespace from the service account mount.
pub async fn read_namespace(path: impl AsRef<Path>) -> Option<String> {
    match tokio::fs::read_to_string(path.as_ref()).await {
        Ok(contents) => {
            let namespace = contents.trim();
            (!namespace.is_empty()).then(|| namespace.to_string())
        }
        Err(e) => {
            tracing::trace!(path = %path.as_ref().display(), error = %e, "No service account namespace");
            None
        }
    }
}

/// Collect the known Kubernetes variables that are set and non-empty.
pub fn collect_env<F>(lookup: F) -> BTreeMap<&'static str, String>
where
    F: Fn(&str) -> Option<String>,
{
    KUBERNETES_ENV_KEYS
        .iter()
        .filter_map(|&key| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .map(|value| (key, value))
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesInfo {
    pub namespace: Option<String>,
    pub pod_name: Option<String>,
    pub node_name: Option<String>,
    pub service_name: Option<String>,
    pub cluster_name: Option<String>,
    pub api: KubernetesApi,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KubernetesApi {
    pub host: Option<String>,
    pub port: Option<String>,
}

impl KubernetesInfo {
    /// Merge the namespace file with collected environment variables.
    ///
    /// The namespace file wins over `POD_NAMESPACE`, `POD_NAME` over `HOSTNAME`,
    /// and `KUBERNETES_PORT` over `KUBERNETES_PORT_443_TCP_ADDR`.
    pub fn from_sources(
        namespace: Option<String>,
        env: &BTreeMap<&'static str, String>,
    ) -> Self {
        let get = |key: &str| env.get(key).cloned();

        Self {
            namespace: namespace.or_else(|| get("POD_NAMESPACE")),
            pod_name: get("POD_NAME").or_else(|| get("HOSTNAME")),
            node_name: get("NODE_NAME"),
            service_name: get("SERVICE_NAME"),
            cluster_name: get("CLUSTER_NAME"),
            api: KubernetesApi {
                host: get("KUBERNETES_SERVICE_HOST"),
                port: get("KUBERNETES_PORT").or_else(|| get("KUBERNETES_PORT_443_TCP_ADDR")),
            },
        }
    }
}

/// IPv4 addresses of one network interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceAddresses {
    pub interface_name: String,
    pub addresses: Vec<String>,
}

/// Group non-loopback IPv4 addresses by interface, keeping first-seen order.
pub fn group_ipv4_addresses<I>(interfaces: I) -> Vec<InterfaceAddresses>
where
    I: IntoIterator<Item = (String, IpAddr)>,
{
    let mut result: Vec<InterfaceAddresses> = Vec::new();

    for (name, ip) in interfaces {
        let IpAddr::V4(v4) = ip else { continue };
        if v4.is_loopback() {
            continue;
        }

        match result.iter_mut().find(|entry| entry.interface_name == name) {
            Some(entry) => entry.addresses.push(v4.to_string()),
            None => result.push(InterfaceAddresses {
                interface_name: name,
                addresses: vec![v4.to_string()],
            }),
        }
    }

    result
}

/// External IPv4 addresses of this host, grouped by interface.
pub fn network_addresses() -> Vec<InterfaceAddresses> {
    match if_addrs::get_if_addrs() {
        Ok(interfaces) => {
            group_ipv4_addresses(interfaces.into_iter().map(|iface| {
                let ip = iface.ip();
                (iface.name, ip)
            }))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to enumerate network interfaces");
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    pub network: Vec<InterfaceAddresses>,
    pub pid: u32,
    pub platform: &'static str,
    pub arch: &'static str,
    pub env_keys: usize,
}

impl ContainerInfo {
    /// Describe the running process.
    pub fn current() -> Self {
        Self {
            network: network_addresses(),
            pid: std::process::id(),
            platform: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            env_keys: std::env::vars_os().count(),
        }
    }
}
