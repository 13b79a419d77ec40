// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Workload layer and service definition
pub mod workload {
    /// Name of the container, the Pebble layer label and the service
    pub const NAME: &str = "rancher";
    pub const ENTRYPOINT: &str = "entrypoint.sh";
    pub const LAYER_SUMMARY: &str = "rancher layer";
    pub const LAYER_DESCRIPTION: &str = "pebble config layer for rancher";

    /// Environment variable names passed to the rancher service
    pub mod env {
        pub const NAMESPACE: &str = "CATTLE_NAMESPACE";
        pub const PEER_SERVICE: &str = "CATTLE_PEER_SERVICE";
        pub const TINI_SUBREAPER: &str = "TINI_SUBREAPER";
    }
}

/// Keys accepted by the ingress collaborator
pub mod ingress {
    pub const SERVICE_HOSTNAME: &str = "service-hostname";
    pub const SERVICE_NAME: &str = "service-name";
    pub const SERVICE_PORT: &str = "service-port";
    /// Port the ingress routes to, fixed when the collaborator is built
    pub const DEFAULT_SERVICE_PORT: i32 = 80;
}

/// Hook and action names the operator observes
pub mod events {
    pub const CONFIG_CHANGED: &str = "config-changed";
    pub const PEBBLE_READY_SUFFIX: &str = "-pebble-ready";
    pub const CLUSTER_RELATION_CHANGED: &str = "cluster-control-relation-changed";
    pub const FORTUNE_ACTION: &str = "fortune";
}

pub const FORTUNE: &str = "A bug in the code is worth two in the documentation.";

/// The operator name used for server-side apply
pub const OPERATOR_NAME: &str = "rancher-operator";
