// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Ingress management through server-side apply

use crate::constants::OPERATOR_NAME;
use crate::error::Result;
use crate::kubernetes::{IngressCollaborator, IngressProvider};
use crate::types::{CharmConfig, IngressFields};
use async_trait::async_trait;
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, ServiceBackendPort,
};
use kube::{
    api::{ObjectMeta, Patch, PatchParams},
    Api, Client,
};
use std::collections::BTreeMap;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, instrument};

/// Connects to the cluster the first time an event needs the ingress
pub struct KubeIngressProvider {
    namespace: String,
    app_name: String,
    client: OnceCell<Client>,
}

impl KubeIngressProvider {
    pub fn new(namespace: &str, app_name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            app_name: app_name.to_string(),
            client: OnceCell::new(),
        }
    }

    #[cfg(test)]
    pub fn with_client(client: Client, namespace: &str, app_name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            app_name: app_name.to_string(),
            client: OnceCell::new_with(Some(client)),
        }
    }
}

#[async_trait]
impl IngressProvider for KubeIngressProvider {
    type Ingress = IngressRequires;

    async fn connect(&self, config: &CharmConfig) -> Result<IngressRequires> {
        let client = self.client.get_or_try_init(Client::try_default).await?;
        debug!("Connected to Kubernetes for namespace {}", self.namespace);

        Ok(IngressRequires::new(
            client.clone(),
            &self.namespace,
            IngressFields::initial(config, &self.app_name),
        ))
    }
}

struct IngressState {
    desired: IngressFields,
    /// Fields this process last wrote or found already in place
    applied: Option<IngressFields>,
}

/// Keeps a `networking.k8s.io/v1` Ingress routing to the workload service
pub struct IngressRequires {
    api: Api<Ingress>,
    namespace: String,
    /// Fixed at construction so a later `service-name` update reroutes
    /// the same Ingress
    name: String,
    state: Mutex<IngressState>,
}

impl IngressRequires {
    pub fn new(client: Client, namespace: &str, initial: IngressFields) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
            namespace: namespace.to_string(),
            name: ingress_name(&initial.service_name),
            state: Mutex::new(IngressState {
                desired: initial,
                applied: None,
            }),
        }
    }

    #[cfg(test)]
    pub async fn desired(&self) -> IngressFields {
        self.state.lock().await.desired.clone()
    }

    /// Whether the live Ingress already routes as `fields` describes
    async fn is_in_place(&self, fields: &IngressFields) -> Result<bool> {
        match self.api.get(&self.name).await {
            Ok(existing) => Ok(fields_of(&existing).as_ref() == Some(fields)),
            Err(kube::Error::Api(err)) if err.code == 404 => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, desired), fields(namespace = %self.namespace, ingress = %self.name))]
    async fn apply(&self, desired: &IngressFields) -> Result<()> {
        let ingress = build_ingress(&self.name, desired, &self.namespace);
        let pp = PatchParams::apply(OPERATOR_NAME).force();
        self.api
            .patch(&self.name, &pp, &Patch::Apply(&ingress))
            .await?;

        info!(
            "Applied ingress routing '{}' to {}:{}",
            desired.service_hostname, desired.service_name, desired.service_port
        );
        Ok(())
    }
}

#[async_trait]
impl IngressCollaborator for IngressRequires {
    async fn update_config(&self, updates: &BTreeMap<String, String>) -> Result<()> {
        let mut state = self.state.lock().await;
        let desired = state.desired.merged(updates)?;
        state.desired = desired.clone();

        if state.applied.as_ref() == Some(&desired) {
            debug!("Ingress fields unchanged, nothing to update");
            return Ok(());
        }

        if self.is_in_place(&desired).await? {
            debug!("Ingress {} already up to date", self.name);
        } else {
            self.apply(&desired).await?;
        }

        state.applied = Some(desired);
        Ok(())
    }
}

fn ingress_name(app_name: &str) -> String {
    format!("{}-ingress", app_name)
}

/// Build the Ingress routing `service-hostname` to `service-name:service-port`
pub fn build_ingress(name: &str, fields: &IngressFields, namespace: &str) -> Ingress {
    let host = Some(fields.service_hostname.clone()).filter(|h| !h.is_empty());

    Ingress {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(BTreeMap::from([(
                "app.kubernetes.io/managed-by".to_string(),
                OPERATOR_NAME.to_string(),
            )])),
            ..Default::default()
        },
        spec: Some(IngressSpec {
            rules: Some(vec![IngressRule {
                host,
                http: Some(HTTPIngressRuleValue {
                    paths: vec![HTTPIngressPath {
                        path: Some("/".to_string()),
                        path_type: "Prefix".to_string(),
                        backend: IngressBackend {
                            service: Some(IngressServiceBackend {
                                name: fields.service_name.clone(),
                                port: Some(ServiceBackendPort {
                                    number: Some(fields.service_port),
                                    ..Default::default()
                                }),
                            }),
                            ..Default::default()
                        },
                    }],
                }),
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Read back the fields an Ingress routes by, from its first rule and path
pub fn fields_of(ingress: &Ingress) -> Option<IngressFields> {
    let rule = ingress.spec.as_ref()?.rules.as_ref()?.first()?;
    let service = rule.http.as_ref()?.paths.first()?.backend.service.as_ref()?;

    Some(IngressFields {
        service_hostname: rule.host.clone().unwrap_or_default(),
        service_name: service.name.clone(),
        service_port: service.port.as_ref()?.number?,
    })
}
