// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Rancher reconciler - maps each event to its handler.

use crate::constants::{ingress::SERVICE_HOSTNAME, workload, FORTUNE};
use crate::error::Result;
use crate::kubernetes::{IngressCollaborator, IngressProvider};
use crate::pebble::WorkloadSupervisor;
use crate::runtime::HostRuntime;
use crate::types::{
    ActionParams, ActionResult, CharmConfig, Event, Layer, PersistedState, UnitStatus,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

pub struct RancherReconciler<'a, R, W, P> {
    state: &'a PersistedState,
    runtime: &'a R,
    workload: &'a W,
    /// Only connected by handlers that update the ingress
    ingress: &'a P,
}

impl<'a, R, W, P> RancherReconciler<'a, R, W, P>
where
    R: HostRuntime,
    W: WorkloadSupervisor,
    P: IngressProvider,
{
    pub fn new(
        state: &'a PersistedState,
        runtime: &'a R,
        workload: &'a W,
        ingress: &'a P,
    ) -> Self {
        Self {
            state,
            runtime,
            workload,
            ingress,
        }
    }

    /// State captured when the unit first initialized
    pub fn state(&self) -> &PersistedState {
        self.state
    }

    pub async fn dispatch(&self, event: &Event, config: &CharmConfig) -> Result<()> {
        debug!("Dispatching {:?}", event);

        match event {
            Event::WorkloadReady { container } => {
                debug!("Container '{}' is ready", container);
                self.on_workload_ready(config).await
            }
            Event::ConfigChanged => self.on_config_changed(config).await,
            Event::ClusterRelationChanged => {
                self.on_cluster_relation_changed();
                Ok(())
            }
            Event::FortuneAction => {
                let params = self.runtime.action_params().await?;
                let result = on_fortune_action(&params);
                self.runtime.respond(&result).await
            }
        }
    }

    /// Replace the rancher service definition and make sure it runs
    #[instrument(
        skip_all,
        fields(port = config.https_listen_port, add_local = config.add_local)
    )]
    pub async fn on_workload_ready(&self, config: &CharmConfig) -> Result<()> {
        let layer = Layer::rancher(config, self.runtime.model_name());

        self.workload.add_layer(workload::NAME, &layer, true).await?;
        self.workload.autostart().await?;

        self.runtime.set_status(&UnitStatus::Active).await?;
        info!("Rancher workload configured");
        Ok(())
    }

    /// Push the external hostname to the ingress.
    ///
    /// Only the hostname is reconfigured here. The listen port and add-local
    /// flag reach the workload on the next workload-ready event.
    #[instrument(skip_all, fields(hostname = %config.external_hostname))]
    pub async fn on_config_changed(&self, config: &CharmConfig) -> Result<()> {
        let fields = BTreeMap::from([(
            SERVICE_HOSTNAME.to_string(),
            config.external_hostname.clone(),
        )]);
        let ingress = self.ingress.connect(config).await?;
        ingress.update_config(&fields).await
    }

    /// Peer discovery over the cluster-control relation is not implemented yet
    pub fn on_cluster_relation_changed(&self) {
        debug!("Ignoring cluster-control relation change");
    }
}

pub fn on_fortune_action(params: &ActionParams) -> ActionResult {
    match params.failure_message() {
        Some(message) => ActionResult::Failed {
            message: message.to_string(),
        },
        None => ActionResult::Succeeded(BTreeMap::from([(
            "fortune".to_string(),
            FORTUNE.to_string(),
        )])),
    }
}
