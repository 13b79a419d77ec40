// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Event handling for the rancher workload.

pub mod rancher;

pub use rancher::{on_fortune_action, RancherReconciler};

use crate::error::Result;
use crate::kubernetes::IngressProvider;
use crate::pebble::WorkloadSupervisor;
use crate::runtime::HostRuntime;
use crate::types::{Event, PersistedState, UnitStatus};
use tracing::{debug, error, info, instrument, warn};

/// Handle one event: read the configuration, initialize persisted state,
/// dispatch, and turn a failure into a blocked status before returning it.
///
/// State is initialized even when no handler observes `event`.
#[instrument(skip(runtime, workload, ingress))]
pub async fn run_hook<R, W, P>(
    event: Option<&Event>,
    runtime: &R,
    workload: &W,
    ingress: &P,
) -> Result<()>
where
    R: HostRuntime,
    W: WorkloadSupervisor,
    P: IngressProvider,
{
    let result = handle(event, runtime, workload, ingress).await;

    if let Err(e) = &result {
        error!("Handling {:?} failed: {}", event, e);
        let blocked = UnitStatus::Blocked(e.to_string());
        if let Err(status_err) = runtime.set_status(&blocked).await {
            warn!("Failed to report blocked status: {}", status_err);
        }
    }

    result
}

async fn handle<R, W, P>(
    event: Option<&Event>,
    runtime: &R,
    workload: &W,
    ingress: &P,
) -> Result<()>
where
    R: HostRuntime,
    W: WorkloadSupervisor,
    P: IngressProvider,
{
    let config = runtime.charm_config().await?;

    let (state, created) = PersistedState::initialize(runtime.load_state().await?, &config);
    if created {
        runtime.save_state(&state).await?;
        info!(
            "Initialized state: https_listen_port={}, add_local={}",
            state.https_listen_port, state.add_local
        );
    }

    let Some(event) = event else {
        debug!("No handler observes this event");
        return Ok(());
    };

    RancherReconciler::new(&state, runtime, workload, ingress)
        .dispatch(event, &config)
        .await
}
