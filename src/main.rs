// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use rancher_operator::config::Config;
use rancher_operator::constants::workload;
use rancher_operator::kubernetes::KubeIngressProvider;
use rancher_operator::pebble::PebbleClient;
use rancher_operator::reconcilers::run_hook;
use rancher_operator::runtime::JujuRuntime;
use rancher_operator::types::Event;

#[tokio::main]
async fn main() -> Result<()> {
    // Hook output on stderr ends up in the model's debug log
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;

    let event = Event::from_dispatch_path(&config.dispatch_path);
    match &event {
        Some(event) => info!(
            "Handling {:?} for {} in model {}",
            event, config.app_name, config.model_name
        ),
        None => debug!("Nothing observes {}", config.dispatch_path),
    }

    let runtime = JujuRuntime::new(&config);
    let workload = PebbleClient::new(config.pebble_socket(workload::NAME));
    // The model's namespace hosts both the workload and its ingress
    let ingress = KubeIngressProvider::new(&config.model_name, &config.app_name);

    run_hook(event.as_ref(), &runtime, &workload, &ingress).await?;

    Ok(())
}
