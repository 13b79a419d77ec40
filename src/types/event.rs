// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{events, workload};

/// Events the operator reacts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The workload container's Pebble API is reachable
    WorkloadReady { container: String },
    ConfigChanged,
    /// A peer changed its data on the cluster-control relation
    ClusterRelationChanged,
    FortuneAction,
}

impl Event {
    /// Map a dispatch path such as `hooks/config-changed` or `actions/fortune`
    /// to an event. Returns `None` for hooks and actions nothing observes.
    pub fn from_dispatch_path(path: &str) -> Option<Self> {
        let (kind, name) = path.trim_matches('/').split_once('/')?;

        match kind {
            "hooks" => Self::from_hook_name(name),
            "actions" if name == events::FORTUNE_ACTION => Some(Event::FortuneAction),
            _ => None,
        }
    }

    fn from_hook_name(name: &str) -> Option<Self> {
        if name == events::CONFIG_CHANGED {
            return Some(Event::ConfigChanged);
        }
        if name == events::CLUSTER_RELATION_CHANGED {
            return Some(Event::ClusterRelationChanged);
        }

        // Only the rancher container is managed
        name.strip_suffix(events::PEBBLE_READY_SUFFIX)
            .filter(|container| *container == workload::NAME)
            .map(|container| Event::WorkloadReady {
                container: container.to_string(),
            })
    }
}
