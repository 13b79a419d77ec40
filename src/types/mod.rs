// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Data types shared by the reconciler and its collaborators.

pub mod action;
pub mod charm_config;
pub mod event;
pub mod ingress;
pub mod layer;
pub mod state;
pub mod status;

pub use action::{ActionParams, ActionResult};
pub use charm_config::CharmConfig;
pub use event::Event;
pub use ingress::IngressFields;
pub use layer::{Layer, Override, Service, Startup};
pub use state::PersistedState;
pub use status::UnitStatus;
