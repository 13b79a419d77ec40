// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use serde::Deserialize;
use std::collections::BTreeMap;

/// Parameters of the `fortune` action, as reported by `action-get --format=json`
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionParams {
    #[serde(default)]
    pub fail: Option<String>,
}

impl ActionParams {
    /// The requested failure message, if one was given and is non-empty
    pub fn failure_message(&self) -> Option<&str> {
        self.fail.as_deref().filter(|m| !m.is_empty())
    }
}

/// Outcome of an action, either a failure message or a result payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionResult {
    Failed { message: String },
    Succeeded(BTreeMap<String, String>),
}
