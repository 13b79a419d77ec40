// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Unit status reported to the host runtime
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnitStatus {
    Active,
    Blocked(String),
}

impl UnitStatus {
    /// Status name as understood by `status-set`
    pub fn name(&self) -> &'static str {
        match self {
            UnitStatus::Active => "active",
            UnitStatus::Blocked(_) => "blocked",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            UnitStatus::Active => "",
            UnitStatus::Blocked(message) => message,
        }
    }
}
