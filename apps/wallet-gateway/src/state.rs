// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::models::FieldLimits;
use crate::storage::WalletDatabase;

/// Shared handler state, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<WalletDatabase>,
    pub field_limits: FieldLimits,
}

impl AppState {
    pub fn new(db: WalletDatabase) -> Self {
        Self {
            db: Arc::new(db),
            field_limits: FieldLimits::default(),
        }
    }

    pub fn with_field_limits(mut self, field_limits: FieldLimits) -> Self {
        self.field_limits = field_limits;
        self
    }
}
