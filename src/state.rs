// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use ring::rand::SystemRandom;

use crate::identity::IdentityLocks;
use crate::minting::Minter;
use crate::storage::{InMemoryUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    /// `None` disables minting.
    pub minter: Option<Arc<dyn Minter>>,
    pub locks: Arc<IdentityLocks>,
    pub rng: SystemRandom,
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            minter: None,
            locks: Arc::new(IdentityLocks::new()),
            rng: SystemRandom::new(),
            cookie_secure: true,
        }
    }

    pub fn with_minter(mut self, minter: Arc<dyn Minter>) -> Self {
        self.minter = Some(minter);
        self
    }

    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryUserStore::new()))
    }
}
