// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        clock::Clock, relay_manager::RelayManager, router_info::RouterInfo,
        session_map::SessionMap, throughput::ThroughputRecorder,
    },
    crypto::keychain::Keychain,
    net::address::Address,
};

/// Everything workers, handlers and the control loop share. One
/// instance per process, behind an `Arc`.
pub struct State {
    pub keychain: Keychain,
    pub sessions: SessionMap,
    pub relays: RelayManager,
    pub router_info: RouterInfo,
    pub recorder: ThroughputRecorder,
    pub clock: Clock,
    /// Flipped on SIGINT/SIGTERM; workers observe it synchronously.
    pub shutdown: CancellationToken,
    /// The external address this relay is reachable on.
    pub relay_address: Address,
}

impl State {
    pub fn new(keychain: Keychain, relay_address: Address) -> Self {
        Self {
            keychain,
            sessions: SessionMap::new(),
            relays: RelayManager::new(),
            router_info: RouterInfo::new(),
            recorder: ThroughputRecorder::new(),
            clock: Clock::new(),
            shutdown: CancellationToken::new(),
            relay_address,
        }
    }
}
