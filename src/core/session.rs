// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::{
    core::{envelope::EnvelopeMeter, replay::ReplayProtection},
    models::token::RouteToken,
    net::address::Address,
};

/// Key a session is filed under: the low byte of the id is replaced by
/// the session version, so a re-routed session (same id, bumped
/// version) gets a fresh slot.
#[inline]
pub fn session_hash(session_id: u64, session_version: u8) -> u64 {
    (session_id & !0xFF) | u64::from(session_version)
}

/// Per-player state for one admitted route through this relay.
#[derive(Debug, Default, Clone)]
pub struct Session {
    pub session_id: u64,
    pub session_version: u8,
    /// Backend-clock second after which the purge sweep may drop this
    /// session.
    pub expire_timestamp: u64,
    pub kbps_up: u32,
    pub kbps_down: u32,
    /// Where client-bound traffic goes; learned from the route request
    /// sender.
    pub prev_addr: Address,
    /// Where server-bound traffic goes; carried in the route token.
    pub next_addr: Address,
    pub private_key: [u8; 32],
    /// Highest sequence accepted per direction.
    pub client_to_server_sequence: u64,
    pub server_to_client_sequence: u64,
    pub client_to_server_replay: ReplayProtection,
    pub server_to_client_replay: ReplayProtection,
    pub client_to_server_envelope: EnvelopeMeter,
    pub server_to_client_envelope: EnvelopeMeter,
    /// Relay-clock time of the last session ping seen; negative until
    /// the first one.
    pub last_ping_time: f64,
}

impl Session {
    pub fn from_route_token(token: &RouteToken, prev_addr: Address) -> Self {
        Self {
            session_id: token.session_id,
            session_version: token.session_version,
            expire_timestamp: token.expire_timestamp,
            kbps_up: token.kbps_up,
            kbps_down: token.kbps_down,
            prev_addr,
            next_addr: token.next_addr,
            private_key: token.private_key,
            last_ping_time: -1.0,
            ..Self::default()
        }
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        session_hash(self.session_id, self.session_version)
    }
}
