// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Dynamic set of peer relays this relay probes.
//!
//! The backend pushes a fresh `(id, address)` list every control cycle;
//! relays that survive an update keep their ping history, new ids start
//! empty, missing ids are dropped. Workers emit pings for relays whose
//! `last_ping_time` is older than [`RELAY_PING_TIME`].

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::{
    core::{ping_history::PingHistory, route_stats::RouteStats},
    net::address::Address,
};

pub const MAX_RELAYS: usize = 1024;

/// Seconds between pings to one relay.
pub const RELAY_PING_TIME: f64 = 0.1;

/// Stats window handed to the backend each cycle.
pub const RELAY_STATS_WINDOW: f64 = 10.0;

/// Pings younger than this do not count as lost.
pub const RELAY_PING_SAFETY: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayPingInfo {
    pub id: u64,
    pub address: Address,
}

/// One due ping: the sequence the history assigned and where to send it.
#[derive(Debug, Clone, Copy)]
pub struct PingData {
    pub sequence: u64,
    pub address: Address,
}

#[derive(Debug, Clone, Copy)]
pub struct RelayStatsEntry {
    pub id: u64,
    pub stats: RouteStats,
}

struct Relay {
    id: u64,
    address: Address,
    last_ping_time: f64,
    history: Box<PingHistory>,
}

impl Relay {
    fn new(info: &RelayPingInfo) -> Self {
        Self {
            id: info.id,
            address: info.address,
            // due immediately
            last_ping_time: -RELAY_PING_TIME,
            history: Box::new(PingHistory::new()),
        }
    }
}

#[derive(Default)]
pub struct RelayManager {
    relays: RwLock<Vec<Relay>>,
}

impl RelayManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.relays.read().len()
    }

    /// Replace the relay set, carrying ping history over for ids that
    /// appear in both the old and the new list. The new list's order is
    /// preserved; readers see either the old set or the new one.
    pub fn update(&self, infos: &[RelayPingInfo]) {
        let mut relays = self.relays.write();
        let old = std::mem::take(&mut *relays);
        let mut previous: HashMap<u64, Relay> =
            old.into_iter().map(|relay| (relay.id, relay)).collect();
        for info in infos.iter().take(MAX_RELAYS) {
            match previous.remove(&info.id) {
                Some(mut survivor) => {
                    survivor.address = info.address;
                    relays.push(survivor);
                },
                None => relays.push(Relay::new(info)),
            }
        }
    }

    /// Collect a ping for every relay that is due at `now`, stamping
    /// the history and `last_ping_time` as it goes. `out` is caller
    /// scratch; it is cleared first.
    pub fn get_ping_data(&self, now: f64, out: &mut Vec<PingData>) -> usize {
        out.clear();
        let mut relays = self.relays.write();
        for relay in relays.iter_mut() {
            if now - relay.last_ping_time >= RELAY_PING_TIME {
                relay.last_ping_time = now;
                let sequence = relay.history.ping_sent(now);
                out.push(PingData { sequence, address: relay.address });
            }
        }
        out.len()
    }

    /// Match a pong from `from` against the relay with that address.
    pub fn handle_pong(&self, from: Address, sequence: u64, now: f64) {
        let mut relays = self.relays.write();
        if let Some(relay) = relays.iter_mut().find(|relay| relay.address == from) {
            relay.history.pong_received(sequence, now);
        }
    }

    /// Ids and route stats over the trailing window, in relay-set
    /// order.
    pub fn get_stats(&self, now: f64) -> Vec<RelayStatsEntry> {
        let relays = self.relays.read();
        relays
            .iter()
            .map(|relay| RelayStatsEntry {
                id: relay.id,
                stats: relay.history.route_stats(
                    now - RELAY_STATS_WINDOW,
                    now,
                    RELAY_PING_SAFETY,
                ),
            })
            .collect()
    }
}
