// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The per-worker data-plane loop: receive, classify, handle, send.
//!
//! Each worker is one pinned OS thread owning one socket. Relay pings
//! are emitted from inside the loop (no timers): the relay manager's
//! `last_ping_time` bookkeeping makes sure only one worker pings a
//! given relay per period, whoever checks first.

use std::sync::Arc;

use core_affinity::CoreId;
use tracing::{info, warn};

use crate::{
    core::{
        packet::Packet,
        relay_manager::{MAX_RELAYS, PingData},
    },
    handlers,
    models::ping::{RELAY_PING_PACKET_BYTES, write_relay_ping},
    net::socket::RelaySocket,
    state::State,
};

/// Receive iterations a worker keeps serving after shutdown flips, so
/// in-flight datagrams drain instead of sitting in the kernel queue.
pub const DRAIN_ITERATIONS: u32 = 100;

/// How often one worker asks the relay manager for due pings. Pings
/// are due at [`crate::core::relay_manager::RELAY_PING_TIME`]
/// granularity; checking an order of magnitude faster keeps the
/// schedule tight without taking the manager's write lock on every
/// received packet.
const PING_CHECK_INTERVAL: f64 = 0.01;

pub fn run_worker(index: usize, core: Option<CoreId>, socket: RelaySocket, state: Arc<State>) {
    if let Some(core) = core
        && !core_affinity::set_for_current(core)
    {
        warn!(worker = index, core = core.id, "failed to pin worker thread");
    }

    let mut packet = Packet::default();
    let mut ping_scratch: Vec<PingData> = Vec::with_capacity(MAX_RELAYS);
    let mut drain_left = DRAIN_ITERATIONS;
    let mut last_ping_check = -PING_CHECK_INTERVAL;

    info!(worker = index, "worker started");

    loop {
        let should_handle = !state.shutdown.is_cancelled();
        if !should_handle {
            if drain_left == 0 {
                break;
            }
            drain_left -= 1;
        }

        if should_handle {
            let now = state.clock.elapsed_secs();
            if now - last_ping_check >= PING_CHECK_INTERVAL {
                last_ping_check = now;
                send_relay_pings(&state, &socket, &mut ping_scratch);
            }
        }

        if socket.recv(&mut packet) {
            handlers::handle_packet(&mut packet, &state, &socket, should_handle);
        }
    }

    info!(worker = index, "worker stopped");
}

fn send_relay_pings(state: &State, socket: &RelaySocket, scratch: &mut Vec<PingData>) {
    let now = state.clock.elapsed_secs();
    if state.relays.get_ping_data(now, scratch) == 0 {
        return;
    }
    let mut buf = [0u8; RELAY_PING_PACKET_BYTES];
    for ping in scratch.iter() {
        let len = write_relay_ping(&mut buf, ping.sequence, &state.relay_address);
        state.recorder.outbound_ping_tx.add(len);
        socket.send(ping.address, &buf[..len]);
    }
}
