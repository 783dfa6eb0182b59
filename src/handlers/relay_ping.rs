// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Relay mesh probing. Pings are answered by echoing the packet with
//! the type byte rewritten; pongs feed the relay manager's history for
//! the peer they came from.

use tracing::debug;

use crate::{
    core::packet::Packet,
    models::{
        packet_type::PacketType,
        ping::{RELAY_PING_PACKET_BYTES, read_relay_ping_sequence},
    },
    net::socket::RelaySocket,
    state::State,
};

pub fn relay_ping(
    packet: &mut Packet,
    state: &State,
    socket: &RelaySocket,
    should_handle: bool,
) {
    state.recorder.inbound_ping_rx.add(packet.len);

    if !should_handle {
        debug!("relay in process of shutting down, ignoring relay ping packet");
        return;
    }

    if packet.len != RELAY_PING_PACKET_BYTES {
        debug!("ignoring relay ping, invalid packet size ({})", packet.len);
        return;
    }

    packet.buffer[0] = PacketType::RelayPong as u8;

    state.recorder.inbound_ping_tx.add(packet.len);
    if !socket.send(packet.addr, packet.payload()) {
        debug!("failed to send pong to {}", packet.addr);
    }
}

pub fn relay_pong(packet: &Packet, state: &State, should_handle: bool) {
    state.recorder.pong_rx.add(packet.len);

    if !should_handle {
        debug!("relay in process of shutting down, ignoring relay pong packet");
        return;
    }

    if packet.len != RELAY_PING_PACKET_BYTES {
        debug!("ignoring relay pong, invalid packet size ({})", packet.len);
        return;
    }

    let sequence = read_relay_ping_sequence(packet.payload());
    state
        .relays
        .handle_pong(packet.addr, sequence, state.clock.elapsed_secs());
}
