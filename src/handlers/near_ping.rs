// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Client-sourced latency probes aimed at this relay.
//!
//! Near pings come in a MAC'd and a direct form. Either way the reply
//! drops the 16 bytes of client padding (which exists so the probe is
//! no amplification vector), flips the type and goes straight back.

use tracing::debug;

use crate::{
    core::packet::Packet,
    crypto::hash::{self, PACKET_HASH_BYTES},
    models::{packet_type::PacketType, ping::NEAR_PAD_BYTES},
    net::socket::RelaySocket,
    state::State,
};

pub fn near_ping(
    packet: &mut Packet,
    state: &State,
    socket: &RelaySocket,
    should_handle: bool,
    signed: bool,
) {
    state.recorder.near_ping_rx.add(packet.len);

    if !should_handle {
        debug!("relay in process of shutting down, ignoring near ping");
        return;
    }

    let prefix = if signed { PACKET_HASH_BYTES } else { 0 };
    if packet.len < prefix + 1 + NEAR_PAD_BYTES {
        debug!("ignoring near ping, invalid packet size ({})", packet.len);
        return;
    }

    packet.len -= NEAR_PAD_BYTES;
    packet.buffer[prefix] = PacketType::NearPong as u8;
    if signed {
        hash::sign_packet(&mut packet.buffer[..packet.len]);
    }

    state.recorder.near_ping_tx.add(packet.len);
    if !socket.send(packet.addr, packet.payload()) {
        debug!("failed to send near pong to {}", packet.addr);
    }
}
