// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Session-scoped keepalives, answered locally.
//!
//! Either endpoint of a session may probe its relay: clients MAC the
//! header in the client-to-server direction, servers in the reverse.
//! The reply is the same datagram with the type byte flipped to
//! SessionPong and the family MAC recomputed. Stray pongs (the relay
//! never pings a session itself) are counted and dropped.

use tracing::debug;

use crate::{
    core::packet::Packet,
    crypto::hash::{self, PACKET_HASH_BYTES},
    handlers::admit_with_header,
    models::{header::PacketDirection, packet_type::PacketType},
    net::socket::RelaySocket,
    state::State,
};

pub fn session_ping(
    packet: &mut Packet,
    state: &State,
    socket: &RelaySocket,
    should_handle: bool,
) {
    state.recorder.session_ping_rx.add(packet.len);

    if !should_handle {
        debug!("relay in process of shutting down, ignoring session ping");
        return;
    }

    let admitted = admit_with_header(packet, state, PacketDirection::ClientToServer, false)
        .or_else(|| {
            admit_with_header(packet, state, PacketDirection::ServerToClient, false)
        });
    let Some((header, _)) = admitted else {
        return;
    };

    if let Some(mut session) = state.sessions.get_mut(header.hash()) {
        session.last_ping_time = state.clock.elapsed_secs();
    }

    packet.buffer[PACKET_HASH_BYTES] = PacketType::SessionPong as u8;
    hash::sign_packet(&mut packet.buffer[..packet.len]);

    state.recorder.session_pong_tx.add(packet.len);
    if !socket.send(packet.addr, packet.payload()) {
        debug!("failed to send session pong to {}", packet.addr);
    }
}

pub fn session_pong(packet: &Packet, state: &State) {
    state.recorder.session_pong_rx.add(packet.len);
    debug!("unsolicited session pong from {}", packet.addr);
}
