// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! One handler per packet family, plus the classify step that picks
//! between them.
//!
//! A handler takes the packet, the shared state, the worker's socket
//! and the drain flag. When the relay is draining every handler logs
//! and returns without touching state. Nothing in here returns errors:
//! malformed or unwanted traffic is dropped and counted.

pub mod continuation;
pub mod data;
pub mod near_ping;
pub mod relay_ping;
pub mod route;
pub mod session_ping;

use tracing::debug;

use crate::{
    core::{
        packet::{MAX_PACKET_BYTES, Packet},
        throughput::ThroughputStats,
    },
    crypto::hash::{self, PACKET_HASH_BYTES},
    models::{
        header::{PacketDirection, SESSION_HEADER_BYTES, SessionHeader},
        packet_type::PacketType,
    },
    net::{address::Address, socket::RelaySocket},
    state::State,
};

/// Classify one received datagram and hand it to its handler.
///
/// Anything too short to carry a MAC is a runt and counts into
/// `unknown_rx` before classification. A valid 8-byte MAC marks the
/// signed framing (type byte behind the MAC) and wins outright; a
/// forged collision is a 2^-64 event. Only packets failing the MAC
/// check are considered for the unsigned vocabulary at byte 0.
/// Unknown or unverifiable packets count into `unknown_rx` too.
pub fn handle_packet(
    packet: &mut Packet,
    state: &State,
    socket: &RelaySocket,
    should_handle: bool,
) {
    if packet.len == 0 || packet.len > MAX_PACKET_BYTES {
        return;
    }

    if packet.len <= PACKET_HASH_BYTES {
        state.recorder.unknown_rx.add(packet.len);
        return;
    }

    if !hash::is_signed_packet(packet.payload()) {
        if let Some(kind) = PacketType::unsigned_tag(packet.buffer[0]) {
            match kind {
                PacketType::RelayPing => {
                    relay_ping::relay_ping(packet, state, socket, should_handle)
                },
                PacketType::RelayPong => {
                    relay_ping::relay_pong(packet, state, should_handle)
                },
                PacketType::NearPing => {
                    near_ping::near_ping(packet, state, socket, should_handle, false)
                },
                _ => state.recorder.unknown_rx.add(packet.len),
            }
        } else {
            state.recorder.unknown_rx.add(packet.len);
        }
        return;
    }

    let Some(kind) = PacketType::signed_tag(packet.buffer[PACKET_HASH_BYTES]) else {
        state.recorder.unknown_rx.add(packet.len);
        return;
    };

    match kind {
        PacketType::RouteRequest => {
            route::route_request(packet, state, socket, should_handle)
        },
        PacketType::RouteResponse => {
            route::route_response(packet, state, socket, should_handle)
        },
        PacketType::ClientToServer => {
            data::client_to_server(packet, state, socket, should_handle)
        },
        PacketType::ServerToClient => {
            data::server_to_client(packet, state, socket, should_handle)
        },
        PacketType::SessionPing => {
            session_ping::session_ping(packet, state, socket, should_handle)
        },
        PacketType::SessionPong => session_ping::session_pong(packet, state),
        PacketType::ContinueRequest => {
            continuation::continue_request(packet, state, socket, should_handle)
        },
        PacketType::ContinueResponse => {
            continuation::continue_response(packet, state, socket, should_handle)
        },
        PacketType::NearPing => {
            near_ping::near_ping(packet, state, socket, should_handle, true)
        },
        PacketType::RelayPing | PacketType::RelayPong | PacketType::NearPong => {
            state.recorder.unknown_rx.add(packet.len)
        },
    }
}

/// Header + session admission shared by forwarders and the local
/// session-ping responder: look the session up, authenticate the
/// header for `direction`, enforce replay (and optionally the
/// bandwidth envelope). Returns the parsed header and the forward
/// destination for `direction`; `None` means the packet was dropped.
pub(crate) fn admit_with_header(
    packet: &Packet,
    state: &State,
    direction: PacketDirection,
    enforce_envelope: bool,
) -> Option<(SessionHeader, Address)> {
    let base = PACKET_HASH_BYTES;
    if packet.len < base + SESSION_HEADER_BYTES {
        debug!("ignoring session packet, bad packet size ({})", packet.len);
        return None;
    }
    let header_bytes = &packet.buffer[base..packet.len];
    let header = match SessionHeader::read(header_bytes) {
        Ok(header) => header,
        Err(e) => {
            debug!("ignoring session packet: {e}");
            return None;
        },
    };

    let mut session = state.sessions.get_mut(header.hash())?;
    if session.session_id != header.session_id
        || session.session_version != header.session_version
    {
        debug!(session_id = header.session_id, "session key collision, dropping");
        return None;
    }
    if !SessionHeader::verify(header_bytes, direction, &session.private_key) {
        debug!(session_id = header.session_id, "bad session header mac");
        return None;
    }

    let dest = match direction {
        PacketDirection::ClientToServer => {
            if !session.client_to_server_replay.accept(header.sequence) {
                debug!(sequence = header.sequence, "replayed packet dropped");
                return None;
            }
            if header.sequence > session.client_to_server_sequence {
                session.client_to_server_sequence = header.sequence;
            }
            if enforce_envelope {
                let kbps = session.kbps_up;
                let now = state.clock.elapsed_secs();
                if !session.client_to_server_envelope.allow(packet.len, kbps, now) {
                    debug!(session_id = header.session_id, "upstream envelope exceeded");
                    return None;
                }
            }
            session.next_addr
        },
        PacketDirection::ServerToClient => {
            if !session.server_to_client_replay.accept(header.sequence) {
                debug!(sequence = header.sequence, "replayed packet dropped");
                return None;
            }
            if header.sequence > session.server_to_client_sequence {
                session.server_to_client_sequence = header.sequence;
            }
            if enforce_envelope {
                let kbps = session.kbps_down;
                let now = state.clock.elapsed_secs();
                if !session.server_to_client_envelope.allow(packet.len, kbps, now) {
                    debug!(session_id = header.session_id, "downstream envelope exceeded");
                    return None;
                }
            }
            session.prev_addr
        },
    };
    Some((header, dest))
}

/// Forward a session-header packet unchanged to its destination.
pub(crate) fn forward_with_header(
    packet: &Packet,
    state: &State,
    socket: &RelaySocket,
    direction: PacketDirection,
    enforce_envelope: bool,
    tx: &ThroughputStats,
) {
    let Some((_, dest)) =
        admit_with_header(packet, state, direction, enforce_envelope)
    else {
        return;
    };
    tx.add(packet.len);
    if !socket.send(dest, packet.payload()) {
        debug!("failed to forward packet to {dest}");
    }
}
