// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Route admission and the reverse path.
//!
//! A route request carries this relay's token followed by at least the
//! next hop's. Admitting the token lazily creates the session; the
//! token is then stripped and the shortened packet forwarded to the
//! next hop. Route responses ride the session header back towards the
//! client.

use tracing::debug;

use crate::{
    core::{packet::Packet, session::Session},
    crypto::hash::{self, PACKET_HASH_BYTES},
    handlers::forward_with_header,
    models::{
        header::PacketDirection,
        token::{ROUTE_TOKEN_WIRE_BYTES, RouteToken},
    },
    net::socket::RelaySocket,
    state::State,
};

pub fn route_request(
    packet: &mut Packet,
    state: &State,
    socket: &RelaySocket,
    should_handle: bool,
) {
    state.recorder.route_request_rx.add(packet.len);

    if !should_handle {
        debug!("relay in process of shutting down, ignoring route request");
        return;
    }

    const MIN_BYTES: usize = PACKET_HASH_BYTES + 1 + 2 * ROUTE_TOKEN_WIRE_BYTES;
    if packet.len < MIN_BYTES {
        debug!("ignoring route request, bad packet size ({})", packet.len);
        return;
    }

    let token_start = PACKET_HASH_BYTES + 1;
    let token = match RouteToken::read_sealed(
        &packet.buffer[token_start..packet.len],
        &state.keychain.route_token_key,
    ) {
        Ok(token) => token,
        Err(e) => {
            debug!("ignoring route request, could not read route token: {e}");
            return;
        },
    };

    if token.expired(state.router_info.current_timestamp()) {
        debug!(
            session_id = token.session_id,
            expire = token.expire_timestamp,
            "ignoring route request, token expired"
        );
        return;
    }

    let hash = token.hash();
    let exists = state.sessions.get(hash).is_some();
    if exists {
        debug!(session_id = token.session_id, "additional route request for session");
    } else {
        let session = Session::from_route_token(&token, packet.addr);
        state.sessions.set(hash, session);
        debug!(
            session_id = token.session_id,
            session_version = token.session_version,
            "session created"
        );
    }

    // Strip our token and pass the rest down the route.
    packet
        .buffer
        .copy_within(token_start + ROUTE_TOKEN_WIRE_BYTES..packet.len, token_start);
    packet.len -= ROUTE_TOKEN_WIRE_BYTES;
    hash::sign_packet(&mut packet.buffer[..packet.len]);

    state.recorder.route_request_tx.add(packet.len);
    if !socket.send(token.next_addr, packet.payload()) {
        debug!("failed to forward route request to {}", token.next_addr);
    }
}

pub fn route_response(
    packet: &mut Packet,
    state: &State,
    socket: &RelaySocket,
    should_handle: bool,
) {
    state.recorder.route_response_rx.add(packet.len);

    if !should_handle {
        debug!("relay in process of shutting down, ignoring route response");
        return;
    }

    forward_with_header(
        packet,
        state,
        socket,
        PacketDirection::ServerToClient,
        false,
        &state.recorder.route_response_tx,
    );
}
