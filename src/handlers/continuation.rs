// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Session lifetime extension.
//!
//! A continue request carries one sealed continue token per hop, same
//! envelope rules as route tokens. It only ever raises an existing
//! session's expiry; there is no lazy creation on this path. The
//! response direction mirrors route responses.

use tracing::debug;

use crate::{
    core::packet::Packet,
    crypto::hash::{self, PACKET_HASH_BYTES},
    handlers::forward_with_header,
    models::{
        header::PacketDirection,
        token::{CONTINUE_TOKEN_WIRE_BYTES, ContinueToken},
    },
    net::{address::Address, socket::RelaySocket},
    state::State,
};

pub fn continue_request(
    packet: &mut Packet,
    state: &State,
    socket: &RelaySocket,
    should_handle: bool,
) {
    state.recorder.continue_request_rx.add(packet.len);

    if !should_handle {
        debug!("relay in process of shutting down, ignoring continue request");
        return;
    }

    const MIN_BYTES: usize = PACKET_HASH_BYTES + 1 + 2 * CONTINUE_TOKEN_WIRE_BYTES;
    if packet.len < MIN_BYTES {
        debug!("ignoring continue request, bad packet size ({})", packet.len);
        return;
    }

    let token_start = PACKET_HASH_BYTES + 1;
    let token = match ContinueToken::read_sealed(
        &packet.buffer[token_start..packet.len],
        &state.keychain.continue_token_key,
    ) {
        Ok(token) => token,
        Err(e) => {
            debug!("ignoring continue request, could not read continue token: {e}");
            return;
        },
    };

    if token.expired(state.router_info.current_timestamp()) {
        debug!(
            session_id = token.session_id,
            "ignoring continue request, token expired"
        );
        return;
    }

    let next_addr: Address = {
        let Some(mut session) = state.sessions.get_mut(token.hash()) else {
            debug!(
                session_id = token.session_id,
                "ignoring continue request for unknown session"
            );
            return;
        };
        if session.session_id != token.session_id
            || session.session_version != token.session_version
        {
            debug!(session_id = token.session_id, "session key collision, dropping");
            return;
        }
        if token.expire_timestamp > session.expire_timestamp {
            session.expire_timestamp = token.expire_timestamp;
            debug!(
                session_id = token.session_id,
                expire = token.expire_timestamp,
                "session lifetime extended"
            );
        }
        session.next_addr
    };

    packet
        .buffer
        .copy_within(token_start + CONTINUE_TOKEN_WIRE_BYTES..packet.len, token_start);
    packet.len -= CONTINUE_TOKEN_WIRE_BYTES;
    hash::sign_packet(&mut packet.buffer[..packet.len]);

    state.recorder.continue_request_tx.add(packet.len);
    if !socket.send(next_addr, packet.payload()) {
        debug!("failed to forward continue request to {next_addr}");
    }
}

pub fn continue_response(
    packet: &mut Packet,
    state: &State,
    socket: &RelaySocket,
    should_handle: bool,
) {
    state.recorder.continue_response_rx.add(packet.len);

    if !should_handle {
        debug!("relay in process of shutting down, ignoring continue response");
        return;
    }

    forward_with_header(
        packet,
        state,
        socket,
        PacketDirection::ServerToClient,
        false,
        &state.recorder.continue_response_tx,
    );
}
