// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The two payload directions. Both forward the datagram untouched;
//! the session header stays in place for the next hop, so the family
//! MAC does not need recomputing.

use tracing::debug;

use crate::{
    core::packet::Packet, handlers::forward_with_header,
    models::header::PacketDirection, net::socket::RelaySocket, state::State,
};

pub fn client_to_server(
    packet: &mut Packet,
    state: &State,
    socket: &RelaySocket,
    should_handle: bool,
) {
    state.recorder.client_to_server_rx.add(packet.len);

    if !should_handle {
        debug!("relay in process of shutting down, ignoring client to server packet");
        return;
    }

    forward_with_header(
        packet,
        state,
        socket,
        PacketDirection::ClientToServer,
        true,
        &state.recorder.client_to_server_tx,
    );
}

pub fn server_to_client(
    packet: &mut Packet,
    state: &State,
    socket: &RelaySocket,
    should_handle: bool,
) {
    state.recorder.server_to_client_rx.add(packet.len);

    if !should_handle {
        debug!("relay in process of shutting down, ignoring server to client packet");
        return;
    }

    forward_with_header(
        packet,
        state,
        socket,
        PacketDirection::ServerToClient,
        true,
        &state.recorder.server_to_client_tx,
    );
}
