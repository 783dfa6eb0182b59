// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Shared scaffolding for the loopback handler tests: fixed key
//! material for both ends of the token box, real UDP sockets on
//! 127.0.0.1 and packet builders for every wire shape the handlers
//! consume.

use std::{sync::Arc, time::Duration};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use ed25519_dalek::SigningKey;
use overlay_relay_rs::{
    core::{packet::Packet, session::Session},
    crypto::{
        hash::{self, PACKET_HASH_BYTES},
        keychain::{CONTINUE_TOKEN_INFO, Keychain, ROUTE_TOKEN_INFO},
        seal,
    },
    models::{
        header::{PacketDirection, SESSION_HEADER_BYTES, SessionHeader},
        packet_type::PacketType,
        token::{
            CONTINUE_TOKEN_WIRE_BYTES, ContinueToken, ROUTE_TOKEN_WIRE_BYTES,
            RouteToken,
        },
    },
    net::{
        address::Address,
        socket::{RelaySocket, SocketMode},
    },
    state::State,
};
use x25519_dalek::{PublicKey, StaticSecret};

pub const BACKEND_BOX_SECRET: [u8; 32] = [7u8; 32];
pub const RELAY_SECRET: [u8; 32] = [9u8; 32];
pub const BACKEND_SIGN_SECRET: [u8; 32] = [11u8; 32];

pub const SESSION_KEY: [u8; 32] = [0xAB; 32];

pub fn test_keychain() -> Keychain {
    let relay_secret = StaticSecret::from(RELAY_SECRET);
    let relay_public = PublicKey::from(&relay_secret);
    let backend_box = StaticSecret::from(BACKEND_BOX_SECRET);
    let signing = SigningKey::from_bytes(&BACKEND_SIGN_SECRET);

    let mut router = [0u8; 64];
    router[..32].copy_from_slice(signing.verifying_key().as_bytes());
    router[32..].copy_from_slice(PublicKey::from(&backend_box).as_bytes());

    Keychain::parse(
        &STANDARD.encode(relay_public.as_bytes()),
        &STANDARD.encode(RELAY_SECRET),
        &STANDARD.encode(router),
    )
    .expect("test keychain")
}

pub fn test_state() -> Arc<State> {
    Arc::new(State::new(
        test_keychain(),
        "127.0.0.1:40000".parse().expect("relay address"),
    ))
}

/// The key the backend uses to seal route tokens for this relay.
pub fn backend_route_token_key() -> [u8; 32] {
    let backend = StaticSecret::from(BACKEND_BOX_SECRET);
    let relay_public = PublicKey::from(&StaticSecret::from(RELAY_SECRET));
    seal::derive_box_key(&backend, &relay_public, ROUTE_TOKEN_INFO)
}

pub fn backend_continue_token_key() -> [u8; 32] {
    let backend = StaticSecret::from(BACKEND_BOX_SECRET);
    let relay_public = PublicKey::from(&StaticSecret::from(RELAY_SECRET));
    seal::derive_box_key(&backend, &relay_public, CONTINUE_TOKEN_INFO)
}

pub fn bind_loopback() -> RelaySocket {
    RelaySocket::bind(
        "127.0.0.1:0".parse().expect("loopback"),
        SocketMode::Timeout(Duration::from_millis(100)),
        64 * 1024,
        64 * 1024,
    )
    .expect("bind loopback socket")
}

/// Receive with a few retries so a slow scheduler cannot flake the
/// test; `None` means nothing arrived.
pub fn recv_packet(socket: &RelaySocket) -> Option<Packet> {
    let mut packet = Packet::default();
    for _ in 0..20 {
        if socket.recv(&mut packet) {
            return Some(packet);
        }
    }
    None
}

pub fn client_addr() -> Address {
    "127.0.0.1:55555".parse().expect("client addr")
}

/// A session as a route request would have created it, with an
/// uncapped envelope unless the test says otherwise.
pub fn make_session(
    session_id: u64,
    session_version: u8,
    prev_addr: Address,
    next_addr: Address,
) -> Session {
    Session {
        session_id,
        session_version,
        expire_timestamp: 1_000_000,
        prev_addr,
        next_addr,
        private_key: SESSION_KEY,
        last_ping_time: -1.0,
        ..Session::default()
    }
}

/// Build a signed session-header packet with `payload` trailing bytes.
pub fn session_packet(
    header: &SessionHeader,
    direction: PacketDirection,
    payload: usize,
) -> Packet {
    let mut packet = Packet::default();
    packet.len = PACKET_HASH_BYTES + SESSION_HEADER_BYTES + payload;
    packet.addr = client_addr();
    header
        .write(&mut packet.buffer[PACKET_HASH_BYTES..], direction, &SESSION_KEY)
        .expect("write header");
    for i in PACKET_HASH_BYTES + SESSION_HEADER_BYTES..packet.len {
        packet.buffer[i] = i as u8;
    }
    hash::sign_packet(&mut packet.buffer[..packet.len]);
    packet
}

/// Build a signed route request: our sealed token, one opaque token
/// for the next hop, then `payload` bytes.
pub fn route_request_packet(token: &RouteToken, payload: usize) -> Packet {
    let mut packet = Packet::default();
    packet.addr = client_addr();
    let token_start = PACKET_HASH_BYTES + 1;
    packet.len = token_start + 2 * ROUTE_TOKEN_WIRE_BYTES + payload;
    packet.buffer[PACKET_HASH_BYTES] = PacketType::RouteRequest as u8;
    token
        .write_sealed(
            &mut packet.buffer[token_start..token_start + ROUTE_TOKEN_WIRE_BYTES],
            &backend_route_token_key(),
        )
        .expect("seal route token");
    // the next hop's token is opaque to us
    for i in token_start + ROUTE_TOKEN_WIRE_BYTES..packet.len {
        packet.buffer[i] = 0xCC;
    }
    hash::sign_packet(&mut packet.buffer[..packet.len]);
    packet
}

pub fn continue_request_packet(token: &ContinueToken, payload: usize) -> Packet {
    let mut packet = Packet::default();
    packet.addr = client_addr();
    let token_start = PACKET_HASH_BYTES + 1;
    packet.len = token_start + 2 * CONTINUE_TOKEN_WIRE_BYTES + payload;
    packet.buffer[PACKET_HASH_BYTES] = PacketType::ContinueRequest as u8;
    token
        .write_sealed(
            &mut packet.buffer[token_start..token_start + CONTINUE_TOKEN_WIRE_BYTES],
            &backend_continue_token_key(),
        )
        .expect("seal continue token");
    for i in token_start + CONTINUE_TOKEN_WIRE_BYTES..packet.len {
        packet.buffer[i] = 0xCC;
    }
    hash::sign_packet(&mut packet.buffer[..packet.len]);
    packet
}
