// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use overlay_relay_rs::{
    crypto::hash::{self, PACKET_HASH_BYTES},
    handlers::route,
    models::{
        header::{PacketDirection, SessionHeader},
        packet_type::PacketType,
        token::{ROUTE_TOKEN_WIRE_BYTES, RouteToken},
    },
};

use crate::integration_tests::common::{
    SESSION_KEY, bind_loopback, client_addr, make_session, recv_packet,
    route_request_packet, test_state,
};

fn sample_token(next_addr: overlay_relay_rs::net::address::Address) -> RouteToken {
    RouteToken {
        expire_timestamp: 100,
        session_id: 0x1122334455667700,
        session_version: 1,
        kbps_up: 256,
        kbps_down: 512,
        next_addr,
        private_key: SESSION_KEY,
    }
}

#[test]
fn test_route_admission_creates_session_and_forwards() {
    let state = test_state();
    let worker = bind_loopback();
    let next_hop = bind_loopback();
    let next_addr = next_hop.local_addr().expect("next addr");

    let token = sample_token(next_addr);
    let mut packet = route_request_packet(&token, 40);
    let original_len = packet.len;

    route::route_request(&mut packet, &state, &worker, true);

    // session created under (id & !0xff) | version
    assert_eq!(state.sessions.size(), 1);
    let hash_key = 0x1122334455667701u64;
    {
        let session = state.sessions.get(hash_key).expect("session");
        assert_eq!(session.session_id, token.session_id);
        assert_eq!(session.session_version, 1);
        assert_eq!(session.expire_timestamp, 100);
        assert_eq!(session.kbps_up, 256);
        assert_eq!(session.kbps_down, 512);
        assert_eq!(session.prev_addr, client_addr());
        assert_eq!(session.next_addr, next_addr);
        assert_eq!(session.private_key, SESSION_KEY);
        assert_eq!(session.client_to_server_sequence, 0);
        assert_eq!(session.server_to_client_sequence, 0);
    }
    assert_eq!(state.sessions.envelope_up_total(), 256);
    assert_eq!(state.sessions.envelope_down_total(), 512);

    // the forwarded request lost exactly our token and is re-signed
    let forwarded = recv_packet(&next_hop).expect("forwarded route request");
    assert_eq!(forwarded.len, original_len - ROUTE_TOKEN_WIRE_BYTES);
    assert!(hash::is_signed_packet(forwarded.payload()));
    assert_eq!(forwarded.buffer[PACKET_HASH_BYTES], PacketType::RouteRequest as u8);
    // what follows is the next hop's token, untouched
    assert!(
        forwarded.buffer
            [PACKET_HASH_BYTES + 1..PACKET_HASH_BYTES + 1 + ROUTE_TOKEN_WIRE_BYTES]
            .iter()
            .all(|&b| b == 0xCC)
    );
}

#[test]
fn test_second_route_request_is_idempotent() {
    let state = test_state();
    let worker = bind_loopback();
    let next_hop = bind_loopback();
    let token = sample_token(next_hop.local_addr().expect("next addr"));

    let mut packet = route_request_packet(&token, 0);
    route::route_request(&mut packet, &state, &worker, true);
    assert_eq!(state.sessions.size(), 1);
    assert!(recv_packet(&next_hop).is_some());

    let mut packet = route_request_packet(&token, 0);
    route::route_request(&mut packet, &state, &worker, true);
    assert_eq!(state.sessions.size(), 1);
    // still forwarded so downstream relays refresh too
    assert!(recv_packet(&next_hop).is_some());
}

#[test]
fn test_expired_token_is_rejected() {
    let state = test_state();
    state.router_info.set_timestamp(1000);
    let worker = bind_loopback();
    let next_hop = bind_loopback();

    let mut token = sample_token(next_hop.local_addr().expect("next addr"));
    token.expire_timestamp = 999;

    let mut packet = route_request_packet(&token, 0);
    route::route_request(&mut packet, &state, &worker, true);

    assert_eq!(state.sessions.size(), 0);
    assert!(recv_packet(&next_hop).is_none());
}

#[test]
fn test_short_route_request_is_dropped() {
    let state = test_state();
    let worker = bind_loopback();
    let next_hop = bind_loopback();
    let token = sample_token(next_hop.local_addr().expect("next addr"));

    let mut packet = route_request_packet(&token, 0);
    // one token's worth is not enough: there must be a next hop token
    packet.len = PACKET_HASH_BYTES + 1 + ROUTE_TOKEN_WIRE_BYTES;
    route::route_request(&mut packet, &state, &worker, true);

    assert_eq!(state.sessions.size(), 0);
    assert!(recv_packet(&next_hop).is_none());
}

#[test]
fn test_garbage_token_is_rejected() {
    let state = test_state();
    let worker = bind_loopback();
    let next_hop = bind_loopback();
    let token = sample_token(next_hop.local_addr().expect("next addr"));

    let mut packet = route_request_packet(&token, 0);
    packet.buffer[PACKET_HASH_BYTES + 1 + 20] ^= 0x01;
    hash::sign_packet(&mut packet.buffer[..packet.len]);
    route::route_request(&mut packet, &state, &worker, true);

    assert_eq!(state.sessions.size(), 0);
    assert!(recv_packet(&next_hop).is_none());
}

#[test]
fn test_drain_mode_admits_nothing() {
    let state = test_state();
    let worker = bind_loopback();
    let next_hop = bind_loopback();
    let token = sample_token(next_hop.local_addr().expect("next addr"));

    let mut packet = route_request_packet(&token, 0);
    route::route_request(&mut packet, &state, &worker, false);

    assert_eq!(state.sessions.size(), 0);
    assert!(recv_packet(&next_hop).is_none());
}

#[test]
fn test_route_response_rides_back_to_prev_addr() {
    let state = test_state();
    let worker = bind_loopback();
    let client = bind_loopback();
    let client_side = client.local_addr().expect("client side");

    let session = make_session(0xAA00, 1, client_side, client_addr());
    state.sessions.set(session.hash(), session);

    let header = SessionHeader {
        packet_type: PacketType::RouteResponse as u8,
        sequence: 1,
        session_id: 0xAA00,
        session_version: 1,
    };
    let mut packet =
        crate::integration_tests::common::session_packet(
            &header,
            PacketDirection::ServerToClient,
            16,
        );

    route::route_response(&mut packet, &state, &worker, true);
    let got = recv_packet(&client).expect("route response");
    assert_eq!(got.len, packet.len);

    // the same sequence again is a replay
    route::route_response(&mut packet, &state, &worker, true);
    assert!(recv_packet(&client).is_none());
}
