// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use overlay_relay_rs::models::{
    header::{PacketDirection, SESSION_HEADER_BYTES, SessionHeader},
    packet_type::PacketType,
};
use rand::RngExt;

fn random_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    rand::rng().fill(&mut key);
    key
}

#[test]
fn test_client_to_server_round_trip() {
    let key = random_key();

    let header = SessionHeader {
        packet_type: PacketType::ClientToServer as u8,
        sequence: 123123130131,
        session_id: 0x12313131,
        session_version: 0x12,
    };

    let mut buf = [0u8; SESSION_HEADER_BYTES];
    header
        .write(&mut buf, PacketDirection::ClientToServer, &key)
        .expect("write");

    let other = SessionHeader::read(&buf).expect("read");
    assert_eq!(other, header);

    assert!(SessionHeader::verify(&buf, PacketDirection::ClientToServer, &key));
}

#[test]
fn test_server_to_client_round_trip() {
    let key = random_key();

    let header = SessionHeader {
        packet_type: PacketType::ServerToClient as u8,
        sequence: 123123130131 | (1 << 63),
        session_id: 0x12313131,
        session_version: 0x12,
    };

    let mut buf = [0u8; SESSION_HEADER_BYTES];
    header
        .write(&mut buf, PacketDirection::ServerToClient, &key)
        .expect("write");

    let other = SessionHeader::read(&buf).expect("read");
    assert_eq!(other, header);

    assert!(SessionHeader::verify(&buf, PacketDirection::ServerToClient, &key));
}

#[test]
fn test_direction_is_bound_into_the_mac() {
    let key = random_key();

    let header = SessionHeader {
        packet_type: PacketType::ClientToServer as u8,
        sequence: 1,
        session_id: 42,
        session_version: 1,
    };

    let mut buf = [0u8; SESSION_HEADER_BYTES];
    header
        .write(&mut buf, PacketDirection::ClientToServer, &key)
        .expect("write");

    assert!(!SessionHeader::verify(&buf, PacketDirection::ServerToClient, &key));
}

#[test]
fn test_wrong_key_fails_verify() {
    let header = SessionHeader {
        packet_type: PacketType::ClientToServer as u8,
        sequence: 1,
        session_id: 42,
        session_version: 1,
    };

    let mut buf = [0u8; SESSION_HEADER_BYTES];
    header
        .write(&mut buf, PacketDirection::ClientToServer, &random_key())
        .expect("write");

    assert!(!SessionHeader::verify(
        &buf,
        PacketDirection::ClientToServer,
        &random_key()
    ));
}

#[test]
fn test_any_field_mutation_fails_verify() {
    let key = random_key();

    let header = SessionHeader {
        packet_type: PacketType::ClientToServer as u8,
        sequence: 7,
        session_id: 0xDEAD00,
        session_version: 2,
    };

    let mut buf = [0u8; SESSION_HEADER_BYTES];
    header
        .write(&mut buf, PacketDirection::ClientToServer, &key)
        .expect("write");

    // byte 0 is the type, which the mac does not cover (relays rewrite
    // it in place for local replies); every other byte is bound
    for i in 1..SESSION_HEADER_BYTES {
        let mut mutated = buf;
        mutated[i] ^= 0x01;
        assert!(
            !SessionHeader::verify(&mutated, PacketDirection::ClientToServer, &key),
            "mutation at {i} went unnoticed"
        );
    }
}

#[test]
fn test_short_buffer_is_rejected() {
    let buf = [0u8; SESSION_HEADER_BYTES - 1];
    assert!(SessionHeader::read(&buf).is_err());
    assert!(!SessionHeader::verify(&buf, PacketDirection::ClientToServer, &[0u8; 32]));
}

#[test]
fn test_header_hash_matches_session_key() {
    let header = SessionHeader {
        packet_type: PacketType::ClientToServer as u8,
        sequence: 0,
        session_id: 0xAABBCCDD00,
        session_version: 9,
    };
    assert_eq!(header.hash(), 0xAABBCCDD09);
}
