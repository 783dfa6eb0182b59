// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Packet-family filter: an 8-byte keyed MAC prefixed to every signed
//! packet.
//!
//! The key is a fixed constant shared by the whole relay fleet and the
//! SDK. Matching the MAC only proves the packet was produced by code
//! holding the key; per-session payload authenticity is the session
//! header's job.

use hex_literal::hex;

use crate::core::packet::MAX_PACKET_BYTES;

pub const PACKET_HASH_BYTES: usize = 8;

const PACKET_HASH_KEY: [u8; 32] =
    hex!("e3186172ee70623740f60aeae0b51a2c2a47988f27ec632c25047489af5aeb24");

/// True iff the first 8 bytes of `packet` are the keyed MAC of the rest.
pub fn is_signed_packet(packet: &[u8]) -> bool {
    if packet.len() <= PACKET_HASH_BYTES || packet.len() > MAX_PACKET_BYTES {
        return false;
    }
    let mac = blake3::keyed_hash(&PACKET_HASH_KEY, &packet[PACKET_HASH_BYTES..]);
    mac.as_bytes()[..PACKET_HASH_BYTES] == packet[..PACKET_HASH_BYTES]
}

/// Overwrite the first 8 bytes of `packet` with the MAC of the rest.
pub fn sign_packet(packet: &mut [u8]) {
    debug_assert!(packet.len() > PACKET_HASH_BYTES);
    let mac = blake3::keyed_hash(&PACKET_HASH_KEY, &packet[PACKET_HASH_BYTES..]);
    packet[..PACKET_HASH_BYTES].copy_from_slice(&mac.as_bytes()[..PACKET_HASH_BYTES]);
}
