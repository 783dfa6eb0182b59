// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Relay-to-relay and client-to-relay probe packets.

use crate::{
    models::packet_type::PacketType,
    net::address::{ADDRESS_BYTES, Address},
    wire,
};

/// type | sequence | from address | format version
pub const RELAY_PING_PACKET_BYTES: usize = 1 + 8 + ADDRESS_BYTES + 1;

pub const RELAY_PING_VERSION: u8 = 1;

/// Client-supplied padding a near ping carries; the reply strips it.
pub const NEAR_PAD_BYTES: usize = 16;

/// Encode a relay ping into `buf`; returns the bytes written.
pub fn write_relay_ping(buf: &mut [u8], sequence: u64, from: &Address) -> usize {
    let mut index = 0;
    wire::write_u8(buf, &mut index, PacketType::RelayPing as u8);
    wire::write_u64(buf, &mut index, sequence);
    wire::write_address(buf, &mut index, from);
    wire::write_u8(buf, &mut index, RELAY_PING_VERSION);
    index
}

/// Sequence carried by a relay ping or pong.
pub fn read_relay_ping_sequence(buf: &[u8]) -> u64 {
    let mut index = 1;
    wire::read_u64(buf, &mut index)
}
