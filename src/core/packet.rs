// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::net::address::Address;

/// Largest datagram the relay will touch. Buffers are sized once per
/// worker and reused for every receive.
pub const MAX_PACKET_BYTES: usize = 1500;

/// One datagram in flight through a worker: the peer it came from (or
/// goes to), the used length and the reusable buffer.
pub struct Packet {
    pub addr: Address,
    pub len: usize,
    pub buffer: [u8; MAX_PACKET_BYTES],
}

impl Default for Packet {
    fn default() -> Self {
        Self {
            addr: Address::None,
            len: 0,
            buffer: [0u8; MAX_PACKET_BYTES],
        }
    }
}

impl Packet {
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.buffer[..self.len]
    }
}
