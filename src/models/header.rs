// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The 25-byte session header carried by every session-scoped packet
//! (data, session pings, route/continue responses).
//!
//! Layout: type, sequence, session id, session version, then a 7-byte
//! MAC keyed with the session private key over the direction byte and
//! the header fields. Reading needs no key; verifying does, which is
//! why the two are separate steps around the session-table lookup.

use thiserror::Error;
use zerocopy::{
    FromBytes as ZFromBytes, Immutable, IntoBytes, KnownLayout, LittleEndian,
    Unaligned, U64,
};

use crate::core::session::session_hash;

pub const SESSION_HEADER_BYTES: usize = 25;
pub const HEADER_MAC_BYTES: usize = 7;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketDirection {
    ClientToServer = 0,
    ServerToClient = 1,
}

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("buffer too short for session header: {0} bytes")]
    Length(usize),
    #[error("malformed session header")]
    Malformed,
}

/// Wire form of the header; every field is alignment-1 so the struct
/// maps straight onto the packet buffer.
#[repr(C)]
#[derive(Debug, Default, Clone, ZFromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
struct SessionHeaderWire {
    packet_type: u8,
    sequence: U64<LittleEndian>,
    session_id: U64<LittleEndian>,
    session_version: u8,
    mac: [u8; HEADER_MAC_BYTES],
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionHeader {
    pub packet_type: u8,
    pub sequence: u64,
    pub session_id: u64,
    pub session_version: u8,
}

impl SessionHeader {
    /// Session-table key for this header.
    #[inline]
    pub fn hash(&self) -> u64 {
        session_hash(self.session_id, self.session_version)
    }

    /// Decode the header fields without checking the MAC.
    pub fn read(buf: &[u8]) -> Result<Self, HeaderError> {
        if buf.len() < SESSION_HEADER_BYTES {
            return Err(HeaderError::Length(buf.len()));
        }
        let raw = SessionHeaderWire::ref_from_bytes(&buf[..SESSION_HEADER_BYTES])
            .map_err(|_| HeaderError::Malformed)?;
        Ok(Self {
            packet_type: raw.packet_type,
            sequence: raw.sequence.get(),
            session_id: raw.session_id.get(),
            session_version: raw.session_version,
        })
    }

    /// Encode the header including its MAC.
    pub fn write(
        &self,
        buf: &mut [u8],
        direction: PacketDirection,
        key: &[u8; 32],
    ) -> Result<(), HeaderError> {
        if buf.len() < SESSION_HEADER_BYTES {
            return Err(HeaderError::Length(buf.len()));
        }
        let raw = SessionHeaderWire {
            packet_type: self.packet_type,
            sequence: U64::new(self.sequence),
            session_id: U64::new(self.session_id),
            session_version: self.session_version,
            mac: compute_mac(
                direction,
                self.sequence,
                self.session_id,
                self.session_version,
                key,
            ),
        };
        buf[..SESSION_HEADER_BYTES].copy_from_slice(raw.as_bytes());
        Ok(())
    }

    /// Recompute the MAC from the on-wire fields and compare.
    pub fn verify(buf: &[u8], direction: PacketDirection, key: &[u8; 32]) -> bool {
        if buf.len() < SESSION_HEADER_BYTES {
            return false;
        }
        let Ok(raw) = SessionHeaderWire::ref_from_bytes(&buf[..SESSION_HEADER_BYTES])
        else {
            return false;
        };
        let expected = compute_mac(
            direction,
            raw.sequence.get(),
            raw.session_id.get(),
            raw.session_version,
            key,
        );
        raw.mac == expected
    }
}

fn compute_mac(
    direction: PacketDirection,
    sequence: u64,
    session_id: u64,
    session_version: u8,
    key: &[u8; 32],
) -> [u8; HEADER_MAC_BYTES] {
    let mut message = [0u8; 18];
    message[0] = direction as u8;
    message[1..9].copy_from_slice(&sequence.to_le_bytes());
    message[9..17].copy_from_slice(&session_id.to_le_bytes());
    message[17] = session_version;
    let digest = blake3::keyed_hash(key, &message);
    let mut mac = [0u8; HEADER_MAC_BYTES];
    mac.copy_from_slice(&digest.as_bytes()[..HEADER_MAC_BYTES]);
    mac
}
