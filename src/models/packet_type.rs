// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The closed first-byte vocabulary of the relay wire protocol.
//!
//! Signed packets carry an 8-byte keyed MAC before the type byte;
//! unsigned ones lead with it. The dispatcher consults byte 0 against
//! the unsigned vocabulary first, so the two framings never collide.
//! Values are stable and must never be reused.

use thiserror::Error;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    RouteRequest = 1,
    RouteResponse = 2,
    ClientToServer = 3,
    ServerToClient = 4,
    SessionPing = 5,
    SessionPong = 6,
    ContinueRequest = 7,
    ContinueResponse = 8,
    RelayPing = 9,
    RelayPong = 10,
    NearPing = 11,
    NearPong = 12,
}

#[derive(Debug, Error)]
#[error("unknown packet type: 0x{0:02x}")]
pub struct UnknownPacketType(pub u8);

impl PacketType {
    /// Types valid in the unsigned (no MAC prefix) framing.
    pub fn unsigned_tag(byte: u8) -> Option<Self> {
        Some(match byte {
            9 => Self::RelayPing,
            10 => Self::RelayPong,
            11 => Self::NearPing,
            12 => Self::NearPong,
            _ => return None,
        })
    }

    /// Types valid after an 8-byte MAC prefix.
    pub fn signed_tag(byte: u8) -> Option<Self> {
        Some(match byte {
            1 => Self::RouteRequest,
            2 => Self::RouteResponse,
            3 => Self::ClientToServer,
            4 => Self::ServerToClient,
            5 => Self::SessionPing,
            6 => Self::SessionPong,
            7 => Self::ContinueRequest,
            8 => Self::ContinueResponse,
            11 => Self::NearPing,
            _ => return None,
        })
    }
}

impl TryFrom<u8> for PacketType {
    type Error = UnknownPacketType;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Self::signed_tag(byte)
            .or_else(|| Self::unsigned_tag(byte))
            .ok_or(UnknownPacketType(byte))
    }
}
