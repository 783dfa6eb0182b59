// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Backend-issued admission tickets.
//!
//! A route token tells one relay where to forward a new session and
//! under what envelope; a continue token extends an existing session's
//! life. Both travel sealed to the receiving relay (see
//! `crypto::seal`) behind a one-byte format version.

use thiserror::Error;
use zerocopy::{
    FromBytes as ZFromBytes, Immutable, IntoBytes, KnownLayout, LittleEndian,
    Unaligned, U32, U64,
};

use crate::{
    core::session::session_hash,
    crypto::seal::{self, SEAL_OVERHEAD_BYTES, SealError},
    net::address::{ADDRESS_BYTES, Address},
    wire,
};

pub const TOKEN_VERSION: u8 = 1;

pub const ROUTE_TOKEN_BODY_BYTES: usize = 77;
pub const ROUTE_TOKEN_WIRE_BYTES: usize =
    1 + ROUTE_TOKEN_BODY_BYTES + SEAL_OVERHEAD_BYTES;

pub const CONTINUE_TOKEN_BODY_BYTES: usize = 17;
pub const CONTINUE_TOKEN_WIRE_BYTES: usize =
    1 + CONTINUE_TOKEN_BODY_BYTES + SEAL_OVERHEAD_BYTES;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token too short: {0} bytes")]
    Length(usize),
    #[error("unsupported token version: {0}")]
    Version(u8),
    #[error("token authentication failed")]
    Seal(#[from] SealError),
    #[error("malformed token body")]
    Malformed,
}

#[repr(C)]
#[derive(Debug, Default, Clone, ZFromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
struct RouteTokenWire {
    expire_timestamp: U64<LittleEndian>,
    session_id: U64<LittleEndian>,
    session_version: u8,
    kbps_up: U32<LittleEndian>,
    kbps_down: U32<LittleEndian>,
    next_addr: [u8; ADDRESS_BYTES],
    private_key: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteToken {
    pub expire_timestamp: u64,
    pub session_id: u64,
    pub session_version: u8,
    pub kbps_up: u32,
    pub kbps_down: u32,
    pub next_addr: Address,
    pub private_key: [u8; 32],
}

impl RouteToken {
    /// Open and decode a sealed route token at the start of `buf`.
    pub fn read_sealed(buf: &[u8], key: &[u8; 32]) -> Result<Self, TokenError> {
        let body = open_token(buf, ROUTE_TOKEN_WIRE_BYTES, key)?;
        let raw = RouteTokenWire::ref_from_bytes(&body[..])
            .map_err(|_| TokenError::Malformed)?;
        let mut index = 0;
        let next_addr = wire::read_address(&raw.next_addr, &mut index);
        Ok(Self {
            expire_timestamp: raw.expire_timestamp.get(),
            session_id: raw.session_id.get(),
            session_version: raw.session_version,
            kbps_up: raw.kbps_up.get(),
            kbps_down: raw.kbps_down.get(),
            next_addr,
            private_key: raw.private_key,
        })
    }

    /// Seal this token into `buf`. The backend side of the exchange;
    /// relays only read, tests stand in for the backend.
    pub fn write_sealed(&self, buf: &mut [u8], key: &[u8; 32]) -> Result<(), TokenError> {
        let mut next_addr = [0u8; ADDRESS_BYTES];
        let mut index = 0;
        wire::write_address(&mut next_addr, &mut index, &self.next_addr);
        let raw = RouteTokenWire {
            expire_timestamp: U64::new(self.expire_timestamp),
            session_id: U64::new(self.session_id),
            session_version: self.session_version,
            kbps_up: U32::new(self.kbps_up),
            kbps_down: U32::new(self.kbps_down),
            next_addr,
            private_key: self.private_key,
        };
        seal_token(raw.as_bytes(), buf, ROUTE_TOKEN_WIRE_BYTES, key)
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        session_hash(self.session_id, self.session_version)
    }

    #[inline]
    pub fn expired(&self, now: u64) -> bool {
        self.expire_timestamp < now
    }
}

#[repr(C)]
#[derive(Debug, Default, Clone, ZFromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
struct ContinueTokenWire {
    expire_timestamp: U64<LittleEndian>,
    session_id: U64<LittleEndian>,
    session_version: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinueToken {
    pub expire_timestamp: u64,
    pub session_id: u64,
    pub session_version: u8,
}

impl ContinueToken {
    pub fn read_sealed(buf: &[u8], key: &[u8; 32]) -> Result<Self, TokenError> {
        let body = open_token(buf, CONTINUE_TOKEN_WIRE_BYTES, key)?;
        let raw = ContinueTokenWire::ref_from_bytes(&body[..])
            .map_err(|_| TokenError::Malformed)?;
        Ok(Self {
            expire_timestamp: raw.expire_timestamp.get(),
            session_id: raw.session_id.get(),
            session_version: raw.session_version,
        })
    }

    pub fn write_sealed(&self, buf: &mut [u8], key: &[u8; 32]) -> Result<(), TokenError> {
        let raw = ContinueTokenWire {
            expire_timestamp: U64::new(self.expire_timestamp),
            session_id: U64::new(self.session_id),
            session_version: self.session_version,
        };
        seal_token(raw.as_bytes(), buf, CONTINUE_TOKEN_WIRE_BYTES, key)
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        session_hash(self.session_id, self.session_version)
    }

    #[inline]
    pub fn expired(&self, now: u64) -> bool {
        self.expire_timestamp < now
    }
}

fn open_token(buf: &[u8], wire_size: usize, key: &[u8; 32]) -> Result<Vec<u8>, TokenError> {
    if buf.len() < wire_size {
        return Err(TokenError::Length(buf.len()));
    }
    let version = buf[0];
    if version != TOKEN_VERSION {
        return Err(TokenError::Version(version));
    }
    Ok(seal::open(&buf[1..wire_size], key)?)
}

fn seal_token(
    body: &[u8],
    buf: &mut [u8],
    wire_size: usize,
    key: &[u8; 32],
) -> Result<(), TokenError> {
    if buf.len() < wire_size {
        return Err(TokenError::Length(buf.len()));
    }
    let sealed = seal::seal(body, key)?;
    buf[0] = TOKEN_VERSION;
    buf[1..wire_size].copy_from_slice(&sealed);
    Ok(())
}
