// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Little-endian cursor codec for everything on the wire that is not a
//! fixed zerocopy struct.
//!
//! Every function advances `index` past the bytes it consumed or
//! produced. Bounds are the caller's responsibility: the dispatcher and
//! handlers validate packet lengths before reading, writers size their
//! buffers up front, and an out-of-range access panics in both debug
//! and release the way any slice access does.

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::net::address::{
    ADDRESS_BYTES, ADDRESS_IPV4, ADDRESS_IPV6, ADDRESS_NONE, Address,
};

#[inline]
pub fn read_u8(buf: &[u8], index: &mut usize) -> u8 {
    let value = buf[*index];
    *index += 1;
    value
}

#[inline]
pub fn read_u16(buf: &[u8], index: &mut usize) -> u16 {
    let mut bytes = [0u8; 2];
    bytes.copy_from_slice(&buf[*index..*index + 2]);
    *index += 2;
    u16::from_le_bytes(bytes)
}

#[inline]
pub fn read_u32(buf: &[u8], index: &mut usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[*index..*index + 4]);
    *index += 4;
    u32::from_le_bytes(bytes)
}

#[inline]
pub fn read_u64(buf: &[u8], index: &mut usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[*index..*index + 8]);
    *index += 8;
    u64::from_le_bytes(bytes)
}

#[inline]
pub fn read_f32(buf: &[u8], index: &mut usize) -> f32 {
    f32::from_bits(read_u32(buf, index))
}

#[inline]
pub fn read_f64(buf: &[u8], index: &mut usize) -> f64 {
    f64::from_bits(read_u64(buf, index))
}

#[inline]
pub fn read_bytes(buf: &[u8], index: &mut usize, out: &mut [u8]) {
    out.copy_from_slice(&buf[*index..*index + out.len()]);
    *index += out.len();
}

#[inline]
pub fn write_u8(buf: &mut [u8], index: &mut usize, value: u8) {
    buf[*index] = value;
    *index += 1;
}

#[inline]
pub fn write_u16(buf: &mut [u8], index: &mut usize, value: u16) {
    buf[*index..*index + 2].copy_from_slice(&value.to_le_bytes());
    *index += 2;
}

#[inline]
pub fn write_u32(buf: &mut [u8], index: &mut usize, value: u32) {
    buf[*index..*index + 4].copy_from_slice(&value.to_le_bytes());
    *index += 4;
}

#[inline]
pub fn write_u64(buf: &mut [u8], index: &mut usize, value: u64) {
    buf[*index..*index + 8].copy_from_slice(&value.to_le_bytes());
    *index += 8;
}

#[inline]
pub fn write_f32(buf: &mut [u8], index: &mut usize, value: f32) {
    write_u32(buf, index, value.to_bits());
}

#[inline]
pub fn write_f64(buf: &mut [u8], index: &mut usize, value: f64) {
    write_u64(buf, index, value.to_bits());
}

#[inline]
pub fn write_bytes(buf: &mut [u8], index: &mut usize, data: &[u8]) {
    buf[*index..*index + data.len()].copy_from_slice(data);
    *index += data.len();
}

/// Decode the 20-byte address form. An unknown type byte decodes as
/// `Address::None`; the cursor always advances the full 20 bytes.
pub fn read_address(buf: &[u8], index: &mut usize) -> Address {
    let start = *index;
    let kind = read_u8(buf, index);
    let address = match kind {
        ADDRESS_IPV4 => {
            let mut octets = [0u8; 4];
            read_bytes(buf, index, &mut octets);
            *index += 12;
            let port = read_u16(buf, index);
            Address::Ipv4(Ipv4Addr::from(octets), port)
        },
        ADDRESS_IPV6 => {
            let mut groups = [0u16; 8];
            for group in &mut groups {
                *group = read_u16(buf, index);
            }
            let port = read_u16(buf, index);
            Address::Ipv6(
                Ipv6Addr::new(
                    groups[0], groups[1], groups[2], groups[3], groups[4],
                    groups[5], groups[6], groups[7],
                ),
                port,
            )
        },
        _ => Address::None,
    };
    *index = start + ADDRESS_BYTES;
    address
}

/// Encode the 20-byte address form. `Address::None` (and anything that
/// failed to parse upstream) encodes as 20 zero bytes.
pub fn write_address(buf: &mut [u8], index: &mut usize, address: &Address) {
    let start = *index;
    buf[start..start + ADDRESS_BYTES].fill(0);
    match address {
        Address::None => {
            write_u8(buf, index, ADDRESS_NONE);
        },
        Address::Ipv4(ip, port) => {
            write_u8(buf, index, ADDRESS_IPV4);
            write_bytes(buf, index, &ip.octets());
            *index += 12;
            write_u16(buf, index, *port);
        },
        Address::Ipv6(ip, port) => {
            write_u8(buf, index, ADDRESS_IPV6);
            for group in ip.segments() {
                write_u16(buf, index, group);
            }
            write_u16(buf, index, *port);
        },
    }
    *index = start + ADDRESS_BYTES;
}
